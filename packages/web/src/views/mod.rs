mod site_layout;
pub use site_layout::SiteLayout;

mod home;
pub use home::Home;

mod about;
pub use about::About;

mod classes;
pub use classes::Classes;

mod coaches;
pub use coaches::Coaches;

mod events;
pub use events::Events;

mod gallery;
pub use gallery::Gallery;

mod join;
pub use join::Join;

mod auth;
pub use auth::Auth;

mod account;
pub use account::Account;

mod access_denied;
pub use access_denied::AccessDenied;

mod not_found;
pub use not_found::NotFound;

pub mod admin;
