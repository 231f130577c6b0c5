//! Admin console. Every page here renders inside [`AdminLayout`], which holds the
//! route guard: nothing below it mounts until the signed-in user holds the admin role.

use api::guard::{evaluate, Access, Redirect};
use dioxus::prelude::*;
use ui::icons::{
    FaCalendar, FaGauge, FaGraduationCap, FaImages, FaMessage, FaRightFromBracket, FaUserGear,
    FaUsers,
};
use ui::{use_academy, use_auth, Icon, LoadingPlaceholder, SignOutButton};

use crate::Route;

mod coaches;
pub use coaches::AdminCoaches;

mod dashboard;
pub use dashboard::AdminDashboard;

mod events;
pub use events::AdminEvents;

mod gallery;
pub use gallery::AdminGallery;

mod messages;
pub use messages::AdminMessages;

mod students;
pub use students::AdminStudents;

mod users;
pub use users::AdminUsers;

#[component]
pub fn AdminLayout() -> Element {
    let academy = use_academy();
    let auth = use_auth();
    let nav = use_navigator();
    let required = academy.config().auth.admin_role;
    let access = evaluate(&auth(), Some(required));

    use_effect(move || {
        if let Access::Redirect(redirect) = evaluate(&auth(), Some(required)) {
            tracing::info!("admin console redirect to {}", redirect.path());
            match redirect {
                Redirect::SignIn => nav.replace(Route::Auth {}),
                Redirect::AccessDenied => nav.replace(Route::AccessDenied {}),
            };
        }
    });

    if access != Access::Granted {
        return rsx! {
            div {
                class: "admin-loading",
                LoadingPlaceholder { message: "Checking access..." }
            }
        };
    }

    rsx! {
        div {
            class: "admin-shell",
            aside {
                class: "admin-sidebar",
                Link { class: "brand", to: Route::Home {}, "Academy" }
                nav {
                    SidebarLink { to: Route::AdminDashboard {}, label: "Dashboard", Icon { icon: FaGauge, width: 16, height: 16 } }
                    SidebarLink { to: Route::AdminCoaches {}, label: "Coaches", Icon { icon: FaUsers, width: 16, height: 16 } }
                    SidebarLink { to: Route::AdminEvents {}, label: "Events", Icon { icon: FaCalendar, width: 16, height: 16 } }
                    SidebarLink { to: Route::AdminStudents {}, label: "Students", Icon { icon: FaGraduationCap, width: 16, height: 16 } }
                    SidebarLink { to: Route::AdminMessages {}, label: "Messages", Icon { icon: FaMessage, width: 16, height: 16 } }
                    SidebarLink { to: Route::AdminGallery {}, label: "Gallery", Icon { icon: FaImages, width: 16, height: 16 } }
                    SidebarLink { to: Route::AdminUsers {}, label: "Users", Icon { icon: FaUserGear, width: 16, height: 16 } }
                }
                div {
                    class: "admin-sidebar-footer",
                    Icon { icon: FaRightFromBracket, width: 14, height: 14 }
                    SignOutButton {
                        class: "link-button",
                        on_signed_out: move |_| {
                            nav.replace(Route::Home {});
                        },
                    }
                }
            }
            main {
                class: "admin-main",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn SidebarLink(to: Route, label: String, children: Element) -> Element {
    rsx! {
        Link {
            class: "admin-link",
            active_class: "active",
            to,
            {children}
            span { "{label}" }
        }
    }
}
