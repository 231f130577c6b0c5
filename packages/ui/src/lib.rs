//! This crate contains all shared UI for the workspace.

// Re-export icon library
pub use dioxus_free_icons::Icon;
pub mod icons {
    pub use dioxus_free_icons::icons::fa_solid_icons::*;
}

mod auth;
pub use auth::{use_academy, use_auth, AppBackend, AuthProvider, SignOutButton};

mod loading;
pub use loading::LoadingPlaceholder;

mod image_upload;
pub use image_upload::{ImageUpload, UploadTarget};

pub mod toast;
pub use toast::{push_toast, use_toasts, ToastHost, ToastLevel, Toasts};

mod navbar;
pub use navbar::Navbar;
