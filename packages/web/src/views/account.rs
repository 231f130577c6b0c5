//! The signed-in user's own profile and password.

use api::guard::{evaluate, Access};
use api::models::ProfileUpdate;
use dioxus::prelude::*;
use ui::{push_toast, use_academy, use_auth, use_toasts, LoadingPlaceholder, ToastLevel};

use crate::format;
use crate::Route;

#[component]
pub fn Account() -> Element {
    let auth = use_auth();
    let nav = use_navigator();
    let access = evaluate(&auth(), None);

    use_effect(move || {
        if let Access::Redirect(_) = evaluate(&auth(), None) {
            nav.replace(Route::Auth {});
        }
    });

    match access {
        // Arrived through a password reset link: the new password comes first.
        Access::Granted if auth().password_recovery => rsx! {
            section {
                class: "page narrow",
                h1 { "Choose a new password" }
                PasswordForm {}
            }
        },
        Access::Granted => rsx! {
            section {
                class: "page narrow",
                h1 { "Your account" }
                ProfileForm {}
                PasswordForm {}
            }
        },
        _ => rsx! { LoadingPlaceholder {} },
    }
}

#[component]
fn ProfileForm() -> Element {
    let academy = use_academy();
    let mut toasts = use_toasts();
    let mut full_name = use_signal(String::new);

    let profile = use_resource({
        let academy = academy.clone();
        move || {
            let academy = academy.clone();
            async move {
                let profile = academy.profiles().get_my_profile().await;
                if let Ok(p) = &profile {
                    full_name.set(p.full_name.clone().unwrap_or_default());
                }
                profile
            }
        }
    });

    let onsubmit = move |evt: FormEvent| {
        evt.prevent_default();
        let academy = academy.clone();
        async move {
            let patch = ProfileUpdate {
                full_name: Some(format::optional(&full_name())),
                ..ProfileUpdate::default()
            };
            match academy.profiles().update_my_profile(&patch).await {
                Ok(_) => push_toast(&mut toasts, ToastLevel::Success, "Profile saved", None),
                Err(e) => push_toast(&mut toasts, ToastLevel::Error, "Could not save profile", Some(e.to_string())),
            }
        }
    };

    let view = match &*profile.read() {
        None => rsx! { LoadingPlaceholder {} },
        Some(Err(e)) => rsx! { p { class: "muted", "Could not load your profile: {e}" } },
        Some(Ok(p)) => rsx! {
            h2 { "Profile" }
            form {
                class: "form",
                onsubmit: onsubmit,
                label { "Email" }
                input { value: p.email.clone().unwrap_or_default(), disabled: true }
                label { "Display name" }
                input { value: "{full_name}", oninput: move |e| full_name.set(e.value()) }
                button { class: "button primary", r#type: "submit", "Save" }
            }
        },
    };
    view
}

#[component]
fn PasswordForm() -> Element {
    let academy = use_academy();
    let mut toasts = use_toasts();
    let mut password = use_signal(String::new);
    let mut confirm = use_signal(String::new);

    let onsubmit = move |evt: FormEvent| {
        evt.prevent_default();
        let session = academy.session().clone();
        async move {
            if password() != confirm() {
                push_toast(&mut toasts, ToastLevel::Error, "Passwords do not match", None);
                return;
            }
            match session.update_password(&password()).await {
                Ok(()) => {
                    push_toast(&mut toasts, ToastLevel::Success, "Password updated", None);
                    password.set(String::new());
                    confirm.set(String::new());
                }
                Err(e) => push_toast(&mut toasts, ToastLevel::Error, "Could not update password", Some(e.to_string())),
            }
        }
    };

    rsx! {
        h2 { "Change password" }
        form {
            class: "form",
            onsubmit: onsubmit,
            label { "New password" }
            input { r#type: "password", value: "{password}", oninput: move |e| password.set(e.value()) }
            label { "Confirm password" }
            input { r#type: "password", value: "{confirm}", oninput: move |e| confirm.set(e.value()) }
            button { class: "button primary", r#type: "submit", "Update password" }
        }
    }
}
