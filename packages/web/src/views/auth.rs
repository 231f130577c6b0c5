//! Sign in, sign up and password reset.

use dioxus::prelude::*;
use ui::{push_toast, use_academy, use_auth, use_toasts, ToastLevel};

use crate::Route;

#[derive(Clone, Copy, PartialEq)]
enum Mode {
    SignIn,
    SignUp,
    Reset,
}

#[component]
pub fn Auth() -> Element {
    let auth = use_auth();
    let nav = use_navigator();
    let mode = use_signal(|| Mode::SignIn);

    // Leave once signed in and the role is known.
    use_effect(move || {
        let state = auth();
        if state.is_authenticated() && !state.is_loading() {
            if state.password_recovery {
                nav.replace(Route::Account {});
            } else if state.is_admin {
                nav.replace(Route::AdminDashboard {});
            } else {
                nav.replace(Route::Home {});
            }
        }
    });

    rsx! {
        section {
            class: "page narrow auth-page",
            if let Some(e) = auth().link_error {
                p { class: "form-error", "{e}" }
            }
            match mode() {
                Mode::SignIn => rsx! { SignInForm { mode } },
                Mode::SignUp => rsx! { SignUpForm { mode } },
                Mode::Reset => rsx! { ResetForm { mode } },
            }
        }
    }
}

#[component]
fn SignInForm(mode: Signal<Mode>) -> Element {
    let mut mode = mode;
    let academy = use_academy();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut busy = use_signal(|| false);

    let onsubmit = move |evt: FormEvent| {
        evt.prevent_default();
        let session = academy.session().clone();
        async move {
            busy.set(true);
            error.set(None);
            if let Err(e) = session.sign_in(&email(), &password()).await {
                error.set(Some(e.to_string()));
            }
            busy.set(false);
        }
    };

    rsx! {
        h1 { "Sign in" }
        form {
            class: "form",
            onsubmit: onsubmit,
            label { "Email" }
            input { r#type: "email", value: "{email}", oninput: move |e| email.set(e.value()) }
            label { "Password" }
            input { r#type: "password", value: "{password}", oninput: move |e| password.set(e.value()) }
            if let Some(message) = error() {
                p { class: "form-error", "{message}" }
            }
            button { class: "button primary", r#type: "submit", disabled: busy(), "Sign in" }
        }
        p {
            button { class: "link-button", onclick: move |_| mode.set(Mode::Reset), "Forgot your password?" }
        }
        p {
            "No account yet? "
            button { class: "link-button", onclick: move |_| mode.set(Mode::SignUp), "Create one" }
        }
    }
}

#[component]
fn SignUpForm(mode: Signal<Mode>) -> Element {
    let mut mode = mode;
    let academy = use_academy();
    let mut toasts = use_toasts();
    let mut full_name = use_signal(String::new);
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut busy = use_signal(|| false);

    let onsubmit = move |evt: FormEvent| {
        evt.prevent_default();
        let session = academy.session().clone();
        async move {
            busy.set(true);
            error.set(None);
            let name = full_name();
            match session.sign_up(&email(), &password(), Some(name.as_str())).await {
                Ok(()) => {
                    push_toast(
                        &mut toasts,
                        ToastLevel::Success,
                        "Account created",
                        Some("Check your email to verify your address, then sign in.".to_string()),
                    );
                    mode.set(Mode::SignIn);
                }
                Err(e) => error.set(Some(e.to_string())),
            }
            busy.set(false);
        }
    };

    rsx! {
        h1 { "Create an account" }
        form {
            class: "form",
            onsubmit: onsubmit,
            label { "Full name" }
            input { value: "{full_name}", oninput: move |e| full_name.set(e.value()) }
            label { "Email" }
            input { r#type: "email", value: "{email}", oninput: move |e| email.set(e.value()) }
            label { "Password" }
            input { r#type: "password", value: "{password}", oninput: move |e| password.set(e.value()) }
            if let Some(message) = error() {
                p { class: "form-error", "{message}" }
            }
            button { class: "button primary", r#type: "submit", disabled: busy(), "Sign up" }
        }
        p {
            "Already registered? "
            button { class: "link-button", onclick: move |_| mode.set(Mode::SignIn), "Sign in" }
        }
    }
}

#[component]
fn ResetForm(mode: Signal<Mode>) -> Element {
    let mut mode = mode;
    let academy = use_academy();
    let mut toasts = use_toasts();
    let mut email = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut busy = use_signal(|| false);

    let onsubmit = move |evt: FormEvent| {
        evt.prevent_default();
        let session = academy.session().clone();
        async move {
            busy.set(true);
            error.set(None);
            match session.reset_password(&email()).await {
                Ok(()) => {
                    push_toast(
                        &mut toasts,
                        ToastLevel::Info,
                        "Check your email",
                        Some("If an account exists for that address, a reset link is on its way.".to_string()),
                    );
                    mode.set(Mode::SignIn);
                }
                Err(e) => error.set(Some(e.to_string())),
            }
            busy.set(false);
        }
    };

    rsx! {
        h1 { "Reset your password" }
        form {
            class: "form",
            onsubmit: onsubmit,
            label { "Email" }
            input { r#type: "email", value: "{email}", oninput: move |e| email.set(e.value()) }
            if let Some(message) = error() {
                p { class: "form-error", "{message}" }
            }
            button { class: "button primary", r#type: "submit", disabled: busy(), "Send reset link" }
        }
        p {
            button { class: "link-button", onclick: move |_| mode.set(Mode::SignIn), "Back to sign in" }
        }
    }
}
