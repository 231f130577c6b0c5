use api::models::{ClassKind, NewStudent};
use dioxus::prelude::*;
use ui::{push_toast, use_academy, use_toasts, ToastLevel};

use super::site_layout::class_title;
use crate::format;

/// Class registration form.
#[component]
pub fn Join() -> Element {
    let academy = use_academy();
    let mut toasts = use_toasts();
    let mut name = use_signal(String::new);
    let mut email = use_signal(String::new);
    let mut phone = use_signal(String::new);
    let mut age = use_signal(String::new);
    let mut class = use_signal(ClassKind::default);
    let mut message = use_signal(String::new);
    let mut submitted = use_signal(|| false);
    let mut sending = use_signal(|| false);

    let onsubmit = move |evt: FormEvent| {
        evt.prevent_default();
        let academy = academy.clone();
        async move {
            let Ok(parsed_age) = age().trim().parse::<u32>() else {
                push_toast(&mut toasts, ToastLevel::Error, "Please enter a valid age", None);
                return;
            };
            let student = NewStudent {
                name: name(),
                email: email(),
                phone: phone(),
                age: parsed_age,
                class: class(),
                message: format::optional(&message()),
            };
            sending.set(true);
            match academy.students().register(&student).await {
                Ok(_) => {
                    push_toast(&mut toasts, ToastLevel::Success, "Registration received", Some("We will contact you to confirm your place.".to_string()));
                    submitted.set(true);
                }
                Err(e) => push_toast(&mut toasts, ToastLevel::Error, "Registration failed", Some(e.to_string())),
            }
            sending.set(false);
        }
    };

    if submitted() {
        return rsx! {
            section {
                class: "page narrow",
                h1 { "Thank you!" }
                p { "Your registration is pending review. We will be in touch soon." }
            }
        };
    }

    rsx! {
        section {
            class: "page narrow",
            h1 { "Join the academy" }
            form {
                class: "form",
                onsubmit: onsubmit,
                label { "Full name" }
                input { value: "{name}", oninput: move |e| name.set(e.value()) }
                label { "Email" }
                input { r#type: "email", value: "{email}", oninput: move |e| email.set(e.value()) }
                label { "Phone" }
                input { r#type: "tel", value: "{phone}", oninput: move |e| phone.set(e.value()) }
                label { "Age" }
                input { r#type: "number", min: "1", value: "{age}", oninput: move |e| age.set(e.value()) }
                label { "Class" }
                select {
                    value: "{class}",
                    onchange: move |e| {
                        if let Some(kind) = ClassKind::parse(&e.value()) {
                            class.set(kind);
                        }
                    },
                    for kind in ClassKind::ALL {
                        option { key: "{kind}", value: "{kind}", {class_title(kind)} }
                    }
                }
                label { "Anything we should know?" }
                textarea { rows: 4, value: "{message}", oninput: move |e| message.set(e.value()) }
                button {
                    class: "button primary",
                    r#type: "submit",
                    disabled: sending(),
                    if sending() { "Submitting..." } else { "Register" }
                }
            }
        }
    }
}
