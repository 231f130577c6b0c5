use api::models::NewMessage;
use dioxus::prelude::*;
use ui::{push_toast, use_academy, use_toasts, LoadingPlaceholder, ToastLevel};

use crate::format;
use crate::Route;

#[component]
pub fn Home() -> Element {
    let academy = use_academy();
    let upcoming = use_resource(move || {
        let academy = academy.clone();
        async move { academy.events().get_upcoming().await }
    });

    rsx! {
        section {
            class: "hero",
            h1 { "Discipline, respect and confidence" }
            p { "Classes for kids and adults, taught by experienced black belts." }
            div {
                class: "hero-actions",
                Link { class: "button primary", to: Route::Join {}, "Start training" }
                Link { class: "button", to: Route::Coaches {}, "Meet the coaches" }
            }
        }

        section {
            class: "page",
            h2 { "Upcoming events" }
            match &*upcoming.read() {
                None => rsx! { LoadingPlaceholder {} },
                Some(Err(e)) => rsx! { p { class: "muted", "Events are unavailable right now: {e}" } },
                Some(Ok(events)) if events.is_empty() => rsx! { p { class: "muted", "No events scheduled yet." } },
                Some(Ok(events)) => rsx! {
                    ul {
                        class: "event-teasers",
                        for event in events.iter().take(3) {
                            li {
                                key: "{event.id}",
                                strong { "{event.title}" }
                                span { class: "muted", " {format::date(&event.date)}" }
                            }
                        }
                    }
                    Link { to: Route::Events {}, "All events" }
                },
            }
        }

        section {
            class: "page narrow",
            h2 { "Contact us" }
            ContactForm {}
        }
    }
}

#[component]
fn ContactForm() -> Element {
    let academy = use_academy();
    let mut toasts = use_toasts();
    let mut name = use_signal(String::new);
    let mut email = use_signal(String::new);
    let mut subject = use_signal(String::new);
    let mut body = use_signal(String::new);
    let mut sending = use_signal(|| false);

    let onsubmit = move |evt: FormEvent| {
        evt.prevent_default();
        let academy = academy.clone();
        async move {
            let message = NewMessage {
                name: name(),
                email: email(),
                subject: format::optional(&subject()),
                message: body(),
            };
            sending.set(true);
            match academy.messages().submit(&message).await {
                Ok(_) => {
                    push_toast(&mut toasts, ToastLevel::Success, "Message sent", Some("We will get back to you soon.".to_string()));
                    name.set(String::new());
                    email.set(String::new());
                    subject.set(String::new());
                    body.set(String::new());
                }
                Err(e) => push_toast(&mut toasts, ToastLevel::Error, "Could not send message", Some(e.to_string())),
            }
            sending.set(false);
        }
    };

    rsx! {
        form {
            class: "form",
            onsubmit: onsubmit,
            label { "Name" }
            input { value: "{name}", oninput: move |e| name.set(e.value()) }
            label { "Email" }
            input { r#type: "email", value: "{email}", oninput: move |e| email.set(e.value()) }
            label { "Subject" }
            input { value: "{subject}", oninput: move |e| subject.set(e.value()) }
            label { "Message" }
            textarea { rows: 5, value: "{body}", oninput: move |e| body.set(e.value()) }
            button {
                class: "button primary",
                r#type: "submit",
                disabled: sending(),
                if sending() { "Sending..." } else { "Send message" }
            }
        }
    }
}
