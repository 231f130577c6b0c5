use api::models::Message;
use dioxus::prelude::*;
use ui::icons::{FaEnvelopeOpen, FaTrashCan};
use ui::{push_toast, use_academy, use_toasts, Icon, LoadingPlaceholder, ToastLevel};

use crate::format;

#[component]
pub fn AdminMessages() -> Element {
    let academy = use_academy();
    let mut toasts = use_toasts();
    let mut messages = use_resource({
        let academy = academy.clone();
        move || {
            let academy = academy.clone();
            async move { academy.messages().get_all().await }
        }
    });

    let mark_read = {
        let academy = academy.clone();
        move |id: String| {
            let academy = academy.clone();
            async move {
                match academy.messages().mark_as_read(&id).await {
                    Ok(_) => messages.restart(),
                    Err(e) => push_toast(&mut toasts, ToastLevel::Error, "Could not update message", Some(e.to_string())),
                }
            }
        }
    };

    let delete = move |id: String| {
        let academy = academy.clone();
        async move {
            match academy.messages().delete(&id).await {
                Ok(()) => {
                    push_toast(&mut toasts, ToastLevel::Success, "Message deleted", None);
                    messages.restart();
                }
                Err(e) => push_toast(&mut toasts, ToastLevel::Error, "Could not delete message", Some(e.to_string())),
            }
        }
    };

    rsx! {
        h1 { "Messages" }
        match &*messages.read() {
            None => rsx! { LoadingPlaceholder {} },
            Some(Err(e)) => rsx! { p { class: "form-error", "Could not load messages: {e}" } },
            Some(Ok(list)) if list.is_empty() => rsx! { p { class: "muted", "The inbox is empty." } },
            Some(Ok(list)) => rsx! {
                div {
                    class: "message-list",
                    for message in list.iter().cloned() {
                        MessageCard {
                            key: "{message.id}",
                            message,
                            onread: {
                                let mark_read = mark_read.clone();
                                move |id: String| mark_read(id)
                            },
                            ondelete: {
                                let delete = delete.clone();
                                move |id: String| delete(id)
                            },
                        }
                    }
                }
            },
        }
    }
}

#[component]
fn MessageCard(message: Message, onread: EventHandler<String>, ondelete: EventHandler<String>) -> Element {
    let read_id = message.id.clone();
    let delete_id = message.id.clone();
    let email_label = format!(" <{}>", message.email);

    rsx! {
        article {
            class: if message.is_read { "message" } else { "message unread" },
            header {
                strong { "{message.name}" }
                a { href: "mailto:{message.email}", "{email_label}" }
                span { class: "muted", " {format::date_time(&message.created_at)}" }
            }
            if let Some(subject) = &message.subject {
                h3 { "{subject}" }
            }
            p { "{message.message}" }
            div {
                class: "row-actions",
                if !message.is_read {
                    button {
                        class: "icon-button",
                        title: "Mark as read",
                        onclick: move |_| onread.call(read_id.clone()),
                        Icon { icon: FaEnvelopeOpen, width: 14, height: 14 }
                    }
                }
                button {
                    class: "icon-button danger",
                    title: "Delete",
                    onclick: move |_| ondelete.call(delete_id.clone()),
                    Icon { icon: FaTrashCan, width: 14, height: 14 }
                }
            }
        }
    }
}
