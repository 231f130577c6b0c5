//! Transient success/error/info messages.
//!
//! The web app provides one `Signal<Toasts>` at the root and renders [`ToastHost`]
//! once; any view pushes with [`push_toast`]. On the web build toasts dismiss
//! themselves after a few seconds.

use dioxus::prelude::*;

#[cfg(target_arch = "wasm32")]
const TOAST_TTL: std::time::Duration = std::time::Duration::from_secs(5);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub level: ToastLevel,
    pub title: String,
    pub message: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct Toasts {
    pub entries: Vec<Toast>,
    next_id: u64,
}

impl Toasts {
    fn push(&mut self, level: ToastLevel, title: &str, message: Option<String>) -> u64 {
        self.next_id += 1;
        self.entries.push(Toast {
            id: self.next_id,
            level,
            title: title.to_string(),
            message,
        });
        self.next_id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.entries.retain(|t| t.id != id);
    }
}

pub fn use_toasts() -> Signal<Toasts> {
    use_context::<Signal<Toasts>>()
}

/// Show a toast. `message` is the optional second line, usually an error's `Display`.
pub fn push_toast(toasts: &mut Signal<Toasts>, level: ToastLevel, title: &str, message: Option<String>) {
    if level == ToastLevel::Error {
        tracing::error!("{}: {}", title, message.as_deref().unwrap_or_default());
    }
    let id = toasts.write().push(level, title, message);

    #[cfg(target_arch = "wasm32")]
    {
        let mut toasts = *toasts;
        spawn(async move {
            gloo_timers::future::sleep(TOAST_TTL).await;
            toasts.write().dismiss(id);
        });
    }
    #[cfg(not(target_arch = "wasm32"))]
    let _ = id;
}

#[component]
pub fn ToastHost() -> Element {
    let mut toasts = use_toasts();
    let entries = toasts().entries.clone();

    rsx! {
        div {
            class: "toast-host",
            for toast in entries {
                div {
                    key: "{toast.id}",
                    class: match toast.level {
                        ToastLevel::Error => "toast toast-error",
                        ToastLevel::Success => "toast toast-success",
                        ToastLevel::Info => "toast toast-info",
                    },
                    div {
                        class: "toast-body",
                        strong { "{toast.title}" }
                        if let Some(message) = &toast.message {
                            p { "{message}" }
                        }
                    }
                    button {
                        class: "toast-close",
                        onclick: move |_| toasts.write().dismiss(toast.id),
                        "×"
                    }
                }
            }
        }
    }
}
