use dioxus::prelude::*;

/// Shown while auth or data is still loading.
#[component]
pub fn LoadingPlaceholder(#[props(default = "Loading...".to_string())] message: String) -> Element {
    rsx! {
        div {
            class: "loading-placeholder",
            role: "status",
            div { class: "loading-spinner" }
            p { "{message}" }
        }
    }
}
