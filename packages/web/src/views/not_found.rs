use dioxus::prelude::*;

use crate::Route;

#[component]
pub fn NotFound(segments: Vec<String>) -> Element {
    tracing::debug!("no route for /{}", segments.join("/"));
    rsx! { NotFoundContent {} }
}

#[component]
pub fn NotFoundContent() -> Element {
    rsx! {
        section {
            class: "page narrow",
            h1 { "Page not found" }
            p { "The page you are looking for does not exist." }
            Link { class: "button", to: Route::Home {}, "Go home" }
        }
    }
}
