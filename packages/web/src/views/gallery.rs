use api::adapters::{categories, filter_by_category, ALL_CATEGORIES};
use api::models::MediaKind;
use dioxus::prelude::*;
use ui::{use_academy, LoadingPlaceholder};

#[component]
pub fn Gallery() -> Element {
    let academy = use_academy();
    let mut selected = use_signal(|| ALL_CATEGORIES.to_string());
    let media = use_resource(move || {
        let academy = academy.clone();
        async move { academy.gallery().media().await }
    });

    let body = match &*media.read() {
        None => rsx! { LoadingPlaceholder { message: "Loading gallery..." } },
        Some(Err(e)) => rsx! { p { class: "muted", "Could not load the gallery: {e}" } },
        Some(Ok(items)) => {
            let tabs = categories(items);
            let visible = filter_by_category(items, &selected());
            rsx! {
                div {
                    class: "tabs",
                    for category in tabs {
                        button {
                            key: "{category}",
                            class: if category == selected() { "tab active" } else { "tab" },
                            onclick: {
                                let category = category.clone();
                                move |_| selected.set(category.clone())
                            },
                            "{category}"
                        }
                    }
                }
                if visible.is_empty() {
                    p { class: "muted", "Nothing here yet." }
                }
                div {
                    class: "media-grid",
                    for item in visible {
                        figure {
                            key: "{item.id}",
                            match item.kind {
                                MediaKind::Image => rsx! { img { src: "{item.url}", alt: "{item.title}" } },
                                MediaKind::Video => rsx! { video { src: "{item.url}", controls: true } },
                            }
                            figcaption { "{item.title}" }
                        }
                    }
                }
            }
        }
    };

    rsx! {
        section {
            class: "page",
            h1 { "Gallery" }
            {body}
        }
    }
}
