use api::models::Event;
use api::DataError;
use dioxus::prelude::*;
use ui::{use_academy, LoadingPlaceholder};

use crate::format;

#[component]
pub fn Events() -> Element {
    let academy = use_academy();
    let upcoming = use_resource({
        let academy = academy.clone();
        move || {
            let academy = academy.clone();
            async move { academy.events().get_upcoming().await }
        }
    });
    let past = use_resource(move || {
        let academy = academy.clone();
        async move { academy.events().get_past().await }
    });

    rsx! {
        section {
            class: "page",
            h1 { "Events" }
            h2 { "Upcoming" }
            EventList { events: upcoming.read().clone(), empty: "No upcoming events." }
            h2 { "Past events" }
            EventList { events: past.read().clone(), empty: "No past events yet." }
        }
    }
}

#[component]
fn EventList(events: Option<Result<Vec<Event>, DataError>>, empty: String) -> Element {
    match events {
        None => rsx! { LoadingPlaceholder {} },
        Some(Err(e)) => rsx! { p { class: "muted", "Could not load events: {e}" } },
        Some(Ok(list)) if list.is_empty() => rsx! { p { class: "muted", "{empty}" } },
        Some(Ok(list)) => rsx! {
            div {
                class: "card-grid",
                for event in list {
                    EventCard { key: "{event.id}", event }
                }
            }
        },
    }
}

#[component]
fn EventCard(event: Event) -> Element {
    rsx! {
        article {
            class: "card",
            if let Some(url) = &event.image_url {
                img { class: "card-image", src: "{url}", alt: "{event.title}" }
            }
            div {
                class: "card-body",
                span { class: "badge", "{event.kind}" }
                h3 { "{event.title}" }
                p { class: "muted", {format::date_time(&event.date)} }
                if let Some(location) = &event.location {
                    p { "{location}" }
                }
                if let Some(description) = &event.description {
                    p { "{description}" }
                }
                if let Some(link) = &event.registration_link {
                    a { class: "button", href: "{link}", target: "_blank", "Register" }
                }
            }
        }
    }
}
