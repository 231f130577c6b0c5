use api::models::Coach;
use dioxus::prelude::*;
use ui::{use_academy, LoadingPlaceholder};

#[component]
pub fn Coaches() -> Element {
    let academy = use_academy();
    let coaches = use_resource(move || {
        let academy = academy.clone();
        async move { academy.coaches().get_all().await }
    });

    rsx! {
        section {
            class: "page",
            h1 { "Our coaches" }
            match &*coaches.read() {
                None => rsx! { LoadingPlaceholder { message: "Loading coaches..." } },
                Some(Err(e)) => rsx! { p { class: "muted", "Could not load coaches: {e}" } },
                Some(Ok(list)) if list.is_empty() => rsx! { p { class: "muted", "Coach profiles are coming soon." } },
                Some(Ok(list)) => rsx! {
                    div {
                        class: "card-grid",
                        for coach in list.iter().cloned() {
                            CoachCard { key: "{coach.id}", coach }
                        }
                    }
                },
            }
        }
    }
}

#[component]
fn CoachCard(coach: Coach) -> Element {
    rsx! {
        article {
            class: "card",
            if let Some(url) = &coach.image_url {
                img { class: "card-image", src: "{url}", alt: "{coach.name}" }
            }
            div {
                class: "card-body",
                h3 { "{coach.name}" }
                p { class: "badge", "{coach.rank}" }
                if let Some(experience) = &coach.experience {
                    p { class: "muted", "{experience}" }
                }
                if let Some(bio) = &coach.bio {
                    p { "{bio}" }
                }
                TagList { title: "Specialization", items: coach.specialization.clone() }
                TagList { title: "Achievements", items: coach.achievements.clone() }
            }
        }
    }
}

#[component]
fn TagList(title: String, items: Option<Vec<String>>) -> Element {
    let items = items.unwrap_or_default();
    if items.is_empty() {
        return rsx! {};
    }
    rsx! {
        h4 { "{title}" }
        ul {
            class: "tags",
            for item in items {
                li { key: "{item}", "{item}" }
            }
        }
    }
}
