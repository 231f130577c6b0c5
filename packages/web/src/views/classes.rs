use api::models::ClassKind;
use dioxus::prelude::*;

use super::not_found::NotFoundContent;
use super::site_layout::class_title;
use crate::Route;

#[component]
pub fn Classes(kind: String) -> Element {
    let Some(kind) = ClassKind::parse(&kind) else {
        return rsx! { NotFoundContent {} };
    };
    let (summary, schedule) = details(kind);

    rsx! {
        section {
            class: "page narrow",
            h1 { {class_title(kind)} }
            p { "{summary}" }
            h2 { "Schedule" }
            ul {
                for slot in schedule {
                    li { key: "{slot}", "{slot}" }
                }
            }
            Link { class: "button primary", to: Route::Join {}, "Register for this class" }
        }
    }
}

fn details(kind: ClassKind) -> (&'static str, &'static [&'static str]) {
    match kind {
        ClassKind::Kids => (
            "Fun, structured sessions for ages 5 to 14 that build coordination, focus and confidence.",
            &["Monday 17:00 - 18:00", "Wednesday 17:00 - 18:00", "Saturday 10:00 - 11:00"],
        ),
        ClassKind::Adults => (
            "Technique, conditioning and sparring for beginners and experienced students alike.",
            &["Tuesday 19:00 - 20:30", "Thursday 19:00 - 20:30", "Saturday 11:30 - 13:00"],
        ),
        ClassKind::Private => (
            "One-to-one lessons tailored to your goals, from grading preparation to competition.",
            &["By appointment"],
        ),
    }
}
