use dioxus::prelude::*;

use crate::Route;

#[component]
pub fn About() -> Element {
    rsx! {
        section {
            class: "page narrow",
            h1 { "About the academy" }
            p {
                "We teach traditional technique alongside modern sport training. Every class "
                "builds fitness, focus and respect, whatever the student's age or goal."
            }
            h2 { "What to expect" }
            ul {
                li { "Structured grading from white belt to black belt" }
                li { "Regular seminars, workshops and competitions" }
                li { "Small groups so every student gets attention" }
            }
            p {
                "Ready to try a class? "
                Link { to: Route::Join {}, "Register here" }
                "."
            }
        }
    }
}
