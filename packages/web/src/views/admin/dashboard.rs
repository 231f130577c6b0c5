use dioxus::prelude::*;
use ui::{use_academy, LoadingPlaceholder};

use crate::Route;

#[component]
pub fn AdminDashboard() -> Element {
    let academy = use_academy();
    let stats = use_resource(move || {
        let academy = academy.clone();
        async move { academy.dashboard().stats().await }
    });

    rsx! {
        h1 { "Dashboard" }
        match &*stats.read() {
            None => rsx! { LoadingPlaceholder { message: "Loading statistics..." } },
            Some(Err(e)) => rsx! { p { class: "form-error", "Could not load statistics: {e}" } },
            Some(Ok(stats)) => rsx! {
                div {
                    class: "stat-grid",
                    StatCard { label: "Coaches", value: stats.coaches, to: Route::AdminCoaches {} }
                    StatCard { label: "Events", value: stats.events, to: Route::AdminEvents {} }
                    StatCard { label: "Students", value: stats.students, to: Route::AdminStudents {} }
                    StatCard { label: "Pending registrations", value: stats.pending_students, to: Route::AdminStudents {} }
                    StatCard { label: "Messages", value: stats.messages, to: Route::AdminMessages {} }
                    StatCard { label: "Unread messages", value: stats.unread_messages, to: Route::AdminMessages {} }
                }
            },
        }
    }
}

#[component]
fn StatCard(label: String, value: u64, to: Route) -> Element {
    rsx! {
        Link {
            class: "stat-card",
            to,
            span { class: "stat-value", "{value}" }
            span { class: "stat-label", "{label}" }
        }
    }
}
