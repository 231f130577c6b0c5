use api::models::{Student, StudentStatus};
use dioxus::prelude::*;
use ui::icons::{FaCheck, FaTrashCan, FaXmark};
use ui::{push_toast, use_academy, use_toasts, Icon, LoadingPlaceholder, ToastLevel};

use crate::format;

/// Registrations, newest first, with approve/reject/delete.
#[component]
pub fn AdminStudents() -> Element {
    let academy = use_academy();
    let mut toasts = use_toasts();
    let mut students = use_resource({
        let academy = academy.clone();
        move || {
            let academy = academy.clone();
            async move { academy.students().get_all().await }
        }
    });

    let set_status = {
        let academy = academy.clone();
        move |id: String, status: StudentStatus| {
            let academy = academy.clone();
            async move {
                match academy.students().update_status(&id, status).await {
                    Ok(student) => {
                        push_toast(&mut toasts, ToastLevel::Success, &format!("{} {}", student.name, status), None);
                        students.restart();
                    }
                    Err(e) => push_toast(&mut toasts, ToastLevel::Error, "Could not update registration", Some(e.to_string())),
                }
            }
        }
    };

    let delete = move |id: String| {
        let academy = academy.clone();
        async move {
            match academy.students().delete(&id).await {
                Ok(()) => {
                    push_toast(&mut toasts, ToastLevel::Success, "Registration deleted", None);
                    students.restart();
                }
                Err(e) => push_toast(&mut toasts, ToastLevel::Error, "Could not delete registration", Some(e.to_string())),
            }
        }
    };

    rsx! {
        h1 { "Students" }
        match &*students.read() {
            None => rsx! { LoadingPlaceholder {} },
            Some(Err(e)) => rsx! { p { class: "form-error", "Could not load registrations: {e}" } },
            Some(Ok(list)) if list.is_empty() => rsx! { p { class: "muted", "No registrations yet." } },
            Some(Ok(list)) => rsx! {
                table {
                    class: "admin-table",
                    thead { tr { th { "Name" } th { "Contact" } th { "Age" } th { "Class" } th { "Received" } th { "Status" } th { "" } } }
                    tbody {
                        for student in list.iter().cloned() {
                            StudentRow {
                                key: "{student.id}",
                                student,
                                onstatus: {
                                    let set_status = set_status.clone();
                                    move |(id, status): (String, StudentStatus)| set_status(id, status)
                                },
                                ondelete: {
                                    let delete = delete.clone();
                                    move |id: String| delete(id)
                                },
                            }
                        }
                    }
                }
            },
        }
    }
}

#[component]
fn StudentRow(
    student: Student,
    onstatus: EventHandler<(String, StudentStatus)>,
    ondelete: EventHandler<String>,
) -> Element {
    let id = student.id.clone();
    let approve_id = id.clone();
    let reject_id = id.clone();

    rsx! {
        tr {
            td {
                "{student.name}"
                if let Some(message) = &student.message {
                    p { class: "muted small", "{message}" }
                }
            }
            td {
                div { "{student.email}" }
                div { class: "muted", "{student.phone}" }
            }
            td { "{student.age}" }
            td { "{student.class}" }
            td { {format::date(&student.created_at)} }
            td { span { class: "status status-{student.status}", "{student.status}" } }
            td {
                class: "row-actions",
                if student.status != StudentStatus::Approved {
                    button {
                        class: "icon-button",
                        title: "Approve",
                        onclick: move |_| onstatus.call((approve_id.clone(), StudentStatus::Approved)),
                        Icon { icon: FaCheck, width: 14, height: 14 }
                    }
                }
                if student.status != StudentStatus::Rejected {
                    button {
                        class: "icon-button",
                        title: "Reject",
                        onclick: move |_| onstatus.call((reject_id.clone(), StudentStatus::Rejected)),
                        Icon { icon: FaXmark, width: 14, height: 14 }
                    }
                }
                button {
                    class: "icon-button danger",
                    title: "Delete",
                    onclick: move |_| ondelete.call(id.clone()),
                    Icon { icon: FaTrashCan, width: 14, height: 14 }
                }
            }
        }
    }
}
