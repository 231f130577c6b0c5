use api::models::{Coach, CoachUpdate, NewCoach};
use dioxus::prelude::*;
use ui::icons::{FaPen, FaPlus, FaTrashCan};
use ui::{push_toast, use_academy, use_toasts, Icon, ImageUpload, LoadingPlaceholder, ToastLevel, UploadTarget};

use crate::format;

/// Which coach the form is editing, if it is open.
#[derive(Clone, PartialEq)]
enum Editing {
    New,
    Existing(Coach),
}

impl Editing {
    fn key(&self) -> String {
        match self {
            Editing::New => "new".to_string(),
            Editing::Existing(coach) => coach.id.clone(),
        }
    }
}

#[component]
pub fn AdminCoaches() -> Element {
    let academy = use_academy();
    let mut toasts = use_toasts();
    let mut editing = use_signal(|| Option::<Editing>::None);
    let mut coaches = use_resource({
        let academy = academy.clone();
        move || {
            let academy = academy.clone();
            async move { academy.coaches().get_all().await }
        }
    });

    let delete = move |coach: Coach| {
        let academy = academy.clone();
        async move {
            match academy.coaches().delete(&coach.id).await {
                Ok(()) => {
                    push_toast(&mut toasts, ToastLevel::Success, "Coach deleted", None);
                    coaches.restart();
                }
                Err(e) => push_toast(&mut toasts, ToastLevel::Error, "Could not delete coach", Some(e.to_string())),
            }
        }
    };

    let form = editing().map(|current| {
        let key = current.key();
        rsx! {
            CoachForm {
                key: "{key}",
                editing: current,
                onsaved: move |_| {
                    editing.set(None);
                    coaches.restart();
                },
                oncancel: move |_| editing.set(None),
            }
        }
    });

    rsx! {
        div {
            class: "admin-header",
            h1 { "Coaches" }
            button {
                class: "button primary",
                onclick: move |_| editing.set(Some(Editing::New)),
                Icon { icon: FaPlus, width: 12, height: 12 }
                " Add coach"
            }
        }

        {form}

        match &*coaches.read() {
            None => rsx! { LoadingPlaceholder {} },
            Some(Err(e)) => rsx! { p { class: "form-error", "Could not load coaches: {e}" } },
            Some(Ok(list)) => rsx! {
                table {
                    class: "admin-table",
                    thead { tr { th { "" } th { "Name" } th { "Rank" } th { "Experience" } th { "" } } }
                    tbody {
                        for coach in list.iter().cloned() {
                            tr {
                                key: "{coach.id}",
                                td {
                                    if let Some(url) = &coach.image_url {
                                        img { class: "thumb", src: "{url}", alt: "{coach.name}" }
                                    }
                                }
                                td { "{coach.name}" }
                                td { "{coach.rank}" }
                                td { {coach.experience.clone().unwrap_or_default()} }
                                td {
                                    class: "row-actions",
                                    button {
                                        class: "icon-button",
                                        title: "Edit",
                                        onclick: {
                                            let coach = coach.clone();
                                            move |_| editing.set(Some(Editing::Existing(coach.clone())))
                                        },
                                        Icon { icon: FaPen, width: 14, height: 14 }
                                    }
                                    button {
                                        class: "icon-button danger",
                                        title: "Delete",
                                        onclick: {
                                            let coach = coach.clone();
                                            let delete = delete.clone();
                                            move |_| delete(coach.clone())
                                        },
                                        Icon { icon: FaTrashCan, width: 14, height: 14 }
                                    }
                                }
                            }
                        }
                    }
                }
            },
        }
    }
}

#[component]
fn CoachForm(editing: Editing, onsaved: EventHandler<()>, oncancel: EventHandler<()>) -> Element {
    let academy = use_academy();
    let mut toasts = use_toasts();
    let existing = match &editing {
        Editing::Existing(coach) => Some(coach.clone()),
        Editing::New => None,
    };
    let initial = existing.clone();
    let mut name = use_signal(|| initial.as_ref().map(|c| c.name.clone()).unwrap_or_default());
    let mut rank = use_signal(|| initial.as_ref().map(|c| c.rank.clone()).unwrap_or_default());
    let mut experience = use_signal(|| initial.as_ref().and_then(|c| c.experience.clone()).unwrap_or_default());
    let mut specialization = use_signal(|| initial.as_ref().map(|c| format::join_list(&c.specialization)).unwrap_or_default());
    let mut achievements = use_signal(|| initial.as_ref().map(|c| format::join_list(&c.achievements)).unwrap_or_default());
    let mut bio = use_signal(|| initial.as_ref().and_then(|c| c.bio.clone()).unwrap_or_default());
    let mut image_url = use_signal(|| initial.as_ref().and_then(|c| c.image_url.clone()));
    let mut saving = use_signal(|| false);

    let upload_target = UploadTarget::Coach(
        existing.as_ref().map(|c| c.id.clone()).unwrap_or_else(|| "new".to_string()),
    );

    let onsubmit = move |evt: FormEvent| {
        evt.prevent_default();
        let academy = academy.clone();
        let existing = existing.clone();
        async move {
            saving.set(true);
            let result = match existing {
                Some(coach) => {
                    let patch = CoachUpdate {
                        name: Some(name()),
                        rank: Some(rank()),
                        experience: Some(format::optional(&experience())),
                        specialization: Some(format::list(&specialization())),
                        achievements: Some(format::list(&achievements())),
                        image_url: Some(image_url()),
                        bio: Some(format::optional(&bio())),
                        ..CoachUpdate::default()
                    };
                    academy.coaches().update(&coach.id, &patch).await.map(|_| "Coach updated")
                }
                None => {
                    let coach = NewCoach {
                        name: name(),
                        rank: rank(),
                        experience: format::optional(&experience()),
                        specialization: format::list(&specialization()),
                        achievements: format::list(&achievements()),
                        students: None,
                        image_url: image_url(),
                        bio: format::optional(&bio()),
                    };
                    academy.coaches().create(&coach).await.map(|_| "Coach added")
                }
            };
            saving.set(false);
            match result {
                Ok(title) => {
                    push_toast(&mut toasts, ToastLevel::Success, title, None);
                    onsaved.call(());
                }
                Err(e) => push_toast(&mut toasts, ToastLevel::Error, "Could not save coach", Some(e.to_string())),
            }
        }
    };

    rsx! {
        form {
            class: "form admin-form",
            onsubmit: onsubmit,
            h2 { if matches!(editing, Editing::New) { "New coach" } else { "Edit coach" } }
            label { "Photo" }
            ImageUpload {
                value: image_url(),
                target: upload_target,
                onchange: move |url| image_url.set(url),
            }
            label { "Name" }
            input { value: "{name}", oninput: move |e| name.set(e.value()) }
            label { "Rank" }
            input { value: "{rank}", placeholder: "e.g. 3rd Dan", oninput: move |e| rank.set(e.value()) }
            label { "Experience" }
            input { value: "{experience}", oninput: move |e| experience.set(e.value()) }
            label { "Specialization (comma separated)" }
            input { value: "{specialization}", oninput: move |e| specialization.set(e.value()) }
            label { "Achievements (comma separated)" }
            input { value: "{achievements}", oninput: move |e| achievements.set(e.value()) }
            label { "Bio" }
            textarea { rows: 4, value: "{bio}", oninput: move |e| bio.set(e.value()) }
            div {
                class: "form-actions",
                button { r#type: "button", class: "button", onclick: move |_| oncancel.call(()), "Cancel" }
                button { r#type: "submit", class: "button primary", disabled: saving(), "Save" }
            }
        }
    }
}
