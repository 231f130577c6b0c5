use api::models::{Event, EventType, EventUpdate, NewEvent};
use chrono::Utc;
use dioxus::prelude::*;
use ui::icons::{FaPen, FaPlus, FaTrashCan};
use ui::{push_toast, use_academy, use_toasts, Icon, ImageUpload, LoadingPlaceholder, ToastLevel, UploadTarget};

use crate::format;

#[component]
pub fn AdminEvents() -> Element {
    let academy = use_academy();
    let mut toasts = use_toasts();
    // `Some(None)` is the empty form for a new event.
    let mut editing = use_signal(|| Option::<Option<Event>>::None);
    let mut events = use_resource({
        let academy = academy.clone();
        move || {
            let academy = academy.clone();
            async move { academy.events().get_all().await }
        }
    });

    let delete = move |id: String| {
        let academy = academy.clone();
        async move {
            match academy.events().delete(&id).await {
                Ok(()) => {
                    push_toast(&mut toasts, ToastLevel::Success, "Event deleted", None);
                    events.restart();
                }
                Err(e) => push_toast(&mut toasts, ToastLevel::Error, "Could not delete event", Some(e.to_string())),
            }
        }
    };

    let form = editing().map(|current| {
        let key = current.as_ref().map(|e| e.id.clone()).unwrap_or_else(|| "new".to_string());
        rsx! {
            EventForm {
                key: "{key}",
                event: current,
                onsaved: move |_| {
                    editing.set(None);
                    events.restart();
                },
                oncancel: move |_| editing.set(None),
            }
        }
    });
    let now = Utc::now();

    rsx! {
        div {
            class: "admin-header",
            h1 { "Events" }
            button {
                class: "button primary",
                onclick: move |_| editing.set(Some(None)),
                Icon { icon: FaPlus, width: 12, height: 12 }
                " Add event"
            }
        }

        {form}

        match &*events.read() {
            None => rsx! { LoadingPlaceholder {} },
            Some(Err(e)) => rsx! { p { class: "form-error", "Could not load events: {e}" } },
            Some(Ok(list)) => rsx! {
                table {
                    class: "admin-table",
                    thead { tr { th { "Title" } th { "Date" } th { "Type" } th { "Status" } th { "" } } }
                    tbody {
                        for event in list.iter().cloned() {
                            tr {
                                key: "{event.id}",
                                td { "{event.title}" }
                                td { {format::date_time(&event.date)} }
                                td { "{event.kind}" }
                                td { if event.has_happened(now) { "Past" } else { "Upcoming" } }
                                td {
                                    class: "row-actions",
                                    button {
                                        class: "icon-button",
                                        title: "Edit",
                                        onclick: {
                                            let event = event.clone();
                                            move |_| editing.set(Some(Some(event.clone())))
                                        },
                                        Icon { icon: FaPen, width: 14, height: 14 }
                                    }
                                    button {
                                        class: "icon-button danger",
                                        title: "Delete",
                                        onclick: {
                                            let id = event.id.clone();
                                            let delete = delete.clone();
                                            move |_| delete(id.clone())
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
fn EventForm(event: Option<Event>, onsaved: EventHandler<()>, oncancel: EventHandler<()>) -> Element {
    let academy = use_academy();
    let mut toasts = use_toasts();
    let initial = event.clone();
    let mut title = use_signal(|| initial.as_ref().map(|e| e.title.clone()).unwrap_or_default());
    let mut description = use_signal(|| initial.as_ref().and_then(|e| e.description.clone()).unwrap_or_default());
    let mut date = use_signal(|| initial.as_ref().map(|e| format::datetime_local(&e.date)).unwrap_or_default());
    let mut location = use_signal(|| initial.as_ref().and_then(|e| e.location.clone()).unwrap_or_default());
    let mut kind = use_signal(|| initial.as_ref().map(|e| e.kind).unwrap_or_default());
    let mut registration_link = use_signal(|| initial.as_ref().and_then(|e| e.registration_link.clone()).unwrap_or_default());
    let mut image_url = use_signal(|| initial.as_ref().and_then(|e| e.image_url.clone()));
    let mut is_past = use_signal(|| initial.as_ref().and_then(|e| e.is_past).unwrap_or(false));
    let mut saving = use_signal(|| false);

    let is_new = event.is_none();
    let upload_target = UploadTarget::Event(
        event.as_ref().map(|e| e.id.clone()).unwrap_or_else(|| "new".to_string()),
    );

    let onsubmit = move |evt: FormEvent| {
        evt.prevent_default();
        let academy = academy.clone();
        let existing = event.clone();
        async move {
            let Some(when) = format::parse_datetime_local(&date()) else {
                push_toast(&mut toasts, ToastLevel::Error, "Please pick a date and time", None);
                return;
            };
            saving.set(true);
            let result = match existing {
                Some(event) => {
                    let patch = EventUpdate {
                        title: Some(title()),
                        description: Some(format::optional(&description())),
                        date: Some(when),
                        location: Some(format::optional(&location())),
                        kind: Some(kind()),
                        registration_link: Some(format::optional(&registration_link())),
                        image_url: Some(image_url()),
                        is_past: Some(Some(is_past())),
                    };
                    academy.events().update(&event.id, &patch).await.map(|_| "Event updated")
                }
                None => {
                    let mut event = NewEvent::new(title(), when, kind());
                    event.description = format::optional(&description());
                    event.location = format::optional(&location());
                    event.registration_link = format::optional(&registration_link());
                    event.image_url = image_url();
                    event.is_past = is_past().then_some(true);
                    academy.events().create(&event).await.map(|_| "Event added")
                }
            };
            saving.set(false);
            match result {
                Ok(message) => {
                    push_toast(&mut toasts, ToastLevel::Success, message, None);
                    onsaved.call(());
                }
                Err(e) => push_toast(&mut toasts, ToastLevel::Error, "Could not save event", Some(e.to_string())),
            }
        }
    };

    rsx! {
        form {
            class: "form admin-form",
            onsubmit: onsubmit,
            h2 { if is_new { "New event" } else { "Edit event" } }
            label { "Cover image" }
            ImageUpload {
                value: image_url(),
                target: upload_target,
                onchange: move |url| image_url.set(url),
            }
            label { "Title" }
            input { value: "{title}", oninput: move |e| title.set(e.value()) }
            label { "Date" }
            input { r#type: "datetime-local", value: "{date}", oninput: move |e| date.set(e.value()) }
            label { "Type" }
            select {
                value: "{kind}",
                onchange: move |e| {
                    if let Some(parsed) = EventType::parse(&e.value()) {
                        kind.set(parsed);
                    }
                },
                for option_kind in EventType::ALL {
                    option { key: "{option_kind}", value: "{option_kind}", "{option_kind}" }
                }
            }
            label { "Location" }
            input { value: "{location}", oninput: move |e| location.set(e.value()) }
            label { "Registration link" }
            input { r#type: "url", value: "{registration_link}", oninput: move |e| registration_link.set(e.value()) }
            label { "Description" }
            textarea { rows: 4, value: "{description}", oninput: move |e| description.set(e.value()) }
            label {
                class: "checkbox",
                input {
                    r#type: "checkbox",
                    checked: is_past(),
                    onchange: move |e| is_past.set(e.checked()),
                }
                " Mark as past event"
            }
            div {
                class: "form-actions",
                button { r#type: "button", class: "button", onclick: move |_| oncancel.call(()), "Cancel" }
                button { r#type: "submit", class: "button primary", disabled: saving(), "Save" }
            }
        }
    }
}
