use api::models::{GalleryItemUpdate, GalleryPhoto, GalleryVideo, MediaKind, NewGalleryItem};
use dioxus::prelude::*;
use ui::icons::{FaPen, FaPlus, FaTrashCan};
use ui::{push_toast, use_academy, use_toasts, Icon, ImageUpload, LoadingPlaceholder, ToastLevel, UploadTarget};

/// The record a form edits: `id` is `None` for a new item.
#[derive(Clone, Debug, PartialEq)]
struct Draft {
    kind: MediaKind,
    id: Option<String>,
    item: NewGalleryItem,
}

impl Draft {
    fn new(kind: MediaKind) -> Self {
        Self {
            kind,
            id: None,
            item: NewGalleryItem::default(),
        }
    }

    fn key(&self) -> String {
        self.id.clone().unwrap_or_else(|| "new".to_string())
    }
}

impl From<&GalleryPhoto> for Draft {
    fn from(photo: &GalleryPhoto) -> Self {
        Self {
            kind: MediaKind::Image,
            id: Some(photo.id.clone()),
            item: NewGalleryItem {
                title: photo.title.clone(),
                url: photo.url.clone(),
                category: photo.category.clone(),
            },
        }
    }
}

impl From<&GalleryVideo> for Draft {
    fn from(video: &GalleryVideo) -> Self {
        Self {
            kind: MediaKind::Video,
            id: Some(video.id.clone()),
            item: NewGalleryItem {
                title: video.title.clone(),
                url: video.url.clone(),
                category: video.category.clone(),
            },
        }
    }
}

#[component]
pub fn AdminGallery() -> Element {
    let academy = use_academy();
    let mut toasts = use_toasts();
    let mut tab = use_signal(|| MediaKind::Image);
    let mut editing = use_signal(|| Option::<Draft>::None);
    let mut photos = use_resource({
        let academy = academy.clone();
        move || {
            let academy = academy.clone();
            async move { academy.gallery().photos().await }
        }
    });
    let mut videos = use_resource({
        let academy = academy.clone();
        move || {
            let academy = academy.clone();
            async move { academy.gallery().videos().await }
        }
    });

    let delete_photo = {
        let academy = academy.clone();
        move |photo: GalleryPhoto| {
            let academy = academy.clone();
            async move {
                match academy.gallery().delete_photo(&photo).await {
                    Ok(()) => {
                        push_toast(&mut toasts, ToastLevel::Success, "Photo deleted", None);
                        photos.restart();
                    }
                    Err(e) => push_toast(&mut toasts, ToastLevel::Error, "Could not delete photo", Some(e.to_string())),
                }
            }
        }
    };

    let delete_video = move |id: String| {
        let academy = academy.clone();
        async move {
            match academy.gallery().delete_video(&id).await {
                Ok(()) => {
                    push_toast(&mut toasts, ToastLevel::Success, "Video deleted", None);
                    videos.restart();
                }
                Err(e) => push_toast(&mut toasts, ToastLevel::Error, "Could not delete video", Some(e.to_string())),
            }
        }
    };

    let form = editing().map(|draft| {
        let key = draft.key();
        rsx! {
            GalleryForm {
                key: "{key}",
                draft,
                onsaved: move |kind: MediaKind| {
                    editing.set(None);
                    match kind {
                        MediaKind::Image => photos.restart(),
                        MediaKind::Video => videos.restart(),
                    }
                },
                oncancel: move |_| editing.set(None),
            }
        }
    });

    let list = match tab() {
        MediaKind::Image => match &*photos.read() {
            None => rsx! { LoadingPlaceholder {} },
            Some(Err(e)) => rsx! { p { class: "form-error", "Could not load photos: {e}" } },
            Some(Ok(items)) => rsx! {
                div {
                    class: "media-grid",
                    for photo in items.iter().cloned() {
                        figure {
                            key: "{photo.id}",
                            img { src: "{photo.url}", alt: "{photo.title}" }
                            figcaption {
                                span { "{photo.title}" }
                                span { class: "badge", "{photo.category}" }
                            }
                            div {
                                class: "row-actions",
                                button {
                                    class: "icon-button",
                                    title: "Edit",
                                    onclick: {
                                        let draft = Draft::from(&photo);
                                        move |_| editing.set(Some(draft.clone()))
                                    },
                                    Icon { icon: FaPen, width: 14, height: 14 }
                                }
                                button {
                                    class: "icon-button danger",
                                    title: "Delete",
                                    onclick: {
                                        let delete_photo = delete_photo.clone();
                                        let photo = photo.clone();
                                        move |_| delete_photo(photo.clone())
                                    },
                                    Icon { icon: FaTrashCan, width: 14, height: 14 }
                                }
                            }
                        }
                    }
                }
            },
        },
        MediaKind::Video => match &*videos.read() {
            None => rsx! { LoadingPlaceholder {} },
            Some(Err(e)) => rsx! { p { class: "form-error", "Could not load videos: {e}" } },
            Some(Ok(items)) => rsx! {
                div {
                    class: "media-grid",
                    for clip in items.iter().cloned() {
                        figure {
                            key: "{clip.id}",
                            video { src: "{clip.url}", controls: true }
                            figcaption {
                                span { "{clip.title}" }
                                span { class: "badge", "{clip.category}" }
                            }
                            div {
                                class: "row-actions",
                                button {
                                    class: "icon-button",
                                    title: "Edit",
                                    onclick: {
                                        let draft = Draft::from(&clip);
                                        move |_| editing.set(Some(draft.clone()))
                                    },
                                    Icon { icon: FaPen, width: 14, height: 14 }
                                }
                                button {
                                    class: "icon-button danger",
                                    title: "Delete",
                                    onclick: {
                                        let delete_video = delete_video.clone();
                                        let id = clip.id.clone();
                                        move |_| delete_video(id.clone())
                                    },
                                    Icon { icon: FaTrashCan, width: 14, height: 14 }
                                }
                            }
                        }
                    }
                }
            },
        },
    };

    rsx! {
        div {
            class: "admin-header",
            h1 { "Gallery" }
            button {
                class: "button primary",
                onclick: move |_| editing.set(Some(Draft::new(tab()))),
                Icon { icon: FaPlus, width: 12, height: 12 }
                if tab() == MediaKind::Image { " Add photo" } else { " Add video" }
            }
        }
        div {
            class: "tabs",
            button {
                class: if tab() == MediaKind::Image { "tab active" } else { "tab" },
                onclick: move |_| tab.set(MediaKind::Image),
                "Photos"
            }
            button {
                class: if tab() == MediaKind::Video { "tab active" } else { "tab" },
                onclick: move |_| tab.set(MediaKind::Video),
                "Videos"
            }
        }
        {form}
        {list}
    }
}

#[component]
fn GalleryForm(draft: Draft, onsaved: EventHandler<MediaKind>, oncancel: EventHandler<()>) -> Element {
    let academy = use_academy();
    let mut toasts = use_toasts();
    let mut title = use_signal(|| draft.item.title.clone());
    let mut url = use_signal(|| draft.item.url.clone());
    let mut category = use_signal(|| draft.item.category.clone());
    let mut saving = use_signal(|| false);
    let kind = draft.kind;
    let heading = match (draft.id.is_none(), kind) {
        (true, MediaKind::Image) => "New photo",
        (true, MediaKind::Video) => "New video",
        (false, MediaKind::Image) => "Edit photo",
        (false, MediaKind::Video) => "Edit video",
    };

    let onsubmit = move |evt: FormEvent| {
        evt.prevent_default();
        let academy = academy.clone();
        let id = draft.id.clone();
        async move {
            let gallery = academy.gallery();
            saving.set(true);
            let result = match id {
                Some(id) => {
                    let patch = GalleryItemUpdate {
                        title: Some(title()),
                        url: Some(url()),
                        category: Some(category()),
                    };
                    match kind {
                        MediaKind::Image => gallery.update_photo(&id, &patch).await.map(|_| ()),
                        MediaKind::Video => gallery.update_video(&id, &patch).await.map(|_| ()),
                    }
                }
                None => {
                    let item = NewGalleryItem {
                        title: title(),
                        url: url(),
                        category: category(),
                    };
                    match kind {
                        MediaKind::Image => gallery.create_photo(&item).await.map(|_| ()),
                        MediaKind::Video => gallery.create_video(&item).await.map(|_| ()),
                    }
                }
            };
            saving.set(false);
            match result {
                Ok(()) => {
                    push_toast(&mut toasts, ToastLevel::Success, "Gallery saved", None);
                    onsaved.call(kind);
                }
                Err(e) => push_toast(&mut toasts, ToastLevel::Error, "Could not save gallery item", Some(e.to_string())),
            }
        }
    };

    rsx! {
        form {
            class: "form admin-form",
            onsubmit: onsubmit,
            h2 { "{heading}" }
            match kind {
                MediaKind::Image => rsx! {
                    label { "Photo" }
                    ImageUpload {
                        value: (!url().is_empty()).then(|| url()),
                        target: UploadTarget::Gallery,
                        onchange: move |uploaded: Option<String>| url.set(uploaded.unwrap_or_default()),
                    }
                },
                MediaKind::Video => rsx! {
                    label { "Video URL" }
                    input { r#type: "url", value: "{url}", oninput: move |e| url.set(e.value()) }
                },
            }
            label { "Title" }
            input { value: "{title}", oninput: move |e| title.set(e.value()) }
            label { "Category" }
            input { value: "{category}", placeholder: "training", oninput: move |e| category.set(e.value()) }
            div {
                class: "form-actions",
                button { r#type: "button", class: "button", onclick: move |_| oncancel.call(()), "Cancel" }
                button { r#type: "submit", class: "button primary", disabled: saving(), "Save" }
            }
        }
    }
}
