//! Image picker that validates and uploads in one step.

use api::upload::validate_image;
use api::ImageFile;
use dioxus::prelude::*;

use crate::auth::use_academy;
use crate::icons::{FaUpload, FaXmark};
use crate::toast::{push_toast, use_toasts, ToastLevel};
use crate::Icon;

/// Where an uploaded image is stored.
#[derive(Clone, Debug, PartialEq)]
pub enum UploadTarget {
    /// Coach portrait, named after the coach id.
    Coach(String),
    /// Event cover, named after the event id.
    Event(String),
    /// Gallery photo.
    Gallery,
}

/// Shows the current image (if any) with a remove button, or a file picker.
///
/// `onchange` receives the new public URL after a successful upload, or `None` when
/// the image is removed. Removing only clears the field; the stored blob stays.
#[component]
pub fn ImageUpload(
    value: Option<String>,
    target: UploadTarget,
    onchange: EventHandler<Option<String>>,
) -> Element {
    let academy = use_academy();
    let mut toasts = use_toasts();
    let mut uploading = use_signal(|| false);
    let limit_mb = academy.config().uploads.max_image_bytes / (1024 * 1024);

    let on_file = move |evt: FormEvent| {
        let academy = academy.clone();
        let target = target.clone();
        async move {
            let Some(file) = evt.files().into_iter().next() else {
                return;
            };
            let bytes = match file.read_bytes().await {
                Ok(bytes) => bytes.to_vec(),
                Err(e) => {
                    push_toast(&mut toasts, ToastLevel::Error, "Could not read file", Some(e.to_string()));
                    return;
                }
            };
            let image = ImageFile::new(file.name(), file.content_type().unwrap_or_default(), bytes);

            if let Err(e) = validate_image(&image, academy.config().uploads.max_image_bytes) {
                push_toast(&mut toasts, ToastLevel::Error, "Invalid image", Some(e.to_string()));
                return;
            }

            uploading.set(true);
            let result = match &target {
                UploadTarget::Coach(id) => academy.coaches().upload_image(&image, id).await,
                UploadTarget::Event(id) => academy.events().upload_image(&image, id).await,
                UploadTarget::Gallery => academy.gallery().upload_photo(&image).await,
            };
            uploading.set(false);

            match result {
                Ok(url) => {
                    push_toast(&mut toasts, ToastLevel::Success, "Image uploaded successfully!", None);
                    onchange.call(Some(url));
                }
                Err(e) => push_toast(&mut toasts, ToastLevel::Error, "Upload failed", Some(e.to_string())),
            }
        }
    };

    rsx! {
        div {
            class: "image-upload",
            if let Some(url) = value {
                div {
                    class: "image-upload-preview",
                    img { src: "{url}", alt: "Preview" }
                    button {
                        r#type: "button",
                        class: "image-upload-remove",
                        title: "Remove image",
                        onclick: move |_| onchange.call(None),
                        Icon { icon: FaXmark, width: 14, height: 14 }
                    }
                }
            } else if uploading() {
                div {
                    class: "image-upload-busy",
                    div { class: "loading-spinner" }
                    p { "Uploading..." }
                }
            } else {
                label {
                    class: "image-upload-picker",
                    Icon { icon: FaUpload, width: 32, height: 32 }
                    p { "Click to upload an image" }
                    p { class: "hint", "PNG, JPG or WEBP, up to {limit_mb} MB" }
                    input {
                        r#type: "file",
                        accept: "image/*",
                        onchange: on_file,
                    }
                }
            }
        }
    }
}
