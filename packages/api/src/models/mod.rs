//! # Domain records
//!
//! Typed mirrors of the remote tables. Each entity comes in up to three shapes:
//!
//! - the stored record (`Coach`, `Event`, ...), with `id` and timestamps assigned remotely;
//! - an insert struct (`NewCoach`, ...) holding exactly what a form submits;
//! - a partial update struct (`CoachUpdate`, ...) whose `None` fields are left out
//!   of the request. Nullable columns use `Option<Option<T>>` so they can be cleared.
//!
//! Timestamps are `chrono::DateTime<Utc>`; ids stay `String` so the records work
//! unchanged in the wasm build.

mod coach;
mod event;
mod gallery;
mod message;
mod profile;
mod role;
mod student;

pub use coach::{Coach, CoachUpdate, NewCoach};
pub use event::{Event, EventType, EventUpdate, NewEvent};
pub use gallery::{GalleryItemUpdate, GalleryPhoto, GalleryVideo, MediaItem, MediaKind, NewGalleryItem};
pub use message::{Message, NewMessage};
pub use profile::{Profile, ProfileUpdate};
pub use role::{Role, UserRole};
pub use student::{ClassKind, NewStudent, Student, StudentStatus};

use serde::{Deserialize, Serialize};

/// Exact row counts shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub coaches: u64,
    pub events: u64,
    pub students: u64,
    pub messages: u64,
    pub unread_messages: u64,
    pub pending_students: u64,
}

/// A required text field counts as missing when it is empty after trimming.
pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
