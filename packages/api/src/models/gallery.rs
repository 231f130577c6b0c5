use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::is_blank;
use crate::error::DataError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryPhoto {
    pub id: String,
    pub title: String,
    pub url: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

/// A video is an external link (usually an embed URL), never an uploaded blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryVideo {
    pub id: String,
    pub title: String,
    pub url: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

/// Photos and videos share one insert shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGalleryItem {
    pub title: String,
    pub url: String,
    pub category: String,
}

impl Default for NewGalleryItem {
    fn default() -> Self {
        Self {
            title: String::new(),
            url: String::new(),
            category: "training".to_string(),
        }
    }
}

impl NewGalleryItem {
    pub fn validate(&self) -> Result<(), DataError> {
        if is_blank(&self.title) {
            return Err(DataError::MissingField("title"));
        }
        if is_blank(&self.url) {
            return Err(DataError::MissingField("url"));
        }
        if is_blank(&self.category) {
            return Err(DataError::MissingField("category"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GalleryItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// One entry of the public gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: String,
    pub kind: MediaKind,
    pub title: String,
    pub url: String,
    pub category: String,
}

impl From<GalleryPhoto> for MediaItem {
    fn from(photo: GalleryPhoto) -> Self {
        Self {
            id: photo.id,
            kind: MediaKind::Image,
            title: photo.title,
            url: photo.url,
            category: photo.category,
        }
    }
}

impl From<GalleryVideo> for MediaItem {
    fn from(video: GalleryVideo) -> Self {
        Self {
            id: video.id,
            kind: MediaKind::Video,
            title: video.title,
            url: video.url,
            category: video.category,
        }
    }
}
