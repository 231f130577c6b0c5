use backend::storage::path_from_public_url;
use backend::{Backend, Query};
use chrono::Utc;

use super::{store_image, Table};
use crate::error::{DataError, UploadError};
use crate::models::{GalleryItemUpdate, GalleryPhoto, GalleryVideo, MediaItem, NewGalleryItem};
use crate::upload::{extension_for, ImageFile};

const PHOTOS: &str = "gallery_photos";
const VIDEOS: &str = "gallery_videos";
const BUCKET: &str = "gallery";

/// Pseudo-category that matches every item.
pub const ALL_CATEGORIES: &str = "all";

#[derive(Clone)]
pub struct GalleryAdapter<B> {
    backend: B,
    max_image_bytes: u64,
}

impl<B: Backend> GalleryAdapter<B> {
    pub fn new(backend: B, max_image_bytes: u64) -> Self {
        Self {
            backend,
            max_image_bytes,
        }
    }

    fn photos_table(&self) -> Table<'_, B> {
        Table::new(&self.backend, PHOTOS)
    }

    fn videos_table(&self) -> Table<'_, B> {
        Table::new(&self.backend, VIDEOS)
    }

    pub async fn photos(&self) -> Result<Vec<GalleryPhoto>, DataError> {
        self.photos_table()
            .select(&Query::new().order("created_at", false))
            .await
    }

    pub async fn create_photo(&self, photo: &NewGalleryItem) -> Result<GalleryPhoto, DataError> {
        photo.validate()?;
        self.photos_table().insert(photo).await
    }

    pub async fn update_photo(&self, id: &str, patch: &GalleryItemUpdate) -> Result<GalleryPhoto, DataError> {
        self.photos_table().update(&Query::by_id(id), patch).await
    }

    /// Delete the row, then the uploaded blob behind it if there is one.
    /// A blob that cannot be removed is logged and left behind.
    pub async fn delete_photo(&self, photo: &GalleryPhoto) -> Result<(), DataError> {
        self.photos_table().delete(&Query::by_id(&photo.id)).await?;

        if let Some(path) = path_from_public_url(&photo.url, BUCKET) {
            if let Err(e) = self.backend.remove(BUCKET, &[path.to_string()]).await {
                tracing::warn!("could not remove {}/{}: {}", BUCKET, path, e);
            }
        }
        Ok(())
    }

    /// Store a gallery photo under `photos/` and return its public URL.
    pub async fn upload_photo(&self, file: &ImageFile) -> Result<String, UploadError> {
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        let path = format!(
            "photos/{}-{}.{}",
            Utc::now().timestamp_millis(),
            &nonce[..7],
            extension_for(file)
        );
        store_image(&self.backend, BUCKET, &path, file, self.max_image_bytes).await
    }

    pub async fn videos(&self) -> Result<Vec<GalleryVideo>, DataError> {
        self.videos_table()
            .select(&Query::new().order("created_at", false))
            .await
    }

    pub async fn create_video(&self, video: &NewGalleryItem) -> Result<GalleryVideo, DataError> {
        video.validate()?;
        self.videos_table().insert(video).await
    }

    pub async fn update_video(&self, id: &str, patch: &GalleryItemUpdate) -> Result<GalleryVideo, DataError> {
        self.videos_table().update(&Query::by_id(id), patch).await
    }

    pub async fn delete_video(&self, id: &str) -> Result<(), DataError> {
        self.videos_table().delete(&Query::by_id(id)).await
    }

    /// Photos then videos, each newest first.
    pub async fn media(&self) -> Result<Vec<MediaItem>, DataError> {
        let (photos, videos) = tokio::join!(self.photos(), self.videos());
        let mut items: Vec<MediaItem> = photos?.into_iter().map(MediaItem::from).collect();
        items.extend(videos?.into_iter().map(MediaItem::from));
        Ok(items)
    }
}

/// `"all"` followed by each distinct category in first-seen order.
pub fn categories(items: &[MediaItem]) -> Vec<String> {
    let mut seen = vec![ALL_CATEGORIES.to_string()];
    for item in items {
        if !seen.contains(&item.category) {
            seen.push(item.category.clone());
        }
    }
    seen
}

pub fn filter_by_category(items: &[MediaItem], category: &str) -> Vec<MediaItem> {
    items
        .iter()
        .filter(|item| category == ALL_CATEGORIES || item.category == category)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaKind;
    use crate::upload::MAX_IMAGE_BYTES;
    use backend::{MemoryBackend, RemoteError};

    fn adapter() -> (MemoryBackend, GalleryAdapter<MemoryBackend>) {
        let backend = MemoryBackend::new();
        (backend.clone(), GalleryAdapter::new(backend, MAX_IMAGE_BYTES))
    }

    fn item(title: &str, url: &str, category: &str) -> NewGalleryItem {
        NewGalleryItem {
            title: title.to_string(),
            url: url.to_string(),
            category: category.to_string(),
        }
    }

    #[tokio::test]
    async fn test_upload_then_delete_removes_blob() {
        let (backend, gallery) = adapter();
        let file = ImageFile::new("kata.jpeg", "image/jpeg", vec![1; 1024]);
        let url = gallery.upload_photo(&file).await.unwrap();

        let objects = backend.objects(BUCKET);
        assert_eq!(objects.len(), 1);
        assert!(objects[0].starts_with("photos/") && objects[0].ends_with(".jpg"));

        let photo = gallery.create_photo(&item("Kata", &url, "training")).await.unwrap();
        gallery.delete_photo(&photo).await.unwrap();
        assert!(backend.objects(BUCKET).is_empty());
        assert!(gallery.photos().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_photo_with_external_url_keeps_storage_alone() {
        let (backend, gallery) = adapter();
        let photo = gallery
            .create_photo(&item("Hotlinked", "https://cdn.example/p.png", "events"))
            .await
            .unwrap();
        gallery.delete_photo(&photo).await.unwrap();
        assert!(backend.rows(PHOTOS).is_empty());
        assert_eq!(gallery.delete_photo(&photo).await, Err(DataError::NotFound));
    }

    #[tokio::test]
    async fn test_media_merges_photos_and_videos() {
        let (_, gallery) = adapter();
        gallery.create_photo(&item("Belt test", "https://x/p1.png", "grading")).await.unwrap();
        gallery.create_video(&item("Kumite", "https://youtube.com/embed/1", "sparring")).await.unwrap();

        let media = gallery.media().await.unwrap();
        let kinds: Vec<MediaKind> = media.iter().map(|m| m.kind).collect();
        assert_eq!(kinds, [MediaKind::Image, MediaKind::Video]);
    }

    #[tokio::test]
    async fn test_media_surfaces_failures() {
        let (backend, gallery) = adapter();
        backend.fail_with(Some(RemoteError::network("offline")));
        assert!(matches!(gallery.media().await, Err(DataError::Remote(_))));
    }

    #[test]
    fn test_categories_and_filter() {
        let media = |id: &str, category: &str| MediaItem {
            id: id.to_string(),
            kind: MediaKind::Image,
            title: id.to_string(),
            url: String::new(),
            category: category.to_string(),
        };
        let items = vec![
            media("1", "training"),
            media("2", "events"),
            media("3", "training"),
        ];
        assert_eq!(categories(&items), ["all", "training", "events"]);
        assert_eq!(categories(&[]), ["all"]);
        assert_eq!(filter_by_category(&items, "all").len(), 3);
        let training: Vec<String> = filter_by_category(&items, "training")
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(training, ["1", "3"]);
        assert!(filter_by_category(&items, "seminars").is_empty());
    }
}
