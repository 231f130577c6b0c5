use backend::{Backend, Query};
use chrono::Utc;

use super::{store_image, Table};
use crate::error::{DataError, UploadError};
use crate::models::{Event, EventUpdate, NewEvent};
use crate::upload::{entity_object_path, ImageFile};

const TABLE: &str = "events";
const BUCKET: &str = "events";

#[derive(Clone)]
pub struct EventAdapter<B> {
    backend: B,
    max_image_bytes: u64,
}

impl<B: Backend> EventAdapter<B> {
    pub fn new(backend: B, max_image_bytes: u64) -> Self {
        Self {
            backend,
            max_image_bytes,
        }
    }

    fn table(&self) -> Table<'_, B> {
        Table::new(&self.backend, TABLE)
    }

    /// Every event, soonest first.
    pub async fn get_all(&self) -> Result<Vec<Event>, DataError> {
        self.table().select(&Query::new().order("date", true)).await
    }

    /// Not flagged past and not yet started, soonest first.
    pub async fn get_upcoming(&self) -> Result<Vec<Event>, DataError> {
        let query = Query::new()
            .eq("is_past", false)
            .gte("date", Utc::now().to_rfc3339())
            .order("date", true);
        self.table().select(&query).await
    }

    /// Flagged past, most recent first.
    pub async fn get_past(&self) -> Result<Vec<Event>, DataError> {
        let query = Query::new().eq("is_past", true).order("date", false);
        self.table().select(&query).await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Event, DataError> {
        self.table().select_one(&Query::by_id(id)).await
    }

    pub async fn create(&self, event: &NewEvent) -> Result<Event, DataError> {
        event.validate()?;
        self.table().insert(event).await
    }

    pub async fn update(&self, id: &str, patch: &EventUpdate) -> Result<Event, DataError> {
        self.table().update(&Query::by_id(id), patch).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), DataError> {
        self.table().delete(&Query::by_id(id)).await
    }

    pub async fn upload_image(&self, file: &ImageFile, event_id: &str) -> Result<String, UploadError> {
        let path = entity_object_path(event_id, file);
        store_image(&self.backend, BUCKET, &path, file, self.max_image_bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventType;
    use crate::upload::MAX_IMAGE_BYTES;
    use backend::{MemoryBackend, RemoteError};
    use chrono::Duration;

    fn adapter() -> EventAdapter<MemoryBackend> {
        EventAdapter::new(MemoryBackend::new(), MAX_IMAGE_BYTES)
    }

    async fn add(events: &EventAdapter<MemoryBackend>, title: &str, days: i64, is_past: Option<bool>) {
        let mut event = NewEvent::new(title, Utc::now() + Duration::days(days), EventType::Seminar);
        event.is_past = is_past;
        events.create(&event).await.unwrap();
    }

    fn titles(events: Vec<Event>) -> Vec<String> {
        events.into_iter().map(|e| e.title).collect()
    }

    #[tokio::test]
    async fn test_upcoming_and_past_views() {
        let events = adapter();
        add(&events, "Summer camp", 30, None).await;
        add(&events, "Grading", 7, Some(false)).await;
        add(&events, "Stale but unflagged", -3, None).await;
        add(&events, "Nationals", -60, Some(true)).await;
        add(&events, "Open day", -10, Some(true)).await;

        assert_eq!(titles(events.get_upcoming().await.unwrap()), ["Grading", "Summer camp"]);
        assert_eq!(titles(events.get_past().await.unwrap()), ["Open day", "Nationals"]);
        assert_eq!(
            titles(events.get_all().await.unwrap()),
            ["Nationals", "Open day", "Stale but unflagged", "Grading", "Summer camp"]
        );
    }

    #[tokio::test]
    async fn test_update_is_partial() {
        let events = adapter();
        let mut new = NewEvent::new("Kata seminar", Utc::now(), EventType::Seminar);
        new.location = Some("Dojo".to_string());
        let created = events.create(&new).await.unwrap();

        let updated = events
            .update(&created.id, &EventUpdate { is_past: Some(Some(true)), ..EventUpdate::default() })
            .await
            .unwrap();
        assert_eq!(updated.is_past, Some(true));
        assert_eq!(updated.location.as_deref(), Some("Dojo"));
        assert_eq!(updated.kind, EventType::Seminar);
    }

    #[tokio::test]
    async fn test_create_requires_title() {
        let events = adapter();
        let event = NewEvent::new("", Utc::now(), EventType::Exam);
        assert_eq!(events.create(&event).await, Err(DataError::MissingField("title")));
    }

    #[tokio::test]
    async fn test_backend_failures_surface_as_data_errors() {
        let backend = MemoryBackend::new();
        let events = EventAdapter::new(backend.clone(), MAX_IMAGE_BYTES);
        let created = events
            .create(&NewEvent::new("Grading", Utc::now(), EventType::Exam))
            .await
            .unwrap();

        backend.fail_with(Some(RemoteError::network("offline")));
        assert!(matches!(events.get_all().await, Err(DataError::Remote(_))));
        assert!(matches!(events.get_upcoming().await, Err(DataError::Remote(_))));
        assert!(matches!(
            events.update(&created.id, &EventUpdate::default()).await,
            Err(DataError::Remote(_))
        ));
        assert!(matches!(events.delete(&created.id).await, Err(DataError::Remote(_))));

        backend.fail_with(Some(RemoteError::new(403, Some("42501"), "permission denied for table events")));
        assert!(matches!(
            events.create(&NewEvent::new("Camp", Utc::now(), EventType::Workshop)).await,
            Err(DataError::PermissionDenied(_))
        ));

        backend.fail_with(None);
        assert_eq!(titles(events.get_all().await.unwrap()), ["Grading"]);
    }
}
