//! # Data access adapters
//!
//! One adapter per entity, each a thin typed layer over the backend's table and
//! storage calls. Adapters are cheap handles (a backend clone plus an upload limit)
//! handed out by [`crate::Academy`]; they keep no state between calls.
//!
//! | Adapter | Table(s) | Bucket |
//! |---------|----------|--------|
//! | [`CoachAdapter`] | `coaches` | `coaches` |
//! | [`EventAdapter`] | `events` | `events` |
//! | [`StudentAdapter`] | `students` | |
//! | [`MessageAdapter`] | `messages` | |
//! | [`ProfileAdapter`] | `profiles` | |
//! | [`GalleryAdapter`] | `gallery_photos`, `gallery_videos` | `gallery` |
//! | [`RoleAdapter`] | `user_roles` | |
//! | [`DashboardAdapter`] | all of the above, counts only | |
//!
//! Shared conventions:
//!
//! - every method returns `Result<_, DataError>` (`UploadError` for uploads);
//! - `create`-style methods validate required fields before any request is made;
//! - `update` sends only the fields that are set, and a missing row is `NotFound`;
//! - `delete` of a row that does not exist is `NotFound`, not a silent success.

mod coaches;
mod dashboard;
mod events;
mod gallery;
mod messages;
mod profiles;
mod roles;
mod students;

pub use coaches::CoachAdapter;
pub use dashboard::DashboardAdapter;
pub use events::EventAdapter;
pub use gallery::{categories, filter_by_category, GalleryAdapter, ALL_CATEGORIES};
pub use messages::MessageAdapter;
pub use profiles::ProfileAdapter;
pub use roles::RoleAdapter;
pub use students::StudentAdapter;

use backend::{Database, Query, Storage};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{DataError, UploadError};
use crate::upload::{validate_image, ImageFile};

/// Typed view of one remote table.
pub(crate) struct Table<'a, B> {
    backend: &'a B,
    name: &'static str,
}

impl<'a, B: Database> Table<'a, B> {
    pub(crate) fn new(backend: &'a B, name: &'static str) -> Self {
        Self { backend, name }
    }

    pub(crate) async fn select<T: DeserializeOwned>(&self, query: &Query) -> Result<Vec<T>, DataError> {
        let rows = self.backend.select(self.name, query).await?;
        rows.into_iter().map(decode).collect()
    }

    /// Exactly one row, `NotFound` when nothing matches.
    pub(crate) async fn select_one<T: DeserializeOwned>(&self, query: &Query) -> Result<T, DataError> {
        let query = query.clone().limit(1);
        let row = self
            .backend
            .select(self.name, &query)
            .await?
            .into_iter()
            .next()
            .ok_or(DataError::NotFound)?;
        decode(row)
    }

    pub(crate) async fn count(&self, query: &Query) -> Result<u64, DataError> {
        Ok(self.backend.count(self.name, query).await?)
    }

    pub(crate) async fn insert<T: DeserializeOwned>(&self, row: &impl Serialize) -> Result<T, DataError> {
        let row = serde_json::to_value(row)?;
        decode(self.backend.insert(self.name, row).await?)
    }

    /// Patch matching rows and return the first, `NotFound` when nothing matched.
    pub(crate) async fn update<T: DeserializeOwned>(
        &self,
        query: &Query,
        patch: &impl Serialize,
    ) -> Result<T, DataError> {
        let patch = serde_json::to_value(patch)?;
        let row = self
            .backend
            .update(self.name, query, patch)
            .await?
            .into_iter()
            .next()
            .ok_or(DataError::NotFound)?;
        decode(row)
    }

    pub(crate) async fn delete(&self, query: &Query) -> Result<(), DataError> {
        let deleted = self.backend.delete(self.name, query).await?;
        if deleted.is_empty() {
            return Err(DataError::NotFound);
        }
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(row: Value) -> Result<T, DataError> {
    Ok(serde_json::from_value(row)?)
}

/// Validate, store under `path` and return the public URL.
pub(crate) async fn store_image<B: Storage>(
    backend: &B,
    bucket: &str,
    path: &str,
    file: &ImageFile,
    max_bytes: u64,
) -> Result<String, UploadError> {
    validate_image(file, max_bytes)?;
    tracing::debug!("storing {} ({} bytes) as {}/{}", file.name, file.size(), bucket, path);
    backend
        .upload(bucket, path, file.bytes.clone(), &file.content_type)
        .await?;
    Ok(backend.public_url(bucket, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend::{MemoryBackend, RemoteError};
    use serde_json::json;

    #[derive(Debug, serde::Deserialize)]
    struct Row {
        id: String,
        name: String,
    }

    #[tokio::test]
    async fn test_empty_table_selects_empty_vec() {
        let backend = MemoryBackend::new();
        let rows: Vec<Row> = Table::new(&backend, "coaches")
            .select(&Query::new())
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_missing_rows_are_not_found() {
        let backend = MemoryBackend::new();
        let table = Table::new(&backend, "coaches");
        let one: Result<Row, _> = table.select_one(&Query::by_id("nope")).await;
        assert_eq!(one.unwrap_err(), DataError::NotFound);
        let updated: Result<Row, _> = table.update(&Query::by_id("nope"), &json!({ "name": "x" })).await;
        assert_eq!(updated.unwrap_err(), DataError::NotFound);
        assert_eq!(table.delete(&Query::by_id("nope")).await, Err(DataError::NotFound));
    }

    #[tokio::test]
    async fn test_undecodable_rows_are_decode_errors() {
        let backend = MemoryBackend::new();
        backend.seed("coaches", json!({ "name": 42 })).unwrap();
        let rows: Result<Vec<Row>, _> = Table::new(&backend, "coaches").select(&Query::new()).await;
        assert!(matches!(rows, Err(DataError::Decode(_))));
    }

    #[tokio::test]
    async fn test_remote_failures_are_classified() {
        let backend = MemoryBackend::new();
        let row = backend.seed("coaches", json!({ "name": "Sensei" })).unwrap();
        let seeded: Row = serde_json::from_value(row).unwrap();
        assert_eq!(seeded.name, "Sensei");

        backend.fail_with(Some(RemoteError::new(403, Some("42501"), "row-level security")));
        let err = Table::new(&backend, "coaches").delete(&Query::by_id(&seeded.id)).await;
        assert!(matches!(err, Err(DataError::PermissionDenied(_))));
        assert_eq!(backend.rows("coaches").len(), 1);
    }
}
