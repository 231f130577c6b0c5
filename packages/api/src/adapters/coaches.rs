use backend::{Backend, Query};

use super::{store_image, Table};
use crate::error::{DataError, UploadError};
use crate::models::{Coach, CoachUpdate, NewCoach};
use crate::upload::{entity_object_path, ImageFile};

const TABLE: &str = "coaches";
const BUCKET: &str = "coaches";

#[derive(Clone)]
pub struct CoachAdapter<B> {
    backend: B,
    max_image_bytes: u64,
}

impl<B: Backend> CoachAdapter<B> {
    pub fn new(backend: B, max_image_bytes: u64) -> Self {
        Self {
            backend,
            max_image_bytes,
        }
    }

    fn table(&self) -> Table<'_, B> {
        Table::new(&self.backend, TABLE)
    }

    /// Newest first.
    pub async fn get_all(&self) -> Result<Vec<Coach>, DataError> {
        self.table()
            .select(&Query::new().order("created_at", false))
            .await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Coach, DataError> {
        self.table().select_one(&Query::by_id(id)).await
    }

    pub async fn create(&self, coach: &NewCoach) -> Result<Coach, DataError> {
        coach.validate()?;
        self.table().insert(coach).await
    }

    pub async fn update(&self, id: &str, patch: &CoachUpdate) -> Result<Coach, DataError> {
        self.table().update(&Query::by_id(id), patch).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), DataError> {
        self.table().delete(&Query::by_id(id)).await
    }

    /// Store a photo for `coach_id` and return its public URL. The record is not touched.
    pub async fn upload_image(&self, file: &ImageFile, coach_id: &str) -> Result<String, UploadError> {
        let path = entity_object_path(coach_id, file);
        store_image(&self.backend, BUCKET, &path, file, self.max_image_bytes).await
    }
}
