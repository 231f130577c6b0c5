use backend::{Database, Query};
use serde_json::json;

use super::Table;
use crate::error::DataError;
use crate::models::{Message, NewMessage};

const TABLE: &str = "messages";

#[derive(Clone)]
pub struct MessageAdapter<B> {
    backend: B,
}

impl<B: Database> MessageAdapter<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    fn table(&self) -> Table<'_, B> {
        Table::new(&self.backend, TABLE)
    }

    /// Public contact form.
    pub async fn submit(&self, message: &NewMessage) -> Result<Message, DataError> {
        message.validate()?;
        self.table().insert(message).await
    }

    pub async fn get_all(&self) -> Result<Vec<Message>, DataError> {
        self.table()
            .select(&Query::new().order("created_at", false))
            .await
    }

    pub async fn mark_as_read(&self, id: &str) -> Result<Message, DataError> {
        self.table()
            .update(&Query::by_id(id), &json!({ "is_read": true }))
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), DataError> {
        self.table().delete(&Query::by_id(id)).await
    }
}
