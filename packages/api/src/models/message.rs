use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::is_blank;
use crate::error::DataError;

/// A contact form message. Messages are never edited, so there is no `updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewMessage {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

impl NewMessage {
    pub fn validate(&self) -> Result<(), DataError> {
        if is_blank(&self.name) {
            return Err(DataError::MissingField("name"));
        }
        if is_blank(&self.email) {
            return Err(DataError::MissingField("email"));
        }
        if is_blank(&self.message) {
            return Err(DataError::MissingField("message"));
        }
        Ok(())
    }
}
