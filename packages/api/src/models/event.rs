use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::is_blank;
use crate::error::DataError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    #[default]
    Competition,
    Seminar,
    Workshop,
    Exam,
}

impl EventType {
    pub const ALL: [EventType; 4] = [
        EventType::Competition,
        EventType::Seminar,
        EventType::Workshop,
        EventType::Exam,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Competition => "competition",
            EventType::Seminar => "seminar",
            EventType::Workshop => "workshop",
            EventType::Exam => "exam",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A competition, seminar, workshop or grading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub kind: EventType,
    #[serde(default)]
    pub registration_link: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_past: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Past either by flag or by date.
    pub fn has_happened(&self, now: DateTime<Utc>) -> bool {
        self.is_past.unwrap_or(false) || self.date < now
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub kind: EventType,
    pub registration_link: Option<String>,
    pub image_url: Option<String>,
    /// Left out when unset so the column default applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_past: Option<bool>,
}

impl NewEvent {
    pub fn new(title: impl Into<String>, date: DateTime<Utc>, kind: EventType) -> Self {
        Self {
            title: title.into(),
            description: None,
            date,
            location: None,
            kind,
            registration_link: None,
            image_url: None,
            is_past: None,
        }
    }

    pub fn validate(&self) -> Result<(), DataError> {
        if is_blank(&self.title) {
            return Err(DataError::MissingField("title"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Option<String>>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<EventType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_link: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_past: Option<Option<bool>>,
}

impl EventUpdate {
    /// Only replace the cover image.
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            image_url: Some(Some(url.into())),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_wire_name() {
        let patch = EventUpdate {
            kind: Some(EventType::Exam),
            ..EventUpdate::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            serde_json::json!({ "type": "exam" })
        );
        assert_eq!(EventType::parse("seminar"), Some(EventType::Seminar));
        assert_eq!(EventType::parse("party"), None);
    }
}
