use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::is_blank;
use crate::error::DataError;

/// A coach shown on the public coaches page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coach {
    pub id: String,
    pub name: String,
    pub rank: String,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub specialization: Option<Vec<String>>,
    #[serde(default)]
    pub achievements: Option<Vec<String>>,
    #[serde(default)]
    pub students: Option<Vec<String>>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewCoach {
    pub name: String,
    pub rank: String,
    pub experience: Option<String>,
    pub specialization: Option<Vec<String>>,
    pub achievements: Option<Vec<String>>,
    pub students: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

impl NewCoach {
    pub fn validate(&self) -> Result<(), DataError> {
        if is_blank(&self.name) {
            return Err(DataError::MissingField("name"));
        }
        if is_blank(&self.rank) {
            return Err(DataError::MissingField("rank"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoachUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<Option<Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achievements: Option<Option<Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub students: Option<Option<Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<Option<String>>,
}

impl CoachUpdate {
    /// Only replace the photo.
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
    fn test_update_skips_untouched_fields() {
        let patch = CoachUpdate {
            rank: Some("3rd Dan".to_string()),
            bio: Some(None),
            ..CoachUpdate::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            serde_json::json!({ "rank": "3rd Dan", "bio": null })
        );
    }

    #[test]
    fn test_new_coach_requires_name_and_rank() {
        let coach = NewCoach {
            name: "  ".to_string(),
            rank: "1st Dan".to_string(),
            ..NewCoach::default()
        };
        assert_eq!(coach.validate(), Err(DataError::MissingField("name")));
    }
}
