use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::is_blank;
use crate::error::DataError;

/// Which programme a student applies for. Also the `/classes/:kind` route segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    #[default]
    Kids,
    Adults,
    Private,
}

impl ClassKind {
    pub const ALL: [ClassKind; 3] = [ClassKind::Kids, ClassKind::Adults, ClassKind::Private];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassKind::Kids => "kids",
            ClassKind::Adults => "adults",
            ClassKind::Private => "private",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl StudentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudentStatus::Pending => "pending",
            StudentStatus::Approved => "approved",
            StudentStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registration submitted through the Join form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub age: u32,
    pub class: ClassKind,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: StudentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Join form submission. The status is always assigned remotely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub age: u32,
    pub class: ClassKind,
    pub message: Option<String>,
}

impl NewStudent {
    pub fn validate(&self) -> Result<(), DataError> {
        if is_blank(&self.name) {
            return Err(DataError::MissingField("name"));
        }
        if is_blank(&self.email) {
            return Err(DataError::MissingField("email"));
        }
        if is_blank(&self.phone) {
            return Err(DataError::MissingField("phone"));
        }
        if self.age == 0 {
            return Err(DataError::MissingField("age"));
        }
        Ok(())
    }
}
