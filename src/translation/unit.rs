//! Translation unit identity and data model.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an arbitrary persisted object: a model label plus its id.
///
/// This is the storage-agnostic equivalent of a (content type, object id)
/// pair; the core never inspects the object itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Model label (e.g., "page", "blog.post")
    pub content_type: String,

    /// Identifier of the instance, stringified
    pub object_id: String,
}

impl ObjectRef {
    pub fn new(content_type: &str, object_id: &str) -> Self {
        Self {
            content_type: content_type.to_string(),
            object_id: object_id.to_string(),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.content_type, self.object_id)
    }
}

/// Unique identity of a translation unit:
/// (content type, object id, field, target locale).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitKey {
    pub object: ObjectRef,
    pub field: String,
    pub target_locale: String,
}

impl UnitKey {
    pub fn new(object: ObjectRef, field: &str, target_locale: &str) -> Self {
        Self {
            object,
            field: field.to_string(),
            target_locale: target_locale.to_string(),
        }
    }
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.object, self.field, self.target_locale)
    }
}

/// Review workflow state of a translation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
}

impl TranslationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranslationStatus::Draft => "draft",
            TranslationStatus::Pending => "pending",
            TranslationStatus::Approved => "approved",
            TranslationStatus::Rejected => "rejected",
        }
    }

}

impl std::str::FromStr for TranslationStatus {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw {
            "draft" => Ok(TranslationStatus::Draft),
            "pending" => Ok(TranslationStatus::Pending),
            "approved" => Ok(TranslationStatus::Approved),
            "rejected" => Ok(TranslationStatus::Rejected),
            other => Err(Error::InvalidStatus(other.to_string())),
        }
    }
}

impl Default for TranslationStatus {
    fn default() -> Self {
        TranslationStatus::Draft
    }
}

impl fmt::Display for TranslationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field-level source→target text record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationUnit {
    pub key: UnitKey,
    pub source_locale: String,
    pub source_text: String,
    pub target_text: Option<String>,
    pub status: TranslationStatus,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TranslationUnit {
    /// True when this unit is ready for end-user display: approved with
    /// non-empty target text.
    pub fn is_displayable(&self) -> bool {
        self.status == TranslationStatus::Approved
            && self.target_text.as_deref().is_some_and(|t| !t.is_empty())
    }
}
