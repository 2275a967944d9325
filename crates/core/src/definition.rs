//! Keyboard definition model and its moderation status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::id::{DefinitionId, Uid};

/// Moderation status of a keyboard definition.
///
/// This is a closed set; the review workflow is
/// draft → in_review → (rejected | approved).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionStatus {
    Draft,
    InReview,
    Rejected,
    Approved,
}

impl DefinitionStatus {
    /// All statuses, in workflow order.
    pub const ALL: [DefinitionStatus; 4] = [
        DefinitionStatus::Draft,
        DefinitionStatus::InReview,
        DefinitionStatus::Rejected,
        DefinitionStatus::Approved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DefinitionStatus::Draft => "draft",
            DefinitionStatus::InReview => "in_review",
            DefinitionStatus::Rejected => "rejected",
            DefinitionStatus::Approved => "approved",
        }
    }
}

impl core::fmt::Display for DefinitionStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown definition status: {0}")]
pub struct UnknownStatus(pub String);

impl core::str::FromStr for DefinitionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(DefinitionStatus::Draft),
            "in_review" => Ok(DefinitionStatus::InReview),
            "rejected" => Ok(DefinitionStatus::Rejected),
            "approved" => Ok(DefinitionStatus::Approved),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A keyboard definition document as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyboardDefinition {
    pub id: DefinitionId,
    pub author_uid: Uid,
    pub name: String,
    pub vendor_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub status: DefinitionStatus,
    /// The definition body itself, kept as raw JSON text.
    pub json: String,
    pub reject_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
