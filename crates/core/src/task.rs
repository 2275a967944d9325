//! Firmware build task model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{TaskId, Uid};

/// A queued firmware build request, owned by the user who created it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildTask {
    pub id: TaskId,
    /// Owner of the task; other uids must not be able to observe it.
    pub uid: Uid,
    pub created_at: DateTime<Utc>,
}
