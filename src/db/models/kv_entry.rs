//! Key-value entry data model.
//!
//! One row per named blob (`applications`, `settings`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named blob together with the time it was last replaced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KvEntry {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
    /// Bumped on every write, so a larger revision is always the newer value.
    pub revision: i64,
}
