//! Item domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single search result
///
/// Lives only for the duration of one cycle; items are never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub body: String,
    #[serde(default)]
    pub urls: Vec<String>,
}
