//! Search API DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::item::Item;

/// Response body of a search request
///
/// `statuses` may be absent or null when the query matched nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub statuses: Option<Vec<SearchStatus>>,
}

/// One search hit as returned on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchStatus {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub text: String,
    #[serde(default)]
    pub urls: Vec<String>,
}

impl From<SearchStatus> for Item {
    fn from(status: SearchStatus) -> Self {
        Self {
            id: status.id,
            created_at: status.created_at,
            body: status.text,
            urls: status.urls,
        }
    }
}

impl SearchResponse {
    /// Converts the response into domain items
    pub fn into_items(self) -> Vec<Item> {
        self.statuses
            .unwrap_or_default()
            .into_iter()
            .map(Item::from)
            .collect()
    }
}
