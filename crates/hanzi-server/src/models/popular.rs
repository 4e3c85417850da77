//! Popular - Most visited characters

use hanzi::{PopularityEntry, DEFAULT_POPULAR_LIMIT};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters for the popular endpoint
#[derive(Debug, Deserialize, IntoParams)]
pub struct PopularQuery {
    /// Maximum entries (default and maximum: 60)
    pub limit: Option<usize>,
}

impl PopularQuery {
    /// Requested limit clamped to `1..=DEFAULT_POPULAR_LIMIT`
    pub fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_POPULAR_LIMIT)
            .clamp(1, DEFAULT_POPULAR_LIMIT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PopularEntryResponse {
    pub character: String,
    pub visit_count: i64,
}

impl From<PopularityEntry> for PopularEntryResponse {
    fn from(entry: PopularityEntry) -> Self {
        Self {
            character: entry.character,
            visit_count: entry.visit_count,
        }
    }
}

/// Ranking, most visited first
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PopularResponse {
    pub characters: Vec<PopularEntryResponse>,
}
