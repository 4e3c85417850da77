//! ViewEvent - One recorded lookup
//!
//! Append-only; aggregated into popularity rankings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::Glyph;

/// Default number of entries in a popularity ranking
pub const DEFAULT_POPULAR_LIMIT: usize = 60;

/// ViewEvent - A visit to a character page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewEvent {
    pub id: Uuid,
    pub character: String,
    pub visited_at: DateTime<Utc>,
}

impl ViewEvent {
    /// Create a new event with generated ID and timestamp
    pub fn new(glyph: &Glyph) -> Self {
        Self {
            id: Uuid::new_v4(),
            character: glyph.to_string(),
            visited_at: Utc::now(),
        }
    }
}

/// PopularityEntry - Visit count for one character (derived, never stored)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularityEntry {
    pub character: String,
    pub visit_count: i64,
}

/// Rank entries by descending count, ties broken by ascending character,
/// and keep at most `limit`.
pub fn rank_popularity(mut entries: Vec<PopularityEntry>, limit: usize) -> Vec<PopularityEntry> {
    entries.sort_by(|a, b| {
        b.visit_count
            .cmp(&a.visit_count)
            .then_with(|| a.character.cmp(&b.character))
    });
    entries.truncate(limit);
    entries
}
