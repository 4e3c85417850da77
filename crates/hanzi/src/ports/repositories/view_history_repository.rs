//! View History Repository Port
//!
//! Append-only visit log and its popularity aggregation.

use async_trait::async_trait;

use crate::domain::{errors::DomainError, PopularityEntry, ViewEvent};

/// Repository interface for ViewEvent entities
#[async_trait]
pub trait ViewHistoryRepository: Send + Sync {
    /// Append a visit
    async fn append(&self, event: &ViewEvent) -> Result<(), DomainError>;

    /// Most visited characters, by descending visit count then ascending
    /// character, at most `limit` entries
    async fn top_visited(&self, limit: usize) -> Result<Vec<PopularityEntry>, DomainError>;
}
