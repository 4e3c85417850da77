//! Character Repository Port
//!
//! Abstract interface for CharacterRecord persistence.

use async_trait::async_trait;

use crate::domain::{errors::DomainError, CharacterRecord, Glyph};

/// Repository interface for CharacterRecord entities
///
/// Records are insert-once: there is no update or delete.
#[async_trait]
pub trait CharacterRepository: Send + Sync {
    /// Find a record by glyph. A miss is `Ok(None)`, not an error.
    async fn find(&self, character: &Glyph) -> Result<Option<CharacterRecord>, DomainError>;

    /// Insert a record and return it as stored.
    ///
    /// Fails with `DomainError::Conflict` when the glyph already exists and
    /// `DomainError::Unavailable` when storage cannot be reached.
    async fn insert(&self, record: &CharacterRecord) -> Result<CharacterRecord, DomainError>;

    /// Number of stored records
    async fn count(&self) -> Result<u64, DomainError>;
}
