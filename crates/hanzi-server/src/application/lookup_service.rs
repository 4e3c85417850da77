//! Lookup Application Service (Use Case)
//!
//! Read-through cache over the character store: find, else generate and
//! write back, then record the visit.

use std::sync::Arc;

use hanzi::{
    CharacterBackfill, CharacterRecord, CharacterRepository, DomainError, Glyph, LlmProvider,
    PopularityEntry, ViewEvent, ViewHistoryRepository,
};

/// Result of importing a seed file
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: usize,
    pub skipped: usize,
}

/// Application service for character lookups
pub struct LookupService<C, V, P>
where
    C: CharacterRepository + ?Sized,
    V: ViewHistoryRepository + ?Sized,
    P: LlmProvider + ?Sized,
{
    characters: Arc<C>,
    history: Arc<V>,
    backfill: CharacterBackfill<P>,
}

impl<C, V, P> LookupService<C, V, P>
where
    C: CharacterRepository + ?Sized,
    V: ViewHistoryRepository + ?Sized,
    P: LlmProvider + ?Sized,
{
    pub fn new(characters: Arc<C>, history: Arc<V>, backfill: CharacterBackfill<P>) -> Self {
        Self {
            characters,
            history,
            backfill,
        }
    }

    /// Look up a glyph, generating and storing it on a miss.
    ///
    /// A visit is recorded for every successful lookup. Nothing is written
    /// when generation fails.
    pub async fn lookup(&self, glyph: &Glyph) -> Result<CharacterRecord, DomainError> {
        let record = match self.characters.find(glyph).await? {
            Some(record) => {
                tracing::debug!("Cache hit for \"{}\"", glyph);
                record
            }
            None => {
                tracing::info!("Cache miss for \"{}\", generating", glyph);
                let generated = self.backfill.generate(glyph).await?;
                self.store(glyph, generated).await?
            }
        };

        self.record_visit(glyph).await;

        Ok(record)
    }

    /// Most visited characters
    pub async fn popular(&self, limit: usize) -> Result<Vec<PopularityEntry>, DomainError> {
        self.history.top_visited(limit).await
    }

    /// Number of stored characters
    pub async fn stored_count(&self) -> Result<u64, DomainError> {
        self.characters.count().await
    }

    /// Insert records that are not stored yet. Existing glyphs are skipped.
    pub async fn seed(&self, records: &[CharacterRecord]) -> Result<SeedReport, DomainError> {
        let mut report = SeedReport::default();

        for record in records {
            match self.characters.insert(record).await {
                Ok(_) => report.inserted += 1,
                Err(DomainError::Conflict(_)) => report.skipped += 1,
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            "Seeded {} characters ({} already stored)",
            report.inserted,
            report.skipped
        );

        Ok(report)
    }

    /// Write a generated record back; if another request stored the glyph
    /// first, that stored record wins.
    async fn store(
        &self,
        glyph: &Glyph,
        generated: CharacterRecord,
    ) -> Result<CharacterRecord, DomainError> {
        match self.characters.insert(&generated).await {
            Ok(stored) => {
                tracing::info!("Stored generated record for \"{}\"", glyph);
                Ok(stored)
            }
            Err(DomainError::Conflict(_)) => {
                tracing::info!("\"{}\" was stored concurrently, re-reading", glyph);
                self.characters
                    .find(glyph)
                    .await?
                    .ok_or_else(|| DomainError::not_found("Character", glyph.as_str()))
            }
            Err(e) => Err(e),
        }
    }

    async fn record_visit(&self, glyph: &Glyph) {
        if let Err(e) = self.history.append(&ViewEvent::new(glyph)).await {
            tracing::warn!("Failed to record visit for \"{}\": {}", glyph, e);
        }
    }
}
