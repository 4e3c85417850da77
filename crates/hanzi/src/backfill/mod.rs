//! Character Backfill - Generate missing records with an LLM
//!
//! Asks the model for a record, validates the answer and retries a fixed
//! number of times with a fixed delay. Persistence is the caller's job.

pub mod prompt;
pub mod response;

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{BackfillError, CharacterRecord, DomainError, Glyph};
use crate::ports::{ChatMessage, CompletionOptions, LlmProvider};

/// Backfill policy
#[derive(Debug, Clone)]
pub struct BackfillConfig {
    /// Attempts per glyph (or per batch group), including the first
    pub max_attempts: u32,
    /// Fixed delay between attempts
    pub retry_delay: Duration,
    /// Upper bound for a single model call
    pub request_timeout: Duration,
    /// Glyphs per request in batch mode
    pub batch_size: usize,
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_millis(500),
            request_timeout: Duration::from_secs(30),
            batch_size: 10,
        }
    }
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub records: Vec<CharacterRecord>,
    /// Groups that exhausted their attempts, with the last error
    pub failed_groups: Vec<(Vec<Glyph>, BackfillError)>,
}

impl BatchReport {
    pub fn failed_glyphs(&self) -> impl Iterator<Item = &Glyph> {
        self.failed_groups.iter().flat_map(|(group, _)| group.iter())
    }
}

/// Generates `CharacterRecord`s for glyphs missing from the store
pub struct CharacterBackfill<P: LlmProvider + ?Sized> {
    provider: Arc<P>,
    config: BackfillConfig,
    options: CompletionOptions,
}

impl<P: LlmProvider + ?Sized> CharacterBackfill<P> {
    pub fn new(provider: Arc<P>, config: Option<BackfillConfig>) -> Self {
        Self {
            provider,
            config: config.unwrap_or_default(),
            options: CompletionOptions::default(),
        }
    }

    /// Generate a record for one glyph.
    ///
    /// Fails with `DomainError::GenerationFailed` once every attempt has
    /// failed; the error carries the last attempt's failure.
    pub async fn generate(&self, glyph: &Glyph) -> Result<CharacterRecord, DomainError> {
        let prompt = prompt::single(glyph);
        self.with_retry(glyph.as_str(), &prompt, |raw| {
            response::parse_single(raw, glyph)
        })
        .await
        .map_err(|(attempts, last_error)| {
            tracing::error!(
                "Giving up on \"{}\" after {} attempts: {}",
                glyph,
                attempts,
                last_error
            );
            DomainError::GenerationFailed {
                glyph: glyph.to_string(),
                attempts,
                last_error,
            }
        })
    }

    /// Generate records for many glyphs in groups of `batch_size`.
    ///
    /// A group that exhausts its attempts is skipped and the run continues.
    pub async fn generate_batch(&self, glyphs: &[Glyph]) -> BatchReport {
        let mut report = BatchReport::default();
        let size = self.config.batch_size.max(1);
        let total = glyphs.len().div_ceil(size);

        for (index, group) in glyphs.chunks(size).enumerate() {
            let label: String = group.iter().map(Glyph::as_str).collect();
            tracing::info!("Batch {}/{}: {}", index + 1, total, label);

            let prompt = prompt::batch(group);
            match self
                .with_retry(&label, &prompt, |raw| response::parse_batch(raw, group))
                .await
            {
                Ok(records) => {
                    if records.len() < group.len() {
                        tracing::warn!(
                            "Batch {} returned {} of {} characters",
                            label,
                            records.len(),
                            group.len()
                        );
                    }
                    report.records.extend(records);
                }
                Err((attempts, last_error)) => {
                    tracing::error!(
                        "Skipping batch {} after {} attempts: {}",
                        label,
                        attempts,
                        last_error
                    );
                    report.failed_groups.push((group.to_vec(), last_error));
                }
            }
        }

        report
    }

    async fn with_retry<T, F>(
        &self,
        label: &str,
        prompt: &str,
        parse: F,
    ) -> Result<T, (u32, BackfillError)>
    where
        F: Fn(&str) -> Result<T, BackfillError>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            tracing::info!(
                "[{}/{} attempt {}/{}] requesting \"{}\"",
                self.provider.provider_name(),
                self.provider.model_id(),
                attempt,
                max_attempts,
                label
            );

            let error = match self.request(prompt).await {
                Ok(raw) => match parse(&raw) {
                    Ok(value) => return Ok(value),
                    Err(e) => {
                        tracing::warn!(
                            "Attempt {}/{} for \"{}\": invalid payload: {}",
                            attempt,
                            max_attempts,
                            label,
                            e
                        );
                        tracing::debug!("Raw response for \"{}\": {}", label, raw);
                        e
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        "Attempt {}/{} for \"{}\": transport failure: {}",
                        attempt,
                        max_attempts,
                        label,
                        e
                    );
                    e
                }
            };

            if attempt >= max_attempts {
                return Err((attempt, error));
            }
            tokio::time::sleep(self.config.retry_delay).await;
        }
    }

    async fn request(&self, prompt: &str) -> Result<String, BackfillError> {
        let messages = [ChatMessage::system(prompt::SYSTEM), ChatMessage::user(prompt)];
        let response = tokio::time::timeout(
            self.config.request_timeout,
            self.provider.complete(&messages, &self.options),
        )
        .await
        .map_err(|_| BackfillError::Timeout(self.config.request_timeout))?
        .map_err(|e| BackfillError::Transport(e.to_string()))?;

        tracing::debug!(
            "Completion from {}: {} tokens, finish reason {:?}",
            response.model,
            response.usage.total_tokens,
            response.finish_reason
        );

        Ok(response.content)
    }
}
