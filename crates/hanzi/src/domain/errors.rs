//! Domain Errors
//!
//! Error types for domain operations.

use std::time::Duration;

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Generation failed for \"{glyph}\" after {attempts} attempts: {last_error}")]
    GenerationFailed {
        glyph: String,
        attempts: u32,
        #[source]
        last_error: BackfillError,
    },
}

impl DomainError {
    pub fn not_found<T: AsRef<str>>(entity_type: T, id: &str) -> Self {
        Self::NotFound {
            entity_type: entity_type.as_ref().to_string(),
            id: id.to_string(),
        }
    }
}

/// Failure of a single backfill attempt.
///
/// Transport failures mean the model was never heard from; the rest mean it
/// answered with something that is not a usable record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackfillError {
    #[error("transport failed: {0}")]
    Transport(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("response has an unexpected shape: {0}")]
    InvalidPayload(String),

    #[error("response is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("response describes \"{actual}\" instead of \"{expected}\"")]
    GlyphMismatch { expected: String, actual: String },
}

impl BackfillError {
    /// True when the attempt failed before any payload was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_))
    }
}
