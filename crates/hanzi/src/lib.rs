//! Hanzi Domain Library
//!
//! Core domain types, interfaces and the model backfill for the Hanzi
//! character lookup service.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain/`): Pure business entities and logic
//!   - `entities/`: Core domain models (CharacterRecord, ViewEvent)
//!   - `value_objects/`: Immutable value types (Glyph)
//!   - `errors/`: Domain-specific error types
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `repositories/`: Data access interfaces
//!   - `services/`: External service interfaces
//!
//! - **Backfill** (`backfill/`): Generates missing records with an LLM,
//!   validating answers and retrying with a fixed delay
//!
//! - **Services** (`services/`): Concrete external clients (OpenAI-compatible
//!   chat completions)
//!
//! # Usage
//!
//! ```rust,ignore
//! use hanzi::{CharacterBackfill, Glyph, OpenAiProvider};
//!
//! let provider = Arc::new(OpenAiProvider::new(api_key));
//! let backfill = CharacterBackfill::new(provider, None);
//! let record = backfill.generate(&Glyph::parse("龙")?).await?;
//! ```

pub mod backfill;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export commonly used types
pub use backfill::{BackfillConfig, BatchReport, CharacterBackfill};
pub use domain::{
    split_glyphs, BackfillError, CharacterRecord, DomainError, Glyph, PopularityEntry, ViewEvent,
    DEFAULT_POPULAR_LIMIT,
};
pub use ports::{
    // Repositories
    CharacterRepository,
    // LLM
    ChatMessage,
    CompletionOptions,
    CompletionResponse,
    LlmProvider,
    MessageRole,
    TokenUsage,
    ViewHistoryRepository,
};
pub use services::OpenAiProvider;
