//! Service Implementations
//!
//! Concrete clients for external services, usable by both the server
//! and the CLI.

pub mod openai;

// Re-exports
pub use openai::OpenAiProvider;
