//! Application Layer (Use Cases)
//!
//! Orchestrates the character store, the view log and the model
//! backfill.

mod lookup_service;

pub use lookup_service::{LookupService, SeedReport};
