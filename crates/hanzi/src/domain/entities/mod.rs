//! Domain Entities
//!
//! Pure domain models without infrastructure dependencies.
//! - CharacterRecord: enrichment data for one glyph
//! - ViewEvent: one recorded lookup, aggregated into popularity

mod character;
mod view_event;

pub use character::*;
pub use view_event::*;
