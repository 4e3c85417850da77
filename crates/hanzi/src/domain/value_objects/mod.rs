//! Value Objects
//!
//! Immutable types validated at construction.

mod glyph;

pub use glyph::*;
