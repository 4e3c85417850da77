//! HTTP Data Models
//!
//! - Character: the lookup response in its wire shape
//! - Popular: visit ranking

mod character;
mod popular;

pub use character::*;
pub use popular::*;
