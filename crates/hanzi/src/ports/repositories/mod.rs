//! Repository Ports
//!
//! Abstract interfaces for data persistence operations.

mod character_repository;
mod view_history_repository;

pub use character_repository::*;
pub use view_history_repository::*;
