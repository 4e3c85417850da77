//! PostgreSQL Repository Implementations

mod character_repository;
mod database;
mod view_history_repository;

pub use character_repository::PgCharacterRepository;
pub use database::Database;
pub use view_history_repository::PgViewHistoryRepository;

use hanzi::DomainError;

/// Unique violations are conflicts; everything else means the store is
/// not usable right now.
fn map_sqlx_error(e: sqlx::Error) -> DomainError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            DomainError::Conflict(db.message().to_string())
        }
        _ => DomainError::Unavailable(e.to_string()),
    }
}
