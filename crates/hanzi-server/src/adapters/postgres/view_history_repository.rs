//! PostgreSQL implementation of ViewHistoryRepository

use async_trait::async_trait;
use sqlx::PgPool;

use hanzi::{DomainError, PopularityEntry, ViewEvent, ViewHistoryRepository};

use super::map_sqlx_error;

/// Ties break on the code point order of the glyph, independent of the
/// database's default collation.
const TOP_VISITED_SQL: &str = r#"
    SELECT character, COUNT(*) AS visit_count
    FROM view_history
    GROUP BY character
    ORDER BY visit_count DESC, character COLLATE "C" ASC
    LIMIT $1
"#;

/// PostgreSQL implementation of ViewHistoryRepository
pub struct PgViewHistoryRepository {
    pool: PgPool,
}

impl PgViewHistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PopularityRow {
    character: String,
    visit_count: i64,
}

impl From<PopularityRow> for PopularityEntry {
    fn from(row: PopularityRow) -> Self {
        Self {
            character: row.character,
            visit_count: row.visit_count,
        }
    }
}

#[async_trait]
impl ViewHistoryRepository for PgViewHistoryRepository {
    async fn append(&self, event: &ViewEvent) -> Result<(), DomainError> {
        sqlx::query("INSERT INTO view_history (id, character, visited_at) VALUES ($1, $2, $3)")
            .bind(event.id)
            .bind(&event.character)
            .bind(event.visited_at)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn top_visited(&self, limit: usize) -> Result<Vec<PopularityEntry>, DomainError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = sqlx::query_as::<_, PopularityRow>(TOP_VISITED_SQL)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hanzi::domain::rank_popularity;

    #[test]
    fn test_tie_break_uses_code_point_order() {
        assert!(TOP_VISITED_SQL.contains(r#"character COLLATE "C" ASC"#));

        // Same order the in-memory ranking produces for equal counts
        let entries = ["天", "人", "a", "我"]
            .into_iter()
            .map(|c| PopularityEntry {
                character: c.to_string(),
                visit_count: 2,
            })
            .collect();
        let ranked: Vec<String> = rank_popularity(entries, 10)
            .into_iter()
            .map(|e| e.character)
            .collect();
        assert_eq!(ranked, vec!["a", "人", "天", "我"]);
    }
}
