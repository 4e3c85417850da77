//! PostgreSQL implementation of CharacterRepository

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use hanzi::{CharacterRecord, CharacterRepository, DomainError, Glyph};

use super::map_sqlx_error;

/// PostgreSQL implementation of CharacterRepository
pub struct PgCharacterRepository {
    pool: PgPool,
}

impl PgCharacterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for sqlx mapping
///
/// Enrichment columns are nullable; rows imported by other tools may lack them.
#[derive(sqlx::FromRow)]
struct CharacterRow {
    character: String,
    pinyin: Option<String>,
    radical: Option<String>,
    strokes: Option<i32>,
    meaning: Option<Json<Vec<String>>>,
    words: Option<Json<Vec<String>>>,
    similar: Option<Json<Vec<String>>>,
    added_at: chrono::DateTime<chrono::Utc>,
}

impl From<CharacterRow> for CharacterRecord {
    fn from(row: CharacterRow) -> Self {
        Self {
            character: row.character,
            pinyin: row.pinyin.unwrap_or_default(),
            radical: row.radical.unwrap_or_default(),
            stroke_count: row.strokes.map(|s| s.max(0) as u32).unwrap_or(0),
            meanings: row.meaning.map(|j| j.0).unwrap_or_default(),
            example_words: row.words.map(|j| j.0).unwrap_or_default(),
            similar_characters: row.similar.map(|j| j.0).unwrap_or_default(),
            created_at: row.added_at,
        }
    }
}

const COLUMNS: &str = "character, pinyin, radical, strokes, meaning, words, similar, added_at";

#[async_trait]
impl CharacterRepository for PgCharacterRepository {
    async fn find(&self, character: &Glyph) -> Result<Option<CharacterRecord>, DomainError> {
        let row = sqlx::query_as::<_, CharacterRow>(&format!(
            "SELECT {COLUMNS} FROM characters WHERE character = $1"
        ))
        .bind(character.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn insert(&self, record: &CharacterRecord) -> Result<CharacterRecord, DomainError> {
        let strokes = i32::try_from(record.stroke_count).map_err(|_| {
            DomainError::Validation(format!("stroke count {} out of range", record.stroke_count))
        })?;

        let row = sqlx::query_as::<_, CharacterRow>(&format!(
            r#"
            INSERT INTO characters (id, character, pinyin, radical, strokes, meaning, words, similar)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (character) DO NOTHING
            RETURNING {COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&record.character)
        .bind(&record.pinyin)
        .bind(&record.radical)
        .bind(strokes)
        .bind(Json(&record.meanings))
        .bind(Json(&record.example_words))
        .bind(Json(&record.similar_characters))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(Into::into).ok_or_else(|| {
            DomainError::Conflict(format!("character \"{}\" already exists", record.character))
        })
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM characters")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(count.max(0) as u64)
    }
}
