//! Character - Lookup response

use chrono::{DateTime, Utc};
use hanzi::CharacterRecord;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters for the word endpoint
#[derive(Debug, Deserialize, IntoParams)]
pub struct WordQuery {
    /// A single Chinese character
    pub character: Option<String>,
}

/// Character record as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CharacterResponse {
    #[schema(example = "我")]
    pub character: String,
    #[schema(example = "wǒ")]
    pub pinyin: String,
    #[schema(example = "戈")]
    pub radical: String,
    #[schema(example = 7)]
    pub strokes: u32,
    pub meaning: Vec<String>,
    pub words: Vec<String>,
    pub similar: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<CharacterRecord> for CharacterResponse {
    fn from(record: CharacterRecord) -> Self {
        Self {
            character: record.character,
            pinyin: record.pinyin,
            radical: record.radical,
            strokes: record.stroke_count,
            meaning: record.meanings,
            words: record.example_words,
            similar: record.similar_characters,
            created_at: record.created_at,
        }
    }
}
