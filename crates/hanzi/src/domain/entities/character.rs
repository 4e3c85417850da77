//! CharacterRecord - Enrichment data for one glyph
//!
//! Pure domain entity without infrastructure dependencies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Glyph;

/// CharacterRecord - Everything known about a single character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRecord {
    /// The glyph itself (unique key)
    pub character: String,
    /// Romanized pronunciation with tone marks, may be empty
    pub pinyin: String,
    /// Semantic/graphic root
    pub radical: String,
    pub stroke_count: u32,
    /// Meanings, most common first
    #[serde(default)]
    pub meanings: Vec<String>,
    /// Words containing the character
    #[serde(default)]
    pub example_words: Vec<String>,
    /// Visually or structurally similar characters
    #[serde(default)]
    pub similar_characters: Vec<String>,
    /// When the record was first stored
    pub created_at: DateTime<Utc>,
}

impl CharacterRecord {
    /// Create a new record stamped with the current time
    pub fn new(
        glyph: &Glyph,
        pinyin: String,
        radical: String,
        stroke_count: u32,
        meanings: Vec<String>,
        example_words: Vec<String>,
        similar_characters: Vec<String>,
    ) -> Self {
        Self {
            character: glyph.to_string(),
            pinyin,
            radical,
            stroke_count,
            meanings,
            example_words,
            similar_characters,
            created_at: Utc::now(),
        }
    }
}
