//! Seed file import
//!
//! A seed file is a JSON object keyed by glyph, the same shape the CLI's
//! `generate` command writes.

use std::path::Path;

use anyhow::{Context, Result};
use hanzi::backfill::response::parse_batch;
use hanzi::{CharacterRecord, Glyph};

/// Read and validate every entry of a seed file
pub fn load(path: &Path) -> Result<Vec<CharacterRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    parse(&raw).with_context(|| format!("Invalid seed file {}", path.display()))
}

fn parse(raw: &str) -> Result<Vec<CharacterRecord>> {
    let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(raw)?;

    let glyphs: Vec<Glyph> = object
        .keys()
        .filter_map(|key| match Glyph::parse(key) {
            Ok(glyph) => Some(glyph),
            Err(e) => {
                tracing::warn!("Skipping seed key {:?}: {}", key, e);
                None
            }
        })
        .collect();

    Ok(parse_batch(raw, &glyphs)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed() {
        let raw = r#"{
            "我": {"pinyin": "wǒ", "radical": "戈", "strokes": 7, "meaning": ["I"], "words": [], "similar": []},
            "你": {"pinyin": "nǐ", "radical": "亻", "strokes": "7"},
            "not a glyph": {"pinyin": "?"}
        }"#;

        let mut records = parse(raw).unwrap();
        records.sort_by(|a, b| a.character.cmp(&b.character));

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].character, "你");
        assert_eq!(records[0].stroke_count, 7);
        assert_eq!(records[1].radical, "戈");
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(parse("[1, 2, 3]").is_err());
        assert!(parse("").is_err());
    }
}
