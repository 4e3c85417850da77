//! Model response cleaning and validation
//!
//! Turns raw completion text into `CharacterRecord`s. Anything that is not
//! a well-formed record is a `BackfillError`, never a partial record.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::domain::{BackfillError, CharacterRecord, Glyph};

/// Record as exchanged with the model and stored in seed files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterPayload {
    pub character: String,
    #[serde(default)]
    pub pinyin: String,
    #[serde(default)]
    pub radical: String,
    #[serde(default, deserialize_with = "deserialize_strokes")]
    pub strokes: u32,
    #[serde(default)]
    pub meaning: Vec<String>,
    #[serde(default)]
    pub words: Vec<String>,
    #[serde(default)]
    pub similar: Vec<String>,
}

impl CharacterPayload {
    pub fn into_record(self, glyph: &Glyph) -> CharacterRecord {
        CharacterRecord::new(
            glyph,
            self.pinyin,
            self.radical,
            self.strokes,
            self.meaning,
            self.words,
            self.similar,
        )
    }
}

impl From<&CharacterRecord> for CharacterPayload {
    fn from(record: &CharacterRecord) -> Self {
        Self {
            character: record.character.clone(),
            pinyin: record.pinyin.clone(),
            radical: record.radical.clone(),
            strokes: record.stroke_count,
            meaning: record.meanings.clone(),
            words: record.example_words.clone(),
            similar: record.similar_characters.clone(),
        }
    }
}

/// Upper bound for a plausible stroke count; the most complex glyphs in
/// use stay well below it.
pub const MAX_STROKES: u32 = 100;

/// Models answer `7`, `"7"` or occasionally `null`.
fn deserialize_strokes<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let strokes = match Value::deserialize(deserializer)? {
        Value::Null => return Ok(0),
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| D::Error::custom(format!("invalid stroke count {}", n)))?,
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| D::Error::custom(format!("invalid stroke count {:?}", s)))?,
        other => return Err(D::Error::custom(format!("invalid stroke count {}", other))),
    };

    match u32::try_from(strokes) {
        Ok(strokes) if strokes <= MAX_STROKES => Ok(strokes),
        _ => Err(D::Error::custom(format!(
            "stroke count {} exceeds {}",
            strokes, MAX_STROKES
        ))),
    }
}

/// Strip surrounding whitespace and an optional Markdown code fence.
///
/// Handles an opening fence with or without a language tag and a closing
/// fence. Text around the fence is left alone, so prose-wrapped answers
/// still fail to parse.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        let tag_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        text = rest[tag_len..].trim_start();
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }
    text
}

/// Parse the answer to a single-glyph prompt.
pub fn parse_single(raw: &str, glyph: &Glyph) -> Result<CharacterRecord, BackfillError> {
    let object = parse_object(raw)?;
    record_from_object(Value::Object(object), glyph)
}

/// Parse the answer to a batch prompt: an object keyed by glyph.
///
/// Entries for glyphs that were not requested, or that fail validation,
/// are dropped with a warning.
pub fn parse_batch(raw: &str, requested: &[Glyph]) -> Result<Vec<CharacterRecord>, BackfillError> {
    let object = parse_object(raw)?;
    let mut records = Vec::with_capacity(object.len());

    for (key, value) in object {
        let glyph = match requested.iter().find(|g| g.as_str() == key) {
            Some(glyph) => glyph,
            None => {
                tracing::warn!("Dropping unrequested entry \"{}\" from batch response", key);
                continue;
            }
        };

        let value = match value {
            Value::Object(mut fields) => {
                fields
                    .entry("character")
                    .or_insert_with(|| Value::String(key.clone()));
                Value::Object(fields)
            }
            other => {
                tracing::warn!("Dropping entry \"{}\": expected object, got {}", key, other);
                continue;
            }
        };

        match record_from_object(value, glyph) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!("Dropping entry \"{}\": {}", key, e),
        }
    }

    Ok(records)
}

/// Serialize records in the batch shape understood by [`parse_batch`].
pub fn to_batch_json(records: &[CharacterRecord]) -> Value {
    let mut map = Map::new();
    for record in records {
        let mut payload = match serde_json::to_value(CharacterPayload::from(record)) {
            Ok(Value::Object(fields)) => fields,
            _ => continue,
        };
        payload.remove("character");
        map.insert(record.character.clone(), Value::Object(payload));
    }
    Value::Object(map)
}

fn parse_object(raw: &str) -> Result<Map<String, Value>, BackfillError> {
    let cleaned = strip_code_fence(raw);
    if cleaned.is_empty() {
        return Err(BackfillError::EmptyResponse);
    }

    match serde_json::from_str::<Value>(cleaned) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(other) => Err(BackfillError::InvalidPayload(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(BackfillError::InvalidJson(e.to_string())),
    }
}

fn record_from_object(value: Value, glyph: &Glyph) -> Result<CharacterRecord, BackfillError> {
    match value.get("character") {
        Some(Value::String(c)) if !c.trim().is_empty() => {
            if c.trim() != glyph.as_str() {
                return Err(BackfillError::GlyphMismatch {
                    expected: glyph.to_string(),
                    actual: c.clone(),
                });
            }
        }
        _ => return Err(BackfillError::MissingField("character")),
    }

    let mut payload: CharacterPayload = serde_json::from_value(value)
        .map_err(|e| BackfillError::InvalidPayload(e.to_string()))?;

    payload.similar = payload
        .similar
        .into_iter()
        .filter_map(|s| match Glyph::parse(s.trim()) {
            Ok(similar) => Some(similar.to_string()),
            Err(_) => {
                tracing::warn!("Dropping similar entry {:?} for \"{}\"", s, glyph);
                None
            }
        })
        .collect();

    Ok(payload.into_record(glyph))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
