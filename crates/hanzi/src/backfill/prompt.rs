//! Prompt templates for character generation
//!
//! Both prompts embed the same worked example so the model copies its
//! field names and value types.

use crate::domain::Glyph;

/// Sets the model up as a dictionary that only answers in JSON
pub const SYSTEM: &str = "You are a Chinese character dictionary. \
You answer every request with a single JSON object and never add prose.";

/// Glyph of the worked example
pub const EXAMPLE_GLYPH: &str = "我";

/// Worked example body, without the `character` key
const EXAMPLE_FIELDS: &str = r#""pinyin":"wǒ","radical":"戈","strokes":7,"meaning":["第一人称代词","表示自己"],"words":["我们","我国","自我","我的"],"similar":["找","戒","成"]"#;

const STRICT_JSON: &str = "The response must be exactly one valid JSON object and nothing else: \
no explanations, no comments, no Markdown code fences (such as ```json or ```), \
no text before or after the object.";

/// Instruction for a single glyph
pub fn single(glyph: &Glyph) -> String {
    format!(
        "Use this JSON object as the reference for structure and field names: \
         {{\"character\":\"{example}\",{fields}}}\n\
         Produce the same kind of object for the Chinese character \"{glyph}\". \
         Write meanings and words in Simplified Chinese, give pinyin with tone marks \
         and strokes as an integer.\n\
         {strict}",
        example = EXAMPLE_GLYPH,
        fields = EXAMPLE_FIELDS,
        glyph = glyph,
        strict = STRICT_JSON,
    )
}

/// Instruction for a group of glyphs, answered as one object keyed by glyph
pub fn batch(glyphs: &[Glyph]) -> String {
    let list: String = glyphs.iter().map(Glyph::as_str).collect();
    format!(
        "Use this JSON object as the reference for structure and field names: \
         {{\"{example}\":{{{fields}}}}}\n\
         For every Chinese character listed below produce one such entry and merge \
         all entries into a single JSON object whose keys are the characters themselves. \
         Write meanings and words in Simplified Chinese, give pinyin with tone marks \
         and strokes as an integer.\n\
         {strict}\n\
         Characters: {list}",
        example = EXAMPLE_GLYPH,
        fields = EXAMPLE_FIELDS,
        strict = STRICT_JSON,
        list = list,
    )
}
