//! Glyph - a single character, the atomic lookup key

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// A validated single character.
///
/// Exactly one Unicode scalar value that is neither whitespace nor a
/// control character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Glyph(String);

impl Glyph {
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let mut chars = input.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_whitespace() || c.is_control() => Err(
                DomainError::Validation(format!("{:?} is not a printable character", c)),
            ),
            (Some(c), None) => Ok(Self(c.to_string())),
            (None, _) => Err(DomainError::Validation(
                "character must not be empty".to_string(),
            )),
            _ => Err(DomainError::Validation(format!(
                "expected exactly one character, got \"{}\"",
                input
            ))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Split free text into glyphs, skipping whitespace and dropping repeats.
///
/// Order of first appearance is preserved.
pub fn split_glyphs(text: &str) -> Vec<Glyph> {
    let mut seen = std::collections::HashSet::new();
    text.chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .filter(|c| seen.insert(*c))
        .map(|c| Glyph(c.to_string()))
        .collect()
}

impl std::fmt::Display for Glyph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Glyph {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Glyph {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Glyph> for String {
    fn from(glyph: Glyph) -> Self {
        glyph.0
    }
}

impl AsRef<str> for Glyph {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
