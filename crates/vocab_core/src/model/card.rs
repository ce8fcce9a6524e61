//! Word card domain model.
//!
//! # Responsibility
//! - Define the external word record shape accepted from word lists.
//! - Define the immutable `WordCard` served by the catalog.
//!
//! # Invariants
//! - `WordCard::id` equals the record's zero-based position in its source list.
//! - Cards are never mutated after catalog load.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Stable card identifier, equal to the position in the source catalog.
pub type CardId = u32;

/// CEFR difficulty level of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl Level {
    /// All levels in ascending difficulty order.
    pub const ALL: [Level; 6] = [
        Level::A1,
        Level::A2,
        Level::B1,
        Level::B2,
        Level::C1,
        Level::C2,
    ];

    /// Stable string form used in storage keys and JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A1 => "A1",
            Self::A2 => "A2",
            Self::B1 => "B1",
            Self::B2 => "B2",
            Self::C1 => "C1",
            Self::C2 => "C2",
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Level string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelParseError(pub String);

impl Display for LevelParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported level `{}`; expected A1|A2|B1|B2|C1|C2",
            self.0
        )
    }
}

impl Error for LevelParseError {}

impl FromStr for Level {
    type Err = LevelParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "A1" => Ok(Self::A1),
            "A2" => Ok(Self::A2),
            "B1" => Ok(Self::B1),
            "B2" => Ok(Self::B2),
            "C1" => Ok(Self::C1),
            "C2" => Ok(Self::C2),
            _ => Err(LevelParseError(value.to_string())),
        }
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One entry of an externally supplied word list.
///
/// Field names follow the word list files (`pos`, `ch`, `example_en`,
/// `example_ch`); long-form names are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRecord {
    pub word: String,
    pub level: Level,
    #[serde(rename = "pos", alias = "part_of_speech", default)]
    pub part_of_speech: String,
    #[serde(rename = "ch", alias = "translation")]
    pub translation: String,
    #[serde(rename = "example_en", alias = "example_source", default)]
    pub example_source: String,
    #[serde(rename = "example_ch", alias = "example_translation", default)]
    pub example_translation: String,
}

/// Immutable vocabulary card served by `WordCatalog`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCard {
    pub id: CardId,
    /// Target word the learner must type.
    pub word: String,
    pub level: Level,
    pub part_of_speech: String,
    /// Prompt shown to the learner.
    pub translation: String,
    pub example_source: String,
    pub example_translation: String,
}

impl WordCard {
    /// Builds a card from a record and its catalog position.
    pub fn from_record(id: CardId, record: WordRecord) -> Self {
        Self {
            id,
            word: record.word,
            level: record.level,
            part_of_speech: record.part_of_speech,
            translation: record.translation,
            example_source: record.example_source,
            example_translation: record.example_translation,
        }
    }
}
