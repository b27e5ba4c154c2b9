//! Core types for the vocabulary app.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::normalize::{normalize_meaning, normalize_word};

/// Part of speech tag for a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
    #[serde(other)]
    Other,
}

impl PartOfSpeech {
    pub const ALL: [PartOfSpeech; 5] = [
        Self::Noun,
        Self::Verb,
        Self::Adjective,
        Self::Adverb,
        Self::Other,
    ];

    /// Get the tag as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Noun => "noun",
            Self::Verb => "verb",
            Self::Adjective => "adjective",
            Self::Adverb => "adverb",
            Self::Other => "other",
        }
    }

    /// Parse from string. Unknown tags fall back to `Other`.
    pub fn parse_lossy(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "noun" | "n" => Self::Noun,
            "verb" | "v" => Self::Verb,
            "adjective" | "adj" => Self::Adjective,
            "adverb" | "adv" => Self::Adverb,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A single stored (word, meaning, part of speech) record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredWord {
    pub id: Uuid,
    pub word: String,
    pub meaning: String,
    pub pos: PartOfSpeech,
}

impl StoredWord {
    pub fn new(word: &str, meaning: &str, pos: PartOfSpeech) -> Self {
        Self {
            id: Uuid::new_v4(),
            word: word.trim().to_string(),
            meaning: normalize_meaning(meaning),
            pos,
        }
    }

    pub fn key(&self) -> WordKey {
        WordKey::new(&self.word, &self.meaning, self.pos)
    }
}

/// Composite key indexing the flag sets without copying word data.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WordKey {
    pub pos: PartOfSpeech,
    pub word: String,
    pub meaning: String,
}

impl WordKey {
    pub fn new(word: &str, meaning: &str, pos: PartOfSpeech) -> Self {
        Self {
            pos,
            word: normalize_word(word),
            meaning: normalize_meaning(meaning),
        }
    }

    /// Persisted form: `pos|word|meaning`, with `|` and `\` in the text
    /// fields backslash-escaped.
    pub fn encode(&self) -> String {
        format!(
            "{}|{}|{}",
            self.pos.as_str(),
            escape_field(&self.word),
            escape_field(&self.meaning)
        )
    }

    pub fn decode(s: &str) -> Option<Self> {
        let parts = split_fields(s)?;
        let [pos, word, meaning] = parts.as_slice() else {
            return None;
        };
        Some(Self::new(word, meaning, PartOfSpeech::parse_lossy(pos)))
    }
}

fn escape_field(field: &str) -> String {
    field.replace('\\', "\\\\").replace('|', "\\|")
}

/// Split on unescaped `|`. A trailing lone backslash is malformed.
fn split_fields(s: &str) -> Option<Vec<String>> {
    let mut fields = vec![String::new()];
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => fields.last_mut()?.push(chars.next()?),
            '|' => fields.push(String::new()),
            c => fields.last_mut()?.push(c),
        }
    }
    Some(fields)
}

/// One distinct word in a list view, with all of its meanings merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCard {
    pub id: Uuid,
    pub word: String,
    pub pos: PartOfSpeech,
    pub meanings: Vec<String>,
}

impl WordCard {
    /// Key of the record the card is pinned to.
    pub fn key(&self) -> WordKey {
        let meaning = self.meanings.first().map(String::as_str).unwrap_or("");
        WordKey::new(&self.word, meaning, self.pos)
    }
}

/// Which flag set a word belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    Favorite,
    Learned,
    Required,
}

impl FlagKind {
    pub const ALL: [FlagKind; 3] = [Self::Favorite, Self::Learned, Self::Required];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Favorite => "favorite",
            Self::Learned => "learned",
            Self::Required => "required",
        }
    }
}

/// Homework assignment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HomeworkStatus {
    Active,
    Paused,
    #[serde(rename = "none")]
    Unassigned,
}

impl Default for HomeworkStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl HomeworkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Unassigned => "none",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "paused" => Some(Self::Paused),
            "none" => Some(Self::Unassigned),
            _ => None,
        }
    }
}

/// One of the two fixed part-of-speech pairings alternated each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", from = "u8")]
pub enum RotationPair {
    NounAdjective,
    VerbAdverb,
}

impl Default for RotationPair {
    fn default() -> Self {
        Self::NounAdjective
    }
}

impl RotationPair {
    pub fn index(self) -> u8 {
        match self {
            Self::NounAdjective => 0,
            Self::VerbAdverb => 1,
        }
    }

    /// Any index folds into the two pairs modulo 2.
    pub fn from_index(index: u8) -> Self {
        if index % 2 == 0 {
            Self::NounAdjective
        } else {
            Self::VerbAdverb
        }
    }

    pub fn parts(self) -> [PartOfSpeech; 2] {
        match self {
            Self::NounAdjective => [PartOfSpeech::Noun, PartOfSpeech::Adjective],
            Self::VerbAdverb => [PartOfSpeech::Verb, PartOfSpeech::Adverb],
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::NounAdjective => Self::VerbAdverb,
            Self::VerbAdverb => Self::NounAdjective,
        }
    }
}

impl From<RotationPair> for u8 {
    fn from(pair: RotationPair) -> Self {
        pair.index()
    }
}

impl From<u8> for RotationPair {
    fn from(index: u8) -> Self {
        Self::from_index(index)
    }
}

/// Historical record of one homework cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeworkEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub status: HomeworkStatus,
    pub pair: RotationPair,
    #[serde(default)]
    pub cycle_index: u32,
    pub word_count: usize,
    #[serde(default)]
    pub word_ids: Vec<Uuid>,
}

/// Homework tunables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeworkSettings {
    pub days_per_cycle: u32,
    pub words_per_part: usize,
    pub export_total: usize,
    pub history_limit: usize,
}

impl Default for HomeworkSettings {
    fn default() -> Self {
        Self {
            days_per_cycle: 7,
            words_per_part: 12,
            export_total: 24,
            history_limit: 200,
        }
    }
}
