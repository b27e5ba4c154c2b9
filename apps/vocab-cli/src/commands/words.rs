//! Word collection commands.

use crate::state::AppState;
use serde::Serialize;
use vocab_core::{FlagKind, KeyValueStore, PartOfSpeech, StoredWord, WordCard, WordKey};

use super::CommandResult;

/// A list card together with its flags.
#[derive(Debug, Clone, Serialize)]
pub struct WordCardView {
    #[serde(flatten)]
    pub card: WordCard,
    pub favorite: bool,
    pub learned: bool,
    pub required: bool,
}

/// Add a word. Returns false when the triple is already stored.
pub fn add_word<S: KeyValueStore>(
    state: &AppState<S>,
    pos: PartOfSpeech,
    word: &str,
    meaning: &str,
) -> CommandResult<bool> {
    state.words.add(word, meaning, pos).map_err(Into::into)
}

/// Edit a word. Missing replacements keep the current value.
pub fn edit_word<S: KeyValueStore>(
    state: &AppState<S>,
    pos: PartOfSpeech,
    word: &str,
    meaning: &str,
    new_word: Option<&str>,
    new_meaning: Option<&str>,
) -> CommandResult<Option<StoredWord>> {
    let original = WordKey::new(word, meaning, pos);
    state
        .words
        .update(
            &original,
            new_word.unwrap_or(word),
            new_meaning.unwrap_or(meaning),
        )
        .map_err(Into::into)
}

pub fn delete_word<S: KeyValueStore>(
    state: &AppState<S>,
    pos: PartOfSpeech,
    word: &str,
    meaning: &str,
) -> CommandResult<bool> {
    state
        .words
        .delete(&WordKey::new(word, meaning, pos))
        .map_err(Into::into)
}

/// List cards for a part of speech with their flags.
pub fn list_words<S: KeyValueStore>(
    state: &AppState<S>,
    pos: PartOfSpeech,
) -> CommandResult<Vec<WordCardView>> {
    state
        .words
        .list(pos)?
        .into_iter()
        .map(|card| -> CommandResult<WordCardView> {
            let key = card.key();
            Ok(WordCardView {
                favorite: state.words.is_favorite(&key)?,
                learned: state.words.is_learned(&key)?,
                required: state.words.is_required(&key)?,
                card,
            })
        })
        .collect()
}

pub fn set_flag<S: KeyValueStore>(
    state: &AppState<S>,
    kind: FlagKind,
    pos: PartOfSpeech,
    word: &str,
    meaning: &str,
    enabled: bool,
) -> CommandResult<()> {
    state
        .words
        .set_flag(kind, word, meaning, pos, enabled)
        .map_err(Into::into)
}

pub fn flagged_words<S: KeyValueStore>(
    state: &AppState<S>,
    kind: FlagKind,
) -> CommandResult<Vec<StoredWord>> {
    state.words.flagged(kind).map_err(Into::into)
}

/// Top up a part of speech from the starter deck.
pub fn autofill<S: KeyValueStore>(
    state: &AppState<S>,
    pos: PartOfSpeech,
    target: usize,
) -> CommandResult<usize> {
    state.words.autofill(pos, target).map_err(Into::into)
}
