//! Spelling game commands.

use crate::state::AppState;
use rand::seq::SliceRandom;
use rand::Rng;
use vocab_core::{KeyValueStore, PartOfSpeech, SpellingRound, StoredWord};

use super::{lock_homework, CommandResult};

/// Pick a practice word: this cycle's homework words first, else any stored
/// word of that part of speech.
pub fn pick_word<S: KeyValueStore, R: Rng + ?Sized>(
    state: &AppState<S>,
    pos: PartOfSpeech,
    rng: &mut R,
) -> CommandResult<Option<StoredWord>> {
    let mut pool = lock_homework(state)?.homework_words(pos)?;
    if pool.is_empty() {
        pool = state.words.pinned_words(pos)?;
    }
    Ok(pool.choose(rng).cloned())
}

/// Start a round for a random practice word.
pub fn new_round<S: KeyValueStore, R: Rng + ?Sized>(
    state: &AppState<S>,
    pos: PartOfSpeech,
    rng: &mut R,
) -> CommandResult<Option<(StoredWord, SpellingRound)>> {
    Ok(pick_word(state, pos, rng)?.map(|word| {
        let round = SpellingRound::new(&word.word, rng);
        (word, round)
    }))
}
