//! Core vocabulary library shared by the app front ends.
//!
//! Provides:
//! - Word store with favorite/learned/required flags
//! - Homework cycle engine (rotation pairs, per-cycle word selection, history)
//! - Homework pack import/export
//! - Spelling tile game
//! - Key-value persistence seam with an in-memory backend

pub mod error;
pub mod homework;
pub mod normalize;
pub mod pack;
pub mod seed;
pub mod spelling;
pub mod store;
pub mod types;
pub mod words;

pub use error::{PackError, Result, StoreError};
pub use homework::{HomeworkState, HomeworkStore};
pub use pack::{HomeworkExportPayload, HomeworkPackStore, ImportOutcome, PackItem};
pub use spelling::{SpellingOutcome, SpellingRound, Tile};
pub use store::{KeyValueExt, KeyValueStore, MemoryStore};
pub use types::{
    FlagKind, HomeworkEntry, HomeworkSettings, HomeworkStatus, PartOfSpeech, RotationPair,
    StoredWord, WordCard, WordKey,
};
pub use words::WordStore;
