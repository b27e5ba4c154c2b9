//! Commands exposed to the front end.

pub mod homework;
pub mod pack;
pub mod spelling;
pub mod words;

use crate::state::AppState;
use std::sync::MutexGuard;
use vocab_core::HomeworkStore;

pub use homework::{
    advance_homework, get_homework, homework_history, homework_words, set_homework_status,
    HistoryView, HomeworkOverview,
};
pub use pack::{export_pack, import_pack, ExportResult};
pub use spelling::{new_round, pick_word};
pub use words::{
    add_word, autofill, delete_word, edit_word, flagged_words, list_words, set_flag, WordCardView,
};

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct CommandError {
    pub message: String,
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CommandError {}

impl From<vocab_core::StoreError> for CommandError {
    fn from(e: vocab_core::StoreError) -> Self {
        Self { message: e.to_string() }
    }
}

impl From<vocab_core::PackError> for CommandError {
    fn from(e: vocab_core::PackError) -> Self {
        Self { message: e.to_string() }
    }
}

impl From<crate::db::DbError> for CommandError {
    fn from(e: crate::db::DbError) -> Self {
        Self { message: e.to_string() }
    }
}

impl From<std::io::Error> for CommandError {
    fn from(e: std::io::Error) -> Self {
        Self { message: e.to_string() }
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(e: serde_json::Error) -> Self {
        Self { message: e.to_string() }
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

fn lock_homework<S>(state: &AppState<S>) -> CommandResult<MutexGuard<'_, HomeworkStore<S>>> {
    state.homework.lock().map_err(|_| CommandError {
        message: "homework state lock poisoned".to_string(),
    })
}
