//! Homework cycle commands.

use crate::state::AppState;
use chrono::{DateTime, Utc};
use serde::Serialize;
use vocab_core::{
    HomeworkEntry, HomeworkSettings, HomeworkState, HomeworkStatus, KeyValueStore, PartOfSpeech,
    StoredWord,
};

use super::{lock_homework, CommandResult};

/// Words assigned to one part of speech this cycle.
#[derive(Debug, Clone, Serialize)]
pub struct AssignedWords {
    pub pos: PartOfSpeech,
    pub variant: u8,
    pub words: Vec<StoredWord>,
}

/// Everything the homework screen needs.
#[derive(Debug, Clone, Serialize)]
pub struct HomeworkOverview {
    pub state: HomeworkState,
    pub settings: HomeworkSettings,
    pub cycle_end: DateTime<Utc>,
    pub advanced: bool,
    pub assignments: Vec<AssignedWords>,
}

/// A history entry with the words that still exist.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryView {
    #[serde(flatten)]
    pub entry: HomeworkEntry,
    pub words: Vec<StoredWord>,
}

/// Refresh the cycle (as on entering the foreground) and describe it.
pub fn get_homework<S: KeyValueStore>(
    state: &AppState<S>,
    now: DateTime<Utc>,
) -> CommandResult<HomeworkOverview> {
    let mut homework = lock_homework(state)?;
    let advanced = homework.refresh(now)?;
    let current = homework.state()?;
    let settings = homework.settings()?;

    let mut assignments = Vec::new();
    if current.status != HomeworkStatus::Unassigned {
        for pos in current.pair.parts() {
            assignments.push(AssignedWords {
                pos,
                variant: homework.variant(pos)?,
                words: homework.homework_words(pos)?,
            });
        }
    }

    Ok(HomeworkOverview {
        cycle_end: current.cycle_end(settings.days_per_cycle),
        state: current,
        settings,
        advanced,
        assignments,
    })
}

pub fn advance_homework<S: KeyValueStore>(
    state: &AppState<S>,
    now: DateTime<Utc>,
) -> CommandResult<HomeworkState> {
    let mut homework = lock_homework(state)?;
    homework.advance_cycle(now)?;
    homework.state().map_err(Into::into)
}

pub fn set_homework_status<S: KeyValueStore>(
    state: &AppState<S>,
    status: HomeworkStatus,
    now: DateTime<Utc>,
) -> CommandResult<HomeworkState> {
    let mut homework = lock_homework(state)?;
    homework.set_status(status, now)?;
    homework.state().map_err(Into::into)
}

pub fn homework_words<S: KeyValueStore>(
    state: &AppState<S>,
    pos: PartOfSpeech,
) -> CommandResult<Vec<StoredWord>> {
    lock_homework(state)?.homework_words(pos).map_err(Into::into)
}

pub fn homework_history<S: KeyValueStore>(state: &AppState<S>) -> CommandResult<Vec<HistoryView>> {
    let homework = lock_homework(state)?;
    homework
        .history()?
        .into_iter()
        .map(|entry| -> CommandResult<HistoryView> {
            Ok(HistoryView {
                words: homework.resolve_entry(&entry)?,
                entry,
            })
        })
        .collect()
}
