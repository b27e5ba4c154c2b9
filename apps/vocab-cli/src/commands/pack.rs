//! Homework pack file commands.

use crate::state::AppState;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use vocab_core::{ImportOutcome, KeyValueStore};

use super::{lock_homework, CommandResult};

#[derive(Debug, Clone, Serialize)]
pub struct ExportResult {
    pub id: String,
    pub path: PathBuf,
    pub total_count: usize,
}

/// Write the current cycle's pack to `<dir>/<id>.json`.
pub fn export_pack<S: KeyValueStore>(state: &AppState<S>, dir: &Path) -> CommandResult<ExportResult> {
    let payload = {
        let mut homework = lock_homework(state)?;
        state.packs.export(&mut homework)?
    };

    fs::create_dir_all(dir)?;
    let path = dir.join(payload.file_name());
    fs::write(&path, payload.to_json()?)?;

    Ok(ExportResult {
        id: payload.id,
        path,
        total_count: payload.total_count,
    })
}

/// Read a pack file and apply it.
pub fn import_pack<S: KeyValueStore>(
    state: &AppState<S>,
    file_path: &Path,
    now: DateTime<Utc>,
) -> CommandResult<ImportOutcome> {
    let content = fs::read_to_string(file_path)?;
    let mut homework = lock_homework(state)?;
    state
        .packs
        .import_json(&mut homework, &content, now)
        .map_err(Into::into)
}
