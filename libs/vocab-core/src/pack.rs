//! Homework pack import/export.
//!
//! A pack is a JSON snapshot of one cycle's word set, passed from a teacher
//! device to a student device. Imports are idempotent per pack id. Word
//! triples merge first-write-wins, while the pack's schedule always
//! overwrites the local rotation state.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{PackError, Result};
use crate::homework::HomeworkStore;
use crate::normalize::normalize_word;
use crate::store::{keys, KeyValueExt, KeyValueStore};
use crate::types::{HomeworkEntry, PartOfSpeech, RotationPair, StoredWord, WordKey};

/// One word in a pack, with every meaning the sender knows for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackItem {
    pub pos: PartOfSpeech,
    pub word: String,
    #[serde(default)]
    pub meanings: Vec<String>,
}

/// External snapshot of one homework cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeworkExportPayload {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub pair: RotationPair,
    pub days_per_cycle: u32,
    pub cycle_index: u32,
    pub total_count: usize,
    pub items: Vec<PackItem>,
}

/// Wire form, decoded leniently before normalization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayloadWire {
    id: String,
    created_at: String,
    pair: RotationPair,
    days_per_cycle: u32,
    cycle_index: u32,
    #[serde(default)]
    total_count: Option<usize>,
    items: Vec<PackItem>,
}

impl HomeworkExportPayload {
    /// Decode a pack. Only malformed JSON or a schema mismatch is an error;
    /// an unreadable `createdAt` falls back to `now`.
    pub fn decode(text: &str, now: DateTime<Utc>) -> std::result::Result<Self, PackError> {
        let wire: PayloadWire = serde_json::from_str(text)?;

        let created_at = match DateTime::parse_from_rfc3339(wire.created_at.trim()) {
            Ok(dt) => dt.with_timezone(&Utc),
            Err(e) => {
                warn!(id = %wire.id, raw = %wire.created_at, error = %e, "bad pack timestamp, using now");
                now
            }
        };

        let unknown = wire
            .items
            .iter()
            .filter(|item| item.pos == PartOfSpeech::Other)
            .count();
        if unknown > 0 {
            warn!(id = %wire.id, unknown, "pack items with unrecognised part of speech");
        }

        Ok(Self {
            total_count: wire.total_count.unwrap_or(wire.items.len()),
            id: wire.id,
            created_at,
            pair: wire.pair,
            days_per_cycle: wire.days_per_cycle,
            cycle_index: wire.cycle_index,
            items: wire.items,
        })
    }

    /// Pretty-printed JSON with sorted keys.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        // serde_json::Map is ordered by key without the preserve_order feature.
        let value = serde_json::to_value(self)?;
        serde_json::to_string_pretty(&value)
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.id)
    }
}

/// Stable pack id for a cycle.
pub fn pack_id(cycle_index: u32, pair: RotationPair, cycle_start: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}|{}|{}", cycle_index, pair.index(), cycle_start.to_rfc3339()).as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("hw-{}", &digest[..16])
}

/// Result of an import attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ImportOutcome {
    AlreadyImported { id: String },
    Imported { id: String, added: usize, items: usize },
}

pub struct HomeworkPackStore<S> {
    kv: Arc<S>,
}

impl<S: KeyValueStore> HomeworkPackStore<S> {
    pub fn new(kv: Arc<S>) -> Self {
        Self { kv }
    }

    pub fn imported_ids(&self) -> Result<BTreeSet<String>> {
        Ok(self.kv.get_json(keys::IMPORTED_IDS)?.unwrap_or_default())
    }

    pub fn is_imported(&self, id: &str) -> Result<bool> {
        Ok(self.imported_ids()?.contains(id))
    }

    /// Snapshot the current cycle.
    ///
    /// Items are the active pair's homework words, topped up from the rest of
    /// those parts of speech and capped at `export_total`.
    pub fn export(&self, homework: &mut HomeworkStore<S>) -> Result<HomeworkExportPayload> {
        let state = homework.state()?;
        let settings = homework.settings()?;
        let total = settings.export_total;

        let mut chosen: Vec<StoredWord> = Vec::new();
        let mut seen: HashSet<(PartOfSpeech, String)> = HashSet::new();
        for pos in state.pair.parts() {
            for word in homework.homework_words(pos)? {
                if seen.insert((pos, normalize_word(&word.word))) {
                    chosen.push(word);
                }
            }
        }
        for pos in state.pair.parts() {
            if chosen.len() >= total {
                break;
            }
            for word in homework.words().pinned_words(pos)? {
                if chosen.len() >= total {
                    break;
                }
                if seen.insert((pos, normalize_word(&word.word))) {
                    chosen.push(word);
                }
            }
        }
        chosen.truncate(total);

        let items = chosen
            .iter()
            .map(|w| -> Result<PackItem> {
                Ok(PackItem {
                    pos: w.pos,
                    word: w.word.clone(),
                    meanings: homework.words().meanings_of(&w.word, w.pos)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let payload = HomeworkExportPayload {
            id: pack_id(state.cycle_index, state.pair, state.cycle_start),
            created_at: state.cycle_start,
            pair: state.pair,
            days_per_cycle: settings.days_per_cycle,
            cycle_index: state.cycle_index,
            total_count: items.len(),
            items,
        };
        info!(id = %payload.id, items = payload.total_count, "exported homework pack");
        Ok(payload)
    }

    /// Apply a pack to local state. Importing the same id again is a no-op.
    pub fn import(
        &self,
        homework: &mut HomeworkStore<S>,
        payload: &HomeworkExportPayload,
    ) -> Result<ImportOutcome> {
        let mut imported = self.imported_ids()?;
        if imported.contains(&payload.id) {
            info!(id = %payload.id, "homework pack already imported");
            return Ok(ImportOutcome::AlreadyImported {
                id: payload.id.clone(),
            });
        }

        let triples: Vec<(&str, &str, PartOfSpeech)> = payload
            .items
            .iter()
            .flat_map(|item| {
                let meanings: Vec<&str> = if item.meanings.is_empty() {
                    vec![""]
                } else {
                    item.meanings.iter().map(String::as_str).collect()
                };
                meanings
                    .into_iter()
                    .map(move |m| (item.word.as_str(), m, item.pos))
            })
            .collect();
        let added = homework.words().add_all(triples)?;

        homework.apply_schedule(
            payload.pair,
            payload.days_per_cycle,
            payload.cycle_index,
            payload.created_at,
        )?;

        let mut cycle_words: HashMap<PartOfSpeech, Vec<StoredWord>> = HashMap::new();
        let mut seen: HashSet<(PartOfSpeech, String)> = HashSet::new();
        for item in &payload.items {
            if !seen.insert((item.pos, normalize_word(&item.word))) {
                continue;
            }
            let meaning = item.meanings.first().map(String::as_str).unwrap_or("");
            if let Some(record) = homework.words().find(&WordKey::new(&item.word, meaning, item.pos))? {
                cycle_words.entry(item.pos).or_default().push(record);
            }
        }
        let word_ids = homework.install_selection(cycle_words)?;

        imported.insert(payload.id.clone());
        self.kv.set_json(keys::IMPORTED_IDS, &imported)?;

        let state = homework.state()?;
        homework.replace_cycle_history(HomeworkEntry {
            id: Uuid::new_v4(),
            timestamp: payload.created_at,
            status: state.status,
            pair: payload.pair,
            cycle_index: payload.cycle_index,
            word_count: word_ids.len(),
            word_ids,
        })?;

        info!(id = %payload.id, added, items = payload.items.len(), "imported homework pack");
        Ok(ImportOutcome::Imported {
            id: payload.id.clone(),
            added,
            items: payload.items.len(),
        })
    }

    /// Decode and import a pack file's contents.
    pub fn import_json(
        &self,
        homework: &mut HomeworkStore<S>,
        text: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<ImportOutcome, PackError> {
        let payload = HomeworkExportPayload::decode(text, now)?;
        Ok(self.import(homework, &payload)?)
    }
}
