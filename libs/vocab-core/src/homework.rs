//! Homework cycle engine.
//!
//! A cycle is a window of `days_per_cycle` days during which one rotation
//! pair of parts of speech is assigned. Each part gets a fixed subset of
//! words, chosen once per cycle and then kept stable until the cycle
//! advances or the cache is reset.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::Result;
use crate::store::{keys, KeyValueExt, KeyValueStore};
use crate::types::{
    HomeworkEntry, HomeworkSettings, HomeworkStatus, PartOfSpeech, RotationPair, StoredWord,
};
use crate::words::WordStore;

/// Number of decorative variants rotated per part of speech.
pub const VARIANT_COUNT: u8 = 3;

/// Snapshot of the persisted rotation state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeworkState {
    pub status: HomeworkStatus,
    pub pair: RotationPair,
    pub cycle_index: u32,
    pub cycle_start: DateTime<Utc>,
}

impl HomeworkState {
    /// When the current cycle is due to end.
    pub fn cycle_end(&self, days_per_cycle: u32) -> DateTime<Utc> {
        self.cycle_start + Duration::days(i64::from(days_per_cycle.max(1)))
    }
}

/// Word ids chosen for one cycle. Persisted so the choice survives a
/// restart, and tagged with the cycle it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CycleSelection {
    cycle_index: u32,
    cycle_start: DateTime<Utc>,
    /// Set when the words came from a pack. An imported part with no words
    /// stays empty instead of being sampled.
    #[serde(default)]
    imported: bool,
    words: BTreeMap<PartOfSpeech, Vec<Uuid>>,
}

impl CycleSelection {
    fn for_state(state: &HomeworkState) -> Self {
        Self {
            cycle_index: state.cycle_index,
            cycle_start: state.cycle_start,
            imported: false,
            words: BTreeMap::new(),
        }
    }

    fn matches(&self, state: &HomeworkState) -> bool {
        self.cycle_index == state.cycle_index && self.cycle_start == state.cycle_start
    }

    fn word_ids(&self) -> Vec<Uuid> {
        self.words.values().flatten().copied().collect()
    }
}

#[derive(Debug, Default)]
struct CycleCache {
    cycle_index: Option<u32>,
    words: HashMap<PartOfSpeech, Vec<StoredWord>>,
}

impl CycleCache {
    fn clear(&mut self) {
        self.cycle_index = None;
        self.words.clear();
    }
}

pub struct HomeworkStore<S> {
    kv: Arc<S>,
    words: WordStore<S>,
    cache: CycleCache,
    rng: StdRng,
}

impl<S: KeyValueStore> HomeworkStore<S> {
    /// Open the engine, starting the first cycle at `now` if none is stored.
    pub fn open(kv: Arc<S>, now: DateTime<Utc>) -> Result<Self> {
        Self::with_rng(kv, now, StdRng::from_entropy())
    }

    /// Open with a caller-supplied random source.
    pub fn with_rng(kv: Arc<S>, now: DateTime<Utc>, rng: StdRng) -> Result<Self> {
        if kv.get_json::<DateTime<Utc>>(keys::CYCLE_START)?.is_none() {
            kv.set_json(keys::CYCLE_START, &now)?;
        }
        Ok(Self {
            words: WordStore::new(Arc::clone(&kv)),
            kv,
            cache: CycleCache::default(),
            rng,
        })
    }

    pub fn words(&self) -> &WordStore<S> {
        &self.words
    }

    pub fn state(&self) -> Result<HomeworkState> {
        Ok(HomeworkState {
            status: self.kv.get_json(keys::STATUS)?.unwrap_or_default(),
            pair: self.kv.get_json(keys::PAIR)?.unwrap_or_default(),
            cycle_index: self.kv.get_json(keys::CYCLE_INDEX)?.unwrap_or(0),
            cycle_start: self
                .kv
                .get_json(keys::CYCLE_START)?
                .unwrap_or_else(Utc::now),
        })
    }

    pub fn settings(&self) -> Result<HomeworkSettings> {
        Ok(self.kv.get_json(keys::SETTINGS)?.unwrap_or_default())
    }

    pub fn save_settings(&self, settings: &HomeworkSettings) -> Result<()> {
        self.kv.set_json(keys::SETTINGS, settings)
    }

    /// Current decorative variant (0..3) for a part of speech.
    pub fn variant(&self, pos: PartOfSpeech) -> Result<u8> {
        Ok(self.kv.get_json(&variant_key(pos))?.unwrap_or(0))
    }

    /// Advance the cycle if it is active and its window has elapsed.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> Result<bool> {
        let state = self.state()?;
        if state.status != HomeworkStatus::Active {
            return Ok(false);
        }

        let days = i64::from(self.settings()?.days_per_cycle.max(1));
        if (now - state.cycle_start).num_days() < days {
            return Ok(false);
        }

        self.advance_cycle(now)?;
        Ok(true)
    }

    /// Start the next cycle at `now`.
    pub fn advance_cycle(&mut self, now: DateTime<Utc>) -> Result<()> {
        let state = self.state()?;
        let pair = state.pair.next();
        let cycle_index = state.cycle_index.saturating_add(1);

        self.cache.clear();
        self.kv.remove(keys::SELECTION)?;
        self.kv.set_json(keys::PAIR, &pair)?;
        self.kv.set_json(keys::CYCLE_INDEX, &cycle_index)?;
        for pos in pair.parts() {
            let next = (self.variant(pos)? + 1) % VARIANT_COUNT;
            self.kv.set_json(&variant_key(pos), &next)?;
        }
        self.kv.set_json(keys::CYCLE_START, &now)?;

        self.upsert_history(HomeworkEntry {
            id: Uuid::new_v4(),
            timestamp: now,
            status: state.status,
            pair,
            cycle_index,
            word_count: 0,
            word_ids: Vec::new(),
        })?;

        info!(cycle_index, pair = pair.index(), "advanced homework cycle");
        Ok(())
    }

    pub fn set_active(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.set_status(HomeworkStatus::Active, now)
    }

    pub fn set_paused(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.set_status(HomeworkStatus::Paused, now)
    }

    pub fn set_none(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.set_status(HomeworkStatus::Unassigned, now)
    }

    pub fn set_status(&mut self, status: HomeworkStatus, now: DateTime<Utc>) -> Result<()> {
        self.kv.set_json(keys::STATUS, &status)?;
        let state = self.state()?;
        let mut word_ids = self.selection(&state)?.word_ids();
        if word_ids.is_empty() {
            word_ids = self
                .current_entry(&state)?
                .map(|e| e.word_ids)
                .unwrap_or_default();
        }

        self.upsert_history(HomeworkEntry {
            id: Uuid::new_v4(),
            timestamp: now,
            status,
            pair: state.pair,
            cycle_index: state.cycle_index,
            word_count: word_ids.len(),
            word_ids,
        })?;

        info!(status = status.as_str(), "homework status changed");
        Ok(())
    }

    /// The fixed word subset for `pos` in the current cycle.
    ///
    /// Repeated calls within one cycle return the same words in the same
    /// order.
    pub fn homework_words(&mut self, pos: PartOfSpeech) -> Result<Vec<StoredWord>> {
        let state = self.state()?;
        if self.cache.cycle_index != Some(state.cycle_index) {
            self.cache.clear();
            self.cache.cycle_index = Some(state.cycle_index);
        }

        if let Some(words) = self.cache.words.get(&pos) {
            return Ok(words.clone());
        }

        let mut selection = self.selection(&state)?;
        if let Some(ids) = selection.words.get(&pos) {
            let restored: Vec<StoredWord> = self
                .words
                .resolve(ids)?
                .into_iter()
                .filter(|w| w.pos == pos)
                .collect();
            if selection.imported || !restored.is_empty() {
                debug!(%pos, count = restored.len(), "restored homework words");
                self.cache.words.insert(pos, restored.clone());
                return Ok(restored);
            }
        }

        let chosen = self.select(pos)?;
        if !chosen.is_empty() {
            selection.words.insert(pos, chosen.iter().map(|w| w.id).collect());
            self.kv.set_json(keys::SELECTION, &selection)?;
            self.record_selection(&state, &chosen)?;
            self.cache.words.insert(pos, chosen.clone());
        }
        Ok(chosen)
    }

    /// Forget the current cycle's selection so the next call re-selects.
    pub fn reset_cache(&mut self) -> Result<()> {
        self.cache.clear();
        self.kv.remove(keys::SELECTION)?;
        debug!("homework selection reset");
        Ok(())
    }

    /// History entries, newest first.
    pub fn history(&self) -> Result<Vec<HomeworkEntry>> {
        Ok(self.kv.get_json(keys::HISTORY)?.unwrap_or_default())
    }

    /// Words of a history entry that still exist.
    pub fn resolve_entry(&self, entry: &HomeworkEntry) -> Result<Vec<StoredWord>> {
        self.words.resolve(&entry.word_ids)
    }

    /// Overwrite the rotation state with an externally supplied schedule.
    pub fn apply_schedule(
        &mut self,
        pair: RotationPair,
        days_per_cycle: u32,
        cycle_index: u32,
        cycle_start: DateTime<Utc>,
    ) -> Result<()> {
        let mut settings = self.settings()?;
        settings.days_per_cycle = days_per_cycle.max(1);
        self.save_settings(&settings)?;

        self.kv.set_json(keys::PAIR, &pair)?;
        self.kv.set_json(keys::CYCLE_INDEX, &cycle_index)?;
        self.kv.set_json(keys::CYCLE_START, &cycle_start)?;
        self.cache.clear();
        Ok(())
    }

    /// Make `words` the selection for the current cycle. Both parts of the
    /// active pair are pinned, so a part without words stays empty. Returns
    /// the selected ids.
    pub(crate) fn install_selection(
        &mut self,
        mut words: HashMap<PartOfSpeech, Vec<StoredWord>>,
    ) -> Result<Vec<Uuid>> {
        let state = self.state()?;
        for pos in state.pair.parts() {
            words.entry(pos).or_default();
        }

        let mut selection = CycleSelection::for_state(&state);
        selection.imported = true;
        for (pos, list) in &words {
            selection
                .words
                .insert(*pos, list.iter().map(|w| w.id).collect());
        }
        self.kv.set_json(keys::SELECTION, &selection)?;

        self.cache.cycle_index = Some(state.cycle_index);
        self.cache.words = words;
        Ok(selection.word_ids())
    }

    /// Upsert `entry` as the only history record holding words for its
    /// cycle. Older entries for the same cycle and pair keep their dates but
    /// lose their word ids.
    pub(crate) fn replace_cycle_history(&self, entry: HomeworkEntry) -> Result<()> {
        let mut history = self.history()?;
        let mut superseded = 0;
        for e in history
            .iter_mut()
            .filter(|e| e.cycle_index == entry.cycle_index && e.pair == entry.pair)
        {
            e.word_ids.clear();
            e.word_count = 0;
            superseded += 1;
        }
        if superseded > 0 {
            self.kv.set_json(keys::HISTORY, &history)?;
            debug!(superseded, "cleared superseded cycle words");
        }
        self.upsert_history(entry)
    }

    pub(crate) fn upsert_history(&self, mut entry: HomeworkEntry) -> Result<()> {
        let limit = self.settings()?.history_limit;
        let mut history = self.history()?;
        let day = entry.timestamp.date_naive();

        if let Some(pos) = history
            .iter()
            .position(|e| e.timestamp.date_naive() == day && e.pair == entry.pair)
        {
            entry.id = history.remove(pos).id;
        }

        history.insert(0, entry);
        history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        history.truncate(limit);
        self.kv.set_json(keys::HISTORY, &history)
    }

    fn selection(&self, state: &HomeworkState) -> Result<CycleSelection> {
        Ok(self
            .kv
            .get_json::<CycleSelection>(keys::SELECTION)?
            .filter(|s| s.matches(state))
            .unwrap_or_else(|| CycleSelection::for_state(state)))
    }

    fn current_entry(&self, state: &HomeworkState) -> Result<Option<HomeworkEntry>> {
        Ok(self
            .history()?
            .into_iter()
            .find(|e| e.cycle_index == state.cycle_index && e.pair == state.pair))
    }

    fn select(&mut self, pos: PartOfSpeech) -> Result<Vec<StoredWord>> {
        let quota = self.settings()?.words_per_part;
        let pool = self.words.pinned_words(pos)?;
        if pool.len() <= quota {
            return Ok(pool);
        }
        debug!(%pos, available = pool.len(), quota, "sampling homework words");
        Ok(pool
            .choose_multiple(&mut self.rng, quota)
            .cloned()
            .collect())
    }

    /// Remember the chosen ids on the current cycle's history entry.
    fn record_selection(&self, state: &HomeworkState, selected: &[StoredWord]) -> Result<()> {
        if selected.is_empty() {
            return Ok(());
        }

        let mut history = self.history()?;
        match history
            .iter_mut()
            .find(|e| e.cycle_index == state.cycle_index && e.pair == state.pair)
        {
            Some(entry) => {
                for word in selected {
                    if !entry.word_ids.contains(&word.id) {
                        entry.word_ids.push(word.id);
                    }
                }
                entry.word_count = entry.word_ids.len();
                self.kv.set_json(keys::HISTORY, &history)
            }
            None => self.upsert_history(HomeworkEntry {
                id: Uuid::new_v4(),
                timestamp: state.cycle_start,
                status: state.status,
                pair: state.pair,
                cycle_index: state.cycle_index,
                word_count: selected.len(),
                word_ids: selected.iter().map(|w| w.id).collect(),
            }),
        }
    }
}

fn variant_key(pos: PartOfSpeech) -> String {
    format!("{}{}", keys::VARIANT_PREFIX, pos.as_str())
}
