//! Word store: the authoritative word table plus the favorite, learned and
//! required flag sets.
//!
//! Duplicate adds and missing deletes are silent no-ops. Flags are keyed by
//! [`WordKey`] and are not cascade-deleted with their word, so re-adding a
//! word (for example through a homework import) brings its flags back.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::error::Result;
use crate::normalize::normalize_word;
use crate::seed::seed_words;
use crate::store::{keys, KeyValueExt, KeyValueStore};
use crate::types::{FlagKind, PartOfSpeech, StoredWord, WordCard, WordKey};

pub struct WordStore<S> {
    kv: Arc<S>,
}

impl<S> Clone for WordStore<S> {
    fn clone(&self) -> Self {
        Self {
            kv: Arc::clone(&self.kv),
        }
    }
}

impl<S: KeyValueStore> WordStore<S> {
    pub fn new(kv: Arc<S>) -> Self {
        Self { kv }
    }

    /// All stored records in insertion order.
    pub fn all(&self) -> Result<Vec<StoredWord>> {
        Ok(self.kv.get_json(keys::WORDS)?.unwrap_or_default())
    }

    fn save_all(&self, words: &[StoredWord]) -> Result<()> {
        self.kv.set_json(keys::WORDS, words)
    }

    pub fn get(&self, id: Uuid) -> Result<Option<StoredWord>> {
        Ok(self.all()?.into_iter().find(|w| w.id == id))
    }

    pub fn find(&self, key: &WordKey) -> Result<Option<StoredWord>> {
        Ok(self.all()?.into_iter().find(|w| &w.key() == key))
    }

    /// Resolve ids to records, skipping any that no longer exist.
    pub fn resolve(&self, ids: &[Uuid]) -> Result<Vec<StoredWord>> {
        let words = self.all()?;
        Ok(ids
            .iter()
            .filter_map(|id| words.iter().find(|w| w.id == *id).cloned())
            .collect())
    }

    /// Insert a new record unless the normalized triple already exists.
    pub fn add(&self, word: &str, meaning: &str, pos: PartOfSpeech) -> Result<bool> {
        Ok(self.add_all([(word, meaning, pos)])? == 1)
    }

    /// Insert every absent triple in one write. Returns how many were added.
    pub fn add_all<'a, I>(&self, triples: I) -> Result<usize>
    where
        I: IntoIterator<Item = (&'a str, &'a str, PartOfSpeech)>,
    {
        let mut words = self.all()?;
        let mut added = 0;

        for (word, meaning, pos) in triples {
            if insert_if_absent(&mut words, word, meaning, pos).is_some() {
                added += 1;
            }
        }

        if added > 0 {
            self.save_all(&words)?;
            info!(added, "added words");
        } else {
            debug!("no new words to add");
        }
        Ok(added)
    }

    /// Edit a record in place, keeping its id and moving its flags.
    ///
    /// If `original` is not stored the new triple is inserted instead. If the
    /// new triple already belongs to another record, the edited record is
    /// folded into it. Returns `None` when the new word is blank.
    pub fn update(
        &self,
        original: &WordKey,
        new_word: &str,
        new_meaning: &str,
    ) -> Result<Option<StoredWord>> {
        if normalize_word(new_word).is_empty() {
            return Ok(None);
        }

        let mut words = self.all()?;
        let new_key = WordKey::new(new_word, new_meaning, original.pos);

        let Some(index) = words.iter().position(|w| &w.key() == original) else {
            let record = match insert_if_absent(&mut words, new_word, new_meaning, original.pos) {
                Some(record) => {
                    self.save_all(&words)?;
                    record
                }
                None => words
                    .iter()
                    .find(|w| w.key() == new_key)
                    .cloned()
                    .unwrap_or_else(|| StoredWord::new(new_word, new_meaning, original.pos)),
            };
            debug!(word = %record.word, "update target missing, inserted as new");
            return Ok(Some(record));
        };

        let duplicate = words
            .iter()
            .enumerate()
            .find(|(i, w)| *i != index && w.key() == new_key)
            .map(|(_, w)| w.clone());

        let updated = match duplicate {
            Some(existing) => {
                words.remove(index);
                existing
            }
            None => {
                let record = &mut words[index];
                record.word = new_word.trim().to_string();
                record.meaning = new_key.meaning.clone();
                record.clone()
            }
        };

        self.save_all(&words)?;
        self.rekey_flags(original, &new_key)?;
        info!(id = %updated.id, word = %updated.word, "updated word");
        Ok(Some(updated))
    }

    /// Remove the matching record. Flags referencing it are left in place.
    pub fn delete(&self, key: &WordKey) -> Result<bool> {
        let mut words = self.all()?;
        let Some(index) = words.iter().position(|w| &w.key() == key) else {
            debug!(word = %key.word, "delete target missing");
            return Ok(false);
        };
        let removed = words.remove(index);
        self.save_all(&words)?;
        info!(id = %removed.id, word = %removed.word, "deleted word");
        Ok(true)
    }

    /// One card per distinct word, sorted alphabetically.
    pub fn list(&self, pos: PartOfSpeech) -> Result<Vec<WordCard>> {
        let words = self.all()?;
        Ok(group_by_word(&words, pos)
            .into_iter()
            .map(|group| {
                let pinned = group[0];
                let mut meanings: Vec<String> = Vec::with_capacity(group.len());
                for w in &group {
                    if !meanings.contains(&w.meaning) {
                        meanings.push(w.meaning.clone());
                    }
                }
                WordCard {
                    id: pinned.id,
                    word: pinned.word.clone(),
                    pos,
                    meanings,
                }
            })
            .collect())
    }

    /// The record each card of [`list`](Self::list) is pinned to, in list order.
    pub fn pinned_words(&self, pos: PartOfSpeech) -> Result<Vec<StoredWord>> {
        let words = self.all()?;
        Ok(group_by_word(&words, pos)
            .into_iter()
            .map(|group| group[0].clone())
            .collect())
    }

    /// Every stored meaning for a word, in list order.
    pub fn meanings_of(&self, word: &str, pos: PartOfSpeech) -> Result<Vec<String>> {
        let target = normalize_word(word);
        Ok(self
            .list(pos)?
            .into_iter()
            .find(|card| normalize_word(&card.word) == target)
            .map(|card| card.meanings)
            .unwrap_or_default())
    }

    /// Number of distinct words stored for a part of speech.
    pub fn count(&self, pos: PartOfSpeech) -> Result<usize> {
        let words = self.all()?;
        Ok(group_by_word(&words, pos).len())
    }

    pub fn set_favorite(&self, word: &str, meaning: &str, pos: PartOfSpeech, enabled: bool) -> Result<()> {
        self.set_flag(FlagKind::Favorite, word, meaning, pos, enabled)
    }

    pub fn set_learned(&self, word: &str, meaning: &str, pos: PartOfSpeech, enabled: bool) -> Result<()> {
        self.set_flag(FlagKind::Learned, word, meaning, pos, enabled)
    }

    pub fn set_required(&self, word: &str, meaning: &str, pos: PartOfSpeech, enabled: bool) -> Result<()> {
        self.set_flag(FlagKind::Required, word, meaning, pos, enabled)
    }

    /// Toggle a flag. Enabling a flag on an unknown word stores the word first.
    pub fn set_flag(
        &self,
        kind: FlagKind,
        word: &str,
        meaning: &str,
        pos: PartOfSpeech,
        enabled: bool,
    ) -> Result<()> {
        let key = WordKey::new(word, meaning, pos);
        if key.word.is_empty() {
            return Ok(());
        }

        if enabled {
            self.add(word, meaning, pos)?;
        }

        let mut flags = self.flags(kind)?;
        let changed = if enabled {
            flags.insert(key.encode())
        } else {
            flags.remove(&key.encode())
        };

        if changed {
            self.save_flags(kind, &flags)?;
            debug!(flag = kind.as_str(), word = %key.word, enabled, "flag changed");
        }
        Ok(())
    }

    pub fn has_flag(&self, kind: FlagKind, key: &WordKey) -> Result<bool> {
        Ok(self.flags(kind)?.contains(&key.encode()))
    }

    pub fn is_favorite(&self, key: &WordKey) -> Result<bool> {
        self.has_flag(FlagKind::Favorite, key)
    }

    pub fn is_learned(&self, key: &WordKey) -> Result<bool> {
        self.has_flag(FlagKind::Learned, key)
    }

    pub fn is_required(&self, key: &WordKey) -> Result<bool> {
        self.has_flag(FlagKind::Required, key)
    }

    /// Stored words carrying a flag. Orphaned flags are skipped.
    pub fn flagged(&self, kind: FlagKind) -> Result<Vec<StoredWord>> {
        let flags = self.flags(kind)?;
        Ok(self
            .all()?
            .into_iter()
            .filter(|w| flags.contains(&w.key().encode()))
            .collect())
    }

    /// Top up a part of speech to `target` distinct words from the seed deck.
    pub fn autofill(&self, pos: PartOfSpeech, target: usize) -> Result<usize> {
        let mut words = self.all()?;
        let mut present: HashSet<String> = words
            .iter()
            .filter(|w| w.pos == pos)
            .map(|w| normalize_word(&w.word))
            .collect();

        let mut added = 0;
        for (word, meaning) in seed_words(pos) {
            if present.len() >= target {
                break;
            }
            if present.insert(normalize_word(word)) {
                words.push(StoredWord::new(word, meaning, pos));
                added += 1;
            }
        }

        if added > 0 {
            self.save_all(&words)?;
            info!(%pos, added, target, "autofilled words");
        }
        Ok(added)
    }

    fn flags(&self, kind: FlagKind) -> Result<BTreeSet<String>> {
        Ok(self.kv.get_json(flag_key(kind))?.unwrap_or_default())
    }

    fn save_flags(&self, kind: FlagKind, flags: &BTreeSet<String>) -> Result<()> {
        self.kv.set_json(flag_key(kind), flags)
    }

    fn rekey_flags(&self, old: &WordKey, new: &WordKey) -> Result<()> {
        if old == new {
            return Ok(());
        }
        let (old, new) = (old.encode(), new.encode());
        for kind in FlagKind::ALL {
            let mut flags = self.flags(kind)?;
            if flags.remove(&old) {
                flags.insert(new.clone());
                self.save_flags(kind, &flags)?;
            }
        }
        Ok(())
    }
}

fn flag_key(kind: FlagKind) -> &'static str {
    match kind {
        FlagKind::Favorite => keys::FAVORITES,
        FlagKind::Learned => keys::LEARNED,
        FlagKind::Required => keys::REQUIRED,
    }
}

fn insert_if_absent(
    words: &mut Vec<StoredWord>,
    word: &str,
    meaning: &str,
    pos: PartOfSpeech,
) -> Option<StoredWord> {
    let key = WordKey::new(word, meaning, pos);
    if key.word.is_empty() || words.iter().any(|w| w.key() == key) {
        return None;
    }
    let record = StoredWord::new(word, meaning, pos);
    words.push(record.clone());
    Some(record)
}

/// Records of one part of speech grouped by case-folded word. Groups are in
/// alphabetical order and each group is sorted by meaning.
fn group_by_word(words: &[StoredWord], pos: PartOfSpeech) -> Vec<Vec<&StoredWord>> {
    let mut groups: BTreeMap<String, Vec<&StoredWord>> = BTreeMap::new();
    for w in words.iter().filter(|w| w.pos == pos) {
        groups.entry(normalize_word(&w.word)).or_default().push(w);
    }
    groups
        .into_values()
        .map(|mut group| {
            group.sort_by(|a, b| a.meaning.cmp(&b.meaning));
            group
        })
        .collect()
}
