//! Application state.

use crate::db::SqliteStore;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use vocab_core::{HomeworkPackStore, HomeworkStore, KeyValueStore, WordStore};

/// Services wired over one shared store.
pub struct AppState<S = SqliteStore> {
    pub store: Arc<S>,
    pub words: WordStore<S>,
    pub homework: Mutex<HomeworkStore<S>>,
    pub packs: HomeworkPackStore<S>,
}

impl<S: KeyValueStore> AppState<S> {
    pub fn new(store: S, now: DateTime<Utc>) -> vocab_core::Result<Self> {
        let store = Arc::new(store);
        let homework = HomeworkStore::open(Arc::clone(&store), now)?;
        Ok(Self {
            words: WordStore::new(Arc::clone(&store)),
            packs: HomeworkPackStore::new(Arc::clone(&store)),
            homework: Mutex::new(homework),
            store,
        })
    }
}
