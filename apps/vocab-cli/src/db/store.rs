//! SQLite-backed key-value store.

use crate::db::error::DbError;
use crate::db::schema::{SCHEMA, SCHEMA_VERSION};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use vocab_core::KeyValueStore;

type Result<T> = std::result::Result<T, DbError>;

/// SQLite implementation of [`KeyValueStore`].
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open database at path, creating if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize()?;
        Ok(store)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(SCHEMA)?;
        conn.execute(
            "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::Poisoned)
    }

    pub fn schema_version(&self) -> Result<i32> {
        self.conn()?
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .map_err(Into::into)
    }

    /// All stored keys, sorted.
    pub fn keys(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        self.conn()?
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(Into::into)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn()?.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.conn()?
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> vocab_core::Result<Option<String>> {
        Ok(self.read(key)?)
    }

    fn set(&self, key: &str, value: &str) -> vocab_core::Result<()> {
        Ok(self.write(key, value)?)
    }

    fn remove(&self, key: &str) -> vocab_core::Result<()> {
        Ok(self.delete(key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocab_core::KeyValueExt;

    #[test]
    fn set_then_get() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set("homework.pair", "1").unwrap();
        assert_eq!(store.get("homework.pair").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn set_overwrites() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set_json("homework.cycle_index", &3u32).unwrap();
        store.set_json("homework.cycle_index", &4u32).unwrap();
        let value: Option<u32> = store.get_json("homework.cycle_index").unwrap();
        assert_eq!(value, Some(4));
        assert_eq!(store.keys().unwrap(), vec!["homework.cycle_index".to_string()]);
    }

    #[test]
    fn remove_missing_key_is_ok() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.remove("nothing").unwrap();
        assert_eq!(store.get("nothing").unwrap(), None);
    }

    #[test]
    fn schema_version_recorded() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);
    }
}
