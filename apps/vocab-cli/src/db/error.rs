//! Database error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("database lock poisoned")]
    Poisoned,
}

impl From<DbError> for vocab_core::StoreError {
    fn from(e: DbError) -> Self {
        vocab_core::StoreError::Backend(e.to_string())
    }
}
