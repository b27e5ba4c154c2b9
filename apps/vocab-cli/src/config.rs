//! Runtime configuration from the environment.

use std::path::PathBuf;

const APP_DIR: &str = "kids-vocab";
const DEFAULT_DB_FILE: &str = "vocab.db";

/// Where the app keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub db_file: String,
}

impl AppConfig {
    /// Read `VOCAB_DATA_DIR` and `VOCAB_DB_FILE`, loading `.env` first.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_vars(
            std::env::var("VOCAB_DATA_DIR").ok(),
            std::env::var("VOCAB_DB_FILE").ok(),
        )
    }

    fn from_vars(data_dir: Option<String>, db_file: Option<String>) -> Self {
        let data_dir = data_dir
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);
        let db_file = db_file
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DB_FILE.to_string());
        Self { data_dir, db_file }
    }

    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        self
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file)
    }

    /// Default directory for exported homework packs.
    pub fn export_dir(&self) -> PathBuf {
        self.data_dir.join("exports")
    }
}

fn default_data_dir() -> PathBuf {
    // Use app data directory for production, fallback to current dir
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}
