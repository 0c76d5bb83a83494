mod config;
pub mod database;
mod kv;
mod session_store;

pub use config::{Config, DisplayConfig, SessionConfig};
pub use database::Database;
pub use kv::{KvStore, MemoryStore};
pub use session_store::{
    SessionStore, KEY_FROZEN_ELAPSED, KEY_IS_FASTING, KEY_LEGACY_IS_FASTING, KEY_START_TIME,
    KEY_TARGET_HOURS,
};

use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Returns `~/.config/fastroom[-dev]/` based on FASTROOM_ENV.
///
/// Set FASTROOM_ENV=dev to use the development data directory, or
/// FASTROOM_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("FASTROOM_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .ok_or_else(|| ConfigError::DataDir("home directory not found".into()))?
                .join(".config");

            let env = std::env::var("FASTROOM_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("fastroom-dev")
            } else {
                base_dir.join("fastroom")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
