//! Typed persistence of session fields on top of a [`KvStore`].
//!
//! Values are stored as plain strings so the layout stays readable from
//! any SQLite shell. The running flag is written under one canonical key;
//! the older `isFasting` key is only read, when the canonical one is absent.

use tracing::{debug, warn};

use super::kv::KvStore;
use crate::error::Result;
use crate::session::PersistedSession;

pub const KEY_START_TIME: &str = "fast_start_time";
pub const KEY_IS_FASTING: &str = "fast_is_fasting";
pub const KEY_LEGACY_IS_FASTING: &str = "isFasting";
pub const KEY_TARGET_HOURS: &str = "fast_target_hours";
pub const KEY_FROZEN_ELAPSED: &str = "fast_frozen_elapsed_ms";

#[derive(Debug)]
pub struct SessionStore<S> {
    kv: S,
}

impl<S: KvStore> SessionStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    /// Read all session fields once. Missing or unreadable values fall back
    /// field by field: paused, no start instant, `default_target_hours`.
    ///
    /// # Errors
    /// Only store failures are errors; corrupt values are not.
    pub fn load(&self, default_target_hours: u32) -> Result<PersistedSession> {
        let running = match self.kv.get(KEY_IS_FASTING)? {
            Some(v) => parse_bool(KEY_IS_FASTING, &v),
            None => self
                .kv
                .get(KEY_LEGACY_IS_FASTING)?
                .and_then(|v| parse_bool(KEY_LEGACY_IS_FASTING, &v)),
        }
        .unwrap_or(false);

        let start_ms = self
            .kv
            .get(KEY_START_TIME)?
            .and_then(|v| parse_number::<i64>(KEY_START_TIME, &v));

        let target_hours = self
            .kv
            .get(KEY_TARGET_HOURS)?
            .and_then(|v| parse_number::<u32>(KEY_TARGET_HOURS, &v))
            .filter(|h| *h >= 1)
            .unwrap_or_else(|| default_target_hours.max(1));

        let frozen_elapsed_ms = self
            .kv
            .get(KEY_FROZEN_ELAPSED)?
            .and_then(|v| parse_number::<u64>(KEY_FROZEN_ELAPSED, &v))
            .unwrap_or(0);

        let persisted = PersistedSession {
            running,
            start_ms,
            target_hours,
            frozen_elapsed_ms,
        };
        debug!(?persisted, "session state loaded");
        Ok(persisted)
    }

    /// Write every field.
    ///
    /// # Errors
    /// Returns an error if the underlying store fails.
    pub fn save(&self, session: &PersistedSession) -> Result<()> {
        self.save_running(session.running)?;
        if let Some(start) = session.start_ms {
            self.save_start(start)?;
        }
        self.save_target(session.target_hours)?;
        self.save_frozen_elapsed(session.frozen_elapsed_ms)
    }

    /// Write only the fields that differ between `before` and `after`.
    ///
    /// Pausing always writes the frozen elapsed value: ticks move it in
    /// memory without persisting, so `before` can already hold it.
    ///
    /// # Errors
    /// Returns an error if the underlying store fails.
    pub fn save_changes(&self, before: &PersistedSession, after: &PersistedSession) -> Result<()> {
        if before.running != after.running {
            self.save_running(after.running)?;
        }
        if before.start_ms != after.start_ms {
            if let Some(start) = after.start_ms {
                self.save_start(start)?;
            }
        }
        if before.target_hours != after.target_hours {
            self.save_target(after.target_hours)?;
        }
        let paused = before.running && !after.running;
        if paused || before.frozen_elapsed_ms != after.frozen_elapsed_ms {
            self.save_frozen_elapsed(after.frozen_elapsed_ms)?;
        }
        Ok(())
    }

    pub fn save_running(&self, running: bool) -> Result<()> {
        self.kv.set(KEY_IS_FASTING, if running { "true" } else { "false" })
    }

    pub fn save_start(&self, start_ms: i64) -> Result<()> {
        self.kv.set(KEY_START_TIME, &start_ms.to_string())
    }

    pub fn save_target(&self, target_hours: u32) -> Result<()> {
        self.kv.set(KEY_TARGET_HOURS, &target_hours.to_string())
    }

    pub fn save_frozen_elapsed(&self, elapsed_ms: u64) -> Result<()> {
        self.kv.set(KEY_FROZEN_ELAPSED, &elapsed_ms.to_string())
    }
}

fn parse_bool(key: &str, value: &str) -> Option<bool> {
    match value.trim() {
        "true" => Some(true),
        "false" => Some(false),
        other => {
            warn!(key, value = other, "ignoring corrupt persisted flag");
            None
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Option<T> {
    match value.trim().parse::<T>() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(key, value, "ignoring corrupt persisted number");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Database, MemoryStore};

    #[test]
    fn empty_store_yields_defaults() {
        let store = SessionStore::new(MemoryStore::new());
        let loaded = store.load(18).unwrap();
        assert_eq!(loaded, PersistedSession::default());
    }

    #[test]
    fn round_trip_through_sqlite() {
        let store = SessionStore::new(Database::open_memory().unwrap());
        let session = PersistedSession {
            running: true,
            start_ms: Some(1_700_000_000_000),
            target_hours: 20,
            frozen_elapsed_ms: 12_345,
        };
        store.save(&session).unwrap();
        assert_eq!(store.load(18).unwrap(), session);
    }

    #[test]
    fn running_flag_uses_single_canonical_key() {
        let kv = MemoryStore::new();
        let store = SessionStore::new(&kv);
        store.save_running(true).unwrap();
        assert_eq!(kv.get(KEY_IS_FASTING).unwrap().as_deref(), Some("true"));
        assert!(kv.get(KEY_LEGACY_IS_FASTING).unwrap().is_none());
    }

    #[test]
    fn legacy_flag_is_read_when_canonical_missing() {
        let kv = MemoryStore::new();
        kv.set(KEY_LEGACY_IS_FASTING, "true").unwrap();
        let store = SessionStore::new(&kv);
        assert!(store.load(18).unwrap().running);

        kv.set(KEY_IS_FASTING, "false").unwrap();
        assert!(!store.load(18).unwrap().running);
    }

    #[test]
    fn corrupt_values_fall_back_per_field() {
        let kv = MemoryStore::new();
        kv.set(KEY_IS_FASTING, "yes").unwrap();
        kv.set(KEY_START_TIME, "not-a-number").unwrap();
        kv.set(KEY_TARGET_HOURS, "0").unwrap();
        kv.set(KEY_FROZEN_ELAPSED, "-4").unwrap();
        let loaded = SessionStore::new(&kv).load(16).unwrap();
        assert_eq!(
            loaded,
            PersistedSession {
                running: false,
                start_ms: None,
                target_hours: 16,
                frozen_elapsed_ms: 0,
            }
        );
    }

    #[test]
    fn save_changes_writes_only_diffs() {
        let kv = MemoryStore::new();
        let store = SessionStore::new(&kv);
        let before = PersistedSession::default();
        let after = PersistedSession {
            target_hours: 24,
            ..before.clone()
        };
        store.save_changes(&before, &after).unwrap();
        assert_eq!(kv.get(KEY_TARGET_HOURS).unwrap().as_deref(), Some("24"));
        assert!(kv.get(KEY_IS_FASTING).unwrap().is_none());
        assert!(kv.get(KEY_START_TIME).unwrap().is_none());
    }

    #[test]
    fn pausing_writes_frozen_elapsed_even_when_unchanged() {
        let kv = MemoryStore::new();
        let store = SessionStore::new(&kv);
        let before = PersistedSession {
            running: true,
            start_ms: Some(1_700_000_000_000),
            target_hours: 18,
            frozen_elapsed_ms: 5 * 3_600_000,
        };
        let after = PersistedSession {
            running: false,
            ..before.clone()
        };
        store.save_changes(&before, &after).unwrap();
        assert_eq!(kv.get(KEY_IS_FASTING).unwrap().as_deref(), Some("false"));
        assert_eq!(
            kv.get(KEY_FROZEN_ELAPSED).unwrap().as_deref(),
            Some("18000000")
        );
        assert_eq!(store.load(18).unwrap().frozen_elapsed_ms, 5 * 3_600_000);
    }
}
