//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Default target length for new fasts
//! - Timebase period for live displays
//! - Display toggles
//! - An optional custom phase table
//!
//! Configuration is stored at `~/.config/fastroom/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::phase::{PhaseDefinition, PhaseTable};
use crate::session::DEFAULT_TARGET_HOURS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Target used when the store holds none.
    #[serde(default = "default_target_hours")]
    pub default_target_hours: u32,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub show_description: bool,
    #[serde(default = "default_true")]
    pub show_next_phase: bool,
    #[serde(default = "default_true")]
    pub clock_24h: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    /// Replaces the built-in phases when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_phases: Option<Vec<PhaseDefinition>>,
}

fn default_target_hours() -> u32 {
    DEFAULT_TARGET_HOURS
}
fn default_tick_interval_ms() -> u64 {
    1000
}
fn default_true() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_target_hours: default_target_hours(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_description: true,
            show_next_phase: true,
            clock_24h: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            display: DisplayConfig::default(),
            custom_phases: None,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }
        key.split('.').try_fold(root, |current, part| current.get(part))
    }

    fn set_json_value_by_path(root: &mut serde_json::Value, key: &str, value: &str) -> Result<()> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let (parent_path, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown().into());
        }

        let mut parent = root;
        if let Some(path) = parent_path {
            for part in path.split('.') {
                parent = parent.get_mut(part).ok_or_else(unknown)?;
            }
        }

        let obj = parent.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|e| invalid(e.to_string()))?,
            ),
            serde_json::Value::Number(_) => {
                let n = value
                    .parse::<u64>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?;
                serde_json::Value::Number(n.into())
            }
            serde_json::Value::String(_) => serde_json::Value::String(value.into()),
            _ => serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?,
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            warn!(error = %e, "falling back to default configuration");
            Self::default()
        })
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Reject values the session cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending key.
    pub fn validate(&self) -> Result<()> {
        if self.session.default_target_hours < 1 {
            return Err(ConfigError::InvalidValue {
                key: "session.default_target_hours".into(),
                message: "must be at least 1".into(),
            }
            .into());
        }
        if self.session.tick_interval_ms < 100 {
            return Err(ConfigError::InvalidValue {
                key: "session.tick_interval_ms".into(),
                message: "must be at least 100".into(),
            }
            .into());
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a value by dot-separated key and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply(key, value)?;
        self.save()
    }

    /// The phase table to run with: the custom one when present and valid,
    /// otherwise the built-in table.
    pub fn phase_table(&self) -> PhaseTable {
        match &self.custom_phases {
            Some(phases) => PhaseTable::new(phases.clone()).unwrap_or_else(|e| {
                warn!(error = %e, "custom phase table rejected, using built-in phases");
                PhaseTable::standard()
            }),
            None => PhaseTable::standard(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::PhaseIcon;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let parsed: Config = toml::from_str("[display]\nshow_description = false\n").unwrap();
        assert_eq!(parsed.session.default_target_hours, 18);
        assert!(!parsed.display.show_description);
        assert!(parsed.display.show_next_phase);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("session.default_target_hours").as_deref(), Some("18"));
        assert_eq!(cfg.get("display.clock_24h").as_deref(), Some("true"));
        assert!(cfg.get("display.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn apply_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.apply("session.default_target_hours", "16").unwrap();
        cfg.apply("display.show_next_phase", "false").unwrap();
        assert_eq!(cfg.session.default_target_hours, 16);
        assert!(!cfg.display.show_next_phase);
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.apply("display.nonexistent", "1").unwrap_err();
        assert!(matches!(
            err,
            crate::error::CoreError::Config(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn apply_rejects_invalid_type_and_range() {
        let mut cfg = Config::default();
        assert!(cfg.apply("display.clock_24h", "sometimes").is_err());
        assert!(cfg.apply("session.default_target_hours", "0").is_err());
        assert!(cfg.apply("session.default_target_hours", "-3").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn load_from_reports_parse_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "session = 3").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn custom_phases_round_trip_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config {
            custom_phases: Some(vec![
                PhaseDefinition::new("Fed", "", 0, PhaseIcon::Leaf),
                PhaseDefinition::new("Fasted", "", 8, PhaseIcon::Flame),
            ]),
            ..Config::default()
        };
        cfg.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
        assert_eq!(loaded.phase_table().len(), 2);
    }

    #[test]
    fn invalid_custom_phases_fall_back_to_standard() {
        let cfg = Config {
            custom_phases: Some(vec![PhaseDefinition::new("Late", "", 3, PhaseIcon::Zap)]),
            ..Config::default()
        };
        assert_eq!(cfg.phase_table(), PhaseTable::standard());
    }
}
