//! TOML-based application configuration.
//!
//! Holds the tunables of the core:
//! - Duration bounds enforced by the task creation interface
//! - Countdown tick interval
//! - Nudge probability, sampling cadence and optional RNG seed
//! - Daily focus goal
//!
//! Configuration is stored at `~/.config/deepwork/config.toml`. Only
//! configuration is read from disk; tasks, sessions and stats live for the
//! process lifetime.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ValidationError};

/// Longest accepted countdown tick (one day).
pub const MAX_TICK_INTERVAL_MS: u64 = 86_400_000;
/// Longest accepted nudge sampling window (one day).
pub const MAX_SAMPLE_INTERVAL_SECS: u64 = 86_400;

/// Soft bounds for task creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TasksConfig {
    #[serde(default = "default_min_duration")]
    pub min_duration_minutes: u32,
    #[serde(default = "default_max_duration")]
    pub max_duration_minutes: u32,
    #[serde(default = "default_duration")]
    pub default_duration_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Wall-clock period of one countdown tick.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NudgeConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Chance of firing per evaluation window when the calendar is free.
    #[serde(default = "default_nudge_probability")]
    pub probability: f64,
    #[serde(default = "default_sample_interval_secs")]
    pub sample_interval_secs: u64,
    /// Fixed seed for reproducible nudges. Entropy when unset.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsConfig {
    #[serde(default = "default_focus_goal")]
    pub daily_focus_goal_minutes: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/deepwork/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub tasks: TasksConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub nudge: NudgeConfig,
    #[serde(default)]
    pub stats: StatsConfig,
}

// Default functions
fn default_min_duration() -> u32 {
    20
}
fn default_max_duration() -> u32 {
    60
}
fn default_duration() -> u32 {
    30
}
fn default_tick_interval_ms() -> u64 {
    1000
}
fn default_true() -> bool {
    true
}
fn default_nudge_probability() -> f64 {
    0.3
}
fn default_sample_interval_secs() -> u64 {
    15
}
fn default_focus_goal() -> u32 {
    240
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            min_duration_minutes: default_min_duration(),
            max_duration_minutes: default_max_duration(),
            default_duration_minutes: default_duration(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Default for NudgeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            probability: default_nudge_probability(),
            sample_interval_secs: default_sample_interval_secs(),
            seed: None,
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            daily_focus_goal_minutes: default_focus_goal(),
        }
    }
}

impl TasksConfig {
    /// Check a duration against the creation bounds.
    pub fn check_duration(&self, minutes: u32) -> Result<(), ValidationError> {
        if !(self.min_duration_minutes..=self.max_duration_minutes).contains(&minutes) {
            return Err(ValidationError::DurationOutOfRange {
                minutes,
                min: self.min_duration_minutes,
                max: self.max_duration_minutes,
            });
        }
        Ok(())
    }
}

/// Returns `~/.config/deepwork[-dev]/` based on DEEPWORK_ENV.
///
/// Set DEEPWORK_ENV=dev to use the development directory. The directory is
/// not created here.
pub fn config_dir() -> PathBuf {
    let base_dir = dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));

    let env = std::env::var("DEEPWORK_ENV").unwrap_or_else(|_| "production".to_string());
    if env == "dev" {
        base_dir.join("deepwork-dev")
    } else {
        base_dir.join("deepwork")
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
        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let (parent, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }
        let mut current = root;
        if let Some(parent) = parent {
            for part in parent.split('.') {
                current = current.get_mut(part).ok_or_else(unknown)?;
            }
        }
        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|e| invalid(e.to_string()))?,
            ),
            serde_json::Value::Number(_) => parse_number(value).ok_or_else(|| {
                invalid(format!("cannot parse '{value}' as number"))
            })?,
            // Optional fields: "none" clears, anything else must be a number.
            serde_json::Value::Null => match value {
                "" | "none" => serde_json::Value::Null,
                _ => parse_number(value)
                    .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?,
            },
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                return Err(invalid("cannot replace a whole section".into()));
            }
            serde_json::Value::String(_) => serde_json::Value::String(value.into()),
        };
        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    pub fn path() -> PathBuf {
        config_dir().join("config.toml")
    }

    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from the default location, or defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or
    /// parsed, or if it holds invalid values.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path())
    }

    /// Load from `path`, or defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Write to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key, typed by the current value.
    ///
    /// The change is validated before it is applied; on error `self` is
    /// unchanged. Does not write to disk.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };
        let t = &self.tasks;
        if t.min_duration_minutes > t.max_duration_minutes {
            return Err(invalid(
                "tasks.min_duration_minutes",
                "must not exceed tasks.max_duration_minutes",
            ));
        }
        if t.check_duration(t.default_duration_minutes).is_err() {
            return Err(invalid(
                "tasks.default_duration_minutes",
                "must lie within the min/max duration bounds",
            ));
        }
        if !(1..=MAX_TICK_INTERVAL_MS).contains(&self.session.tick_interval_ms) {
            return Err(invalid(
                "session.tick_interval_ms",
                "must be between 1 and 86400000",
            ));
        }
        if !(0.0..=1.0).contains(&self.nudge.probability) {
            return Err(invalid("nudge.probability", "must be between 0 and 1"));
        }
        if !(1..=MAX_SAMPLE_INTERVAL_SECS).contains(&self.nudge.sample_interval_secs) {
            return Err(invalid(
                "nudge.sample_interval_secs",
                "must be between 1 and 86400",
            ));
        }
        Ok(())
    }
}

fn parse_number(value: &str) -> Option<serde_json::Value> {
    if let Ok(n) = value.parse::<u64>() {
        return Some(serde_json::Value::Number(n.into()));
    }
    value
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(serde_json::Value::Number)
}
