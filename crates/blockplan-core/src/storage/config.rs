//! TOML-based application configuration.
//!
//! Stores planning preferences including:
//! - Working-day bounds and where sequential packing starts
//! - Duration heuristics
//! - Diagnostics thresholds
//! - Plan-section trigger phrases
//!
//! Configuration is stored at `~/.config/blockplan/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, ValidationError};
use crate::plan::DEFAULT_TRIGGER_PHRASES;
use crate::planner::PlannerConfig;
use crate::scheduler::DurationConfig;
use crate::timeline::parse_clock;

/// Working-day configuration, times as `HH:MM`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayConfig {
    #[serde(default = "default_day_start")]
    pub start: String,
    #[serde(default = "default_day_end")]
    pub end: String,
    #[serde(default = "default_sequential_start")]
    pub sequential_start: String,
}

/// Diagnostics configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Warn about idle gaps longer than this many minutes; 0 disables.
    #[serde(default)]
    pub gap_warning_minutes: u32,
}

/// Plan-section extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default = "default_trigger_phrases")]
    pub trigger_phrases: Vec<String>,
    #[serde(default)]
    pub ignore_phrases: Vec<String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/blockplan/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub day: DayConfig,
    #[serde(default)]
    pub durations: DurationConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

fn default_day_start() -> String {
    "00:00".into()
}
fn default_day_end() -> String {
    "24:00".into()
}
fn default_sequential_start() -> String {
    "08:00".into()
}
fn default_trigger_phrases() -> Vec<String> {
    DEFAULT_TRIGGER_PHRASES.iter().map(|p| p.to_string()).collect()
}

impl Default for DayConfig {
    fn default() -> Self {
        Self {
            start: default_day_start(),
            end: default_day_end(),
            sequential_start: default_sequential_start(),
        }
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            trigger_phrases: default_trigger_phrases(),
            ignore_phrases: Vec::new(),
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

        if key.is_empty() {
            return Err(unknown());
        }

        let mut parts = key.split('.').peekable();
        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default config file location.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/blockplan"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the default location, writing defaults if missing.
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults if the file does not exist.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if the
    /// default config cannot be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`, creating parent directories.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| failed(e.to_string()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| failed(e.to_string()))
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

    /// Set a config value by dot-separated key, keeping the value's type.
    ///
    /// Changes are in memory only; call [`Config::save_to`] to persist.
    ///
    /// # Errors
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the updated config no longer converts to planner settings.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.to_planner_config()?;
        *self = updated;
        Ok(())
    }

    /// Convert into engine configuration.
    ///
    /// # Errors
    /// Returns `InvalidValue` for unparseable times or an empty working day.
    pub fn to_planner_config(&self) -> Result<PlannerConfig, ConfigError> {
        let clock = |key: &str, value: &str| {
            parse_clock(value).ok_or_else(|| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("'{value}' is not a HH:MM time"),
            })
        };

        let day_start = clock("day.start", &self.day.start)?;
        let day_end = clock("day.end", &self.day.end)?;
        let sequential_start = clock("day.sequential_start", &self.day.sequential_start)?;
        if day_start >= day_end {
            return Err(ConfigError::InvalidValue {
                key: "day.end".to_string(),
                message: format!("{} is not after {}", self.day.end, self.day.start),
            });
        }

        self.durations
            .validate()
            .map_err(|e| match e {
                ValidationError::InvalidValue { field, message } => ConfigError::InvalidValue {
                    key: field,
                    message,
                },
                other => ConfigError::InvalidValue {
                    key: "durations".to_string(),
                    message: other.to_string(),
                },
            })?;

        Ok(PlannerConfig {
            day_start,
            day_end,
            sequential_start,
            durations: self.durations.clone(),
            gap_warning_minutes: self.diagnostics.gap_warning_minutes,
            trigger_phrases: self.extractor.trigger_phrases.clone(),
            ignore_phrases: self.extractor.ignore_phrases.clone(),
        })
    }
}
