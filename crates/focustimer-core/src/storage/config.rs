//! TOML-based application configuration.
//!
//! Holds the host-side knobs that do not belong in the settings table:
//! the scheduler tick interval and the named timer presets offered by
//! the CLI. Stored at `data_dir()/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;

/// A named focus/break duration pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub focus_minutes: u32,
    pub break_minutes: u32,
}

impl Preset {
    fn new(name: &str, focus_minutes: u32, break_minutes: u32) -> Self {
        Self {
            name: name.into(),
            focus_minutes,
            break_minutes,
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `data_dir()/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Scheduler wake-up interval for watch mode, in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_presets")]
    pub presets: Vec<Preset>,
}

fn default_tick_interval_ms() -> u64 {
    300
}

fn default_presets() -> Vec<Preset> {
    vec![
        Preset::new("Classic Pomodoro", 25, 5),
        Preset::new("Extended Focus", 50, 10),
        Preset::new("Long Session", 60, 15),
        Preset::new("Deep Work", 90, 20),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            presets: default_presets(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load the configuration, falling back to defaults when the file
    /// does not exist yet.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let text = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, text).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    pub fn find_preset(&self, name: &str) -> Option<&Preset> {
        self.presets
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_include_classic_pomodoro() {
        let config = Config::default();
        let preset = config.find_preset("classic pomodoro").unwrap();
        assert_eq!(preset.focus_minutes, 25);
        assert_eq!(preset.break_minutes, 5);
    }

    #[test]
    fn toml_round_trip() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.tick_interval_ms, 300);
        assert_eq!(parsed.presets, config.presets);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed.tick_interval_ms, 300);
        assert_eq!(parsed.presets.len(), 4);
    }
}
