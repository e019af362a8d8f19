use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use bevy::prelude::*;
use crossbeam_channel::Receiver;
use memory_ascension::console::ConsoleReply;
use memory_ascension::core::DEFAULT_TICK_MILLIS;
use memory_ascension::save::SaveStorage;
use memory_ascension::Simulation;
use serde::Deserialize;

pub const DEFAULT_SAVE_FILE: &str = "memory_ascension_save.json";

#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub tick_hz: f32,
    pub auto_save_interval_seconds: f32,
    pub frame_hz: f64,
    pub save_path: PathBuf,
    /// Directory holding upgrades/programs/parts JSON; the bundled tables are
    /// used when unset.
    pub data_dir: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_hz: 1000.0 / DEFAULT_TICK_MILLIS as f32,
            auto_save_interval_seconds: 3.0,
            frame_hz: 60.0,
            save_path: PathBuf::from(DEFAULT_SAVE_FILE),
            data_dir: None,
        }
    }
}

impl RuntimeConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).context("failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.tick_hz.is_finite() && self.tick_hz > 0.0,
            "tick_hz must be positive, got {}",
            self.tick_hz
        );
        ensure!(
            self.frame_hz.is_finite() && self.frame_hz > 0.0,
            "frame_hz must be positive, got {}",
            self.frame_hz
        );
        ensure!(
            self.auto_save_interval_seconds.is_finite(),
            "auto_save_interval_seconds must be finite"
        );
        Ok(())
    }

    /// Seconds per simulation tick, at most one second and at least 10 ms.
    pub fn tick_seconds(&self) -> f32 {
        if self.tick_hz.is_finite() && self.tick_hz > 0.0 {
            (1.0 / self.tick_hz).clamp(0.01, 1.0)
        } else {
            DEFAULT_TICK_MILLIS as f32 / 1000.0
        }
    }

    pub fn tick_millis(&self) -> u64 {
        (self.tick_seconds() * 1000.0).round() as u64
    }

    pub fn frame_seconds(&self) -> f64 {
        if self.frame_hz.is_finite() && self.frame_hz > 0.0 {
            (1.0 / self.frame_hz).clamp(0.001, 1.0)
        } else {
            1.0 / 60.0
        }
    }
}

#[derive(Resource)]
pub struct SessionState {
    pub simulation: Simulation,
    pub storage: Box<dyn SaveStorage>,
    pub tick_timer: Timer,
    pub autosave_timer: Timer,
    pub last_save_error: Option<String>,
}

/// Lines typed on stdin, fed by a reader thread.
#[derive(Resource, Debug)]
pub struct ConsoleInput {
    pub lines: Receiver<String>,
    pub closed: bool,
}

#[derive(Event, Debug, Clone)]
pub struct ConsoleOutput(pub ConsoleReply);

#[cfg(test)]
mod tests {
    use super::RuntimeConfig;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = RuntimeConfig::from_json_str(r#"{"tick_hz": 20}"#).expect("config");

        assert_eq!(config.tick_millis(), 50);
        assert_eq!(config.auto_save_interval_seconds, 3.0);
        assert_eq!(config.data_dir, None);
    }

    #[test]
    fn non_positive_rates_are_rejected() {
        assert!(RuntimeConfig::from_json_str(r#"{"tick_hz": 0}"#).is_err());
        assert!(RuntimeConfig::from_json_str(r#"{"tick_hz": -5}"#).is_err());
        assert!(RuntimeConfig::from_json_str(r#"{"frame_hz": 0}"#).is_err());
    }

    #[test]
    fn timer_periods_stay_finite() {
        let config = RuntimeConfig {
            tick_hz: 0.0,
            frame_hz: 0.0,
            ..RuntimeConfig::default()
        };

        assert_eq!(config.tick_millis(), 100);
        assert!(config.frame_seconds().is_finite());
    }
}
