//! Configuration parameters for the stabilizer and the tuning engine.
//!
//! Every field has a serde default so a partial JSON file only needs the
//! values it overrides.

use crate::error::TunerError;
use crate::tuning_mode::TuningMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Lowest frequency treated as a guitar note, in Hz.
pub const DEFAULT_MIN_FREQUENCY: f64 = 60.0;

/// Highest frequency treated as a guitar note, in Hz.
pub const DEFAULT_MAX_FREQUENCY: f64 = 500.0;

/// Frequency stabilizer parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizerConfig {
    /// Minimum analyzer confidence for a sample to be used (default: 0.95)
    pub min_confidence: f64,

    /// Lowest accepted frequency in Hz (default: 60.0)
    pub min_frequency: f64,

    /// Highest accepted frequency in Hz (default: 500.0)
    pub max_frequency: f64,

    /// Number of accepted samples kept for the median (default: 5)
    pub history_len: usize,

    /// Samples needed before a median is taken (default: 3)
    pub min_history: usize,

    /// Median change in Hz treated as a new note (default: 10.0)
    pub jump_threshold_hz: f64,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.95,
            min_frequency: DEFAULT_MIN_FREQUENCY,
            max_frequency: DEFAULT_MAX_FREQUENCY,
            history_len: 5,
            min_history: 3,
            jump_threshold_hz: 10.0,
        }
    }
}

/// Tuning engine parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Below this frequency the engine reports "detecting" (default: 60.0)
    pub min_frequency: f64,

    /// Above this frequency the engine reports "detecting" (default: 500.0)
    pub max_frequency: f64,

    /// Largest deviation in cents still counted as in tune (default: 5.0)
    pub in_tune_cents: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_frequency: DEFAULT_MIN_FREQUENCY,
            max_frequency: DEFAULT_MAX_FREQUENCY,
            in_tune_cents: 5.0,
        }
    }
}

/// Complete tuner configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunerConfig {
    pub stabilizer: StabilizerConfig,
    pub engine: EngineConfig,
    /// Tuning mode selected when a session is created
    pub default_mode: TuningMode,
}

fn invalid(msg: impl Into<String>) -> TunerError {
    TunerError::InvalidConfig(msg.into())
}

fn check_range(name: &str, min: f64, max: f64) -> Result<(), TunerError> {
    if !(min.is_finite() && max.is_finite()) || min <= 0.0 || min >= max {
        return Err(invalid(format!(
            "{name} frequency range must satisfy 0 < min < max, got [{min}, {max}]"
        )));
    }
    Ok(())
}

impl StabilizerConfig {
    pub fn validate(&self) -> Result<(), TunerError> {
        check_range("stabilizer", self.min_frequency, self.max_frequency)?;
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(invalid(format!(
                "min_confidence must be within [0, 1], got {}",
                self.min_confidence
            )));
        }
        if self.min_history == 0 || self.min_history > self.history_len {
            return Err(invalid(format!(
                "need 1 <= min_history <= history_len, got {} and {}",
                self.min_history, self.history_len
            )));
        }
        if !(self.jump_threshold_hz.is_finite() && self.jump_threshold_hz > 0.0) {
            return Err(invalid(format!(
                "jump_threshold_hz must be positive, got {}",
                self.jump_threshold_hz
            )));
        }
        Ok(())
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), TunerError> {
        check_range("engine", self.min_frequency, self.max_frequency)?;
        if !(self.in_tune_cents.is_finite() && self.in_tune_cents >= 0.0) {
            return Err(invalid(format!(
                "in_tune_cents must be non-negative, got {}",
                self.in_tune_cents
            )));
        }
        Ok(())
    }
}

impl TunerConfig {
    /// Checks every section.
    pub fn validate(&self) -> Result<(), TunerError> {
        self.stabilizer.validate()?;
        self.engine.validate()
    }

    /// Loads and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: TunerConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Rejected config {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Writes the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = TunerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.stabilizer.min_confidence, 0.95);
        assert_eq!(config.stabilizer.history_len, 5);
        assert_eq!(config.stabilizer.min_history, 3);
        assert_eq!(config.stabilizer.jump_threshold_hz, 10.0);
        assert_eq!(config.engine.in_tune_cents, 5.0);
        assert_eq!(config.default_mode, TuningMode::Standard);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{"default_mode": "Drop D", "engine": {"in_tune_cents": 3.0}}"#;
        let config: TunerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.default_mode, TuningMode::DropD);
        assert_eq!(config.engine.in_tune_cents, 3.0);
        assert_eq!(config.engine.min_frequency, 60.0);
        assert_eq!(config.stabilizer, StabilizerConfig::default());
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = TunerConfig::default();
        config.stabilizer.min_history = 6;
        assert!(matches!(config.validate(), Err(TunerError::InvalidConfig(_))));

        let mut config = TunerConfig::default();
        config.stabilizer.min_confidence = 1.5;
        assert!(config.validate().is_err());

        let mut config = TunerConfig::default();
        config.engine.min_frequency = 600.0;
        assert!(config.validate().is_err());

        let mut config = TunerConfig::default();
        config.stabilizer.jump_threshold_hz = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = TunerConfig::default();
        config.engine.in_tune_cents = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tuner.json");

        let mut config = TunerConfig::default();
        config.default_mode = TuningMode::OpenG;
        config.stabilizer.history_len = 7;
        config.save(&path).unwrap();

        let loaded = TunerConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tuner.json");
        std::fs::write(&path, r#"{"stabilizer": {"min_history": 0}}"#).unwrap();
        assert!(TunerConfig::load(&path).is_err());

        assert!(TunerConfig::load(dir.path().join("missing.json")).is_err());
    }
}
