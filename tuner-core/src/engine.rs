//! # Tuning Engine Module
//!
//! Maps a stabilized frequency onto the active tuning: which note it is,
//! which string it should be, how far off it is in cents and whether that
//! counts as in tune.

use crate::config::EngineConfig;
use crate::tuning::{Note, calculate_cents_deviation, note_from_frequency};
use crate::tuning_mode::{STRING_COUNT, TuningMode};
use serde::Serialize;

/// Tuning status indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TuningStatus {
    /// No clear signal
    #[default]
    Detecting,
    /// Below target (flat)
    TooLow,
    /// Within tolerance
    InTune,
    /// Above target (sharp)
    TooHigh,
}

impl TuningStatus {
    /// Classifies a deviation. `|cents| == tolerance` is still in tune.
    pub fn classify(cents: f64, tolerance: f64) -> TuningStatus {
        if cents.abs() <= tolerance {
            TuningStatus::InTune
        } else if cents < 0.0 {
            TuningStatus::TooLow
        } else {
            TuningStatus::TooHigh
        }
    }
}

/// The tuning readout for one processed frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TuningState {
    pub detected_note: Note,
    /// Frequency of the string being tuned toward, in Hz
    pub target_frequency: Option<f64>,
    /// Deviation from the target (positive = sharp)
    pub cents: f64,
    pub status: TuningStatus,
}

impl TuningState {
    /// A "detecting" readout carrying only the note for `frequency`.
    pub fn detecting(frequency: f64) -> Self {
        Self {
            detected_note: note_from_frequency(frequency),
            ..Self::default()
        }
    }
}

/// Calculates tuning state from detected frequencies.
#[derive(Debug, Clone)]
pub struct TuningEngine {
    config: EngineConfig,
    mode: TuningMode,
    /// Pinned string; only used while it indexes into the active mode
    target_string: Option<usize>,
}

impl Default for TuningEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default(), TuningMode::default())
    }
}

impl TuningEngine {
    pub fn new(config: EngineConfig, mode: TuningMode) -> Self {
        Self {
            config,
            mode,
            target_string: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Switches the active tuning. A pinned string stays pinned.
    pub fn set_tuning_mode(&mut self, mode: TuningMode) {
        self.mode = mode;
    }

    pub fn tuning_mode(&self) -> TuningMode {
        self.mode
    }

    /// Pins the string to tune. Indices outside 0-5 are kept but ignored.
    pub fn set_target_string(&mut self, index: usize) {
        self.target_string = Some(index);
    }

    /// Tune whichever string is closest.
    pub fn clear_target_string(&mut self) {
        self.target_string = None;
    }

    pub fn target_string(&self) -> Option<usize> {
        self.target_string
    }

    /// Note labels of the active tuning, lowest string first.
    pub fn target_notes(&self) -> [&'static str; STRING_COUNT] {
        self.mode.note_names()
    }

    /// Calculates the tuning state for a stabilized frequency.
    pub fn compute_state(&self, frequency: f64) -> TuningState {
        if !self.in_range(frequency) {
            return TuningState::detecting(frequency);
        }

        let target = self.target_frequency(frequency);
        let cents = calculate_cents_deviation(frequency, target);

        TuningState {
            detected_note: note_from_frequency(frequency),
            target_frequency: Some(target),
            cents,
            status: TuningStatus::classify(cents, self.config.in_tune_cents),
        }
    }

    fn in_range(&self, frequency: f64) -> bool {
        frequency >= self.config.min_frequency && frequency <= self.config.max_frequency
    }

    /// The pinned string if it is valid, else the nearest string.
    fn target_frequency(&self, frequency: f64) -> f64 {
        let strings = self.mode.strings();
        if let Some(pinned) = self.target_string.and_then(|i| strings.get(i)) {
            return pinned.frequency;
        }

        // Strict less-than: the lowest string wins exact ties
        let mut closest = strings[0].frequency;
        let mut min_diff = (frequency - closest).abs();
        for string in &strings[1..] {
            let diff = (frequency - string.frequency).abs();
            if diff < min_diff {
                min_diff = diff;
                closest = string.frequency;
            }
        }
        closest
    }
}
