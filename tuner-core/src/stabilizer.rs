//! # Frequency Stabilizer Module
//!
//! Smooths the jittery per-frame frequency estimates from the pitch
//! analyzer into a value that is steady enough to display.
//!
//! ## Pipeline
//! - Gating: the sentinel, low-confidence frames and out-of-range
//!   frequencies clear the history and report "no signal"
//! - Median: once enough samples are buffered, the median of the
//!   history becomes the candidate frequency
//! - Hysteresis: a candidate that moves by the jump threshold or more
//!   is treated as a new note; the history restarts and the previous
//!   output is held until the new pitch settles

use crate::PitchSample;
use crate::config::StabilizerConfig;
use std::collections::VecDeque;

/// What a single [`FrequencyStabilizer::process`] call did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StabilizerStep {
    /// The sample was rejected; the output is now "no signal".
    NoSignal,
    /// The sample was buffered but there are not enough samples for a median yet.
    Settling,
    /// The median jumped to a new note. The history was restarted and the
    /// previous output is still held.
    Onset { candidate: f64 },
    /// A new stabilized frequency was emitted.
    Stable(f64),
}

/// Median filter with jump hysteresis over accepted pitch samples.
#[derive(Debug, Clone)]
pub struct FrequencyStabilizer {
    config: StabilizerConfig,
    /// Most recent accepted frequencies, oldest first
    history: VecDeque<f64>,
    /// Reused buffer for sorting the history
    scratch: Vec<f64>,
    /// Median the hysteresis compares against (None until the first median)
    last_stable: Option<f64>,
    /// Last emitted frequency (None = no signal)
    output: Option<f64>,
}

impl Default for FrequencyStabilizer {
    fn default() -> Self {
        Self::new(StabilizerConfig::default())
    }
}

impl FrequencyStabilizer {
    pub fn new(config: StabilizerConfig) -> Self {
        let capacity = config.history_len.max(1);
        Self {
            config,
            history: VecDeque::with_capacity(capacity),
            scratch: Vec::with_capacity(capacity),
            last_stable: None,
            output: None,
        }
    }

    pub fn config(&self) -> &StabilizerConfig {
        &self.config
    }

    /// Feeds one analyzer frame through the filter.
    pub fn process(&mut self, sample: PitchSample) -> StabilizerStep {
        if !self.accepts(&sample) {
            log::trace!(
                "Rejected sample {:.2} Hz at confidence {:.2}",
                sample.frequency,
                sample.confidence
            );
            self.history.clear();
            self.output = None;
            return StabilizerStep::NoSignal;
        }

        self.history.push_back(sample.frequency);
        while self.history.len() > self.config.history_len.max(1) {
            self.history.pop_front();
        }

        if self.history.len() < self.config.min_history.max(1) {
            return StabilizerStep::Settling;
        }

        let candidate = self.median();
        match self.last_stable {
            Some(last) if (candidate - last).abs() >= self.config.jump_threshold_hz => {
                log::debug!("Pitch jumped {last:.2} Hz -> {candidate:.2} Hz, restarting history");
                self.history.clear();
                self.last_stable = Some(candidate);
                StabilizerStep::Onset { candidate }
            }
            _ => {
                self.last_stable = Some(candidate);
                self.output = Some(candidate);
                StabilizerStep::Stable(candidate)
            }
        }
    }

    /// The last emitted stabilized frequency, or `None` for "no signal".
    pub fn output(&self) -> Option<f64> {
        self.output
    }

    /// The median the next candidate is compared against.
    pub fn last_stable(&self) -> Option<f64> {
        self.last_stable
    }

    /// Number of samples currently buffered.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Discards all state so the next sample starts a fresh session.
    pub fn reset(&mut self) {
        self.history.clear();
        self.last_stable = None;
        self.output = None;
    }

    fn accepts(&self, sample: &PitchSample) -> bool {
        // Every comparison is false for NaN
        sample.has_pitch()
            && sample.confidence >= self.config.min_confidence
            && sample.frequency >= self.config.min_frequency
            && sample.frequency <= self.config.max_frequency
    }

    /// Upper median of the history (index `len / 2` of the sorted copy).
    fn median(&mut self) -> f64 {
        self.scratch.clear();
        self.scratch.extend(self.history.iter().copied());
        self.scratch.sort_by(f64::total_cmp);
        self.scratch[self.scratch.len() / 2]
    }
}
