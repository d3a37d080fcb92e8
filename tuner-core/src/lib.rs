// tuner-core/src/lib.rs

//! The core logic for the guitar tuner.
//! This crate turns per-frame pitch estimates from an external analyzer
//! into a stable tuning readout: detected note, target string, cents
//! deviation and tuning status. It does no audio capture and contains
//! no GUI code.

pub mod config;
pub mod engine;
pub mod error;
pub mod publish;
pub mod session;
pub mod stabilizer;
pub mod tuning;
pub mod tuning_mode;
pub mod worker;

pub use config::{EngineConfig, StabilizerConfig, TunerConfig};
pub use engine::{TuningEngine, TuningState, TuningStatus};
pub use error::TunerError;
pub use session::TunerSession;
pub use stabilizer::{FrequencyStabilizer, StabilizerStep};
pub use tuning::Note;
pub use tuning_mode::TuningMode;
pub use worker::SessionWorker;

use serde::{Deserialize, Serialize};

/// Frequency value the analyzer reports when it found no pitch.
pub const NO_PITCH: f64 = -1.0;

/// One frame of output from the pitch analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchSample {
    /// The estimated frequency in Hz, or [`NO_PITCH`].
    pub frequency: f64,
    /// The analyzer's confidence in the estimate (0.0 to 1.0).
    pub confidence: f64,
}

impl PitchSample {
    pub fn new(frequency: f64, confidence: f64) -> Self {
        Self {
            frequency,
            confidence,
        }
    }

    /// A frame in which the analyzer found no pitch.
    pub fn no_pitch() -> Self {
        Self::new(NO_PITCH, 0.0)
    }

    /// Returns false for the [`NO_PITCH`] sentinel.
    pub fn has_pitch(&self) -> bool {
        self.frequency != NO_PITCH
    }
}
