//! # Tuner Session Module
//!
//! Ties one [`FrequencyStabilizer`] and one [`TuningEngine`] into the unit
//! a front end drives: start and stop listening, pick a tuning or a string,
//! and push analyzer frames through to a [`TuningState`].

use crate::PitchSample;
use crate::config::TunerConfig;
use crate::engine::{TuningEngine, TuningState};
use crate::error::TunerError;
use crate::publish::{self, LatestReceiver, LatestSender};
use crate::stabilizer::FrequencyStabilizer;
use crate::tuning_mode::{STRING_COUNT, TuningMode};

/// A listening session over a stream of analyzer frames.
///
/// Samples must arrive in the order the analyzer produced them; the
/// stabilizer's median and hysteresis depend on it.
#[derive(Debug)]
pub struct TunerSession {
    stabilizer: FrequencyStabilizer,
    engine: TuningEngine,
    listening: bool,
    state: TuningState,
    subscribers: Vec<LatestSender<TuningState>>,
}

impl Default for TunerSession {
    fn default() -> Self {
        Self::new(&TunerConfig::default())
    }
}

impl TunerSession {
    /// Creates a stopped session using `config`'s thresholds and default mode.
    pub fn new(config: &TunerConfig) -> Self {
        Self {
            stabilizer: FrequencyStabilizer::new(config.stabilizer.clone()),
            engine: TuningEngine::new(config.engine.clone(), config.default_mode),
            listening: false,
            state: TuningState::default(),
            subscribers: Vec::new(),
        }
    }

    /// Begins a fresh session. Does nothing if already listening.
    pub fn start_listening(&mut self) {
        if self.listening {
            return;
        }
        log::info!("Starting tuner session ({})", self.engine.tuning_mode());
        self.stabilizer.reset();
        self.listening = true;
    }

    /// Ends the session and drops all smoothing state. Idempotent.
    pub fn stop_listening(&mut self) {
        if !self.listening {
            return;
        }
        log::info!("Stopping tuner session");
        self.stabilizer.reset();
        self.listening = false;
        self.set_state(TuningState::default());
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Runs one analyzer frame through the stabilizer and the engine.
    ///
    /// Every frame yields a state, including frames with no usable pitch.
    /// Frames that arrive while stopped are dropped and the current state
    /// is returned unchanged.
    pub fn process(&mut self, sample: PitchSample) -> TuningState {
        if !self.listening {
            return self.state;
        }
        self.stabilizer.process(sample);
        let frequency = self.stabilizer.output().unwrap_or(0.0);
        let state = self.engine.compute_state(frequency);
        self.set_state(state);
        state
    }

    /// Switches tuning and clears any pinned string.
    pub fn select_mode(&mut self, mode: TuningMode) {
        log::debug!("Tuning mode set to {mode}");
        self.engine.set_tuning_mode(mode);
        self.engine.clear_target_string();
    }

    /// Switches tuning by name ("Drop D", "dadgad", ...).
    pub fn select_mode_by_name(&mut self, name: &str) -> Result<TuningMode, TunerError> {
        let mode = name.parse()?;
        self.select_mode(mode);
        Ok(mode)
    }

    /// Pins a string (0 = lowest) or, with `None`, tunes to the nearest one.
    pub fn select_string(&mut self, index: Option<usize>) {
        log::debug!("Target string set to {index:?}");
        match index {
            Some(index) => self.engine.set_target_string(index),
            None => self.engine.clear_target_string(),
        }
    }

    pub fn current_state(&self) -> TuningState {
        self.state
    }

    pub fn tuning_mode(&self) -> TuningMode {
        self.engine.tuning_mode()
    }

    pub fn selected_string(&self) -> Option<usize> {
        self.engine.target_string()
    }

    pub fn target_notes(&self) -> [&'static str; STRING_COUNT] {
        self.engine.target_notes()
    }

    /// Returns a receiver that always holds the newest state.
    pub fn subscribe(&mut self) -> LatestReceiver<TuningState> {
        let (tx, rx) = publish::latest();
        tx.publish(self.state);
        self.subscribers.push(tx);
        rx
    }

    /// Number of registered subscribers. A dropped receiver stays counted
    /// until the next state change prunes it.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn set_state(&mut self, state: TuningState) {
        self.state = state;
        let before = self.subscribers.len();
        self.subscribers.retain(LatestSender::is_connected);
        if self.subscribers.len() < before {
            log::debug!(
                "Dropped {} disconnected subscriber(s)",
                before - self.subscribers.len()
            );
        }
        for subscriber in &self.subscribers {
            subscriber.publish(state);
        }
    }
}
