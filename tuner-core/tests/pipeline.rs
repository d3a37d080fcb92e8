//! End-to-end scenarios: analyzer frames in, tuning readouts out.

use approx::assert_relative_eq;
use tuner_core::{
    FrequencyStabilizer, PitchSample, StabilizerStep, TunerConfig, TunerSession, TuningEngine,
    TuningMode, TuningState, TuningStatus,
};

fn frame(freq: f64) -> PitchSample {
    PitchSample::new(freq, 0.99)
}

fn listening_session(mode: TuningMode) -> TunerSession {
    let mut session = TunerSession::new(&TunerConfig {
        default_mode: mode,
        ..TunerConfig::default()
    });
    session.start_listening();
    session
}

fn play(session: &mut TunerSession, freqs: &[f64]) -> Vec<TuningState> {
    freqs.iter().map(|&f| session.process(frame(f))).collect()
}

#[test]
fn standard_low_e_reads_in_tune() {
    let mut session = listening_session(TuningMode::Standard);
    let states = play(&mut session, &[82.41, 82.41, 82.41]);

    let state = states[2];
    assert_eq!(state.detected_note.display_name(), "E2");
    assert_eq!(state.target_frequency, Some(82.41));
    assert_eq!(state.cents, 0.0);
    assert_eq!(state.status, TuningStatus::InTune);
}

#[test]
fn drop_d_slightly_flat() {
    let mut session = listening_session(TuningMode::DropD);
    let state = play(&mut session, &[73.0, 73.0, 73.0])[2];

    assert_eq!(state.target_frequency, Some(73.42));
    assert_relative_eq!(state.cents, -9.93, epsilon = 0.01);
    assert_eq!(state.status, TuningStatus::TooLow);
}

#[test]
fn pinned_string_ignores_nearer_string() {
    let mut session = listening_session(TuningMode::Standard);
    session.select_string(Some(0));
    let state = play(&mut session, &[196.0, 196.0, 196.0])[2];

    assert_eq!(state.target_frequency, Some(82.41));
    assert_eq!(state.status, TuningStatus::TooHigh);
    assert!(state.cents > 1000.0);
}

#[test]
fn out_of_range_pin_behaves_like_no_pin() {
    let mut pinned = listening_session(TuningMode::Standard);
    pinned.select_string(Some(9));
    let mut free = listening_session(TuningMode::Standard);

    let freqs = [108.0, 108.5, 109.0, 250.0, 251.0, 249.0, 330.0];
    assert_eq!(play(&mut pinned, &freqs), play(&mut free, &freqs));
}

#[test]
fn dropout_clears_readout() {
    let mut session = listening_session(TuningMode::Standard);
    play(&mut session, &[110.0, 110.0, 110.0]);

    let state = session.process(PitchSample::new(110.0, 0.5));
    assert_eq!(state.status, TuningStatus::Detecting);
    assert_eq!(state.target_frequency, None);
    assert!(!state.detected_note.is_detected());
}

#[test]
fn string_change_holds_previous_readout() {
    let mut session = listening_session(TuningMode::Standard);
    play(&mut session, &[110.0, 110.0, 110.0]);

    // Moving from A2 to D3: two frames outvoted by the median, the onset
    // frame and two settling frames all keep showing A2.
    let states = play(&mut session, &[146.83; 6]);
    for state in &states[..5] {
        assert_eq!(state.target_frequency, Some(110.0));
        assert_eq!(state.status, TuningStatus::InTune);
    }
    assert_eq!(states[5].target_frequency, Some(146.83));
    assert_eq!(states[5].status, TuningStatus::InTune);
}

#[test]
fn stabilizer_onset_regression() {
    // Pins the hold-on-jump behavior: the step that detects the jump emits
    // nothing and restarts the history, then three agreeing frames emit.
    let mut stabilizer = FrequencyStabilizer::default();
    for _ in 0..3 {
        stabilizer.process(frame(110.0));
    }
    assert_eq!(stabilizer.output(), Some(110.0));

    let steps: Vec<_> = (0..3).map(|_| stabilizer.process(frame(150.0))).collect();
    assert_eq!(steps[2], StabilizerStep::Onset { candidate: 150.0 });
    assert_eq!(stabilizer.output(), Some(110.0));
    assert_eq!(stabilizer.history_len(), 0);

    let steps: Vec<_> = (0..3).map(|_| stabilizer.process(frame(150.0))).collect();
    assert_eq!(
        steps,
        vec![
            StabilizerStep::Settling,
            StabilizerStep::Settling,
            StabilizerStep::Stable(150.0)
        ]
    );
}

#[test]
fn out_of_range_frequencies_always_detect() {
    for mode in TuningMode::ALL {
        let mut engine = TuningEngine::default();
        engine.set_tuning_mode(mode);
        engine.set_target_string(2);
        for freq in [20.0, 59.0, 501.0, 2000.0] {
            let state = engine.compute_state(freq);
            assert_eq!(state.status, TuningStatus::Detecting);
            assert_eq!(state.target_frequency, None);
        }
    }
}

#[test]
fn every_mode_tunes_its_own_strings() {
    for mode in TuningMode::ALL {
        let engine = {
            let mut engine = TuningEngine::default();
            engine.set_tuning_mode(mode);
            engine
        };
        for string in mode.strings() {
            let state = engine.compute_state(string.frequency);
            assert_eq!(
                state.target_frequency,
                Some(string.frequency),
                "{mode} {}",
                string.label
            );
            assert_eq!(state.status, TuningStatus::InTune);
        }
    }
}
