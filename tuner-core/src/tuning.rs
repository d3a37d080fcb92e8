//! # Musical Tuning Module
//!
//! Pure frequency/note arithmetic for the 12-tone equal-tempered scale,
//! referenced to A4 = 440 Hz (MIDI note 69).
//!
//! ## Features
//! - Frequency to note name and octave conversion
//! - Nearest equal-tempered semitone frequency
//! - Cent deviation between two frequencies

use serde::Serialize;
use std::fmt;

/// Reference pitch for A4 in Hz.
pub const A4_FREQUENCY: f64 = 440.0;

/// MIDI note number of A4.
pub const A4_MIDI: i32 = 69;

/// Chromatic scale starting from C.
const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Represents a single detected musical note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Note {
    /// Pitch class name (e.g., "A", "C#"), or "?" when nothing was detected
    pub name: &'static str,
    /// Scientific pitch octave (A4 = 440 Hz)
    pub octave: i32,
    /// The frequency the note was derived from, in Hz
    pub frequency: f64,
}

impl Note {
    /// The "no detection" note.
    pub const UNDETECTED: Note = Note {
        name: "?",
        octave: 0,
        frequency: 0.0,
    };

    /// Returns true unless this is the [`Note::UNDETECTED`] sentinel.
    pub fn is_detected(&self) -> bool {
        self.name != Self::UNDETECTED.name
    }

    /// Note name with octave, e.g. "E2".
    pub fn display_name(&self) -> String {
        format!("{}{}", self.name, self.octave)
    }
}

impl Default for Note {
    fn default() -> Self {
        Self::UNDETECTED
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.octave)
    }
}

/// Fractional MIDI note number for a positive, finite frequency.
fn midi_position(freq: f64) -> f64 {
    12.0 * (freq / A4_FREQUENCY).log2() + A4_MIDI as f64
}

fn is_usable(freq: f64) -> bool {
    freq.is_finite() && freq > 0.0
}

/// Converts a frequency to the note it falls in.
///
/// The MIDI position is truncated, not rounded, so a slightly flat E2
/// reads as D#2. The input frequency is kept unchanged on the returned note.
///
/// # Arguments
/// * `freq` - Frequency in Hz
///
/// # Returns
/// * The note, or [`Note::UNDETECTED`] for non-positive or non-finite input
pub fn note_from_frequency(freq: f64) -> Note {
    if !is_usable(freq) {
        return Note::UNDETECTED;
    }

    let note_number = (midi_position(freq).trunc() as i32).clamp(0, 127);
    let octave = note_number / 12 - 1;
    let name = NOTE_NAMES[(note_number % 12) as usize];

    Note {
        name,
        octave,
        frequency: freq,
    }
}

/// Finds the equal-tempered semitone frequency closest to `freq`.
///
/// Unlike [`note_from_frequency`] the MIDI position is rounded to the
/// nearest semitone before converting back: f = 440 * 2^((n - 69) / 12).
///
/// # Returns
/// * `Some(frequency)` - Nearest semitone frequency, MIDI range 0-127
/// * `None` - Input was non-positive or non-finite
pub fn closest_equal_tempered_frequency(freq: f64) -> Option<f64> {
    if !is_usable(freq) {
        return None;
    }

    let closest_midi = (midi_position(freq).round() as i32).clamp(0, 127);
    Some(A4_FREQUENCY * 2.0_f64.powf((closest_midi - A4_MIDI) as f64 / 12.0))
}

/// Calculates the deviation from a target frequency in cents.
///
/// - 100 cents = 1 semitone
/// - 1200 cents = 1 octave
/// - Positive values indicate sharpness, negative values indicate flatness
///
/// # Returns
/// * Cent deviation, or 0.0 if either frequency is not a positive finite value
pub fn calculate_cents_deviation(freq: f64, target_freq: f64) -> f64 {
    if !is_usable(freq) || !is_usable(target_freq) {
        return 0.0;
    }
    1200.0 * (freq / target_freq).log2()
}
