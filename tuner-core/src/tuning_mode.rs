//! # Tuning Mode Module
//!
//! The six guitar tuning presets. Each preset lists its six open-string
//! target frequencies from the lowest string (index 0) to the highest.

use crate::error::TunerError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Number of strings in every tuning mode.
pub const STRING_COUNT: usize = 6;

/// One open string of a tuning: its target frequency and note label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetString {
    /// Target frequency in Hz
    pub frequency: f64,
    /// Note label (e.g., "E2", "F#3")
    pub label: &'static str,
}

const fn string(frequency: f64, label: &'static str) -> TargetString {
    TargetString { frequency, label }
}

const STANDARD: [TargetString; STRING_COUNT] = [
    string(82.41, "E2"),
    string(110.00, "A2"),
    string(146.83, "D3"),
    string(196.00, "G3"),
    string(246.94, "B3"),
    string(329.63, "E4"),
];

const DROP_D: [TargetString; STRING_COUNT] = [
    string(73.42, "D2"),
    string(110.00, "A2"),
    string(146.83, "D3"),
    string(196.00, "G3"),
    string(246.94, "B3"),
    string(329.63, "E4"),
];

const DROP_C: [TargetString; STRING_COUNT] = [
    string(65.41, "C2"),
    string(98.00, "G2"),
    string(130.81, "C3"),
    string(174.61, "F3"),
    string(220.00, "A3"),
    string(293.66, "D4"),
];

const OPEN_G: [TargetString; STRING_COUNT] = [
    string(73.42, "D2"),
    string(98.00, "G2"),
    string(146.83, "D3"),
    string(196.00, "G3"),
    string(246.94, "B3"),
    string(293.66, "D4"),
];

const OPEN_D: [TargetString; STRING_COUNT] = [
    string(73.42, "D2"),
    string(110.00, "A2"),
    string(146.83, "D3"),
    string(185.00, "F#3"),
    string(220.00, "A3"),
    string(293.66, "D4"),
];

const DADGAD: [TargetString; STRING_COUNT] = [
    string(73.42, "D2"),
    string(110.00, "A2"),
    string(146.83, "D3"),
    string(196.00, "G3"),
    string(220.00, "A3"),
    string(293.66, "D4"),
];

/// A guitar tuning preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TuningMode {
    #[default]
    #[serde(rename = "Standard")]
    Standard,
    #[serde(rename = "Drop D")]
    DropD,
    #[serde(rename = "Drop C")]
    DropC,
    #[serde(rename = "Open G")]
    OpenG,
    #[serde(rename = "Open D")]
    OpenD,
    #[serde(rename = "DADGAD")]
    Dadgad,
}

/// Lookup from normalized names ("dropd", "dadgad", ...) to modes.
static MODE_BY_NAME: Lazy<BTreeMap<String, TuningMode>> = Lazy::new(|| {
    TuningMode::ALL
        .iter()
        .map(|&mode| (normalize_name(mode.display_name()), mode))
        .collect()
});

/// Lowercases and drops spaces, dashes and underscores.
fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

impl TuningMode {
    /// Every mode, in menu order.
    pub const ALL: [TuningMode; 6] = [
        TuningMode::Standard,
        TuningMode::DropD,
        TuningMode::DropC,
        TuningMode::OpenG,
        TuningMode::OpenD,
        TuningMode::Dadgad,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            TuningMode::Standard => "Standard",
            TuningMode::DropD => "Drop D",
            TuningMode::DropC => "Drop C",
            TuningMode::OpenG => "Open G",
            TuningMode::OpenD => "Open D",
            TuningMode::Dadgad => "DADGAD",
        }
    }

    /// The six open strings, lowest first.
    pub fn strings(self) -> &'static [TargetString; STRING_COUNT] {
        match self {
            TuningMode::Standard => &STANDARD,
            TuningMode::DropD => &DROP_D,
            TuningMode::DropC => &DROP_C,
            TuningMode::OpenG => &OPEN_G,
            TuningMode::OpenD => &OPEN_D,
            TuningMode::Dadgad => &DADGAD,
        }
    }

    /// Target frequencies in string order.
    pub fn frequencies(self) -> [f64; STRING_COUNT] {
        let strings = *self.strings();
        strings.map(|s| s.frequency)
    }

    /// Note labels in string order.
    pub fn note_names(self) -> [&'static str; STRING_COUNT] {
        let strings = *self.strings();
        strings.map(|s| s.label)
    }

    /// Looks up a mode by name, falling back to [`TuningMode::Standard`]
    /// when nothing matches.
    pub fn from_display_name(name: &str) -> TuningMode {
        name.parse().unwrap_or_else(|_| {
            log::warn!("Unknown tuning mode {name:?}, using Standard");
            TuningMode::Standard
        })
    }
}

impl FromStr for TuningMode {
    type Err = TunerError;

    /// Case-insensitive; spaces, dashes and underscores are ignored, so
    /// "Drop D", "drop-d" and "DROP_D" all resolve to [`TuningMode::DropD`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MODE_BY_NAME
            .get(&normalize_name(s))
            .copied()
            .ok_or_else(|| TunerError::UnknownTuningMode(s.to_string()))
    }
}

impl fmt::Display for TuningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
