//! Parsing of recorded analyzer output.
//!
//! One frame per line: `frequency confidence`, separated by whitespace or a
//! comma. `#` starts a comment and blank lines are skipped.

use anyhow::{Context, Result, anyhow};
use std::io::BufRead;
use tuner_core::PitchSample;

/// Parses a single line. Returns `Ok(None)` for blank and comment lines.
pub fn parse_line(line: &str) -> Result<Option<PitchSample>> {
    let content = line.split('#').next().unwrap_or("").trim();
    if content.is_empty() {
        return Ok(None);
    }

    let mut fields = content
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|f| !f.is_empty());
    let frequency = fields
        .next()
        .ok_or_else(|| anyhow!("missing frequency"))?
        .parse::<f64>()
        .context("invalid frequency")?;
    let confidence = fields
        .next()
        .ok_or_else(|| anyhow!("missing confidence"))?
        .parse::<f64>()
        .context("invalid confidence")?;
    if fields.next().is_some() {
        return Err(anyhow!("expected two fields"));
    }

    Ok(Some(PitchSample::new(frequency, confidence)))
}

/// Reads every frame from `reader`, in order.
pub fn read_samples(reader: impl BufRead) -> Result<Vec<PitchSample>> {
    let mut samples = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", number + 1))?;
        if let Some(sample) =
            parse_line(&line).with_context(|| format!("Bad frame on line {}", number + 1))?
        {
            samples.push(sample);
        }
    }
    Ok(samples)
}
