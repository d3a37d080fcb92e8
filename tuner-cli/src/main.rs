//! # Tuner - Command Line Host
//!
//! Replays recorded pitch-analyzer output through the tuner core and
//! prints the tuning readout.
//!
//! ## Modes
//! - **Default**: every frame is processed on the main thread and its
//!   readout printed, one line per frame
//! - **Live** (`--live`): frames are streamed to a session worker thread
//!   while the main thread polls the newest readout at a fixed interval,
//!   the way a display would

mod replay;

use anyhow::{Context, Result, anyhow, bail};
use std::fs::File;
use std::io::{self, BufReader};
use std::thread;
use std::time::Duration;
use tuner_core::{
    PitchSample, SessionWorker, TunerConfig, TunerSession, TuningMode, TuningState, TuningStatus,
};

const USAGE: &str = "\
Usage: tuner [OPTIONS] [FILE]

Reads `frequency confidence` frames from FILE (or stdin) and prints the
tuning readout for each one. A frequency of -1 means no pitch.

Options:
  --mode NAME        Tuning mode (Standard, Drop D, Drop C, Open G, Open D, DADGAD)
  --string N         Pin string N (0 = lowest)
  --config PATH      Load thresholds from a JSON config file
  --json             Print one JSON object per readout
  --live             Process on a worker thread and print only the newest readout
  --interval-ms MS   Poll interval for --live (default: 50)
  --list-modes       Print the available tunings and exit
  -h, --help         Show this help";

/// Parsed command line.
#[derive(Debug, Default)]
struct Options {
    mode: Option<TuningMode>,
    string: Option<usize>,
    config: Option<String>,
    json: bool,
    live: bool,
    interval_ms: u64,
    list_modes: bool,
    input: Option<String>,
}

fn parse_args(mut args: Vec<String>) -> Result<Option<Options>> {
    let mut options = Options {
        interval_ms: 50,
        ..Options::default()
    };

    while let Some(a) = args.first().cloned() {
        args.remove(0);
        let mut value = |flag: &str| -> Result<String> {
            if args.is_empty() {
                bail!("{flag} requires a value");
            }
            Ok(args.remove(0))
        };
        match a.as_str() {
            "--mode" => options.mode = Some(value("--mode")?.parse()?),
            "--string" => {
                let index = value("--string")?
                    .parse::<usize>()
                    .context("--string expects a string index")?;
                options.string = Some(index);
            }
            "--config" => options.config = Some(value("--config")?),
            "--json" => options.json = true,
            "--live" => options.live = true,
            "--interval-ms" => {
                options.interval_ms = value("--interval-ms")?
                    .parse::<u64>()
                    .context("--interval-ms expects milliseconds")?
                    .max(1);
            }
            "--list-modes" => options.list_modes = true,
            "--help" | "-h" => return Ok(None),
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            _ => {
                if options.input.replace(a).is_some() {
                    bail!("only one input file may be given");
                }
            }
        }
    }
    Ok(Some(options))
}

fn main() -> Result<()> {
    env_logger::init();

    let Some(options) = parse_args(std::env::args().skip(1).collect())? else {
        println!("{USAGE}");
        return Ok(());
    };

    if options.list_modes {
        for mode in TuningMode::ALL {
            let notes = mode.note_names().join(" ");
            println!("{:<10} {notes}", mode.display_name());
        }
        return Ok(());
    }

    let config = match &options.config {
        Some(path) => TunerConfig::load(path)?,
        None => TunerConfig::default(),
    };

    let samples = match &options.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open {path}"))?;
            replay::read_samples(BufReader::new(file))?
        }
        None => replay::read_samples(io::stdin().lock())?,
    };
    log::info!("Loaded {} frames", samples.len());

    let mut session = TunerSession::new(&config);
    if let Some(mode) = options.mode {
        session.select_mode(mode);
    }
    if let Some(index) = options.string {
        if index >= session.target_notes().len() {
            log::warn!("String {index} does not exist, using the nearest string");
        }
        session.select_string(Some(index));
    }
    eprintln!(
        "Tuning: {} [{}]",
        session.tuning_mode(),
        session.target_notes().join(" ")
    );

    if options.live {
        run_live(session, samples, &options)
    } else {
        run_replay(session, samples, &options)
    }
}

/// Processes every frame on this thread and prints each readout.
fn run_replay(
    mut session: TunerSession,
    samples: Vec<PitchSample>,
    options: &Options,
) -> Result<()> {
    session.start_listening();
    for (frame, sample) in samples.into_iter().enumerate() {
        let state = session.process(sample);
        print_state(frame, &state, options.json)?;
    }
    session.stop_listening();
    Ok(())
}

/// Streams frames to a worker thread and polls the newest readout.
fn run_live(session: TunerSession, samples: Vec<PitchSample>, options: &Options) -> Result<()> {
    let interval = Duration::from_millis(options.interval_ms);
    let (sample_tx, sample_rx) = crossbeam_channel::unbounded();
    let worker = SessionWorker::spawn(session, sample_rx)?;
    worker.start_listening()?;

    // Frames are paced like an analyzer running at the poll rate
    let feeder = thread::spawn(move || {
        for sample in samples {
            if sample_tx.send(sample).is_err() {
                break;
            }
            thread::sleep(interval / 2);
        }
    });

    let mut tick = 0;
    let mut last_shown: Option<TuningState> = None;
    let mut show = |tick: usize, state: TuningState| -> Result<()> {
        if last_shown != Some(state) {
            print_state(tick, &state, options.json)?;
            last_shown = Some(state);
        }
        Ok(())
    };

    while !feeder.is_finished() {
        if let Some(state) = worker.latest_state() {
            show(tick, state)?;
        }
        tick += 1;
        thread::sleep(interval);
    }
    feeder.join().map_err(|_| anyhow!("sample feeder panicked"))?;

    // Pick up whatever the worker finishes after the last frame was sent
    while let Some(state) = worker.states().recv_timeout(interval * 4) {
        show(tick, state)?;
        tick += 1;
    }
    worker.shutdown()?;
    Ok(())
}

fn print_state(index: usize, state: &TuningState, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(state)?);
        return Ok(());
    }

    let readout = match (state.status, state.target_frequency) {
        (TuningStatus::Detecting, _) | (_, None) => "--".to_string(),
        (status, Some(target)) => {
            let arrow = match status {
                TuningStatus::TooLow => "tune up",
                TuningStatus::TooHigh => "tune down",
                _ => "in tune",
            };
            format!(
                "{:>5} {:>7.2} Hz -> {:>7.2} Hz {:>+7.1} cents  {arrow}",
                state.detected_note.display_name(),
                state.detected_note.frequency,
                target,
                state.cents,
            )
        }
    };
    println!("{index:>5}  {readout}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let argv = args(&["--mode", "drop-d", "--string", "0", "--json", "take.txt"]);
        let options = parse_args(argv).unwrap().unwrap();
        assert_eq!(options.mode, Some(TuningMode::DropD));
        assert_eq!(options.string, Some(0));
        assert!(options.json);
        assert!(!options.live);
        assert_eq!(options.interval_ms, 50);
        assert_eq!(options.input.as_deref(), Some("take.txt"));
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(args(&["--mode", "Nashville"])).is_err());
        assert!(parse_args(args(&["--string"])).is_err());
        assert!(parse_args(args(&["--string", "x"])).is_err());
        assert!(parse_args(args(&["--bogus"])).is_err());
        assert!(parse_args(args(&["a.txt", "b.txt"])).is_err());
        assert!(parse_args(args(&["--help"])).unwrap().is_none());
    }
}
