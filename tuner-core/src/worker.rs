//! # Session Worker Module
//!
//! Runs a [`TunerSession`] on its own thread. The analyzer feeds frames in
//! through a crossbeam channel, control calls arrive on a second channel,
//! and readers pick up results through [`TunerSession::subscribe`].
//!
//! ## Threads
//! - **Analyzer**: owns the sample `Sender`, pushes frames in order
//! - **Worker**: the only owner of stabilizer and engine state
//! - **Display**: polls a `LatestReceiver` at its own pace

use crate::PitchSample;
use crate::engine::TuningState;
use crate::error::TunerError;
use crate::publish::LatestReceiver;
use crate::session::TunerSession;
use crate::tuning_mode::TuningMode;
use crossbeam_channel::{Receiver, Sender};
use std::thread::{self, JoinHandle};

/// Control messages for the worker thread.
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Start,
    Stop,
    SelectMode(TuningMode),
    SelectString(Option<usize>),
    Shutdown,
}

/// Handle to a session running on a dedicated thread.
#[derive(Debug)]
pub struct SessionWorker {
    command_tx: Sender<Command>,
    states: LatestReceiver<TuningState>,
    thread_handle: Option<JoinHandle<TunerSession>>,
}

impl SessionWorker {
    /// Moves `session` onto a new thread that processes `samples` in order.
    ///
    /// The thread runs until [`SessionWorker::shutdown`] is called or every
    /// sample sender has been dropped.
    pub fn spawn(
        mut session: TunerSession,
        samples: Receiver<PitchSample>,
    ) -> Result<Self, TunerError> {
        let (command_tx, command_rx) = crossbeam_channel::unbounded();
        let states = session.subscribe();

        let thread_handle = thread::Builder::new()
            .name("tuner-session".into())
            .spawn(move || run(session, samples, command_rx))
            .map_err(|e| {
                log::error!("Failed to spawn session worker: {e}");
                TunerError::worker_spawn(e)
            })?;
        log::info!("Session worker started");

        Ok(Self {
            command_tx,
            states,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn start_listening(&self) -> Result<(), TunerError> {
        self.send(Command::Start)
    }

    pub fn stop_listening(&self) -> Result<(), TunerError> {
        self.send(Command::Stop)
    }

    pub fn select_mode(&self, mode: TuningMode) -> Result<(), TunerError> {
        self.send(Command::SelectMode(mode))
    }

    pub fn select_string(&self, index: Option<usize>) -> Result<(), TunerError> {
        self.send(Command::SelectString(index))
    }

    /// The newest state the worker published, if any arrived since the last call.
    pub fn latest_state(&self) -> Option<TuningState> {
        self.states.try_latest()
    }

    /// Receiver for the worker's published states.
    pub fn states(&self) -> &LatestReceiver<TuningState> {
        &self.states
    }

    /// Stops the thread and hands the session back.
    pub fn shutdown(mut self) -> Result<TunerSession, TunerError> {
        // The thread may already have exited on sample disconnect
        let _ = self.command_tx.send(Command::Shutdown);
        let handle = self.thread_handle.take().ok_or(TunerError::WorkerStopped)?;
        handle.join().map_err(|_| {
            log::error!("Session worker panicked");
            TunerError::WorkerStopped
        })
    }

    fn send(&self, command: Command) -> Result<(), TunerError> {
        self.command_tx
            .send(command)
            .map_err(|_| TunerError::WorkerStopped)
    }
}

impl Drop for SessionWorker {
    fn drop(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            let _ = self.command_tx.send(Command::Shutdown);
            let _ = handle.join();
        }
    }
}

fn run(
    mut session: TunerSession,
    samples: Receiver<PitchSample>,
    commands: Receiver<Command>,
) -> TunerSession {
    loop {
        crossbeam_channel::select! {
            recv(samples) -> msg => match msg {
                Ok(sample) => {
                    // Control calls made before this frame was sent apply to it
                    let mut running = true;
                    while let Ok(command) = commands.try_recv() {
                        running = apply(&mut session, command);
                        if !running {
                            break;
                        }
                    }
                    if !running {
                        break;
                    }
                    session.process(sample);
                }
                Err(_) => {
                    log::warn!("Sample channel closed, session worker exiting");
                    break;
                }
            },
            recv(commands) -> msg => {
                let running = msg.is_ok_and(|command| apply(&mut session, command));
                if !running {
                    break;
                }
            },
        }
    }
    session.stop_listening();
    session
}

/// Applies one control message. Returns false on shutdown.
fn apply(session: &mut TunerSession, command: Command) -> bool {
    match command {
        Command::Start => session.start_listening(),
        Command::Stop => session.stop_listening(),
        Command::SelectMode(mode) => session.select_mode(mode),
        Command::SelectString(index) => session.select_string(index),
        Command::Shutdown => {
            log::info!("Session worker received shutdown");
            return false;
        }
    }
    true
}
