//! Error types for the tuner core.
//!
//! The sample path never fails. These errors only come from the edges:
//! name lookups, configuration and the worker thread.

use thiserror::Error;

/// Errors that can occur outside the per-sample path
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TunerError {
    /// No tuning mode matches the given name
    #[error("unknown tuning mode: {0}")]
    UnknownTuningMode(String),

    /// A configuration value is out of its valid range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The OS refused to start the session worker thread
    #[error("failed to spawn session worker: {0}")]
    WorkerSpawn(String),

    /// The session worker thread is no longer running
    #[error("session worker has stopped")]
    WorkerStopped,
}

impl TunerError {
    pub(crate) fn worker_spawn(err: std::io::Error) -> Self {
        TunerError::WorkerSpawn(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_spawn_error_keeps_cause() {
        let err = TunerError::worker_spawn(io::Error::new(
            io::ErrorKind::WouldBlock,
            "Resource temporarily unavailable",
        ));
        assert_eq!(
            err,
            TunerError::WorkerSpawn("Resource temporarily unavailable".into())
        );
        assert_eq!(
            err.to_string(),
            "failed to spawn session worker: Resource temporarily unavailable"
        );
        assert_ne!(err, TunerError::WorkerStopped);
    }
}
