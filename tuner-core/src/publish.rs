//! Single-slot, overwrite-on-publish channel.
//!
//! The processing thread publishes every new [`crate::TuningState`]; a
//! display thread only ever cares about the newest one. The channel holds
//! at most one value and a publish replaces whatever the reader has not
//! picked up yet, so the producer never blocks and nothing queues.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use std::sync::{Arc, Weak};
use std::time::Duration;

/// Creates a connected latest-value sender/receiver pair.
pub fn latest<T>() -> (LatestSender<T>, LatestReceiver<T>) {
    let (tx, rx) = crossbeam_channel::bounded(1);
    let alive = Arc::new(());
    (
        LatestSender {
            tx,
            stale: rx.clone(),
            reader: Arc::downgrade(&alive),
        },
        LatestReceiver { rx, _alive: alive },
    )
}

/// Publishing half. Cloning gives another publisher into the same slot.
#[derive(Debug, Clone)]
pub struct LatestSender<T> {
    tx: Sender<T>,
    /// Used to evict a value nobody has read yet
    stale: Receiver<T>,
    reader: Weak<()>,
}

impl<T> LatestSender<T> {
    /// Returns false once the [`LatestReceiver`] has been dropped.
    ///
    /// The channel itself never disconnects because every sender holds an
    /// eviction receiver, so the reader's liveness is tracked separately.
    pub fn is_connected(&self) -> bool {
        self.reader.strong_count() > 0
    }

    /// Replaces the slot's contents with `value`.
    pub fn publish(&self, mut value: T) {
        loop {
            match self.tx.try_send(value) {
                Ok(()) => return,
                Err(TrySendError::Full(v)) => {
                    // The reader may take it first; either way the slot frees up
                    let _ = self.stale.try_recv();
                    value = v;
                }
                // The sender keeps its own receiver, so this cannot happen
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }
}

/// Reading half. Each published value is delivered at most once.
#[derive(Debug)]
pub struct LatestReceiver<T> {
    rx: Receiver<T>,
    _alive: Arc<()>,
}

impl<T> LatestReceiver<T> {
    /// Takes the newest value if one arrived since the last read.
    pub fn try_latest(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Waits for the next value. Returns `None` once every sender is gone.
    pub fn recv(&self) -> Option<T> {
        self.rx.recv().ok()
    }

    /// Waits up to `timeout` for the next value.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(value) => Some(value),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_keeps_only_newest() {
        let (tx, rx) = latest();
        assert_eq!(rx.try_latest(), None::<u32>);

        tx.publish(1);
        tx.publish(2);
        tx.publish(3);
        assert_eq!(rx.try_latest(), Some(3));
        assert_eq!(rx.try_latest(), None);
    }

    #[test]
    fn test_publish_never_blocks_without_reader() {
        let (tx, rx) = latest();
        for i in 0..10_000 {
            tx.publish(i);
        }
        assert_eq!(rx.try_latest(), Some(9_999));
    }

    #[test]
    fn test_cross_thread() {
        let (tx, rx) = latest();
        let producer = thread::spawn(move || {
            for i in 0..100_000u32 {
                tx.publish(i);
            }
        });

        // Reads race the producer's evictions; values only ever move forward
        let mut seen = Vec::new();
        while let Some(value) = rx.recv_timeout(Duration::from_secs(2)) {
            seen.push(value);
            if value == 99_999 {
                break;
            }
        }
        producer.join().unwrap();

        assert_eq!(seen.last(), Some(&99_999));
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(rx.try_latest(), None);
    }

    #[test]
    fn test_is_connected_tracks_receiver() {
        let (tx, rx) = latest::<u32>();
        let other = tx.clone();
        assert!(tx.is_connected());
        assert!(other.is_connected());

        drop(rx);
        assert!(!tx.is_connected());
        assert!(!other.is_connected());
        tx.publish(1);
    }

    #[test]
    fn test_recv_timeout_when_empty() {
        let (_tx, rx) = latest::<u32>();
        assert_eq!(rx.recv_timeout(Duration::from_millis(10)), None);
    }
}
