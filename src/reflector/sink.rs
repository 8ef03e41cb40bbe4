// src/reflector/sink.rs
use crate::health::ProbeOutcome;
use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::error;

/// Observer of the two-state signal, called once per tick in tick order.
///
/// Implementations must return quickly. A sink that needs to do slow work
/// should hand the outcome off to another task (see [`WatchSink`]).
pub trait StatusSink: Send + Sync {
    fn on_status_changed(&self, outcome: ProbeOutcome);
}

impl<F> StatusSink for F
where
    F: Fn(ProbeOutcome) + Send + Sync,
{
    fn on_status_changed(&self, outcome: ProbeOutcome) {
        self(outcome)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub outcome: ProbeOutcome,
    /// 1-based publication counter.
    pub sequence: u64,
    pub checked_at: DateTime<Utc>,
}

/// Single-slot, last-value store of the current status.
///
/// Readers always get a whole snapshot; there is no history.
#[derive(Debug, Default)]
pub struct StatusBoard {
    slot: ArcSwapOption<StatusSnapshot>,
    sequence: AtomicU64,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<Arc<StatusSnapshot>> {
        self.slot.load_full()
    }

    pub fn current(&self) -> Option<ProbeOutcome> {
        self.slot.load().as_ref().map(|snapshot| snapshot.outcome)
    }

    pub fn publications(&self) -> u64 {
        self.sequence.load(Ordering::Acquire)
    }
}

impl StatusSink for StatusBoard {
    fn on_status_changed(&self, outcome: ProbeOutcome) {
        let sequence = self.sequence.fetch_add(1, Ordering::AcqRel) + 1;
        self.slot.store(Some(Arc::new(StatusSnapshot {
            outcome,
            sequence,
            checked_at: Utc::now(),
        })));
    }
}

/// Hands each outcome to another context through a watch channel.
///
/// Every publication marks the channel as changed, even when the value is
/// the same as before.
#[derive(Debug)]
pub struct WatchSink {
    tx: watch::Sender<ProbeOutcome>,
}

impl WatchSink {
    pub fn channel(initial: ProbeOutcome) -> (Self, watch::Receiver<ProbeOutcome>) {
        let (tx, rx) = watch::channel(initial);
        (Self { tx }, rx)
    }
}

impl StatusSink for WatchSink {
    fn on_status_changed(&self, outcome: ProbeOutcome) {
        self.tx.send_replace(outcome);
    }
}

/// Forwards every outcome to each inner sink, in insertion order.
///
/// A panicking sink is logged and skipped; the sinks after it still run.
#[derive(Default)]
pub struct Fanout {
    sinks: Vec<Arc<dyn StatusSink>>,
}

impl Fanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn StatusSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl StatusSink for Fanout {
    fn on_status_changed(&self, outcome: ProbeOutcome) {
        for (index, sink) in self.sinks.iter().enumerate() {
            if panic::catch_unwind(AssertUnwindSafe(|| sink.on_status_changed(outcome))).is_err() {
                error!(index, %outcome, "Status sink panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_board_starts_empty() {
        let board = StatusBoard::new();
        assert!(board.latest().is_none());
        assert!(board.current().is_none());
        assert_eq!(board.publications(), 0);
    }

    #[test]
    fn test_board_last_write_wins() {
        let board = StatusBoard::new();

        board.on_status_changed(ProbeOutcome::Up);
        board.on_status_changed(ProbeOutcome::Up);
        board.on_status_changed(ProbeOutcome::Down);

        let latest = board.latest().unwrap();
        assert_eq!(latest.outcome, ProbeOutcome::Down);
        assert_eq!(latest.sequence, 3);
        assert_eq!(board.current(), Some(ProbeOutcome::Down));
        assert_eq!(board.publications(), 3);
    }

    #[test]
    fn test_board_snapshot_is_stable_after_overwrite() {
        let board = StatusBoard::new();
        board.on_status_changed(ProbeOutcome::Up);
        let held = board.latest().unwrap();

        board.on_status_changed(ProbeOutcome::Down);

        assert_eq!(held.outcome, ProbeOutcome::Up);
        assert_eq!(held.sequence, 1);
        assert!(board.latest().unwrap().checked_at >= held.checked_at);
    }

    #[tokio::test]
    async fn test_watch_sink_flags_repeated_values() {
        let (sink, mut rx) = WatchSink::channel(ProbeOutcome::Down);
        assert_eq!(*rx.borrow(), ProbeOutcome::Down);

        sink.on_status_changed(ProbeOutcome::Up);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), ProbeOutcome::Up);

        sink.on_status_changed(ProbeOutcome::Up);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), ProbeOutcome::Up);
    }

    #[test]
    fn test_fanout_and_closure_sinks() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = {
            let seen = seen.clone();
            move |outcome: ProbeOutcome| seen.lock().unwrap().push(outcome)
        };
        let board = Arc::new(StatusBoard::new());
        assert!(Fanout::new().is_empty());

        let fanout = Fanout::new().with(Arc::new(recorder)).with(board.clone());
        assert!(!fanout.is_empty());
        assert_eq!(fanout.len(), 2);

        fanout.on_status_changed(ProbeOutcome::Up);
        fanout.on_status_changed(ProbeOutcome::Down);

        assert_eq!(*seen.lock().unwrap(), vec![ProbeOutcome::Up, ProbeOutcome::Down]);
        assert_eq!(board.current(), Some(ProbeOutcome::Down));
    }

    #[test]
    fn test_fanout_keeps_going_after_a_sink_panics() {
        let failing = |_: ProbeOutcome| panic!("sink failure");
        let board = Arc::new(StatusBoard::new());
        let fanout = Fanout::new().with(Arc::new(failing)).with(board.clone());

        fanout.on_status_changed(ProbeOutcome::Up);
        fanout.on_status_changed(ProbeOutcome::Down);

        assert_eq!(board.publications(), 2);
        assert_eq!(board.current(), Some(ProbeOutcome::Down));
    }
}
