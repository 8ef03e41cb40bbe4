// src/reflector/reflector.rs
use super::StatusSink;
use crate::health::{ProbeOutcome, Prober};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};

/// Background loop that probes on a fixed delay and publishes every outcome.
pub struct StatusReflector {
    prober: Arc<dyn Prober>,
    sink: Arc<dyn StatusSink>,
    interval: Duration,
}

impl StatusReflector {
    pub fn new(prober: Arc<dyn Prober>, sink: Arc<dyn StatusSink>, interval: Duration) -> Self {
        Self {
            prober,
            sink,
            interval,
        }
    }

    /// Spawn the loop on the current runtime and return immediately.
    pub fn start(self) -> LoopHandle {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(cancel_rx));

        LoopHandle {
            cancel_tx,
            task: Some(task),
        }
    }

    /// Run ticks until `cancel_rx` turns true or its sender is dropped.
    /// Returns the number of published outcomes.
    pub async fn run(self, mut cancel_rx: watch::Receiver<bool>) -> u64 {
        info!("Starting status reflector with interval: {:?}", self.interval);

        let mut published = 0u64;

        loop {
            if *cancel_rx.borrow() {
                break;
            }

            // A probe already in flight is allowed to finish and be published.
            let outcome = self.probe_once().await;
            self.publish(outcome);
            published += 1;

            let cancelled = *cancel_rx.borrow();
            if cancelled || self.wait(&mut cancel_rx).await {
                break;
            }
        }

        info!("Status reflector stopped after {} ticks", published);
        published
    }

    async fn probe_once(&self) -> ProbeOutcome {
        match AssertUnwindSafe(self.prober.probe()).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(_) => {
                error!("Probe panicked, reporting down for this tick");
                ProbeOutcome::Down
            }
        }
    }

    fn publish(&self, outcome: ProbeOutcome) {
        debug!(%outcome, "publishing status");
        let sink = &self.sink;
        if std::panic::catch_unwind(AssertUnwindSafe(|| sink.on_status_changed(outcome))).is_err() {
            error!(%outcome, "Status sink panicked");
        }
    }

    /// Sleep for one interval. Returns true if cancelled while waiting.
    async fn wait(&self, cancel_rx: &mut watch::Receiver<bool>) -> bool {
        let delay = sleep(self.interval);
        tokio::pin!(delay);

        loop {
            tokio::select! {
                _ = &mut delay => return false,
                changed = cancel_rx.changed() => {
                    if changed.is_err() || *cancel_rx.borrow() {
                        return true;
                    }
                }
            }
        }
    }
}

/// Handle to a running [`StatusReflector`].
///
/// Dropping the handle requests cancellation and abandons the task.
#[derive(Debug)]
pub struct LoopHandle {
    cancel_tx: watch::Sender<bool>,
    task: Option<JoinHandle<u64>>,
}

impl LoopHandle {
    /// Sticky: stays set even if the loop has already exited.
    pub fn cancel(&self) {
        self.cancel_tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().map_or(false, |task| !task.is_finished())
    }

    /// Cancel and wait for the loop to exit. Returns the number of ticks.
    pub async fn stop(mut self) -> Result<u64, JoinError> {
        self.cancel();

        match self.task.take() {
            Some(task) => task.await,
            None => Ok(0),
        }
    }
}

impl Drop for LoopHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            warn!("Status reflector handle dropped without stop()");
            self.cancel();
        }
    }
}
