//! Poller: fetches the readings collection on a fixed cadence and applies it
//! to the shared state

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::source::ReadingSource;
use crate::state::{ApplyOutcome, StateHandle};

/// Result of a single poll tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Applied,
    Empty,
    Stale,
    Failed,
    /// The poller was deactivated while the fetch was in flight
    Discarded,
}

impl From<ApplyOutcome> for PollOutcome {
    fn from(outcome: ApplyOutcome) -> Self {
        match outcome {
            ApplyOutcome::Applied => PollOutcome::Applied,
            ApplyOutcome::Empty => PollOutcome::Empty,
            ApplyOutcome::Stale => PollOutcome::Stale,
        }
    }
}

/// Periodically fetches readings and writes them into the shared state
pub struct Poller {
    source: Arc<dyn ReadingSource>,
    state: StateHandle,
    interval: Duration,
    cancel: CancellationToken,
    next_seq: AtomicU64,
    in_flight: TaskTracker,
}

impl Poller {
    pub fn new(
        source: Arc<dyn ReadingSource>,
        state: StateHandle,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            source,
            state,
            interval,
            cancel,
            next_seq: AtomicU64::new(1),
            in_flight: TaskTracker::new(),
        }
    }

    /// Tick immediately, then every interval. Returns when the cancellation
    /// token is triggered. Fetches run as their own tasks so a slow request
    /// never delays the next tick.
    pub async fn run(&self) {
        // number ticks after anything already applied to a reused state
        let resume_at = self.state.read().await.last_applied_seq + 1;
        self.next_seq.fetch_max(resume_at, Ordering::Relaxed);

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::debug!("Poller cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!("Poll tick #{}", seq);
                    self.in_flight.spawn(poll_once(
                        Arc::clone(&self.source),
                        Arc::clone(&self.state),
                        seq,
                        self.cancel.clone(),
                    ));
                }
            }
        }

        self.in_flight.close();
    }

    /// Start polling in the background
    pub fn activate(self) -> PollerHandle {
        let cancel = self.cancel.clone();
        let in_flight = self.in_flight.clone();
        tracing::info!("Activating poller (interval {:?})", self.interval);
        let task = tokio::spawn(async move { self.run().await });
        PollerHandle {
            cancel,
            task: Some(task),
            in_flight,
        }
    }
}

/// Handle to an activated [`Poller`]
#[derive(Debug)]
pub struct PollerHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    in_flight: TaskTracker,
}

impl PollerHandle {
    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled() && self.task.is_some()
    }

    /// Stop the timer. Fetches already dispatched keep running but can no
    /// longer touch the shared state.
    pub async fn deactivate(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("Poller task ended abnormally: {}", e);
            }
            tracing::info!("Poller deactivated");
        }
    }

    /// Wait until every dispatched fetch has finished. Only completes after
    /// [`PollerHandle::deactivate`].
    pub async fn wait_in_flight(&self) {
        self.in_flight.wait().await;
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }
}

/// Perform one poll tick: fetch, then apply the result unless the poller
/// has been deactivated in the meantime.
pub async fn poll_once(
    source: Arc<dyn ReadingSource>,
    state: StateHandle,
    seq: u64,
    cancel: CancellationToken,
) -> PollOutcome {
    let result = source.fetch().await;
    let now_ms = current_epoch_ms();

    let mut state = state.write().await;
    if cancel.is_cancelled() {
        tracing::debug!("Discarding poll #{} result after deactivation", seq);
        return PollOutcome::Discarded;
    }

    match result {
        Ok(readings) => {
            let count = readings.len();
            let outcome = state.apply_readings(seq, readings, now_ms);
            match outcome {
                ApplyOutcome::Applied => {
                    tracing::debug!("Poll #{} applied {} readings", seq, count)
                }
                ApplyOutcome::Empty => {
                    tracing::debug!("Poll #{} returned no readings; keeping last state", seq)
                }
                ApplyOutcome::Stale => {
                    tracing::debug!("Poll #{} finished after a newer poll; dropped", seq)
                }
            }
            outcome.into()
        }
        Err(e) => {
            if state.record_failure(seq, e.to_string(), now_ms) {
                tracing::warn!(
                    "Poll #{} failed ({} consecutive): {}",
                    seq,
                    state.consecutive_failures,
                    e
                );
                PollOutcome::Failed
            } else {
                tracing::debug!("Poll #{} failed after a newer poll: {}", seq, e);
                PollOutcome::Stale
            }
        }
    }
}

pub(crate) fn current_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
