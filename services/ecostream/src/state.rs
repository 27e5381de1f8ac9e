//! Shared dashboard state: reading history, latest reading and poll bookkeeping

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::reading::Reading;

/// What happened to a poll result handed to [`SharedState::apply_readings`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// History and latest were replaced
    Applied,
    /// The response was empty; history and latest were kept
    Empty,
    /// A newer poll had already been applied; the result was dropped
    Stale,
}

/// Poll health, exposed on the dashboard API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollStatus {
    pub last_success_epoch_ms: Option<u64>,
    pub last_failure_epoch_ms: Option<u64>,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
    pub uptime_seconds: u64,
}

/// State shared by the poller (single writer) and the dashboard (readers)
#[derive(Debug)]
pub struct SharedState {
    /// Readings shown on the chart, oldest first
    pub history: Vec<Reading>,
    /// Most recent known-good reading
    pub latest: Option<Reading>,
    pub last_applied_seq: u64,
    pub last_success_epoch_ms: Option<u64>,
    pub last_failure_epoch_ms: Option<u64>,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
    pub started_at: Instant,
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedState {
    pub fn new() -> Self {
        Self {
            history: Vec::new(),
            latest: None,
            last_applied_seq: 0,
            last_success_epoch_ms: None,
            last_failure_epoch_ms: None,
            consecutive_failures: 0,
            last_error: None,
            started_at: Instant::now(),
        }
    }

    /// Replace history and latest from a newest-first poll response.
    ///
    /// `seq` is the tick that produced the response; results from ticks at
    /// or before the last applied one are dropped.
    pub fn apply_readings(&mut self, seq: u64, readings: Vec<Reading>, now_ms: u64) -> ApplyOutcome {
        if seq <= self.last_applied_seq {
            return ApplyOutcome::Stale;
        }
        self.last_applied_seq = seq;
        self.last_success_epoch_ms = Some(now_ms);
        self.consecutive_failures = 0;
        self.last_error = None;

        if readings.is_empty() {
            return ApplyOutcome::Empty;
        }

        let history = derive_history(readings);
        self.latest = history.last().cloned();
        self.history = history;
        ApplyOutcome::Applied
    }

    /// Record a failed poll. History and latest are left untouched.
    /// Returns false when the failure is older than the last applied poll.
    pub fn record_failure(&mut self, seq: u64, error: String, now_ms: u64) -> bool {
        if seq <= self.last_applied_seq {
            return false;
        }
        self.consecutive_failures += 1;
        self.last_failure_epoch_ms = Some(now_ms);
        self.last_error = Some(error);
        true
    }

    pub fn is_critical(&self) -> bool {
        self.latest.as_ref().is_some_and(Reading::is_critical)
    }

    pub fn poll_status(&self) -> PollStatus {
        PollStatus {
            last_success_epoch_ms: self.last_success_epoch_ms,
            last_failure_epoch_ms: self.last_failure_epoch_ms,
            consecutive_failures: self.consecutive_failures,
            last_error: self.last_error.clone(),
            uptime_seconds: self.started_at.elapsed().as_secs(),
        }
    }
}

/// Turn a newest-first response into an oldest-first history.
///
/// The reversal honours the server's ordering; the stable sort afterwards
/// guarantees ascending timestamps even if the server breaks that contract.
pub fn derive_history(mut readings: Vec<Reading>) -> Vec<Reading> {
    readings.reverse();
    readings.sort_by_key(|r| r.timestamp);
    readings
}

/// Thread-safe shared state handle
pub type StateHandle = Arc<RwLock<SharedState>>;

pub fn new_state_handle() -> StateHandle {
    Arc::new(RwLock::new(SharedState::new()))
}
