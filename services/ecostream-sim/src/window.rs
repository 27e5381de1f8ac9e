//! Bounded store of the most recent readings

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::generator::SensorReading;

/// Keeps at most `capacity` readings (at least one); pushing past that drops
/// the oldest
#[derive(Debug)]
pub struct ReadingWindow {
    capacity: usize,
    readings: VecDeque<SensorReading>,
}

impl ReadingWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            readings: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, reading: SensorReading) {
        if self.readings.len() >= self.capacity {
            self.readings.pop_front();
        }
        self.readings.push_back(reading);
    }

    /// Contents with the most recently pushed reading first
    pub fn newest_first(&self) -> Vec<SensorReading> {
        self.readings.iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

pub type WindowHandle = Arc<RwLock<ReadingWindow>>;

pub fn new_window_handle(capacity: usize) -> WindowHandle {
    Arc::new(RwLock::new(ReadingWindow::new(capacity)))
}
