use std::collections::VecDeque;

use chrono::{Local, NaiveDate};

use crate::signal::types::Signal;

pub const SIGNAL_LOG_CAPACITY: usize = 50;

/// Bounded, newest-first record of emitted signals.
#[derive(Debug, Clone)]
pub struct SignalLog {
    entries: VecDeque<Signal>,
    capacity: usize,
}

impl Default for SignalLog {
    fn default() -> Self {
        Self::new(SIGNAL_LOG_CAPACITY)
    }
}

impl SignalLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Prepend a signal, dropping the oldest entries beyond capacity.
    pub fn record(&mut self, signal: Signal) {
        self.entries.push_front(signal);
        self.entries.truncate(self.capacity);
    }

    /// Up to `n` signals, newest first.
    pub fn recent(&self, n: usize) -> Vec<Signal> {
        self.entries.iter().take(n).cloned().collect()
    }

    /// Number of signals created on `date` in the local calendar.
    pub fn count_on(&self, date: NaiveDate) -> usize {
        self.entries
            .iter()
            .filter(|s| s.created_at.with_timezone(&Local).date_naive() == date)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
