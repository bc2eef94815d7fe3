use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Aggregate counters for operational visibility. They never affect behavior.
#[derive(Clone, Default)]
pub struct Counters {
    pub ticks_accepted: Arc<AtomicU64>,
    pub ticks_stale: Arc<AtomicU64>,
    pub ticks_invalid: Arc<AtomicU64>,

    pub evaluations: Arc<AtomicU64>,
    pub signals_emitted: Arc<AtomicU64>,
    pub signals_bullish: Arc<AtomicU64>,
    pub signals_bearish: Arc<AtomicU64>,
    pub suppressed_cooldown: Arc<AtomicU64>,

    pub notifications_dropped: Arc<AtomicU64>,
}

/// Point-in-time copy of [`Counters`] for the status endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CountersSnapshot {
    pub ticks_accepted: u64,
    pub ticks_stale: u64,
    pub ticks_invalid: u64,
    pub evaluations: u64,
    pub signals_emitted: u64,
    pub signals_bullish: u64,
    pub signals_bearish: u64,
    pub suppressed_cooldown: u64,
    pub notifications_dropped: u64,
}

pub(crate) fn bump(c: &AtomicU64) {
    c.fetch_add(1, Ordering::Relaxed);
}

impl Counters {
    pub fn snapshot(&self) -> CountersSnapshot {
        let get = |c: &AtomicU64| c.load(Ordering::Relaxed);
        CountersSnapshot {
            ticks_accepted: get(&self.ticks_accepted),
            ticks_stale: get(&self.ticks_stale),
            ticks_invalid: get(&self.ticks_invalid),
            evaluations: get(&self.evaluations),
            signals_emitted: get(&self.signals_emitted),
            signals_bullish: get(&self.signals_bullish),
            signals_bearish: get(&self.signals_bearish),
            suppressed_cooldown: get(&self.suppressed_cooldown),
            notifications_dropped: get(&self.notifications_dropped),
        }
    }
}
