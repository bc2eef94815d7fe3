//! MarketManager
//!
//! Owns the `MarketState` + `SignalEngine` pair behind a single lock so that
//! every tick is ingested and evaluated as one atomic step, and instrument
//! switches never interleave with that step.
//!
//! Responsibilities:
//!   • Serialize tick ingestion and the evaluation it triggers
//!   • Gate start on the feed connectivity flag reported by the adapter
//!   • Forward emitted signals to the notification queue without blocking
//!   • Expose status, health and signal-log views for the API layer

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Local, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc::Sender;
use tracing::{debug, info, warn};

use crate::counters::{Counters, CountersSnapshot, bump};
use crate::error::MarketError;
use crate::signal::{Evaluation, Signal, SignalEngine};
use crate::state::MarketState;
use crate::time::now_ms;
use crate::types::{Direction, Family, InstrumentSpec, Quote, Tick};

struct Desk {
    state: MarketState,
    engine: SignalEngine,
}

/// Performance block of the status view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Performance {
    #[serde(flatten)]
    pub counters: CountersSnapshot,
    pub last_signal_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub symbol: String,
    pub display_name: String,
    pub family: Family,
    pub frequency: String,
    pub running: bool,
    pub connected: bool,
    pub current_price: f64,
    pub last_update: Option<DateTime<Utc>>,
    pub signals_today: usize,
    pub performance: Performance,
    pub market: Quote,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthSnapshot {
    pub connected: bool,
    pub running: bool,
    pub timestamp: DateTime<Utc>,
}

pub struct MarketManager {
    desk: Mutex<Desk>,
    connected: AtomicBool,
    counters: Counters,
    signal_tx: Option<Sender<Signal>>,
}

impl MarketManager {
    /// `signal_tx` receives every emitted signal; `None` disables forwarding.
    pub fn new(instrument: &'static InstrumentSpec, signal_tx: Option<Sender<Signal>>) -> Self {
        Self {
            desk: Mutex::new(Desk {
                state: MarketState::new(instrument),
                engine: SignalEngine::new(),
            }),
            connected: AtomicBool::new(false),
            counters: Counters::default(),
            signal_tx,
        }
    }

    pub fn ingest_tick(&self, tick: &Tick) -> Result<Option<Signal>, MarketError> {
        self.ingest_tick_at(tick, now_ms())
    }

    /// Ingest one tick and, while running, evaluate it, all under one lock.
    pub fn ingest_tick_at(&self, tick: &Tick, now_ms: u64) -> Result<Option<Signal>, MarketError> {
        let mut desk = self.desk.lock();

        if let Err(e) = desk.state.ingest_tick(tick) {
            match e {
                MarketError::StaleTick { .. } => bump(&self.counters.ticks_stale),
                _ => bump(&self.counters.ticks_invalid),
            }
            return Err(e);
        }
        bump(&self.counters.ticks_accepted);

        if !desk.state.is_running() {
            return Ok(None);
        }

        bump(&self.counters.evaluations);
        let Desk { state, engine } = &mut *desk;

        match engine.evaluate(state, now_ms) {
            Evaluation::Emitted(signal) => {
                bump(&self.counters.signals_emitted);
                match signal.direction {
                    Direction::Bullish => bump(&self.counters.signals_bullish),
                    Direction::Bearish => bump(&self.counters.signals_bearish),
                }
                self.forward(&signal);
                Ok(Some(*signal))
            }
            Evaluation::CoolingDown { .. } => {
                bump(&self.counters.suppressed_cooldown);
                Ok(None)
            }
            Evaluation::Warming { samples, required } => {
                debug!(samples, required, "warming up");
                Ok(None)
            }
            Evaluation::BelowThreshold { .. } => Ok(None),
        }
    }

    /// Hand the signal to the notification queue. A full or closed queue drops
    /// the notification; the signal itself stays logged.
    fn forward(&self, signal: &Signal) {
        let Some(tx) = &self.signal_tx else {
            return;
        };
        if let Err(e) = tx.try_send(signal.clone()) {
            bump(&self.counters.notifications_dropped);
            warn!(id = signal.id, error = %e, "notification queue rejected signal");
        }
    }

    /// Switch to `(family, level)`; `family` defaults to the active one.
    pub fn switch_instrument(
        &self,
        family: Option<Family>,
        level: u32,
    ) -> Result<&'static InstrumentSpec, MarketError> {
        let mut desk = self.desk.lock();
        let family = family.unwrap_or(desk.state.family());
        desk.state.switch_instrument(family, level)
    }

    pub fn start(&self) -> Result<(), MarketError> {
        let connected = self.is_connected();
        self.desk.lock().state.start(connected)?;
        info!("analysis started");
        Ok(())
    }

    pub fn stop(&self) {
        self.desk.lock().state.stop();
        info!("analysis stopped");
    }

    /// Record feed connectivity as reported by the adapter.
    pub fn set_connected(&self, connected: bool) {
        let was = self.connected.swap(connected, Ordering::SeqCst);
        if was != connected {
            info!(connected, "feed connectivity changed");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.desk.lock().state.is_running()
    }

    pub fn active_instrument(&self) -> &'static InstrumentSpec {
        self.desk.lock().state.instrument()
    }

    pub fn current_price(&self) -> f64 {
        self.desk.lock().state.current_price()
    }

    /// Up to `n` signals, newest first.
    pub fn recent_signals(&self, n: usize) -> Vec<Signal> {
        self.desk.lock().engine.log().recent(n)
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// Read-only access to the state under the lock.
    pub fn with_state<R>(&self, f: impl FnOnce(&MarketState) -> R) -> R {
        f(&self.desk.lock().state)
    }

    pub fn status(&self) -> StatusSnapshot {
        let desk = self.desk.lock();
        let spec = desk.state.instrument();
        let quote = desk.state.quote();
        let today = Local::now().date_naive();

        StatusSnapshot {
            symbol: spec.symbol.to_string(),
            display_name: spec.display_name.to_string(),
            family: spec.family,
            frequency: spec.nominal_frequency.to_string(),
            running: desk.state.is_running(),
            connected: self.is_connected(),
            current_price: desk.state.current_price(),
            last_update: quote.timestamp,
            signals_today: desk.engine.log().count_on(today),
            performance: Performance {
                counters: self.counters.snapshot(),
                last_signal_at: desk
                    .engine
                    .clock()
                    .last_signal_at_ms()
                    .and_then(|ms| DateTime::<Utc>::from_timestamp_millis(ms as i64)),
            },
            market: quote,
        }
    }

    pub fn health(&self) -> HealthSnapshot {
        HealthSnapshot {
            connected: self.is_connected(),
            running: self.is_running(),
            timestamp: Utc::now(),
        }
    }
}
