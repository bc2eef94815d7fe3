//! Rolling market state for the single active instrument.
//!
//! Mutated only by tick ingestion and instrument switches. Holds the
//! one-tick-lagged price pair, the latest quote, the bounded sample history
//! and the running flag.

use tracing::{debug, info, trace};

use crate::catalog;
use crate::error::MarketError;
use crate::rolling_window::RollingWindow;
use crate::types::{Family, InstrumentSpec, Quote, Sample, Tick};

#[derive(Debug, Clone)]
pub struct MarketState {
    instrument: &'static InstrumentSpec,
    current_price: f64,
    previous_price: f64,
    quote: Quote,
    history: RollingWindow<Sample>,
    running: bool,
}

impl MarketState {
    pub fn new(instrument: &'static InstrumentSpec) -> Self {
        Self {
            instrument,
            current_price: 0.0,
            previous_price: 0.0,
            quote: Quote::default(),
            history: RollingWindow::new(instrument.family.profile().history_capacity),
            running: false,
        }
    }

    /// Apply one feed tick.
    ///
    /// Ticks for any symbol other than the active one are rejected with
    /// `StaleTick`; those arrive when the feed lags behind a switch.
    pub fn ingest_tick(&mut self, tick: &Tick) -> Result<(), MarketError> {
        if tick.symbol != self.instrument.symbol {
            return Err(MarketError::StaleTick {
                active: self.instrument.symbol.to_string(),
                received: tick.symbol.clone(),
            });
        }
        if !tick.price.is_finite() || tick.price <= 0.0 {
            return Err(MarketError::InvalidTick { price: tick.price });
        }

        let observed_at = tick.observed_at();
        let bid = tick.bid.unwrap_or(tick.price);
        let ask = tick.ask.unwrap_or(tick.price);

        self.previous_price = self.current_price;
        self.current_price = tick.price;
        self.quote = Quote {
            bid,
            ask,
            spread: (ask - bid).abs(),
            timestamp: Some(observed_at),
        };

        let evicted = self.history.push(Sample {
            price: tick.price,
            observed_at,
        });

        trace!(
            symbol = %tick.symbol,
            price = tick.price,
            samples = self.history.len(),
            evicted,
            "tick ingested"
        );

        Ok(())
    }

    /// Make `(family, level)` the active instrument and force a fresh warm-up.
    ///
    /// On `UnknownInstrument` nothing changes. The running flag is preserved.
    pub fn switch_instrument(
        &mut self,
        family: Family,
        level: u32,
    ) -> Result<&'static InstrumentSpec, MarketError> {
        let next = catalog::lookup(family, level)?;

        debug!(
            from = %self.instrument.symbol,
            to = %next.symbol,
            dropped_samples = self.history.len(),
            "switching instrument"
        );

        self.instrument = next;
        self.history = RollingWindow::new(family.profile().history_capacity);
        self.current_price = 0.0;
        self.previous_price = 0.0;
        self.quote = Quote::default();

        info!(symbol = %next.symbol, family = %family, "active instrument switched");
        Ok(next)
    }

    /// Enter the running state. `connected` is the feed's liveness as seen by the caller.
    pub fn start(&mut self, connected: bool) -> Result<(), MarketError> {
        if !connected {
            return Err(MarketError::NotConnected);
        }
        self.running = true;
        Ok(())
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn instrument(&self) -> &'static InstrumentSpec {
        self.instrument
    }

    pub fn family(&self) -> Family {
        self.instrument.family
    }

    pub fn current_price(&self) -> f64 {
        self.current_price
    }

    pub fn previous_price(&self) -> f64 {
        self.previous_price
    }

    pub fn quote(&self) -> Quote {
        self.quote
    }

    pub fn history(&self) -> &RollingWindow<Sample> {
        &self.history
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Prices of the `n` most recent samples, oldest first.
    pub fn recent_prices(&self, n: usize) -> Vec<f64> {
        self.history.tail(n).map(|s| s.price).collect()
    }
}
