//! Signal engine: warm-up gate, confluence scoring, cooldown and materialization.

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use crate::signal::analysis::{classify, compute_snapshot, reason_tags, score};
use crate::signal::log::SignalLog;
use crate::signal::types::{
    Classification, Evaluation, IndicatorSnapshot, Signal, SignalTechnicals,
};
use crate::state::MarketState;
use crate::types::Direction;

/// Time of the last emitted signal. Drives the cooldown policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineClock {
    last_signal_at_ms: Option<u64>,
}

impl EngineClock {
    pub fn last_signal_at_ms(&self) -> Option<u64> {
        self.last_signal_at_ms
    }

    /// Milliseconds left before another signal may be emitted; 0 when allowed.
    pub fn remaining_cooldown(&self, now_ms: u64, cooldown_ms: u64) -> u64 {
        match self.last_signal_at_ms {
            None => 0,
            Some(last) => cooldown_ms.saturating_sub(now_ms.saturating_sub(last)),
        }
    }

    fn mark(&mut self, now_ms: u64) {
        self.last_signal_at_ms = Some(now_ms);
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignalEngine {
    clock: EngineClock,
    log: SignalLog,
    last_id: u64,
}

impl SignalEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clock(&self) -> EngineClock {
        self.clock
    }

    pub fn log(&self) -> &SignalLog {
        &self.log
    }

    /// Evaluate the current state once.
    ///
    /// Only `Emitted` mutates the engine: the signal is logged and the clock advances.
    #[instrument(
        level = "debug",
        skip(self, state),
        fields(symbol = %state.instrument().symbol, samples = state.history().len())
    )]
    pub fn evaluate(&mut self, state: &MarketState, now_ms: u64) -> Evaluation {
        let family = state.family();
        let profile = family.profile();
        let samples = state.history().len();

        if samples < profile.min_samples {
            return Evaluation::Warming {
                samples,
                required: profile.min_samples,
            };
        }

        let window = state.recent_prices(profile.analysis_window);
        let Ok(snapshot) = compute_snapshot(&window, state.current_price(), state.previous_price())
        else {
            return Evaluation::Warming {
                samples,
                required: profile.min_samples,
            };
        };

        let classification = classify(&snapshot, &profile);
        let strength = score(&classification, family);

        debug!(
            strength,
            trend = ?classification.trend,
            momentum = ?classification.momentum,
            volatility = ?classification.volatility_state,
            price_action = ?classification.price_action,
            "market scored"
        );

        if strength <= profile.strength_threshold {
            return Evaluation::BelowThreshold {
                strength,
                threshold: profile.strength_threshold,
            };
        }

        let remaining_ms = self.clock.remaining_cooldown(now_ms, profile.cooldown_ms);
        if remaining_ms > 0 {
            debug!(strength, remaining_ms, "signal suppressed by cooldown");
            return Evaluation::CoolingDown {
                strength,
                remaining_ms,
            };
        }

        let signal = self.materialize(state, &snapshot, &classification, strength, now_ms);
        self.log.record(signal.clone());
        self.clock.mark(now_ms);

        info!(
            id = signal.id,
            direction = %signal.direction,
            entry = signal.entry_price,
            confidence = signal.confidence,
            "signal emitted"
        );

        Evaluation::Emitted(Box::new(signal))
    }

    fn materialize(
        &mut self,
        state: &MarketState,
        snapshot: &IndicatorSnapshot,
        classification: &Classification,
        strength: u8,
        now_ms: u64,
    ) -> Signal {
        let spec = state.instrument();
        let entry = state.current_price();

        let direction = if classification.trend.is_bullish() {
            Direction::Bullish
        } else {
            Direction::Bearish
        };

        let (stop_loss_price, take_profit_price) = match direction {
            Direction::Bullish => (
                entry - spec.stop_loss_distance,
                entry + spec.take_profit_distance,
            ),
            Direction::Bearish => (
                entry + spec.stop_loss_distance,
                entry - spec.take_profit_distance,
            ),
        };

        let id = now_ms.max(self.last_id + 1);
        self.last_id = id;

        let quote = state.quote();

        Signal {
            id,
            created_at: DateTime::<Utc>::from_timestamp_millis(now_ms as i64).unwrap_or_default(),
            instrument_symbol: spec.symbol.to_string(),
            instrument_name: spec.display_name.to_string(),
            family: spec.family,
            frequency: spec.nominal_frequency.to_string(),
            direction,
            entry_price: entry,
            stop_loss_price,
            take_profit_price,
            confidence: strength,
            risk_percent: spec.risk_percent,
            risk_reward_ratio: spec.risk_reward_ratio(),
            technicals: SignalTechnicals {
                rsi: snapshot.rsi14,
                volatility_pct: snapshot.realized_volatility_pct,
                sma5: snapshot.sma5,
                sma10: snapshot.sma10,
                sma20: snapshot.sma20,
                price_change_pct: snapshot.price_change_pct,
                trend: classification.trend,
                momentum: classification.momentum,
            },
            reason_tags: reason_tags(classification, spec.family),
            spread_at_entry: quote.spread,
            market_time_at_entry: quote.timestamp,
        }
    }
}
