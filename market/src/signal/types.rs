use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{Direction, Family};

/// Indicator values recomputed on every evaluation. Never stored on their own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub sma5: f64,
    pub sma10: f64,
    pub sma20: f64,
    pub rsi14: f64,
    pub realized_volatility_pct: f64,
    pub price_change_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trend {
    StrongBullish,
    Bullish,
    Neutral,
    Bearish,
    StrongBearish,
}

impl Trend {
    pub fn is_bullish(self) -> bool {
        matches!(self, Trend::StrongBullish | Trend::Bullish)
    }

    pub fn is_bearish(self) -> bool {
        matches!(self, Trend::StrongBearish | Trend::Bearish)
    }

    pub fn is_strong(self) -> bool {
        matches!(self, Trend::StrongBullish | Trend::StrongBearish)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Trend::StrongBullish => "STRONG_BULLISH",
            Trend::Bullish => "BULLISH",
            Trend::Neutral => "NEUTRAL",
            Trend::Bearish => "BEARISH",
            Trend::StrongBearish => "STRONG_BEARISH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Momentum {
    Overbought,
    Neutral,
    Oversold,
}

impl Momentum {
    pub fn as_str(self) -> &'static str {
        match self {
            Momentum::Overbought => "OVERBOUGHT",
            Momentum::Neutral => "NEUTRAL",
            Momentum::Oversold => "OVERSOLD",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolatilityState {
    High,
    Normal,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceAction {
    StrongMove,
    WeakMove,
}

/// Market condition derived from an [`IndicatorSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub trend: Trend,
    pub momentum: Momentum,
    pub volatility_state: VolatilityState,
    pub price_action: PriceAction,
}

/// Indicator subset frozen into a signal at creation time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalTechnicals {
    pub rsi: f64,
    pub volatility_pct: f64,
    pub sma5: f64,
    pub sma10: f64,
    pub sma20: f64,
    pub price_change_pct: f64,
    pub trend: Trend,
    pub momentum: Momentum,
}

/// An emitted directional trading signal. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub instrument_symbol: String,
    pub instrument_name: String,
    pub family: Family,
    pub frequency: String,
    pub direction: Direction,
    pub entry_price: f64,
    pub stop_loss_price: f64,
    pub take_profit_price: f64,
    pub confidence: u8,
    pub risk_percent: f64,
    pub risk_reward_ratio: String,
    pub technicals: SignalTechnicals,
    pub reason_tags: Vec<String>,
    pub spread_at_entry: f64,
    pub market_time_at_entry: Option<DateTime<Utc>>,
}

impl Signal {
    pub fn reason(&self) -> String {
        self.reason_tags.join(" + ")
    }
}

/// Outcome of one engine evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// Not enough history yet.
    Warming { samples: usize, required: usize },

    /// Scored, but at or below the family threshold.
    BelowThreshold { strength: u8, threshold: u8 },

    /// Strong enough, but the previous signal is too recent.
    CoolingDown { strength: u8, remaining_ms: u64 },

    Emitted(Box<Signal>),
}

impl Evaluation {
    pub fn into_signal(self) -> Option<Signal> {
        match self {
            Evaluation::Emitted(s) => Some(*s),
            _ => None,
        }
    }
}
