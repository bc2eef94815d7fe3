use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cadence class of a synthetic instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    /// Ticks roughly every two seconds.
    Regular,

    /// Ticks exactly once per second.
    #[serde(alias = "1s", alias = "high-frequency")]
    HighFrequency,
}

impl Family {
    /// Per-family tuning. These thresholds are empirical and must be kept as-is.
    pub const fn profile(self) -> FamilyProfile {
        match self {
            Family::Regular => FamilyProfile {
                history_capacity: 150,
                min_samples: 20,
                analysis_window: 30,
                high_volatility_pct: 2.0,
                strong_move_pct: 0.1,
                strength_threshold: 75,
                cooldown_ms: 300_000,
            },
            Family::HighFrequency => FamilyProfile {
                history_capacity: 300,
                min_samples: 30,
                analysis_window: 60,
                high_volatility_pct: 1.5,
                strong_move_pct: 0.05,
                strength_threshold: 80,
                cooldown_ms: 180_000,
            },
        }
    }

    /// Short label used in rendered messages.
    pub fn label(self) -> &'static str {
        match self {
            Family::Regular => "regular",
            Family::HighFrequency => "1s",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::Regular => f.write_str("regular"),
            Family::HighFrequency => f.write_str("high_frequency"),
        }
    }
}

impl FromStr for Family {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regular" => Ok(Family::Regular),
            "high_frequency" | "high-frequency" | "1s" => Ok(Family::HighFrequency),
            other => Err(format!("unknown instrument family '{other}'")),
        }
    }
}

/// Family-dependent constants used by the rolling state and the signal engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FamilyProfile {
    /// Maximum number of samples retained in the rolling history.
    pub history_capacity: usize,

    /// Samples required before any evaluation is attempted.
    pub min_samples: usize,

    /// Number of most recent samples analysed per evaluation.
    pub analysis_window: usize,

    /// Realized volatility (%) above which the regime is `High`.
    pub high_volatility_pct: f64,

    /// Absolute one-tick price change (%) above which the move is `StrongMove`.
    pub strong_move_pct: f64,

    /// Strength must strictly exceed this to emit.
    pub strength_threshold: u8,

    /// Minimum spacing between two emitted signals.
    pub cooldown_ms: u64,
}

/// Realized volatility (%) below which the regime is `Low`, for every family.
pub const LOW_VOLATILITY_PCT: f64 = 0.5;

/// Static description of a tradable synthetic index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InstrumentSpec {
    pub symbol: &'static str,
    pub display_name: &'static str,
    pub family: Family,
    pub level: u32,
    pub stop_loss_distance: f64,
    pub take_profit_distance: f64,
    pub risk_percent: f64,
    pub nominal_frequency: &'static str,
}

impl InstrumentSpec {
    /// Take-profit over stop-loss distance, rendered as `1:x.x`.
    pub fn risk_reward_ratio(&self) -> String {
        format!("1:{:.1}", self.take_profit_distance / self.stop_loss_distance)
    }
}

/// One price update as delivered by the market feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub price: f64,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub symbol: String,
    pub epoch_seconds: i64,
}

impl Tick {
    pub fn observed_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.epoch_seconds, 0).unwrap_or_default()
    }
}

/// A single accepted price observation held by the rolling history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub price: f64,
    pub observed_at: DateTime<Utc>,
}

/// Latest top-of-book view for the active instrument.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Quote {
    pub bid: f64,
    pub ask: f64,
    pub spread: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Direction of an emitted signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Bullish,
    Bearish,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Bullish => f.write_str("BULLISH"),
            Direction::Bearish => f.write_str("BEARISH"),
        }
    }
}
