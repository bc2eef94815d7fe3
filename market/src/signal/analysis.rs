//! Confluence analysis: indicators, classification and strength scoring.
//!
//! Everything here is pure so the engine can be tested rule by rule.

use crate::error::MarketError;
use crate::indicators::{RSI_PERIOD, realized_volatility, rsi, simple_moving_average};
use crate::signal::types::{
    Classification, IndicatorSnapshot, Momentum, PriceAction, Trend, VolatilityState,
};
use crate::types::{Family, FamilyProfile, LOW_VOLATILITY_PCT};

const BASE_STRENGTH: i32 = 50;

fn tail(values: &[f64], n: usize) -> &[f64] {
    &values[values.len().saturating_sub(n)..]
}

/// Compute the indicator snapshot for an analysis window.
pub fn compute_snapshot(
    window: &[f64],
    current_price: f64,
    previous_price: f64,
) -> Result<IndicatorSnapshot, MarketError> {
    let price_change_pct = if previous_price > 0.0 {
        (current_price - previous_price) / previous_price * 100.0
    } else {
        0.0
    };

    Ok(IndicatorSnapshot {
        sma5: simple_moving_average(tail(window, 5))?,
        sma10: simple_moving_average(tail(window, 10))?,
        sma20: simple_moving_average(tail(window, 20))?,
        rsi14: rsi(window, RSI_PERIOD),
        realized_volatility_pct: realized_volatility(window),
        price_change_pct,
    })
}

pub fn classify_trend(s: &IndicatorSnapshot) -> Trend {
    if s.sma5 > s.sma10 {
        if s.sma10 > s.sma20 {
            Trend::StrongBullish
        } else {
            Trend::Bullish
        }
    } else if s.sma5 < s.sma10 {
        if s.sma10 < s.sma20 {
            Trend::StrongBearish
        } else {
            Trend::Bearish
        }
    } else {
        Trend::Neutral
    }
}

pub fn classify(s: &IndicatorSnapshot, profile: &FamilyProfile) -> Classification {
    let momentum = if s.rsi14 > 70.0 {
        Momentum::Overbought
    } else if s.rsi14 < 30.0 {
        Momentum::Oversold
    } else {
        Momentum::Neutral
    };

    let volatility_state = if s.realized_volatility_pct > profile.high_volatility_pct {
        VolatilityState::High
    } else if s.realized_volatility_pct < LOW_VOLATILITY_PCT {
        VolatilityState::Low
    } else {
        VolatilityState::Normal
    };

    let price_action = if s.price_change_pct.abs() > profile.strong_move_pct {
        PriceAction::StrongMove
    } else {
        PriceAction::WeakMove
    };

    Classification {
        trend: classify_trend(s),
        momentum,
        volatility_state,
        price_action,
    }
}

fn rsi_divergence(c: &Classification) -> bool {
    (c.momentum == Momentum::Oversold && c.trend.is_bullish())
        || (c.momentum == Momentum::Overbought && c.trend.is_bearish())
}

/// Confluence score in `[0, 100]`.
pub fn score(c: &Classification, family: Family) -> u8 {
    let mut strength = BASE_STRENGTH;

    if c.trend.is_strong() {
        strength += 20;
    } else if c.trend != Trend::Neutral {
        strength += 10;
    }

    // Both divergence rules are independent.
    if c.momentum == Momentum::Oversold && c.trend.is_bullish() {
        strength += 15;
    }
    if c.momentum == Momentum::Overbought && c.trend.is_bearish() {
        strength += 15;
    }

    if c.volatility_state == VolatilityState::High && c.price_action == PriceAction::StrongMove {
        strength += 10;
    }

    if c.volatility_state == VolatilityState::Low {
        strength -= 20;
    }

    if family == Family::HighFrequency && c.price_action != PriceAction::StrongMove {
        strength -= 10;
    }

    strength.clamp(0, 100) as u8
}

pub const TAG_STRONG_TREND: &str = "Strong Trend Confirmed";
pub const TAG_OVERSOLD_BULLISH: &str = "RSI Oversold + Bullish Trend";
pub const TAG_OVERBOUGHT_BEARISH: &str = "RSI Overbought + Bearish Trend";
pub const TAG_HIGH_VOLATILITY: &str = "High Volatility Breakout";
pub const TAG_SCALP: &str = "1s Scalping Opportunity";
pub const TAG_FALLBACK: &str = "Technical Confluence";

/// Human-readable reasons for the rules that fired, in a stable order.
pub fn reason_tags(c: &Classification, family: Family) -> Vec<String> {
    let mut tags = Vec::new();

    if c.trend.is_strong() {
        tags.push(TAG_STRONG_TREND);
    }
    if rsi_divergence(c) {
        if c.trend.is_bullish() {
            tags.push(TAG_OVERSOLD_BULLISH);
        } else {
            tags.push(TAG_OVERBOUGHT_BEARISH);
        }
    }
    if c.volatility_state == VolatilityState::High {
        tags.push(TAG_HIGH_VOLATILITY);
    }
    if family == Family::HighFrequency && c.price_action == PriceAction::StrongMove {
        tags.push(TAG_SCALP);
    }
    if tags.is_empty() {
        tags.push(TAG_FALLBACK);
    }

    tags.into_iter().map(String::from).collect()
}
