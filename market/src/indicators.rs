//! Pure indicator functions over an ordered price sequence.
//!
//! No state, no I/O. Only the mean can fail, and only on empty input.

use crate::error::MarketError;

/// Neutral RSI returned when there are not enough changes to measure.
pub const RSI_NEUTRAL: f64 = 50.0;

pub const RSI_PERIOD: usize = 14;

/// Arithmetic mean.
pub fn simple_moving_average(values: &[f64]) -> Result<f64, MarketError> {
    if values.is_empty() {
        return Err(MarketError::InsufficientData);
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Relative Strength Index over the last `period` single-step changes.
///
/// Average gain and loss are simple means of those changes. Returns
/// [`RSI_NEUTRAL`] when fewer than `period + 1` values are supplied, and
/// saturates at 100 when there is no loss in the window.
pub fn rsi(values: &[f64], period: usize) -> f64 {
    if period == 0 || values.len() < period + 1 {
        return RSI_NEUTRAL;
    }

    let tail = &values[values.len() - (period + 1)..];
    let (gain, loss) = tail
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold((0.0, 0.0), |(g, l), change| {
            if change > 0.0 {
                (g + change, l)
            } else {
                (g, l - change)
            }
        });

    let avg_gain = gain / period as f64;
    let avg_loss = loss / period as f64;

    if avg_loss == 0.0 {
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

/// Population standard deviation of simple period-over-period returns, in percent.
pub fn realized_volatility(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let returns: Vec<f64> = values.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect();
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;

    variance.sqrt() * 100.0
}
