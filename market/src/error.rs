use thiserror::Error;

use crate::types::Family;

/// Failures surfaced by the market core.
///
/// Every operation that returns one of these leaves `MarketState` and the
/// engine clock exactly as they were before the call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketError {
    #[error("unknown instrument: {family} volatility level {level}")]
    UnknownInstrument { family: Family, level: u32 },

    #[error("market feed is not connected")]
    NotConnected,

    #[error("stale tick for {received} while {active} is active")]
    StaleTick { active: String, received: String },

    #[error("insufficient data to compute indicator")]
    InsufficientData,

    #[error("invalid tick price {price}")]
    InvalidTick { price: f64 },
}
