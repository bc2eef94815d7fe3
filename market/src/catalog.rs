//! Static catalog of supported volatility indices.
//!
//! Instruments are keyed by `(family, level)` with a reverse lookup by symbol.
//! The catalog is fixed at compile time; lookups never invent instruments.

use std::collections::BTreeMap;

use crate::error::MarketError;
use crate::types::{Family, InstrumentSpec};

/// Volatility levels offered in both families.
pub const LEVELS: [u32; 5] = [10, 25, 50, 75, 100];

const fn spec(
    symbol: &'static str,
    display_name: &'static str,
    family: Family,
    level: u32,
    stop_loss_distance: f64,
    take_profit_distance: f64,
    risk_percent: f64,
) -> InstrumentSpec {
    InstrumentSpec {
        symbol,
        display_name,
        family,
        level,
        stop_loss_distance,
        take_profit_distance,
        risk_percent,
        nominal_frequency: match family {
            Family::Regular => "~2s",
            Family::HighFrequency => "1s",
        },
    }
}

static INSTRUMENTS: [InstrumentSpec; 10] = [
    spec("R_10", "Volatility 10 Index", Family::Regular, 10, 30.0, 75.0, 1.0),
    spec("R_25", "Volatility 25 Index", Family::Regular, 25, 50.0, 125.0, 1.5),
    spec("R_50", "Volatility 50 Index", Family::Regular, 50, 100.0, 250.0, 2.0),
    spec("R_75", "Volatility 75 Index", Family::Regular, 75, 150.0, 375.0, 2.5),
    spec("R_100", "Volatility 100 Index", Family::Regular, 100, 250.0, 625.0, 3.0),
    spec("1HZ10V", "Volatility 10 (1s) Index", Family::HighFrequency, 10, 20.0, 50.0, 0.8),
    spec("1HZ25V", "Volatility 25 (1s) Index", Family::HighFrequency, 25, 35.0, 90.0, 1.2),
    spec("1HZ50V", "Volatility 50 (1s) Index", Family::HighFrequency, 50, 70.0, 180.0, 1.8),
    spec("1HZ75V", "Volatility 75 (1s) Index", Family::HighFrequency, 75, 100.0, 250.0, 2.2),
    spec("1HZ100V", "Volatility 100 (1s) Index", Family::HighFrequency, 100, 150.0, 400.0, 2.8),
];

/// Look up an instrument by family and volatility level.
pub fn lookup(family: Family, level: u32) -> Result<&'static InstrumentSpec, MarketError> {
    INSTRUMENTS
        .iter()
        .find(|i| i.family == family && i.level == level)
        .ok_or(MarketError::UnknownInstrument { family, level })
}

/// Reverse lookup by feed symbol.
pub fn by_symbol(symbol: &str) -> Option<&'static InstrumentSpec> {
    INSTRUMENTS.iter().find(|i| i.symbol == symbol)
}

/// Instrument the service monitors when nothing else is configured.
pub fn default_instrument() -> &'static InstrumentSpec {
    &INSTRUMENTS[8]
}

pub fn all() -> &'static [InstrumentSpec] {
    &INSTRUMENTS
}

/// Full catalog grouped by family, then by level.
pub fn grouped() -> BTreeMap<Family, BTreeMap<u32, InstrumentSpec>> {
    let mut out: BTreeMap<Family, BTreeMap<u32, InstrumentSpec>> = BTreeMap::new();
    for i in INSTRUMENTS.iter() {
        out.entry(i.family).or_default().insert(i.level, *i);
    }
    out
}
