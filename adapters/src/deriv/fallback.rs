use market::catalog;
use market::types::{Family, InstrumentSpec};

/// Instrument to fall back to when the feed rejects `failed` as an invalid symbol.
///
/// High-frequency indices fall back to the regular index of the same level.
/// Regular indices have nowhere to go.
pub fn fallback_instrument(failed: &InstrumentSpec) -> Option<&'static InstrumentSpec> {
    match failed.family {
        Family::HighFrequency => catalog::lookup(Family::Regular, failed.level).ok(),
        Family::Regular => None,
    }
}
