/// Strike ranking by distance from the underlying
use serde::Serialize;

use crate::data::fields::{Field, FieldSource};
use crate::options::chain::{OptionChainSnapshot, OptionLeg};
use crate::options::extreme::{derived_open, display_low, opened_at_extreme};
use crate::types::{Extreme, OptionSide};

/// Strikes kept per row
pub const MAX_RANKED_STRIKES: usize = 4;

#[derive(Debug, Clone, Serialize)]
pub struct RankedStrike {
    pub strike: f64,
    pub distance: f64,
    /// Open as reported or derived from `lastPrice - change`
    pub open: Option<f64>,
    /// Current price (last traded, else best offer/bid)
    pub current: String,
    pub low: Option<f64>,
    pub data: OptionLeg,
}

impl RankedStrike {
    fn new(strike: f64, underlying: f64, leg: &OptionLeg) -> Self {
        RankedStrike {
            strike,
            distance: (strike - underlying).abs(),
            open: derived_open(leg),
            current: leg.resolve(Field::OptionLastPrice).display(),
            low: display_low(leg),
            data: leg.clone(),
        }
    }
}

/// Legs of `side` that opened at `extreme`, closest to the underlying first.
///
/// Ties keep chain order. A chain without records or without an underlying
/// value ranks nothing.
pub fn rank_strikes(
    chain: &OptionChainSnapshot,
    side: OptionSide,
    extreme: Extreme,
    limit: usize,
) -> Vec<RankedStrike> {
    let Some(underlying) = chain.underlying_value else {
        return Vec::new();
    };

    let mut ranked: Vec<RankedStrike> = chain
        .records
        .iter()
        .filter_map(|record| record.leg(side).map(|leg| (record.strike_price, leg)))
        .filter(|(_, leg)| opened_at_extreme(*leg, extreme))
        .map(|(strike, leg)| RankedStrike::new(strike, underlying, leg))
        .collect();

    // Stable: equal distances stay in chain order
    ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    ranked.truncate(limit);
    ranked
}

/// Up to four strikes on `side` whose leg opened at its low.
///
/// Both calls and puts are screened for open == low: an option bought at the
/// session low is the signal, whichever way the underlying moved.
pub fn nearest_opened_at_extreme_strikes(
    chain: &OptionChainSnapshot,
    side: OptionSide,
) -> Vec<RankedStrike> {
    rank_strikes(chain, side, Extreme::Low, MAX_RANKED_STRIKES)
}
