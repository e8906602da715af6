pub mod chain;
pub mod correlator;
pub mod extreme;
pub mod ranking;

pub use chain::{OptionChainResult, OptionChainSnapshot, OptionLeg, StrikeRecord};
pub use correlator::{select_expiry, OptionChainCorrelator};
pub use extreme::{derived_open, display_low, opened_at_extreme, opened_at_low};
pub use ranking::{nearest_opened_at_extreme_strikes, rank_strikes, RankedStrike, MAX_RANKED_STRIKES};
