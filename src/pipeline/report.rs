/// Output contract handed to presentation
use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::data::MoverRow;

#[derive(Debug, Clone, Serialize)]
pub struct MoversReport {
    /// Gainers whose open equals the day's low, with CE correlation
    pub gainers: Vec<MoverRow>,
    /// Losers whose open equals the day's high, with PE correlation
    pub losers: Vec<MoverRow>,
    pub available_expiries: Vec<String>,
    pub selected_expiry: Option<String>,
    pub fetched_at: DateTime<FixedOffset>,
    pub market_open: bool,
}

impl MoversReport {
    pub fn rows(&self) -> impl Iterator<Item = &MoverRow> {
        self.gainers.iter().chain(self.losers.iter())
    }

    /// Rows whose option chain resolved
    pub fn resolved_count(&self) -> usize {
        self.rows()
            .filter(|row| row.option_chain.as_ref().map(|r| r.is_resolved()).unwrap_or(false))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.rows().count() - self.resolved_count()
    }
}
