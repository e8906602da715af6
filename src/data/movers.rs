/// Movers extraction and open-at-extreme filtering
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::data::fields::{Field, FieldSource};
use crate::options::OptionChainResult;
use crate::types::Extreme;

/// Gainer/loser row with canonical fields resolved once
#[derive(Debug, Clone, Serialize)]
pub struct MoverRow {
    pub symbol: Option<String>,
    pub display_name: String,
    pub open_price: Option<f64>,
    pub low_price: Option<f64>,
    pub high_price: Option<f64>,
    pub last_price: Option<f64>,
    pub percent_change: Option<f64>,
    /// Upstream row as received, for verbatim display
    pub raw: Map<String, Value>,
    pub option_chain: Option<OptionChainResult>,
}

impl MoverRow {
    pub fn from_raw(raw: Map<String, Value>) -> Self {
        MoverRow {
            symbol: raw.text(Field::Symbol).filter(|s| !s.trim().is_empty()),
            display_name: raw.resolve(Field::DisplayName).display(),
            open_price: raw.number(Field::Open),
            low_price: raw.number(Field::Low),
            high_price: raw.number(Field::High),
            last_price: raw.number(Field::LastPrice),
            percent_change: raw.number(Field::PercentChange),
            raw,
            option_chain: None,
        }
    }

    /// Verbatim display of any canonical field
    pub fn display(&self, field: Field) -> String {
        self.raw.resolve(field).display()
    }

    pub fn is_positive(&self) -> bool {
        self.percent_change.map(|p| p >= 0.0).unwrap_or(false)
    }

    pub fn attach_option_chain(&mut self, result: OptionChainResult) {
        self.option_chain = Some(result);
    }
}

/// Rows of the F&O securities section (`FOSec.data`)
///
/// A missing or non-array section is an empty movers list, not an error.
pub fn extract_rows(payload: &Value) -> Vec<Map<String, Value>> {
    payload
        .get("FOSec")
        .and_then(|section| section.get("data"))
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(|row| row.as_object().cloned())
                .collect()
        })
        .unwrap_or_default()
}

/// Open and the requested extreme, both numerically resolved
fn open_and_extreme(row: &Map<String, Value>, extreme: Extreme) -> Option<(f64, f64)> {
    let open = row.number(Field::Open)?;
    let bound = match extreme {
        Extreme::Low => row.number(Field::Low)?,
        Extreme::High => row.number(Field::High)?,
    };
    Some((open, bound))
}

/// Keep rows whose open price equals the session extreme exactly
pub fn filter_open_at_extreme(rows: Vec<Map<String, Value>>, extreme: Extreme) -> Vec<MoverRow> {
    rows.into_iter()
        .filter(|row| match open_and_extreme(row, extreme) {
            // Exact match, no tolerance band
            Some((open, bound)) => open == bound,
            None => {
                debug!(
                    "Dropping row without open/{:?}: {}",
                    extreme,
                    row.resolve(Field::Symbol).display()
                );
                false
            }
        })
        .map(MoverRow::from_raw)
        .collect()
}

pub fn filter_open_equals_low(rows: Vec<Map<String, Value>>) -> Vec<MoverRow> {
    filter_open_at_extreme(rows, Extreme::Low)
}

pub fn filter_open_equals_high(rows: Vec<Map<String, Value>>) -> Vec<MoverRow> {
    filter_open_at_extreme(rows, Extreme::High)
}
