/// Option chain snapshot types and per-row correlation result
use serde::Serialize;
use serde_json::{Map, Value};

use crate::data::fields::{Field, FieldSource};
use crate::error::{ErrorKind, ScanError};
use crate::options::ranking::RankedStrike;
use crate::types::OptionSide;

/// One side (CE or PE) of a strike, kept as the upstream mapping
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OptionLeg(pub Map<String, Value>);

impl FieldSource for OptionLeg {
    fn raw(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StrikeRecord {
    pub strike_price: f64,
    pub call: Option<OptionLeg>,
    pub put: Option<OptionLeg>,
}

impl StrikeRecord {
    pub fn from_raw(raw: &Value) -> Option<Self> {
        let strike_price = raw.number(Field::StrikePrice)?;
        Some(StrikeRecord {
            strike_price,
            call: leg(raw, OptionSide::CE),
            put: leg(raw, OptionSide::PE),
        })
    }

    pub fn leg(&self, side: OptionSide) -> Option<&OptionLeg> {
        match side {
            OptionSide::CE => self.call.as_ref(),
            OptionSide::PE => self.put.as_ref(),
        }
    }
}

/// An empty or non-object leg means no contract at that strike
fn leg(raw: &Value, side: OptionSide) -> Option<OptionLeg> {
    raw.get(side.as_str())
        .and_then(Value::as_object)
        .filter(|data| !data.is_empty())
        .map(|data| OptionLeg(data.clone()))
}

/// Option chain for one symbol and expiry
#[derive(Debug, Clone, Serialize)]
pub struct OptionChainSnapshot {
    pub expiry: String,
    pub all_expiries: Vec<String>,
    pub underlying_value: Option<f64>,
    pub timestamp: Option<String>,
    pub records: Vec<StrikeRecord>,
}

impl OptionChainSnapshot {
    /// Parse `records.data` / `records.underlyingValue`; records without a
    /// numeric strike are skipped
    pub fn from_payload(payload: &Value, expiry: String, all_expiries: Vec<String>) -> Self {
        let records_section = payload.get("records");

        let records: Vec<StrikeRecord> = records_section
            .and_then(|r| r.get("data"))
            .and_then(Value::as_array)
            .map(|data| data.iter().filter_map(StrikeRecord::from_raw).collect())
            .unwrap_or_default();

        // Legs repeat the underlying when the records header omits it
        let underlying_value = records_section
            .and_then(|r| r.number(Field::UnderlyingValue))
            .or_else(|| {
                records.iter().find_map(|r| {
                    r.call
                        .as_ref()
                        .and_then(|l| l.number(Field::UnderlyingValue))
                        .or_else(|| r.put.as_ref().and_then(|l| l.number(Field::UnderlyingValue)))
                })
            });

        let timestamp = records_section
            .and_then(|r| r.get("timestamp"))
            .and_then(Value::as_str)
            .map(str::to_string);

        OptionChainSnapshot {
            expiry,
            all_expiries,
            underlying_value,
            timestamp,
            records,
        }
    }
}

/// Correlation outcome attached to a mover row
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OptionChainResult {
    Resolved {
        chain: OptionChainSnapshot,
        side: OptionSide,
        nearest_strikes: Vec<RankedStrike>,
    },
    Failed {
        kind: ErrorKind,
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        expiry: Option<String>,
    },
}

impl OptionChainResult {
    pub fn failed(error: &ScanError, expiry: Option<String>) -> Self {
        OptionChainResult::Failed {
            kind: error.kind(),
            error: error.to_string(),
            expiry,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, OptionChainResult::Resolved { .. })
    }

    /// Expiry the result refers to, recorded on failures too when known
    pub fn expiry(&self) -> Option<&str> {
        match self {
            OptionChainResult::Resolved { chain, .. } => Some(&chain.expiry),
            OptionChainResult::Failed { expiry, .. } => expiry.as_deref(),
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            OptionChainResult::Failed { kind, .. } => Some(*kind),
            OptionChainResult::Resolved { .. } => None,
        }
    }
}
