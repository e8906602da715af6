/// Field resolution across NSE payload shapes
///
/// Different NSE endpoints and API revisions name the same quantity
/// differently (`open_price`, `openPrice`, `open`). Each logical field owns
/// one ordered list of candidate keys; lookups always go through
/// [`FieldSource::resolve`] so the fallback order lives in one place.
use serde_json::{Map, Value};

/// Placeholder shown for values the payload does not carry
pub const UNAVAILABLE: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Symbol,
    DisplayName,
    Open,
    Low,
    High,
    LastPrice,
    PercentChange,
    Change,
    TradedPrice,
    OptionLastPrice,
    StrikePrice,
    UnderlyingValue,
}

impl Field {
    /// Candidate keys, most specific first
    pub fn candidates(&self) -> &'static [&'static str] {
        match self {
            Field::Symbol => &["symbol", "Symbol", "symbolFull"],
            Field::DisplayName => &["identifier", "companyName", "series", "symbol"],
            Field::Open => &["open_price", "openPrice", "open"],
            Field::Low => &["low_price", "lowPrice", "low"],
            Field::High => &["high_price", "highPrice", "high"],
            Field::LastPrice => &["ltp", "lastPrice", "ltP", "last", "close"],
            Field::PercentChange => &["pChange", "perChange", "percentChange"],
            Field::Change => &["change"],
            Field::TradedPrice => &["lastPrice"],
            Field::OptionLastPrice => &["lastPrice", "sellPrice1", "buyPrice1"],
            Field::StrikePrice => &["strikePrice"],
            Field::UnderlyingValue => &["underlyingValue"],
        }
    }
}

/// Outcome of resolving a field: the first non-null candidate, or nothing
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Present(&'a Value),
    Unavailable,
}

impl<'a> FieldValue<'a> {
    pub fn is_available(&self) -> bool {
        matches!(self, FieldValue::Present(_))
    }

    /// Numeric view; non-numeric values count as unavailable
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Present(value) => coerce_f64(value),
            FieldValue::Unavailable => None,
        }
    }

    /// Textual view with strings returned verbatim
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Present(Value::String(s)) => Some(s.clone()),
            FieldValue::Present(value) => Some(value.to_string()),
            FieldValue::Unavailable => None,
        }
    }

    pub fn display(&self) -> String {
        self.as_text().unwrap_or_else(|| UNAVAILABLE.to_string())
    }
}

/// Convert a JSON number or numeric string to f64
pub fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Anything keyed like a JSON object
pub trait FieldSource {
    fn raw(&self, key: &str) -> Option<&Value>;

    fn resolve(&self, field: Field) -> FieldValue<'_> {
        field
            .candidates()
            .iter()
            .filter_map(|key| self.raw(key))
            .find(|value| !value.is_null())
            .map(FieldValue::Present)
            .unwrap_or(FieldValue::Unavailable)
    }

    fn number(&self, field: Field) -> Option<f64> {
        self.resolve(field).as_f64()
    }

    fn text(&self, field: Field) -> Option<String> {
        self.resolve(field).as_text()
    }
}

impl FieldSource for Map<String, Value> {
    fn raw(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

impl FieldSource for Value {
    fn raw(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}
