/// "Opened at extreme" predicate for option legs
///
/// The option-chain-v3 payload usually carries `lastPrice` and `change` but no
/// open/low/high. When explicit fields are missing the open is derived as
/// `lastPrice - change`, and a non-negative change is taken to mean the open
/// was the session low.
///
/// This is an APPROXIMATION, not an equality test: a leg that traded below its
/// open and then recovered also reports a non-negative change and is counted
/// as opened-at-low. The `High` side mirrors it with a non-positive change.
use crate::data::fields::{Field, FieldSource};
use crate::types::Extreme;

/// Explicit open, else `lastPrice - change` when both are numeric
pub fn derived_open<L: FieldSource + ?Sized>(leg: &L) -> Option<f64> {
    leg.number(Field::Open).or_else(|| {
        let last = leg.number(Field::TradedPrice)?;
        let change = leg.number(Field::Change)?;
        Some(last - change)
    })
}

/// Explicit session low, else the derived open
pub fn display_low<L: FieldSource + ?Sized>(leg: &L) -> Option<f64> {
    leg.number(Field::Low).or_else(|| derived_open(leg))
}

fn extreme_field(extreme: Extreme) -> Field {
    match extreme {
        Extreme::Low => Field::Low,
        Extreme::High => Field::High,
    }
}

pub fn opened_at_extreme<L: FieldSource + ?Sized>(leg: &L, extreme: Extreme) -> bool {
    let bound = leg.number(extreme_field(extreme));

    // Exact path: both explicit fields present
    if let (Some(open), Some(bound)) = (leg.number(Field::Open), bound) {
        return open == bound;
    }

    let Some(open) = derived_open(leg) else {
        return false;
    };

    // Approximation path
    if let Some(change) = leg.number(Field::Change) {
        let monotonic = match extreme {
            Extreme::Low => change >= 0.0,
            Extreme::High => change <= 0.0,
        };
        if monotonic {
            return true;
        }
    }

    bound.map(|bound| open == bound).unwrap_or(false)
}

/// Shorthand for the low side used by the movers report
pub fn opened_at_low<L: FieldSource + ?Sized>(leg: &L) -> bool {
    opened_at_extreme(leg, Extreme::Low)
}
