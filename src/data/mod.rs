pub mod fields;
pub mod movers;

pub use fields::{coerce_f64, Field, FieldSource, FieldValue, UNAVAILABLE};
pub use movers::{
    extract_rows, filter_open_at_extreme, filter_open_equals_high, filter_open_equals_low,
    MoverRow,
};
