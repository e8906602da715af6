pub mod session;

pub use session::{is_market_open, is_trading_day, now_ist};
