pub mod client;
pub mod session;

pub use client::{expiry_dates, NseClient};
pub use session::Session;
