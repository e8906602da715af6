pub mod types;
pub mod error;
pub mod config;
pub mod utils;
pub mod time;
pub mod nse;
pub mod data;
pub mod options;
pub mod pipeline;

pub use types::*;
pub use error::{ErrorKind, ErrorReport, Result, ScanError};
pub use pipeline::{MoversPipeline, MoversReport};
