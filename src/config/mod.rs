pub mod loader;

pub use loader::{load_config, save_default_config, validate_config};
