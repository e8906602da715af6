/// Configuration loading: optional TOML file layered under FNOSCAN_* env vars
use std::path::Path;
use crate::error::{Result, ScanError};
use crate::types::Config;

pub const ENV_PREFIX: &str = "FNOSCAN";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let settings = config::Config::builder()
        .add_source(
            config::File::from(path.as_ref())
                .format(config::FileFormat::Toml)
                .required(false),
        )
        .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()
        .map_err(|e| ScanError::ConfigError(format!("Failed to read config: {}", e)))?;

    let config: Config = settings
        .try_deserialize()
        .map_err(|e| ScanError::ConfigError(format!("Failed to parse config: {}", e)))?;

    // Validate config
    validate_config(&config)?;

    Ok(config)
}

/// Write the default configuration as a TOML template. An existing file is
/// left untouched.
pub fn save_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Err(ScanError::ConfigError(format!(
            "{} already exists, refusing to overwrite",
            path.display()
        )));
    }

    let content = toml::to_string_pretty(&Config::default())
        .map_err(|e| ScanError::ConfigError(format!("Failed to render config: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn validate_config(config: &Config) -> Result<()> {
    if config.base_url.trim().is_empty() {
        return Err(ScanError::ConfigError("base_url is empty".to_string()));
    }

    if config.request_timeout_sec == 0 {
        return Err(ScanError::ConfigError("request_timeout_sec must be > 0".to_string()));
    }

    // Rate limiter must admit at least one request per interval
    if config.rate_limit_requests == 0 {
        return Err(ScanError::ConfigError("rate_limit_requests must be > 0".to_string()));
    }

    if config.max_concurrent_symbols == 0 {
        return Err(ScanError::ConfigError("max_concurrent_symbols must be > 0".to_string()));
    }

    if !matches!(config.log_format.as_str(), "text" | "json") {
        return Err(ScanError::ConfigError(
            format!("Invalid log_format: {} (expected text or json)", config.log_format)
        ));
    }

    Ok(())
}
