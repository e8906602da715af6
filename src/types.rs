/// Core type definitions for the movers scanner
use serde::{Deserialize, Serialize};
use std::fmt;

/// Movers list requested from the live-analysis endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoverCategory {
    Gainers,
    Losers,
}

impl MoverCategory {
    pub fn as_str(&self) -> &str {
        match self {
            MoverCategory::Gainers => "gainers",
            MoverCategory::Losers => "losers",
        }
    }

    /// Value of the `index` query parameter. NSE spells losers "loosers".
    pub fn index_param(&self) -> &str {
        match self {
            MoverCategory::Gainers => "gainers",
            MoverCategory::Losers => "loosers",
        }
    }

    /// Session extreme a mover's open is compared against
    pub fn extreme(&self) -> Extreme {
        match self {
            MoverCategory::Gainers => Extreme::Low,
            MoverCategory::Losers => Extreme::High,
        }
    }

    /// Option leg correlated with this category's movers
    pub fn option_side(&self) -> OptionSide {
        match self {
            MoverCategory::Gainers => OptionSide::CE,
            MoverCategory::Losers => OptionSide::PE,
        }
    }
}

impl fmt::Display for MoverCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Option side (Call or Put)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionSide {
    CE,  // Call
    PE,  // Put
}

impl OptionSide {
    /// Key of this leg inside an option-chain strike record
    pub fn as_str(&self) -> &str {
        match self {
            OptionSide::CE => "CE",
            OptionSide::PE => "PE",
        }
    }
}

/// Session extreme an opening price can coincide with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Extreme {
    Low,
    High,
}

/// Configuration for the scanner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Upstream
    pub base_url: String,
    pub request_timeout_sec: u64,

    // Rate Limiting
    pub rate_limit_requests: u32,
    pub rate_limit_interval_ms: u64,
    pub max_concurrent_symbols: usize,

    // Browser-like headers sent with every request
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    pub referer: String,

    // Logging
    pub log_level: String,
    /// "text" or "json"
    pub log_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: "https://www.nseindia.com".to_string(),
            request_timeout_sec: 30,
            rate_limit_requests: 1,
            rate_limit_interval_ms: 300,
            max_concurrent_symbols: 1,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            accept: "application/json".to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            referer: "https://www.nseindia.com/".to_string(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_sec)
    }

    pub fn rate_limit_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.rate_limit_interval_ms)
    }

    /// Base URL without a trailing slash, ready for path concatenation
    pub fn api_root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
