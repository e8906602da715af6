/// Centralized error types for the movers scanner
use serde::Serialize;
use thiserror::Error;

use crate::types::MoverCategory;

/// Upstream response bodies are kept for diagnostics, capped at this many bytes
pub const BODY_SNIPPET_LIMIT: usize = 500;

#[derive(Error, Debug)]
pub enum ScanError {
    // Network Errors
    #[error("Failed to fetch data: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}")]
    Http { status: u16, body: String },

    #[error("Invalid JSON response: {message}")]
    Decode { message: String, body: String },

    // Correlation Errors
    #[error("No symbol on mover row")]
    NoSymbol,

    #[error("No expiry dates for {0}")]
    NoExpiryDates(String),

    #[error("Empty expiry selection for {0}")]
    EmptyExpirySelection(String),

    // Pipeline Errors
    #[error("{category} movers unavailable: {source}")]
    MoversUnavailable {
        category: MoverCategory,
        #[source]
        source: Box<ScanError>,
    },

    // Configuration Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // File I/O Errors
    #[error("File I/O error: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;

/// Serializable failure classification attached to per-row results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    TransportError,
    HttpError,
    DecodeError,
    NoSymbol,
    NoExpiryDates,
    EmptyExpirySelection,
    ConfigError,
    IoError,
}

/// Top-level `{error, details}` payload handed to presentation on a fatal run
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ScanError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScanError::Transport(_) => ErrorKind::TransportError,
            ScanError::Http { .. } => ErrorKind::HttpError,
            ScanError::Decode { .. } => ErrorKind::DecodeError,
            ScanError::NoSymbol => ErrorKind::NoSymbol,
            ScanError::NoExpiryDates(_) => ErrorKind::NoExpiryDates,
            ScanError::EmptyExpirySelection(_) => ErrorKind::EmptyExpirySelection,
            ScanError::MoversUnavailable { source, .. } => source.kind(),
            ScanError::ConfigError(_) => ErrorKind::ConfigError,
            ScanError::FileError(_) => ErrorKind::IoError,
            ScanError::SerializationError(_) => ErrorKind::DecodeError,
        }
    }

    /// Errors that abort the whole run instead of degrading a single row
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ScanError::MoversUnavailable { .. } | ScanError::ConfigError(_)
        )
    }

    /// Get error code for logging/monitoring
    pub fn error_code(&self) -> &str {
        match self {
            ScanError::Transport(_) => "NET_001",
            ScanError::Http { .. } => "NET_002",
            ScanError::Decode { .. } => "DATA_001",
            ScanError::NoSymbol => "CHAIN_001",
            ScanError::NoExpiryDates(_) => "CHAIN_002",
            ScanError::EmptyExpirySelection(_) => "CHAIN_003",
            ScanError::MoversUnavailable { .. } => "MOVERS_001",
            ScanError::ConfigError(_) => "CFG_001",
            ScanError::FileError(_) => "FILE_001",
            ScanError::SerializationError(_) => "DATA_002",
        }
    }

    /// Diagnostic detail beyond the message: the truncated upstream body or
    /// the transport cause
    pub fn details(&self) -> Option<String> {
        match self {
            ScanError::Http { body, .. } | ScanError::Decode { body, .. } => {
                if body.is_empty() {
                    None
                } else {
                    Some(body.clone())
                }
            }
            ScanError::Transport(e) => {
                let kind = if e.is_timeout() {
                    "timeout"
                } else if e.is_connect() {
                    "connect"
                } else {
                    "request"
                };
                Some(format!("{} error: {}", kind, e))
            }
            ScanError::MoversUnavailable { source, .. } => source.details(),
            _ => None,
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            error: self.to_string(),
            details: self.details(),
        }
    }
}

/// Cut an upstream body down to `BODY_SNIPPET_LIMIT` bytes on a char boundary
pub fn truncate_body(body: &str) -> String {
    if body.len() <= BODY_SNIPPET_LIMIT {
        return body.to_string();
    }
    let mut end = BODY_SNIPPET_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body[..end].to_string()
}
