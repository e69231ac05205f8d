use std::io;
use thiserror::Error;

/// Custom error type for the exporter
#[derive(Error, Debug)]
pub enum ExporterError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Device at {url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Malformed JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Invalid field {path}: {reason}")]
    InvalidField { path: String, reason: String },

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Result type alias for the exporter
pub type Result<T> = std::result::Result<T, ExporterError>;

impl ExporterError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        ExporterError::Config(msg.into())
    }

    /// Create a missing field error for a dotted JSON path
    pub fn missing_field<S: Into<String>>(path: S) -> Self {
        ExporterError::MissingField(path.into())
    }

    pub fn invalid_field<P: Into<String>, R: Into<String>>(path: P, reason: R) -> Self {
        ExporterError::InvalidField {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
