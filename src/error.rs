use std::io;
use thiserror::Error;

/// Failure while turning a device page into a reading
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("expected a number, found '{0}'")]
    NotNumeric(String),
}

/// Custom error type for the supply monitor
#[derive(Error, Debug)]
pub enum SupplyError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Authorization error: {0}")]
    Auth(String),

    #[error("Mail error: {0}")]
    Mail(String),
}

/// Result type alias for the supply monitor
pub type Result<T> = std::result::Result<T, SupplyError>;

impl SupplyError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        SupplyError::Config(msg.into())
    }

    /// Create a browser error
    pub fn browser<S: Into<String>>(msg: S) -> Self {
        SupplyError::Browser(msg.into())
    }

    /// Create an authorization error
    pub fn auth<S: Into<String>>(msg: S) -> Self {
        SupplyError::Auth(msg.into())
    }

    pub fn mail<S: Into<String>>(msg: S) -> Self {
        SupplyError::Mail(msg.into())
    }
}
