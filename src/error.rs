use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unknown location: {0}")]
    UnknownLocation(String),

    #[error("No weather data available for {location}")]
    DataAbsent { location: String },

    #[error("Weather service rejected the API key (HTTP 401) for {location}")]
    Unauthorized { location: String },

    #[error("Weather service has no entry for {location} (HTTP 404)")]
    NotFound { location: String },

    #[error("Weather service returned HTTP {status} for {location}")]
    ServiceStatus { location: String, status: u16 },

    #[error("Input out of range: {0}")]
    InputOutOfRange(String),

    #[error("Request for {location} timed out after {timeout:?}")]
    Timeout { location: String, timeout: Duration },

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl ProcessingError {
    /// Errors that only remove one location or one row from a result.
    pub fn is_absence(&self) -> bool {
        matches!(
            self,
            ProcessingError::DataAbsent { .. }
                | ProcessingError::Unauthorized { .. }
                | ProcessingError::NotFound { .. }
                | ProcessingError::ServiceStatus { .. }
                | ProcessingError::Timeout { .. }
                | ProcessingError::Http(_)
                | ProcessingError::Json(_)
                | ProcessingError::InputOutOfRange(_)
        )
    }
}
