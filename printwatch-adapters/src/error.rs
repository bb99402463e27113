//! Error types for adapters.

use thiserror::Error;

/// Errors that can occur when reading from a telemetry source.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Network failure, timeout or non-success HTTP status.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body was malformed or had an unexpected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Database connection or SQL failure.
    #[error("Query failed: {0}")]
    Query(String),

    /// An expected row or resource was absent.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AdapterError {
    /// Short label of the error class, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            AdapterError::Transport(_) => "transport",
            AdapterError::Decode(_) => "decode",
            AdapterError::Query(_) => "query",
            AdapterError::NotFound(_) => "not_found",
        }
    }
}

impl From<printwatch_types::LayerParseError> for AdapterError {
    fn from(err: printwatch_types::LayerParseError) -> Self {
        AdapterError::Decode(err.to_string())
    }
}

#[cfg(feature = "octoprint")]
impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AdapterError::Decode(err.to_string())
        } else if err.is_timeout() {
            AdapterError::Transport(format!("request timed out: {}", err))
        } else {
            AdapterError::Transport(err.to_string())
        }
    }
}

#[cfg(feature = "filament")]
impl From<sqlx::Error> for AdapterError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AdapterError::NotFound("no matching row".to_string()),
            other => AdapterError::Query(other.to_string()),
        }
    }
}
