//! Object-store error types.

use thiserror::Error;

/// Errors that can occur while talking to the object store.
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    /// The client could not be configured.
    #[error("Storage configuration error: {0}")]
    ConfigError(String),

    /// A listing page request failed.
    #[error("List error: {0}")]
    ListError(String),

    /// Opening an object for reading failed.
    #[error("Fetch error for {key}: {message}")]
    FetchError { key: String, message: String },

    /// The object body failed mid-stream.
    #[error("Stream error for {key}: {message}")]
    StreamError { key: String, message: String },
}

impl StorageError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a list error.
    pub fn list(msg: impl Into<String>) -> Self {
        Self::ListError(msg.into())
    }

    /// Create a fetch error.
    pub fn fetch(key: &str, msg: impl Into<String>) -> Self {
        Self::FetchError {
            key: key.to_string(),
            message: msg.into(),
        }
    }

    /// Create a stream error.
    pub fn stream(key: &str, msg: impl Into<String>) -> Self {
        Self::StreamError {
            key: key.to_string(),
            message: msg.into(),
        }
    }
}
