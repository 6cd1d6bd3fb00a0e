//! Error types for the import pipeline.

use thiserror::Error;
use trail_import_repository::{SearchError, StorageError};

/// Errors that abort a whole run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Invalid pipeline configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An index could not be checked or created.
    #[error("Provision error: {0}")]
    ProvisionError(String),

    /// The archive listing failed; no archive was processed.
    #[error("List error: {0}")]
    ListError(#[from] StorageError),

    /// Error from the index store outside of per-archive work.
    #[error("Search error: {0}")]
    SearchError(#[from] SearchError),
}

impl PipelineError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a provision error.
    pub fn provision(msg: impl Into<String>) -> Self {
        Self::ProvisionError(msg.into())
    }
}

/// Errors confined to a single archive.
///
/// These are logged by the worker and never stop the pool. An archive that
/// failed with any of them has no work-log entry and is retried next run.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// The work-log lookup failed for a reason other than "not found".
    #[error("Work-log lookup failed for {fingerprint}: {source}")]
    LookupError {
        fingerprint: String,
        #[source]
        source: SearchError,
    },

    /// Opening or streaming the object failed.
    #[error("Fetch failed: {0}")]
    FetchError(#[from] StorageError),

    /// The body is not a valid gzip stream.
    #[error("Decompression failed for {key}: {message}")]
    DecompressError { key: String, message: String },

    /// The decompressed body is not a JSON document with a `Records` array.
    #[error("Malformed archive {key}: {message}")]
    MalformedArchive { key: String, message: String },

    /// The bulk request did not reach or was refused by the index store.
    #[error("Bulk write failed for {key}: {source}")]
    WriteError {
        key: String,
        #[source]
        source: SearchError,
    },

    /// The bulk request landed but some of its items were rejected.
    #[error("Bulk write for {key} rejected {failed} of {total} operations")]
    PartialWrite {
        key: String,
        failed: usize,
        total: usize,
    },
}

impl ArchiveError {
    /// Create a lookup error.
    pub fn lookup(fingerprint: &str, source: SearchError) -> Self {
        Self::LookupError {
            fingerprint: fingerprint.to_string(),
            source,
        }
    }

    /// Create a decompression error.
    pub fn decompress(key: &str, msg: impl Into<String>) -> Self {
        Self::DecompressError {
            key: key.to_string(),
            message: msg.into(),
        }
    }

    /// Create a malformed-archive error.
    pub fn malformed(key: &str, msg: impl Into<String>) -> Self {
        Self::MalformedArchive {
            key: key.to_string(),
            message: msg.into(),
        }
    }

    /// Create a write error.
    pub fn write(key: &str, source: SearchError) -> Self {
        Self::WriteError {
            key: key.to_string(),
            source,
        }
    }
}
