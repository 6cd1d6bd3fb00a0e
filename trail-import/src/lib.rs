//! # Trail Import
//!
//! Main library for the CloudTrail archive importer.
//!
//! This crate provides the command line, logging setup and dependency
//! wiring for running the import pipeline once.

pub mod config;
pub mod logging;

pub use config::{Cli, Dependencies, ImportConfig};

use thiserror::Error;

/// Errors that can occur during importer initialization or execution.
#[derive(Error, Debug)]
pub enum ImportError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] trail_import_pipeline::PipelineError),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] trail_import_repository::SearchError),

    /// Storage error.
    #[error("Storage error: {0}")]
    StorageError(#[from] trail_import_repository::StorageError),
}

impl ImportError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
