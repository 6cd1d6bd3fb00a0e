//! # Trail Import Pipeline
//!
//! This crate provides the pipeline that imports gzip-compressed audit-log
//! archives from an object store into an index store, at most once per
//! archive across runs.
//!
//! ## Architecture
//!
//! 1. **Provisioner**: Ensures the work-log and event indexes exist
//! 2. **Lister**: Enumerates every archive under the prefix, page by page
//! 3. **Worker pool**: N workers drain the archive queue; per archive:
//!    - **Dedup gate**: Skips archives already recorded in the work-log
//!    - **Processor**: Streams, decompresses and extracts the records
//!    - **Loader**: Writes records plus the completion marker in one bulk request
//! 4. **Orchestrator**: Runs the stages in order and reports a summary

pub mod config;
pub mod dedup;
pub mod errors;
pub mod lister;
pub mod loader;
pub mod orchestrator;
pub mod processor;
pub mod provisioner;
pub mod summary;
pub mod worker;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::PipelineConfig;
pub use errors::{ArchiveError, PipelineError};
pub use orchestrator::Orchestrator;
pub use summary::{ArchiveOutcome, RunSummary};
