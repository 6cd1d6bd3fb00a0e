//! Processor module for the import pipeline.
//!
//! Turns an archive object into the event records it carries.

mod archive_processor;

pub use archive_processor::{extract_records, ArchiveProcessor, GzipAccumulator};
