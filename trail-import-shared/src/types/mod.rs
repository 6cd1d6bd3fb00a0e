//! Core data types for the archive importer.

mod archive;
mod event_record;
mod work_log;

pub use archive::{normalize_fingerprint, ArchiveDescriptor};
pub use event_record::EventRecord;
pub use work_log::WorkLogEntry;
