//! # Trail Import Shared
//!
//! Types shared by the pipeline crate and its callers in the archive
//! importer: the unit of work ([`ArchiveDescriptor`]), the completion marker
//! ([`WorkLogEntry`]) and the opaque extracted payload ([`EventRecord`]).

pub mod types;

pub use types::{normalize_fingerprint, ArchiveDescriptor, EventRecord, WorkLogEntry};
