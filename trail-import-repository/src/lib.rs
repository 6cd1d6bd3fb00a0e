//! # Trail Import Repository
//!
//! This crate provides the collaborator interfaces the import pipeline talks
//! to, plus concrete implementations: OpenSearch as the index store and S3 as
//! the object store. It includes definitions for errors, request/response
//! types, and index mappings.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod s3;
pub mod types;

pub use config::{OpenSearchConfig, S3Config};
pub use errors::{SearchError, StorageError};
pub use interfaces::{ByteChunkStream, IndexStore, ObjectStore};
pub use opensearch::OpenSearchClient;
pub use s3::S3ObjectStore;
pub use types::{BulkItemOutcome, BulkOperation, BulkResponse, ObjectListing, ObjectSummary};
