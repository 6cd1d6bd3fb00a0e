//! Interface definitions for the store collaborators.
//!
//! The pipeline only talks to these traits, so the OpenSearch and S3 clients
//! can be swapped for in-memory fakes in tests.

mod index_store;
mod object_store;

pub use index_store::IndexStore;
pub use object_store::{ByteChunkStream, ObjectStore};
