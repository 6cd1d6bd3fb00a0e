//! Object store trait definition.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::errors::StorageError;
use crate::types::ObjectListing;

/// A streamed object body, yielded chunk by chunk as it downloads.
pub type ByteChunkStream = BoxStream<'static, Result<Bytes, StorageError>>;

/// Abstract interface for the object store holding the archives.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch one listing page of objects under `prefix`.
    ///
    /// `marker` is the last key of the previous page; the page starts after
    /// it. Page size is a property of the implementation.
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        marker: Option<&str>,
    ) -> Result<ObjectListing, StorageError>;

    /// Open a streaming read of an object body.
    async fn get_object_stream(&self, bucket: &str, key: &str)
        -> Result<ByteChunkStream, StorageError>;
}
