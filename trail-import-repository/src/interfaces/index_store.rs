//! Index store trait definition.
//!
//! This module defines the abstract interface for the index-store operations
//! the importer needs, allowing for different backend implementations
//! (OpenSearch, Elasticsearch, in-memory fakes).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchError;
use crate::types::{BulkOperation, BulkResponse};

/// Abstract interface for index-store operations.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`; one instance is shared by every
/// worker of the pool.
///
/// # Error Handling
///
/// "Not found" is never an error: lookups report it through their return
/// value so callers do not have to inspect error messages.
#[async_trait]
pub trait IndexStore: Send + Sync {
    /// Check whether an index exists.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` / `Ok(false)` - Index present or absent
    /// * `Err(SearchError)` - If the check could not be performed
    async fn index_exists(&self, name: &str) -> Result<bool, SearchError>;

    /// Create an index with the given settings/mappings body.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index was created
    /// * `Err(SearchError::IndexAlreadyExists)` - If another creator won the race
    /// * `Err(SearchError)` - Any other failure
    async fn create_index(&self, name: &str, body: &Value) -> Result<(), SearchError>;

    /// Check whether a document exists.
    ///
    /// A missing document and a missing index both yield `Ok(false)`.
    async fn document_exists(&self, index: &str, id: &str) -> Result<bool, SearchError>;

    /// Submit several index actions in a single request.
    ///
    /// # Returns
    ///
    /// * `Ok(BulkResponse)` - The request reached the store; inspect items for
    ///   per-action failures
    /// * `Err(SearchError)` - Transport or server failure for the whole request
    async fn bulk_write(&self, operations: &[BulkOperation]) -> Result<BulkResponse, SearchError>;

    /// Delete a document. Deleting a missing document succeeds.
    async fn delete_document(&self, index: &str, id: &str) -> Result<(), SearchError>;

    /// Check if the index store is healthy and reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the cluster is healthy
    /// * `Ok(false)` - If the cluster is unhealthy
    /// * `Err(SearchError)` - If the health check fails to execute
    async fn health_check(&self) -> Result<bool, SearchError>;
}
