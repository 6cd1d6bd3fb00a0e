//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `IndexStore`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    cluster::ClusterHealthParts,
    http::request::JsonBody,
    http::response::Response,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts},
    BulkParts, DeleteParts, ExistsParts, OpenSearch,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::config::OpenSearchConfig;
use crate::errors::SearchError;
use crate::interfaces::IndexStore;
use crate::opensearch::bulk::{build_bulk_body, parse_bulk_response};
use crate::types::{BulkOperation, BulkResponse};

/// Port assumed when the configured URL does not name one.
pub const DEFAULT_PORT: u16 = 9200;

/// OpenSearch client implementation.
///
/// # Example
///
/// ```ignore
/// let config = OpenSearchConfig::new("http://localhost:9200");
/// let client = OpenSearchClient::new(&config)?;
///
/// if !client.index_exists("cloudtrail").await? {
///     client.create_index("cloudtrail", &event_index_settings()).await?;
/// }
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client for the configured URL.
    ///
    /// The configured request timeout is applied to every request.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchError)` - If the URL is invalid or transport setup fails
    pub fn new(config: &OpenSearchConfig) -> Result<Self, SearchError> {
        let parsed_url = normalize_url(&config.url)?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url.clone());
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %parsed_url,
            timeout_secs = config.request_timeout.as_secs(),
            "Created OpenSearch client"
        );

        Ok(Self { client })
    }

    async fn error_body(response: Response) -> String {
        response.text().await.unwrap_or_default()
    }
}

/// Parse the configured URL, defaulting the port to 9200 when none is given.
///
/// An explicitly written port is kept even when it is the scheme default
/// (e.g. `https://host:443`).
pub fn normalize_url(raw: &str) -> Result<Url, SearchError> {
    let mut url = Url::parse(raw)
        .map_err(|e| SearchError::connection(format!("Invalid OpenSearch URL {}: {}", raw, e)))?;

    if url.host_str().is_none() {
        return Err(SearchError::connection(format!(
            "OpenSearch URL has no host: {}",
            raw
        )));
    }

    if !authority_has_port(raw) {
        url.set_port(Some(DEFAULT_PORT))
            .map_err(|_| SearchError::connection(format!("Cannot set port on URL: {}", raw)))?;
    }

    Ok(url)
}

fn authority_has_port(raw: &str) -> bool {
    let rest = raw.split_once("://").map(|(_, rest)| rest).unwrap_or(raw);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map(|(_, hp)| hp).unwrap_or(authority);

    // IPv6 literals are bracketed; only a colon after the bracket is a port.
    let tail = match host_port.rfind(']') {
        Some(end) => &host_port[end + 1..],
        None => host_port,
    };

    tail.rsplit_once(':')
        .map(|(_, port)| !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

fn is_already_exists(body: &Value) -> bool {
    body["error"]["type"].as_str() == Some("resource_already_exists_exception")
}

#[async_trait]
impl IndexStore for OpenSearchClient {
    #[instrument(skip(self))]
    async fn index_exists(&self, name: &str) -> Result<bool, SearchError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[name]))
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => {
                let body = Self::error_body(response).await;
                error!(status, body = %body, "Index existence check failed");
                Err(SearchError::query(format!(
                    "Existence check for {} failed with status {}: {}",
                    name, status, body
                )))
            }
        }
    }

    #[instrument(skip(self, body))]
    async fn create_index(&self, name: &str, body: &Value) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(name))
            .body(body.clone())
            .send()
            .await
            .map_err(|e| SearchError::index_creation(e.to_string()))?;

        let status = response.status_code();
        if status.is_success() {
            info!(index = %name, "Created index");
            return Ok(());
        }

        let text = Self::error_body(response).await;
        let parsed: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
        if is_already_exists(&parsed) {
            debug!(index = %name, "Index created concurrently");
            return Err(SearchError::IndexAlreadyExists(name.to_string()));
        }

        error!(status = %status, body = %text, "Create index request failed");
        Err(SearchError::index_creation(format!(
            "Creating {} failed with status {}: {}",
            name, status, text
        )))
    }

    #[instrument(skip(self))]
    async fn document_exists(&self, index: &str, id: &str) -> Result<bool, SearchError> {
        let response = self
            .client
            .exists(ExistsParts::IndexId(index, id))
            .send()
            .await
            .map_err(|e| SearchError::query(e.to_string()))?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            // HEAD carries no body, so a missing index and a missing document
            // look the same. Both mean "not processed yet".
            404 => Ok(false),
            status => Err(SearchError::query(format!(
                "Lookup of {}/{} failed with status {}",
                index, id, status
            ))),
        }
    }

    #[instrument(skip(self, operations), fields(operation_count = operations.len()))]
    async fn bulk_write(&self, operations: &[BulkOperation]) -> Result<BulkResponse, SearchError> {
        if operations.is_empty() {
            return Ok(BulkResponse::default());
        }

        let body: Vec<JsonBody<Value>> = build_bulk_body(operations)
            .into_iter()
            .map(Into::into)
            .collect();

        let response = self
            .client
            .bulk(BulkParts::None)
            .body(body)
            .send()
            .await
            .map_err(|e| SearchError::bulk_index(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let text = Self::error_body(response).await;
            error!(status = %status, body = %text, "Bulk request failed");
            return Err(SearchError::bulk_index(format!(
                "Bulk request failed with status {}: {}",
                status, text
            )));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        parse_bulk_response(json)
    }

    #[instrument(skip(self))]
    async fn delete_document(&self, index: &str, id: &str) -> Result<(), SearchError> {
        let response = self
            .client
            .delete(DeleteParts::IndexId(index, id))
            .send()
            .await
            .map_err(|e| SearchError::delete(e.to_string()))?;

        let status = response.status_code();

        // 404 is acceptable - document may not exist
        if !status.is_success() && status.as_u16() != 404 {
            let text = Self::error_body(response).await;
            error!(status = %status, body = %text, "Delete request failed");
            return Err(SearchError::delete(format!(
                "Delete failed with status {}: {}",
                status, text
            )));
        }

        debug!(index = %index, id = %id, "Document deleted");
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            return Ok(false);
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        let status = json["status"].as_str().unwrap_or("red");
        debug!(status = %status, "Cluster health");
        Ok(matches!(status, "green" | "yellow"))
    }
}
