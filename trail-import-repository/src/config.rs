//! Configuration types for the store clients.

use std::time::Duration;

/// Default per-request timeout for both stores.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest page S3 will return from a single listing request.
pub const MAX_LIST_PAGE_SIZE: i32 = 1000;

/// Configuration for the OpenSearch client.
#[derive(Debug, Clone)]
pub struct OpenSearchConfig {
    /// Base URL, e.g. `http://localhost:9200`.
    pub url: String,
    /// Timeout applied to every request sent through the transport.
    pub request_timeout: Duration,
}

impl OpenSearchConfig {
    /// Create a config for the given URL with the default timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Override the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Configuration for the S3 object store.
#[derive(Clone)]
pub struct S3Config {
    /// Bucket region.
    pub region: String,
    /// Optional endpoint override for S3-compatible stores.
    pub endpoint: Option<String>,
    /// Static access key; the default credential chain is used when absent.
    pub access_key: Option<String>,
    /// Static secret key; the default credential chain is used when absent.
    pub secret_key: Option<String>,
    /// Objects requested per listing page.
    pub page_size: i32,
    /// Timeout for a whole SDK operation, retries included.
    pub operation_timeout: Duration,
}

impl S3Config {
    /// Create a config for the given region with default settings.
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            endpoint: None,
            access_key: None,
            secret_key: None,
            page_size: MAX_LIST_PAGE_SIZE,
            operation_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Static credentials, used only when both halves are present.
    pub fn static_credentials(&self) -> Option<(&str, &str)> {
        match (&self.access_key, &self.secret_key) {
            (Some(access), Some(secret)) => Some((access.as_str(), secret.as_str())),
            _ => None,
        }
    }
}

// Keep secrets out of debug logs.
impl std::fmt::Debug for S3Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Config")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("static_credentials", &self.static_credentials().is_some())
            .field("page_size", &self.page_size)
            .field("operation_timeout", &self.operation_timeout)
            .finish()
    }
}
