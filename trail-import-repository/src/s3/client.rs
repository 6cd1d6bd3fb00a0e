//! S3 object store backed by the AWS SDK.

use async_trait::async_trait;
use aws_config::{timeout::TimeoutConfig, BehaviorVersion};
use aws_sdk_s3::{
    config::{Credentials, Region},
    error::DisplayErrorContext,
    primitives::ByteStream,
    Client,
};
use futures::stream;
use tracing::{debug, info, instrument, warn};

use crate::config::{S3Config, MAX_LIST_PAGE_SIZE};
use crate::errors::StorageError;
use crate::interfaces::{ByteChunkStream, ObjectStore};
use crate::types::{ObjectListing, ObjectSummary};

/// Object store reading archives from S3.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    page_size: i32,
}

impl S3ObjectStore {
    /// Build a client from configuration.
    ///
    /// Static credentials are used when both keys are configured; otherwise
    /// the SDK's default provider chain resolves them.
    pub async fn new(config: &S3Config) -> Result<Self, StorageError> {
        if !(1..=MAX_LIST_PAGE_SIZE).contains(&config.page_size) {
            return Err(StorageError::config(format!(
                "page size must be between 1 and {}, got {}",
                MAX_LIST_PAGE_SIZE, config.page_size
            )));
        }

        let timeouts = TimeoutConfig::builder()
            .operation_timeout(config.operation_timeout)
            .build();

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .timeout_config(timeouts);

        if let Some((access_key, secret_key)) = config.static_credentials() {
            let credentials = Credentials::new(access_key, secret_key, None, None, "trail-import");
            loader = loader.credentials_provider(credentials);
        } else {
            warn!("Static S3 credentials not set, using the default provider chain");
        }

        let sdk_config = loader.load().await;
        let mut s3_config = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint {
            s3_config = s3_config.endpoint_url(endpoint).force_path_style(true);
        }

        info!(
            region = %config.region,
            endpoint = ?config.endpoint,
            page_size = config.page_size,
            "S3 client initialized"
        );

        Ok(Self::from_client(
            Client::from_conf(s3_config.build()),
            config.page_size,
        ))
    }

    /// Wrap an already configured SDK client.
    pub fn from_client(client: Client, page_size: i32) -> Self {
        Self { client, page_size }
    }
}

fn body_stream(key: String, body: ByteStream) -> ByteChunkStream {
    Box::pin(stream::unfold(Some(body), move |state| {
        let key = key.clone();
        async move {
            let mut body = state?;
            match body.next().await? {
                Ok(chunk) => Some((Ok(chunk), Some(body))),
                // Stop after the first error so consumers never see data past it.
                Err(e) => Some((Err(StorageError::stream(&key, e.to_string())), None)),
            }
        }
    }))
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    #[instrument(skip(self))]
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        marker: Option<&str>,
    ) -> Result<ObjectListing, StorageError> {
        let response = self
            .client
            .list_objects()
            .bucket(bucket)
            .prefix(prefix)
            .max_keys(self.page_size)
            .set_marker(marker.map(str::to_string))
            .send()
            .await
            .map_err(|e| StorageError::list(DisplayErrorContext(&e).to_string()))?;

        let mut items = Vec::with_capacity(response.contents().len());
        for object in response.contents() {
            match (object.key(), object.e_tag()) {
                (Some(key), Some(etag)) => items.push(ObjectSummary::new(key, etag)),
                (key, _) => warn!(key = ?key, "Skipping listed object without key or ETag"),
            }
        }

        let is_truncated = response.is_truncated().unwrap_or(false);
        debug!(
            count = items.len(),
            is_truncated,
            "Fetched listing page"
        );

        Ok(ObjectListing {
            items,
            is_truncated,
        })
    }

    #[instrument(skip(self))]
    async fn get_object_stream(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<ByteChunkStream, StorageError> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::fetch(key, DisplayErrorContext(&e).to_string()))?;

        Ok(body_stream(key.to_string(), response.body))
    }
}
