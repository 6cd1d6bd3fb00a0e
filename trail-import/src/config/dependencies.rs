//! Dependency initialization and wiring for the importer.

use std::sync::Arc;
use tracing::info;

use crate::config::ImportConfig;
use crate::ImportError;
use trail_import_pipeline::Orchestrator;
use trail_import_repository::{IndexStore, OpenSearchClient, S3ObjectStore};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Build both store clients and wire them into an orchestrator.
    ///
    /// The OpenSearch cluster must be reachable and not red before any
    /// archive is listed.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(ImportError)` - If a client cannot be built or the cluster is unhealthy
    pub async fn new(config: &ImportConfig) -> Result<Self, ImportError> {
        info!(
            opensearch_url = %config.opensearch.url,
            bucket = %config.pipeline.bucket,
            prefix = %config.pipeline.prefix,
            region = %config.s3.region,
            "Initializing dependencies"
        );

        let search_client = OpenSearchClient::new(&config.opensearch)
            .map_err(|e| ImportError::config(format!("Failed to create OpenSearch client: {}", e)))?;

        let healthy = search_client
            .health_check()
            .await
            .map_err(|e| ImportError::config(format!("OpenSearch health check failed: {}", e)))?;

        if !healthy {
            return Err(ImportError::config("OpenSearch cluster is unhealthy"));
        }

        info!("OpenSearch connection verified");

        let object_store = S3ObjectStore::new(&config.s3).await?;

        info!("S3 client created");

        let orchestrator = Orchestrator::new(
            config.pipeline.clone(),
            Arc::new(search_client),
            Arc::new(object_store),
        );

        Ok(Self { orchestrator })
    }
}
