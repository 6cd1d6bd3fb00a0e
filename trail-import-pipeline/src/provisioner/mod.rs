//! Index provisioner.
//!
//! Makes sure the work-log and event indexes exist before any archive is
//! touched.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use crate::errors::PipelineError;
use trail_import_repository::opensearch::{event_index_settings, work_index_settings};
use trail_import_repository::IndexStore;

/// What provisioning did for one index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The index was already there, or another creator won the race.
    Existing,
    /// This run created it.
    Created,
}

/// Creates the importer's indexes when they are missing.
pub struct IndexProvisioner {
    store: Arc<dyn IndexStore>,
}

impl IndexProvisioner {
    /// Create a provisioner over the given index store.
    pub fn new(store: Arc<dyn IndexStore>) -> Self {
        Self { store }
    }

    /// Ensure both indexes exist, handling them concurrently.
    ///
    /// Any failure other than losing a creation race aborts the run.
    #[instrument(skip(self))]
    pub async fn ensure_indexes(
        &self,
        work_index: &str,
        event_index: &str,
    ) -> Result<(ProvisionOutcome, ProvisionOutcome), PipelineError> {
        let outcomes = tokio::try_join!(
            self.ensure_index(work_index, work_index_settings()),
            self.ensure_index(event_index, event_index_settings()),
        )?;

        info!("Indexes ready");
        Ok(outcomes)
    }

    async fn ensure_index(
        &self,
        name: &str,
        settings: Value,
    ) -> Result<ProvisionOutcome, PipelineError> {
        let exists = self.store.index_exists(name).await.map_err(|e| {
            error!(index = %name, error = %e, "Index existence check failed");
            PipelineError::provision(format!("checking {}: {}", name, e))
        })?;

        if exists {
            debug!(index = %name, "Index exists");
            return Ok(ProvisionOutcome::Existing);
        }

        info!(index = %name, "Creating index");
        match self.store.create_index(name, &settings).await {
            Ok(()) => Ok(ProvisionOutcome::Created),
            Err(e) if e.is_already_exists() => {
                info!(index = %name, "Index was created concurrently");
                Ok(ProvisionOutcome::Existing)
            }
            Err(e) => {
                error!(index = %name, error = %e, "Index creation failed");
                Err(PipelineError::provision(format!("creating {}: {}", name, e)))
            }
        }
    }
}
