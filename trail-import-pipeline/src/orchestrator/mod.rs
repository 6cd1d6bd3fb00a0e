//! Orchestrator module for the import pipeline.
//!
//! Runs provisioning, listing and the worker pool in order.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, instrument};

use crate::config::PipelineConfig;
use crate::dedup::DedupGate;
use crate::errors::PipelineError;
use crate::lister::ArchiveLister;
use crate::loader::BulkWriter;
use crate::processor::ArchiveProcessor;
use crate::provisioner::IndexProvisioner;
use crate::summary::RunSummary;
use crate::worker::{ArchiveWorker, WorkerPool};
use trail_import_repository::{IndexStore, ObjectStore};

/// Orchestrator that coordinates one import run.
///
/// The orchestrator:
/// - Validates the configuration
/// - Provisions both indexes, aborting the run on failure
/// - Lists every archive under the prefix, aborting the run on failure
/// - Hands the archives to the worker pool and reports the merged summary
///
/// Ctrl-C, or [`Orchestrator::shutdown`], stops workers from starting new
/// archives; in-flight archives are allowed to finish.
pub struct Orchestrator {
    config: PipelineConfig,
    provisioner: IndexProvisioner,
    lister: ArchiveLister,
    pool: WorkerPool,
    shutdown_tx: Arc<watch::Sender<bool>>,
}

impl Orchestrator {
    /// Wire the pipeline stages over the given stores.
    pub fn new(
        config: PipelineConfig,
        index_store: Arc<dyn IndexStore>,
        object_store: Arc<dyn ObjectStore>,
    ) -> Self {
        let worker = ArchiveWorker::new(
            DedupGate::new(Arc::clone(&index_store), config.work_index.clone()),
            ArchiveProcessor::new(Arc::clone(&object_store), config.bucket.clone()),
            BulkWriter::new(Arc::clone(&index_store)),
            config.work_index.clone(),
            config.event_index.clone(),
        );
        let pool = WorkerPool::new(worker, config.concurrency);
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            provisioner: IndexProvisioner::new(index_store),
            lister: ArchiveLister::new(object_store),
            pool,
            config,
            shutdown_tx: Arc::new(shutdown_tx),
        }
    }

    /// Run the import once.
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - The run completed; per-archive failures are
    ///   counted in the summary, not returned
    /// * `Err(PipelineError)` - Configuration, provisioning or listing failed
    #[instrument(skip(self), fields(bucket = %self.config.bucket, prefix = %self.config.prefix))]
    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        self.config.validate()?;

        info!(
            work_index = %self.config.work_index,
            event_index = %self.config.event_index,
            concurrency = self.pool.concurrency(),
            "Starting archive import"
        );

        self.provisioner
            .ensure_indexes(&self.config.work_index, &self.config.event_index)
            .await?;

        let archives = self
            .lister
            .list_archives(&self.config.bucket, &self.config.prefix)
            .await?;

        let signal_tx = Arc::clone(&self.shutdown_tx);
        let signal_listener = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received shutdown signal, finishing in-flight archives");
                signal_tx.send_replace(true);
            }
        });

        let summary = self
            .pool
            .run(archives, self.shutdown_tx.subscribe())
            .await;

        signal_listener.abort();

        info!(
            listed = summary.listed,
            indexed = summary.indexed,
            skipped = summary.skipped,
            failed = summary.failed,
            not_started = summary.not_started,
            records = summary.records,
            "Archive import finished"
        );
        Ok(summary)
    }

    /// Ask a running import to stop starting new archives.
    pub fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }
}
