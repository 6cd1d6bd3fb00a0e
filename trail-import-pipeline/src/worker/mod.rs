//! Worker pool.
//!
//! A fixed number of workers drain a shared queue of archives. Each worker
//! handles one archive at a time: dedup gate, fetch and extract, bulk write.
//! Per-archive errors are logged and counted, never propagated.

use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use crate::dedup::{DedupGate, GateDecision};
use crate::loader::BulkWriter;
use crate::processor::ArchiveProcessor;
use crate::summary::{ArchiveOutcome, RunSummary};
use trail_import_shared::{ArchiveDescriptor, WorkLogEntry};

/// Processes a single archive end to end.
pub struct ArchiveWorker {
    gate: DedupGate,
    processor: ArchiveProcessor,
    writer: BulkWriter,
    work_index: String,
    event_index: String,
}

impl ArchiveWorker {
    pub fn new(
        gate: DedupGate,
        processor: ArchiveProcessor,
        writer: BulkWriter,
        work_index: impl Into<String>,
        event_index: impl Into<String>,
    ) -> Self {
        Self {
            gate,
            processor,
            writer,
            work_index: work_index.into(),
            event_index: event_index.into(),
        }
    }

    /// Import one archive unless the work-log already has it.
    ///
    /// Nothing is fetched for an archive that is already recorded, and an
    /// archive that fails at any step is left without a marker.
    #[instrument(skip(self, archive), fields(key = %archive.key, fingerprint = %archive.fingerprint))]
    pub async fn process(&self, archive: &ArchiveDescriptor) -> ArchiveOutcome {
        match self.gate.check(archive).await {
            Ok(GateDecision::AlreadyProcessed) => {
                debug!("Archive already imported, skipping");
                return ArchiveOutcome::Skipped;
            }
            Ok(GateDecision::Process) => {}
            Err(e) => {
                error!(error = %e, "Work-log lookup failed, skipping archive");
                return ArchiveOutcome::Failed;
            }
        }

        let records = match self.processor.process(archive).await {
            Ok(records) => records,
            Err(e) => {
                error!(error = %e, "Failed to read archive");
                return ArchiveOutcome::Failed;
            }
        };

        let marker = WorkLogEntry::for_archive(archive);
        match self
            .writer
            .write_batch(&self.event_index, records, &self.work_index, &marker)
            .await
        {
            Ok(stats) => {
                info!(
                    records = stats.records,
                    operations = stats.operations,
                    "Archive imported"
                );
                ArchiveOutcome::Indexed {
                    records: stats.records,
                    operations: stats.operations,
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to write archive");
                ArchiveOutcome::Failed
            }
        }
    }
}

/// Runs `concurrency` workers over a list of archives.
#[derive(Clone)]
pub struct WorkerPool {
    worker: Arc<ArchiveWorker>,
    concurrency: usize,
}

impl WorkerPool {
    /// Create a pool; a concurrency of zero is treated as one.
    pub fn new(worker: ArchiveWorker, concurrency: usize) -> Self {
        Self {
            worker: Arc::new(worker),
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Process every archive, returning the merged tallies.
    ///
    /// Workers check `shutdown` before taking the next archive. Once it reads
    /// `true` no new archive is started; archives already in flight finish
    /// and whatever is left in the queue is counted as not started.
    pub async fn run(
        &self,
        archives: Vec<ArchiveDescriptor>,
        shutdown: watch::Receiver<bool>,
    ) -> RunSummary {
        let listed = archives.len();
        let queue = Arc::new(Mutex::new(VecDeque::from(archives)));
        let workers = self.concurrency.min(listed.max(1));

        info!(archives = listed, workers, "Starting workers");

        let mut tasks = JoinSet::new();
        for worker_id in 0..workers {
            let worker = Arc::clone(&self.worker);
            let queue = Arc::clone(&queue);
            let shutdown = shutdown.clone();
            tasks.spawn(async move { drain(worker_id, worker, queue, shutdown).await });
        }

        let mut summary = RunSummary {
            listed,
            ..Default::default()
        };
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(tally) => summary += tally,
                Err(e) => error!(error = %e, "Worker task failed"),
            }
        }

        summary.not_started = queue.lock().await.len();
        if summary.not_started > 0 {
            warn!(not_started = summary.not_started, "Run cancelled before all archives were started");
        }
        summary
    }
}

async fn drain(
    worker_id: usize,
    worker: Arc<ArchiveWorker>,
    queue: Arc<Mutex<VecDeque<ArchiveDescriptor>>>,
    shutdown: watch::Receiver<bool>,
) -> RunSummary {
    let mut tally = RunSummary::default();
    loop {
        if *shutdown.borrow() {
            debug!(worker_id, "Shutdown requested, worker stopping");
            break;
        }
        let next = queue.lock().await.pop_front();
        let Some(archive) = next else {
            break;
        };
        tally.record(worker.process(&archive).await);
    }
    debug!(worker_id, processed = tally.processed(), "Worker finished");
    tally
}
