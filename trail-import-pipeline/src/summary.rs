//! Per-archive outcomes and the run summary built from them.

use std::ops::AddAssign;

/// What happened to one archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// Records and marker were written.
    Indexed {
        /// Event records written.
        records: usize,
        /// Bulk operations submitted (records + marker).
        operations: usize,
    },
    /// A work-log entry already existed.
    Skipped,
    /// A per-archive error was logged; the archive stays unmarked.
    Failed,
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Archives returned by the listing.
    pub listed: usize,
    /// Archives skipped because they were already imported.
    pub skipped: usize,
    /// Archives fully imported during this run.
    pub indexed: usize,
    /// Event records written during this run.
    pub records: usize,
    /// Archives that failed and will be retried next run.
    pub failed: usize,
    /// Archives left in the queue when the run was cancelled.
    pub not_started: usize,
}

impl RunSummary {
    /// Fold one archive outcome into the counters.
    pub fn record(&mut self, outcome: ArchiveOutcome) {
        match outcome {
            ArchiveOutcome::Indexed { records, .. } => {
                self.indexed += 1;
                self.records += records;
            }
            ArchiveOutcome::Skipped => self.skipped += 1,
            ArchiveOutcome::Failed => self.failed += 1,
        }
    }

    /// Archives that reached a worker.
    pub fn processed(&self) -> usize {
        self.skipped + self.indexed + self.failed
    }
}

impl AddAssign for RunSummary {
    fn add_assign(&mut self, other: Self) {
        self.listed += other.listed;
        self.skipped += other.skipped;
        self.indexed += other.indexed;
        self.records += other.records;
        self.failed += other.failed;
        self.not_started += other.not_started;
    }
}
