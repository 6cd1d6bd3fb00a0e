//! Dedup gate.
//!
//! Decides from the work-log whether an archive still needs importing.

use std::sync::Arc;
use tracing::{debug, instrument};

use crate::errors::ArchiveError;
use trail_import_repository::IndexStore;
use trail_import_shared::ArchiveDescriptor;

/// Verdict for one archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// No marker found; import the archive.
    Process,
    /// A marker exists; the archive was imported by an earlier run.
    AlreadyProcessed,
}

/// Work-log lookup keyed by archive fingerprint.
#[derive(Clone)]
pub struct DedupGate {
    store: Arc<dyn IndexStore>,
    work_index: String,
}

impl DedupGate {
    /// Create a gate reading markers from `work_index`.
    pub fn new(store: Arc<dyn IndexStore>, work_index: impl Into<String>) -> Self {
        Self {
            store,
            work_index: work_index.into(),
        }
    }

    /// Look up the archive's marker.
    ///
    /// A store error is returned as [`ArchiveError::LookupError`] so the
    /// worker can skip just this archive.
    #[instrument(skip(self, archive), fields(fingerprint = %archive.fingerprint))]
    pub async fn check(&self, archive: &ArchiveDescriptor) -> Result<GateDecision, ArchiveError> {
        let exists = self
            .store
            .document_exists(&self.work_index, &archive.fingerprint)
            .await
            .map_err(|e| ArchiveError::lookup(&archive.fingerprint, e))?;

        let decision = if exists {
            GateDecision::AlreadyProcessed
        } else {
            GateDecision::Process
        };
        debug!(decision = ?decision, "Dedup gate");
        Ok(decision)
    }
}
