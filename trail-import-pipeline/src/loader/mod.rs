//! Loader module for the import pipeline.
//!
//! Writes one archive's records and its work-log marker to the index store
//! in a single bulk request.

use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::ArchiveError;
use trail_import_repository::{BulkOperation, BulkResponse, IndexStore};
use trail_import_shared::{EventRecord, WorkLogEntry};

/// Statistics for a bulk request that fully succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    /// Event records written.
    pub records: usize,
    /// Operations submitted and acknowledged, marker included.
    pub operations: usize,
}

/// Writer for per-archive batches.
///
/// A batch never spans archives, so a failure only ever affects one archive.
/// The marker is the last operation of the batch; when the batch fails the
/// archive must end up without a marker so the next run retries it.
#[derive(Clone)]
pub struct BulkWriter {
    store: Arc<dyn IndexStore>,
}

impl BulkWriter {
    /// Create a writer over the given index store.
    pub fn new(store: Arc<dyn IndexStore>) -> Self {
        Self { store }
    }

    /// Build the operations for one archive: every record into the event
    /// index in archive order, then the marker under its fingerprint.
    pub fn build_operations(
        event_index: &str,
        records: Vec<EventRecord>,
        work_index: &str,
        marker: &WorkLogEntry,
    ) -> Result<Vec<BulkOperation>, ArchiveError> {
        let marker_doc = serde_json::to_value(marker)
            .map_err(|e| ArchiveError::write(&marker.key, e.into()))?;

        let mut operations = Vec::with_capacity(records.len() + 1);
        operations.extend(
            records
                .into_iter()
                .map(|record| BulkOperation::auto_id(event_index, record.into_value())),
        );
        operations.push(BulkOperation::with_id(work_index, &marker.id, marker_doc));
        Ok(operations)
    }

    /// Submit the records and the marker as one bulk request.
    ///
    /// # Returns
    ///
    /// * `Ok(BatchStats)` - Every operation was acknowledged
    /// * `Err(ArchiveError::WriteError)` - The request failed as a whole
    /// * `Err(ArchiveError::PartialWrite)` - Some items were rejected; the
    ///   marker has been removed again if it had landed
    #[instrument(skip(self, records, marker), fields(key = %marker.key, records = records.len()))]
    pub async fn write_batch(
        &self,
        event_index: &str,
        records: Vec<EventRecord>,
        work_index: &str,
        marker: &WorkLogEntry,
    ) -> Result<BatchStats, ArchiveError> {
        let record_count = records.len();
        let operations = Self::build_operations(event_index, records, work_index, marker)?;
        let total = operations.len();

        let response = self.store.bulk_write(&operations).await.map_err(|e| {
            error!(error = %e, "Bulk request failed");
            ArchiveError::write(&marker.key, e)
        })?;

        if response.count() == total && !response.has_errors() {
            debug!(operations = total, "Bulk request acknowledged");
            return Ok(BatchStats {
                records: record_count,
                operations: total,
            });
        }

        let failed = Self::failed_count(&response, total);
        for item in response.failed_items().take(5) {
            warn!(
                index = %item.index,
                status = item.status,
                error = ?item.error,
                "Bulk item rejected"
            );
        }

        if Self::marker_landed(&response, total) {
            self.retract_marker(work_index, marker).await;
        }

        Err(ArchiveError::PartialWrite {
            key: marker.key.clone(),
            failed,
            total,
        })
    }

    fn failed_count(response: &BulkResponse, total: usize) -> usize {
        let missing = total.saturating_sub(response.count());
        response.failed_items().count() + missing
    }

    /// The marker is the last operation, so it is the last item when the
    /// store echoed every operation back.
    fn marker_landed(response: &BulkResponse, total: usize) -> bool {
        response.count() == total
            && response
                .items
                .last()
                .map(|item| item.succeeded())
                .unwrap_or(false)
    }

    async fn retract_marker(&self, work_index: &str, marker: &WorkLogEntry) {
        match self.store.delete_document(work_index, &marker.id).await {
            Ok(()) => info!(
                fingerprint = %marker.id,
                "Removed work-log marker after partial bulk failure"
            ),
            Err(e) => error!(
                fingerprint = %marker.id,
                error = %e,
                "Could not remove work-log marker; archive will not be retried automatically"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeIndexStore;
    use serde_json::json;
    use std::sync::atomic::Ordering;
    use trail_import_shared::ArchiveDescriptor;

    fn records(names: &[&str]) -> Vec<EventRecord> {
        names
            .iter()
            .map(|n| EventRecord::from(json!({"eventName": n})))
            .collect()
    }

    fn marker() -> WorkLogEntry {
        WorkLogEntry::for_archive(&ArchiveDescriptor::new("logs/a.json.gz", "\"abc\""))
    }

    #[test]
    fn test_build_operations_puts_marker_last() {
        let ops = BulkWriter::build_operations("events", records(&["A", "B"]), "work", &marker())
            .unwrap();

        assert_eq!(ops.len(), 3);
        assert_eq!(ops[0].index, "events");
        assert!(ops[0].id.is_none());
        assert_eq!(ops[0].document["eventName"], "A");
        assert_eq!(ops[1].document["eventName"], "B");
        assert_eq!(ops[2].index, "work");
        assert_eq!(ops[2].id.as_deref(), Some("abc"));
        assert_eq!(ops[2].document["key"], "logs/a.json.gz");
        assert!(ops[2].document["processedAt"].is_string());
    }

    #[tokio::test]
    async fn test_write_batch_counts_records_plus_marker() {
        let store = Arc::new(FakeIndexStore::new());
        let writer = BulkWriter::new(store.clone());

        let stats = writer
            .write_batch("events", records(&["A", "B"]), "work", &marker())
            .await
            .unwrap();

        assert_eq!(stats, BatchStats { records: 2, operations: 3 });
        assert_eq!(store.bulk_sizes(), vec![3]);
        assert_eq!(store.documents("events").len(), 2);
        assert!(store.document("work", "abc").is_some());
    }

    #[tokio::test]
    async fn test_write_batch_with_no_records_still_marks() {
        let store = Arc::new(FakeIndexStore::new());
        let writer = BulkWriter::new(store.clone());

        let stats = writer
            .write_batch("events", Vec::new(), "work", &marker())
            .await
            .unwrap();

        assert_eq!(stats.operations, 1);
        assert!(store.document("work", "abc").is_some());
    }

    #[tokio::test]
    async fn test_transport_failure_leaves_archive_unmarked() {
        let store = Arc::new(FakeIndexStore::new());
        store.fail_bulk.store(true, Ordering::SeqCst);
        let writer = BulkWriter::new(store.clone());

        let result = writer
            .write_batch("events", records(&["A"]), "work", &marker())
            .await;

        assert!(matches!(result, Err(ArchiveError::WriteError { .. })));
        assert!(store.document("work", "abc").is_none());
        assert!(store.deletes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_record_retracts_marker() {
        let store = Arc::new(FakeIndexStore::new());
        *store.reject_item.lock().unwrap() = Some(1);
        let writer = BulkWriter::new(store.clone());

        let result = writer
            .write_batch("events", records(&["A", "B", "C"]), "work", &marker())
            .await;

        assert!(matches!(
            result,
            Err(ArchiveError::PartialWrite { failed: 1, total: 4, .. })
        ));
        assert!(store.document("work", "abc").is_none());
        assert_eq!(
            store.deletes.lock().unwrap().clone(),
            vec![("work".to_string(), "abc".to_string())]
        );
    }

    #[tokio::test]
    async fn test_rejected_marker_needs_no_retraction() {
        let store = Arc::new(FakeIndexStore::new());
        *store.reject_item.lock().unwrap() = Some(2);
        let writer = BulkWriter::new(store.clone());

        let result = writer
            .write_batch("events", records(&["A", "B"]), "work", &marker())
            .await;

        assert!(matches!(result, Err(ArchiveError::PartialWrite { failed: 1, .. })));
        assert!(store.document("work", "abc").is_none());
        assert!(store.deletes.lock().unwrap().is_empty());
    }
}
