//! Archive lister.
//!
//! Enumerates every archive under a prefix by following marker-based
//! pagination until the store reports no more pages.

use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use crate::errors::PipelineError;
use trail_import_repository::ObjectStore;
use trail_import_shared::ArchiveDescriptor;

/// Lists the archives a run will process.
pub struct ArchiveLister {
    store: Arc<dyn ObjectStore>,
}

impl ArchiveLister {
    /// Create a lister over the given object store.
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Collect all archive descriptors under `prefix`, in listing order.
    ///
    /// Each request resumes after the last key of the previous page. The loop
    /// ends on a page that is not truncated or that is empty. A failed page
    /// discards everything gathered so far.
    #[instrument(skip(self))]
    pub async fn list_archives(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<ArchiveDescriptor>, PipelineError> {
        let mut archives = Vec::new();
        let mut marker: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .store
                .list_objects(bucket, prefix, marker.as_deref())
                .await
                .map_err(|e| {
                    error!(error = %e, pages, "Listing failed");
                    e
                })?;
            pages += 1;

            let Some(last) = page.items.last() else {
                debug!(pages, "Listing ended on an empty page");
                break;
            };
            marker = Some(last.key.clone());

            debug!(
                page = pages,
                count = page.items.len(),
                marker = ?marker,
                "Fetched listing page"
            );

            archives.extend(
                page.items
                    .into_iter()
                    .map(|object| ArchiveDescriptor::new(object.key, &object.etag)),
            );

            if !page.is_truncated {
                break;
            }
        }

        info!(count = archives.len(), pages, "Listed archives");
        Ok(archives)
    }
}
