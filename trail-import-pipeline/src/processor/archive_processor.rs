//! Archive processor implementation.
//!
//! Streams an archive from the object store through a gzip decoder and
//! extracts the `Records` collection from the resulting JSON document.

use std::io::Write;
use std::sync::Arc;

use flate2::write::MultiGzDecoder;
use futures::StreamExt;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::errors::ArchiveError;
use trail_import_repository::ObjectStore;
use trail_import_shared::{ArchiveDescriptor, EventRecord};

/// Incremental gzip decoder.
///
/// Compressed chunks are decoded as they are pushed, so decompression keeps
/// pace with the download instead of waiting for the whole body.
/// Concatenated gzip members are decoded as one stream.
pub struct GzipAccumulator {
    decoder: MultiGzDecoder<Vec<u8>>,
    compressed_bytes: usize,
}

impl GzipAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self {
            decoder: MultiGzDecoder::new(Vec::new()),
            compressed_bytes: 0,
        }
    }

    /// Decode one compressed chunk.
    pub fn push(&mut self, chunk: &[u8]) -> std::io::Result<()> {
        self.compressed_bytes += chunk.len();
        self.decoder.write_all(chunk)
    }

    /// Compressed bytes consumed so far.
    pub fn compressed_bytes(&self) -> usize {
        self.compressed_bytes
    }

    /// Flush the decoder and return all decompressed bytes.
    pub fn finish(self) -> std::io::Result<Vec<u8>> {
        self.decoder.finish()
    }
}

impl Default for GzipAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct ArchiveBody {
    #[serde(rename = "Records")]
    records: Vec<EventRecord>,
}

/// Parse a decompressed archive and return its records in archive order.
///
/// The document must be a JSON object with a `Records` array; nothing else
/// about the records is checked.
pub fn extract_records(key: &str, bytes: &[u8]) -> Result<Vec<EventRecord>, ArchiveError> {
    let body: ArchiveBody =
        serde_json::from_slice(bytes).map_err(|e| ArchiveError::malformed(key, e.to_string()))?;
    Ok(body.records)
}

/// Fetches, decompresses and parses archives.
#[derive(Clone)]
pub struct ArchiveProcessor {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl ArchiveProcessor {
    /// Create a processor reading from `bucket`.
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    /// Download and decompress an archive body.
    #[instrument(skip(self, archive), fields(key = %archive.key))]
    pub async fn fetch(&self, archive: &ArchiveDescriptor) -> Result<Vec<u8>, ArchiveError> {
        let mut chunks = self
            .store
            .get_object_stream(&self.bucket, &archive.key)
            .await?;

        let mut accumulator = GzipAccumulator::new();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            accumulator
                .push(&chunk)
                .map_err(|e| ArchiveError::decompress(&archive.key, e.to_string()))?;
        }

        let compressed = accumulator.compressed_bytes();
        let decompressed = accumulator
            .finish()
            .map_err(|e| ArchiveError::decompress(&archive.key, e.to_string()))?;

        debug!(
            compressed_bytes = compressed,
            decompressed_bytes = decompressed.len(),
            "Archive decompressed"
        );
        Ok(decompressed)
    }

    /// Fetch an archive and extract its records.
    pub async fn process(
        &self,
        archive: &ArchiveDescriptor,
    ) -> Result<Vec<EventRecord>, ArchiveError> {
        let bytes = self.fetch(archive).await?;
        let records = extract_records(&archive.key, &bytes)?;
        debug!(key = %archive.key, records = records.len(), "Extracted records");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{gzip, gzip_json, FakeObjectStore};
    use serde_json::json;

    #[test]
    fn test_extract_records_in_order() {
        let body = br#"{"Records":[{"eventName":"A"},{"eventName":"B"}]}"#;

        let records = extract_records("k", body).unwrap();

        let names: Vec<_> = records.iter().filter_map(|r| r.event_name()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_extract_records_empty_collection() {
        let records = extract_records("k", br#"{"Records":[]}"#).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_extract_records_missing_field() {
        let result = extract_records("k", br#"{"records":[]}"#);
        assert!(matches!(result, Err(ArchiveError::MalformedArchive { .. })));
    }

    #[test]
    fn test_extract_records_invalid_json() {
        let result = extract_records("k", b"{\"Records\": [");
        assert!(matches!(result, Err(ArchiveError::MalformedArchive { .. })));
    }

    #[test]
    fn test_accumulator_decodes_across_chunks() {
        let compressed = gzip(b"hello archive");
        let mut accumulator = GzipAccumulator::new();
        for chunk in compressed.chunks(3) {
            accumulator.push(chunk).unwrap();
        }

        assert_eq!(accumulator.compressed_bytes(), compressed.len());
        assert_eq!(accumulator.finish().unwrap(), b"hello archive");
    }

    #[test]
    fn test_accumulator_handles_concatenated_members() {
        let mut compressed = gzip(b"{\"Records\":");
        compressed.extend(gzip(b"[1,2]}"));

        let mut accumulator = GzipAccumulator::new();
        accumulator.push(&compressed).unwrap();

        assert_eq!(accumulator.finish().unwrap(), b"{\"Records\":[1,2]}");
    }

    #[tokio::test]
    async fn test_process_streams_and_extracts() {
        let store = Arc::new(FakeObjectStore::new(10));
        let body = json!({"Records": [{"eventName": "A"}, {"eventName": "B"}, {"eventName": "C"}]});
        store.put("logs/a.json.gz", "\"e1\"", gzip_json(&body));
        let processor = ArchiveProcessor::new(store.clone(), "bucket");

        let records = processor
            .process(&ArchiveDescriptor::new("logs/a.json.gz", "\"e1\""))
            .await
            .unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[2].event_name(), Some("C"));
        assert_eq!(store.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_process_rejects_non_gzip_body() {
        let store = Arc::new(FakeObjectStore::new(10));
        store.put("plain.json", "e", br#"{"Records":[]}"#.to_vec());
        let processor = ArchiveProcessor::new(store, "bucket");

        let result = processor
            .process(&ArchiveDescriptor::new("plain.json", "e"))
            .await;

        assert!(matches!(result, Err(ArchiveError::DecompressError { .. })));
    }

    #[tokio::test]
    async fn test_process_surfaces_fetch_error() {
        let store = Arc::new(FakeObjectStore::new(10));
        store.put("gone.json.gz", "e", gzip(b"{}"));
        store.fail_fetch("gone.json.gz");
        let processor = ArchiveProcessor::new(store, "bucket");

        let result = processor
            .process(&ArchiveDescriptor::new("gone.json.gz", "e"))
            .await;

        assert!(matches!(result, Err(ArchiveError::FetchError(_))));
    }
}
