//! In-memory store fakes shared by the pipeline tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use flate2::write::GzEncoder;
use flate2::Compression;
use futures::stream;
use serde_json::Value;

use trail_import_repository::{
    BulkItemOutcome, BulkOperation, BulkResponse, ByteChunkStream, IndexStore, ObjectListing,
    ObjectStore, ObjectSummary, SearchError, StorageError,
};

/// Gzip a byte slice the way archive objects are stored.
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Gzip a JSON value.
pub fn gzip_json(value: &Value) -> Vec<u8> {
    gzip(value.to_string().as_bytes())
}

/// Object store over a sorted key map, paginating like S3's marker listing.
pub struct FakeObjectStore {
    objects: Mutex<BTreeMap<String, (String, Vec<u8>)>>,
    page_size: usize,
    chunk_size: usize,
    fetch_delay: Option<Duration>,
    fail_list_call: Option<usize>,
    fail_fetch_keys: Mutex<HashSet<String>>,
    pub list_markers: Mutex<Vec<Option<String>>>,
    pub fetched: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeObjectStore {
    pub fn new(page_size: usize) -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            page_size,
            chunk_size: 7,
            fetch_delay: None,
            fail_list_call: None,
            fail_fetch_keys: Mutex::new(HashSet::new()),
            list_markers: Mutex::new(Vec::new()),
            fetched: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Fail the n-th (0-based) listing request.
    pub fn failing_list_call(mut self, call: usize) -> Self {
        self.fail_list_call = Some(call);
        self
    }

    /// Sleep inside every fetch, to observe worker concurrency.
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    pub fn put(&self, key: &str, etag: &str, body: Vec<u8>) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (etag.to_string(), body));
    }

    pub fn fail_fetch(&self, key: &str) {
        self.fail_fetch_keys.lock().unwrap().insert(key.to_string());
    }

    pub fn fetch_count(&self) -> usize {
        self.fetched.lock().unwrap().len()
    }

    pub fn fetches_of(&self, key: &str) -> usize {
        self.fetched
            .lock()
            .unwrap()
            .iter()
            .filter(|k| k.as_str() == key)
            .count()
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn list_objects(
        &self,
        _bucket: &str,
        prefix: &str,
        marker: Option<&str>,
    ) -> Result<ObjectListing, StorageError> {
        let call = {
            let mut markers = self.list_markers.lock().unwrap();
            markers.push(marker.map(str::to_string));
            markers.len() - 1
        };
        if self.fail_list_call == Some(call) {
            return Err(StorageError::list("injected listing failure"));
        }

        let objects = self.objects.lock().unwrap();
        let mut matching = objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .filter(|(key, _)| marker.map_or(true, |m| key.as_str() > m));

        let items: Vec<ObjectSummary> = matching
            .by_ref()
            .take(self.page_size)
            .map(|(key, (etag, _))| ObjectSummary::new(key.clone(), etag.clone()))
            .collect();
        let is_truncated = matching.next().is_some();

        Ok(ObjectListing {
            items,
            is_truncated,
        })
    }

    async fn get_object_stream(
        &self,
        _bucket: &str,
        key: &str,
    ) -> Result<ByteChunkStream, StorageError> {
        self.fetched.lock().unwrap().push(key.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_fetch_keys.lock().unwrap().contains(key) {
            return Err(StorageError::fetch(key, "injected fetch failure"));
        }

        let body = self
            .objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(_, body)| body.clone())
            .ok_or_else(|| StorageError::fetch(key, "NoSuchKey"))?;

        let chunks: Vec<Result<Bytes, StorageError>> = body
            .chunks(self.chunk_size)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        Ok(Box::pin(stream::iter(chunks)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub document: Value,
}

/// Index store keeping documents in memory.
#[derive(Default)]
pub struct FakeIndexStore {
    pub indexes: Mutex<HashMap<String, Value>>,
    documents: Mutex<HashMap<String, Vec<StoredDocument>>>,
    next_id: AtomicUsize,
    pub fail_exists_check: AtomicBool,
    pub race_on_create: AtomicBool,
    pub fail_create: AtomicBool,
    pub fail_lookup: AtomicBool,
    pub fail_bulk: AtomicBool,
    /// Reject the bulk item at this position (0-based) with a mapping error.
    pub reject_item: Mutex<Option<usize>>,
    pub create_calls: AtomicUsize,
    pub lookups: Mutex<Vec<(String, String)>>,
    pub bulk_requests: Mutex<Vec<Vec<BulkOperation>>>,
    pub deletes: Mutex<Vec<(String, String)>>,
}

impl FakeIndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a document under a fixed id.
    pub fn insert(&self, index: &str, id: &str, document: Value) {
        let mut docs = self.documents.lock().unwrap();
        let entries = docs.entry(index.to_string()).or_default();
        entries.retain(|d| d.id != id);
        entries.push(StoredDocument {
            id: id.to_string(),
            document,
        });
    }

    pub fn documents(&self, index: &str) -> Vec<StoredDocument> {
        self.documents
            .lock()
            .unwrap()
            .get(index)
            .cloned()
            .unwrap_or_default()
    }

    pub fn document(&self, index: &str, id: &str) -> Option<Value> {
        self.documents(index)
            .into_iter()
            .find(|d| d.id == id)
            .map(|d| d.document)
    }

    pub fn bulk_sizes(&self) -> Vec<usize> {
        self.bulk_requests
            .lock()
            .unwrap()
            .iter()
            .map(Vec::len)
            .collect()
    }
}

#[async_trait]
impl IndexStore for FakeIndexStore {
    async fn index_exists(&self, name: &str) -> Result<bool, SearchError> {
        if self.fail_exists_check.load(Ordering::SeqCst) {
            return Err(SearchError::connection("connection refused"));
        }
        Ok(self.indexes.lock().unwrap().contains_key(name))
    }

    async fn create_index(&self, name: &str, body: &Value) -> Result<(), SearchError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(SearchError::index_creation("cluster read-only"));
        }
        let mut indexes = self.indexes.lock().unwrap();
        if self.race_on_create.load(Ordering::SeqCst) || indexes.contains_key(name) {
            indexes.entry(name.to_string()).or_insert_with(|| body.clone());
            return Err(SearchError::IndexAlreadyExists(name.to_string()));
        }
        indexes.insert(name.to_string(), body.clone());
        Ok(())
    }

    async fn document_exists(&self, index: &str, id: &str) -> Result<bool, SearchError> {
        self.lookups
            .lock()
            .unwrap()
            .push((index.to_string(), id.to_string()));
        if self.fail_lookup.load(Ordering::SeqCst) {
            return Err(SearchError::query("search_phase_execution_exception"));
        }
        Ok(self.document(index, id).is_some())
    }

    async fn bulk_write(&self, operations: &[BulkOperation]) -> Result<BulkResponse, SearchError> {
        self.bulk_requests.lock().unwrap().push(operations.to_vec());
        if self.fail_bulk.load(Ordering::SeqCst) {
            return Err(SearchError::bulk_index("503 Service Unavailable"));
        }

        let reject = *self.reject_item.lock().unwrap();
        let mut items = Vec::with_capacity(operations.len());
        for (position, op) in operations.iter().enumerate() {
            if reject == Some(position) {
                items.push(BulkItemOutcome {
                    index: op.index.clone(),
                    id: op.id.clone(),
                    status: 400,
                    error: Some("mapper_parsing_exception".to_string()),
                });
                continue;
            }

            let id = op.id.clone().unwrap_or_else(|| {
                format!("auto-{}", self.next_id.fetch_add(1, Ordering::SeqCst))
            });
            self.insert(&op.index, &id, op.document.clone());
            items.push(BulkItemOutcome {
                index: op.index.clone(),
                id: Some(id),
                status: 201,
                error: None,
            });
        }

        Ok(BulkResponse { items })
    }

    async fn delete_document(&self, index: &str, id: &str) -> Result<(), SearchError> {
        self.deletes
            .lock()
            .unwrap()
            .push((index.to_string(), id.to_string()));
        if let Some(entries) = self.documents.lock().unwrap().get_mut(index) {
            entries.retain(|d| d.id != id);
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        Ok(true)
    }
}
