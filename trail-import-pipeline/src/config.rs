//! Pipeline configuration.

use crate::errors::PipelineError;

/// Default work-log index name.
pub const DEFAULT_WORK_INDEX: &str = "cloudtrail-import-log";

/// Default event index name.
pub const DEFAULT_EVENT_INDEX: &str = "cloudtrail";

/// Default number of concurrent archive workers.
pub const DEFAULT_CONCURRENCY: usize = 1;

/// What to import and where to put it.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Source bucket.
    pub bucket: String,
    /// Key prefix to import; empty imports the whole bucket.
    pub prefix: String,
    /// Index holding one marker per imported archive.
    pub work_index: String,
    /// Index receiving the extracted records.
    pub event_index: String,
    /// Number of archives processed concurrently.
    pub concurrency: usize,
}

impl PipelineConfig {
    /// Create a config for a bucket and prefix with default index names.
    pub fn new(bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.into(),
            work_index: DEFAULT_WORK_INDEX.to_string(),
            event_index: DEFAULT_EVENT_INDEX.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Set the number of concurrent workers.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set both index names.
    pub fn with_indexes(mut self, work_index: impl Into<String>, event_index: impl Into<String>) -> Self {
        self.work_index = work_index.into();
        self.event_index = event_index.into();
        self
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.bucket.trim().is_empty() {
            return Err(PipelineError::config("bucket is required"));
        }
        if self.concurrency == 0 {
            return Err(PipelineError::config("concurrency must be at least 1"));
        }
        if self.work_index.is_empty() || self.event_index.is_empty() {
            return Err(PipelineError::config("index names must not be empty"));
        }
        // Markers and events sharing an index would make every marker look
        // like an event and vice versa.
        if self.work_index == self.event_index {
            return Err(PipelineError::config(format!(
                "work index and event index must differ (both are {})",
                self.work_index
            )));
        }
        Ok(())
    }
}
