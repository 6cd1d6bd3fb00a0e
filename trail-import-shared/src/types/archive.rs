//! Archive descriptor type.

use serde::{Deserialize, Serialize};

/// Identifies one archive object to import.
///
/// Built by the archive lister from a listing page and consumed by exactly
/// one worker. The fingerprint is always stored normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveDescriptor {
    /// Object path in the bucket.
    pub key: String,
    /// Content fingerprint (ETag) with quote characters stripped.
    pub fingerprint: String,
}

impl ArchiveDescriptor {
    /// Create a descriptor, normalizing the raw fingerprint reported by the
    /// object store.
    pub fn new(key: impl Into<String>, raw_fingerprint: &str) -> Self {
        Self {
            key: key.into(),
            fingerprint: normalize_fingerprint(raw_fingerprint),
        }
    }
}

/// Strip every `"` from an ETag as returned by S3 (`"abc123"` -> `abc123`).
pub fn normalize_fingerprint(raw: &str) -> String {
    raw.replace('"', "")
}
