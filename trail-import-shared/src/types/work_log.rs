//! Work-log marker document.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::ArchiveDescriptor;

/// Durable proof that an archive was fully imported.
///
/// Stored in the work-log index under `id`, which is the archive
/// fingerprint, so writing it twice overwrites the same document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkLogEntry {
    /// Document id; never serialized into the document body.
    #[serde(skip)]
    pub id: String,
    /// Originating archive path.
    pub key: String,
    /// When the archive finished processing.
    #[serde(rename = "processedAt", with = "rfc3339_seconds")]
    pub processed_at: DateTime<Utc>,
}

impl WorkLogEntry {
    /// Build the marker for a descriptor, stamped with the current time.
    pub fn for_archive(archive: &ArchiveDescriptor) -> Self {
        Self::at(archive, Utc::now())
    }

    /// Build the marker for a descriptor with an explicit completion time.
    pub fn at(archive: &ArchiveDescriptor, processed_at: DateTime<Utc>) -> Self {
        Self {
            id: archive.fingerprint.clone(),
            key: archive.key.clone(),
            processed_at,
        }
    }
}

mod rfc3339_seconds {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for WorkLogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}) at {}",
            self.id,
            self.key,
            self.processed_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}
