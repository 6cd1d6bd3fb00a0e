//! Request and response types for store operations.

use serde_json::Value;

/// One `index` action inside a bulk request.
///
/// With `id` set the target document is overwritten, which gives the
/// work-log marker its upsert semantics. Without it the index store assigns
/// an identity.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkOperation {
    /// Target index name.
    pub index: String,
    /// Explicit document id.
    pub id: Option<String>,
    /// Document body.
    pub document: Value,
}

impl BulkOperation {
    /// Index a document with a store-assigned id.
    pub fn auto_id(index: impl Into<String>, document: Value) -> Self {
        Self {
            index: index.into(),
            id: None,
            document,
        }
    }

    /// Index a document under a fixed id, replacing any previous version.
    pub fn with_id(index: impl Into<String>, id: impl Into<String>, document: Value) -> Self {
        Self {
            index: index.into(),
            id: Some(id.into()),
            document,
        }
    }
}

/// Outcome of a single action within a bulk request.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkItemOutcome {
    /// Index the action targeted.
    pub index: String,
    /// Document id, as assigned or echoed by the store.
    pub id: Option<String>,
    /// Per-item HTTP-style status.
    pub status: u16,
    /// Error reason, if the item was rejected.
    pub error: Option<String>,
}

impl BulkItemOutcome {
    /// Whether the item was accepted.
    pub fn succeeded(&self) -> bool {
        self.error.is_none() && (200..300).contains(&self.status)
    }
}

/// Result of a bulk request that reached the store.
///
/// Items appear in request order. Individual items can fail even when the
/// request as a whole succeeded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkResponse {
    /// Per-action outcomes.
    pub items: Vec<BulkItemOutcome>,
}

impl BulkResponse {
    /// Number of operations the store acknowledged.
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Items that were rejected.
    pub fn failed_items(&self) -> impl Iterator<Item = &BulkItemOutcome> {
        self.items.iter().filter(|item| !item.succeeded())
    }

    /// True if any item was rejected.
    pub fn has_errors(&self) -> bool {
        self.failed_items().next().is_some()
    }
}

/// One object entry from a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    /// Object key.
    pub key: String,
    /// Raw ETag as reported by the store, quotes included.
    pub etag: String,
}

impl ObjectSummary {
    /// Create a summary.
    pub fn new(key: impl Into<String>, etag: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            etag: etag.into(),
        }
    }
}

/// One page of an object listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectListing {
    /// Objects on this page, in key order.
    pub items: Vec<ObjectSummary>,
    /// Whether more pages follow.
    pub is_truncated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn outcome(status: u16, error: Option<&str>) -> BulkItemOutcome {
        BulkItemOutcome {
            index: "cloudtrail".to_string(),
            id: None,
            status,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn test_bulk_operation_constructors() {
        let auto = BulkOperation::auto_id("cloudtrail", json!({"eventName": "A"}));
        assert!(auto.id.is_none());

        let fixed = BulkOperation::with_id("cloudtrail-import-log", "abc", json!({}));
        assert_eq!(fixed.id.as_deref(), Some("abc"));
        assert_eq!(fixed.index, "cloudtrail-import-log");
    }

    #[test]
    fn test_bulk_response_counts_failures() {
        let response = BulkResponse {
            items: vec![
                outcome(201, None),
                outcome(400, Some("mapper_parsing_exception")),
                outcome(200, None),
            ],
        };

        assert_eq!(response.count(), 3);
        assert!(response.has_errors());
        assert_eq!(response.failed_items().count(), 1);
    }

    #[test]
    fn test_bulk_response_all_ok() {
        let response = BulkResponse {
            items: vec![outcome(201, None), outcome(201, None)],
        };

        assert!(!response.has_errors());
    }
}
