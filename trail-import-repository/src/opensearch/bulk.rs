//! Bulk request encoding and response decoding.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::SearchError;
use crate::types::{BulkItemOutcome, BulkOperation, BulkResponse};

/// Build the NDJSON line pairs for a bulk request: one action line followed
/// by the document line, per operation, in order.
pub fn build_bulk_body(operations: &[BulkOperation]) -> Vec<Value> {
    let mut body = Vec::with_capacity(operations.len() * 2);

    for op in operations {
        let action = match &op.id {
            Some(id) => json!({"index": {"_index": op.index, "_id": id}}),
            None => json!({"index": {"_index": op.index}}),
        };
        body.push(action);
        body.push(op.document.clone());
    }

    body
}

#[derive(Debug, Deserialize)]
struct RawBulkResponse {
    #[serde(default)]
    items: Vec<HashMap<String, RawBulkItem>>,
}

#[derive(Debug, Deserialize)]
struct RawBulkItem {
    #[serde(rename = "_index", default)]
    index: String,
    #[serde(rename = "_id")]
    id: Option<String>,
    status: u16,
    error: Option<Value>,
}

/// Decode a bulk response body into per-item outcomes.
///
/// Each item is keyed by its action name (`index`, `create`, ...); the key
/// itself is ignored.
pub fn parse_bulk_response(body: Value) -> Result<BulkResponse, SearchError> {
    let raw: RawBulkResponse = serde_json::from_value(body)
        .map_err(|e| SearchError::parse(format!("Invalid bulk response: {}", e)))?;

    let mut items = Vec::with_capacity(raw.items.len());
    for entry in raw.items {
        let Some(item) = entry.into_values().next() else {
            return Err(SearchError::parse("Bulk response item without an action"));
        };

        items.push(BulkItemOutcome {
            index: item.index,
            id: item.id,
            status: item.status,
            error: item.error.as_ref().map(error_reason),
        });
    }

    Ok(BulkResponse { items })
}

fn error_reason(error: &Value) -> String {
    let kind = error.get("type").and_then(Value::as_str);
    let reason = error.get("reason").and_then(Value::as_str);

    match (kind, reason) {
        (Some(kind), Some(reason)) => format!("{}: {}", kind, reason),
        (Some(kind), None) => kind.to_string(),
        (None, Some(reason)) => reason.to_string(),
        (None, None) => error.to_string(),
    }
}
