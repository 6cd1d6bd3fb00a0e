//! OpenSearch implementation of the index store.
//!
//! This module provides a concrete implementation of `IndexStore`
//! using OpenSearch as the backend.

mod bulk;
mod client;
mod index_config;

pub use bulk::{build_bulk_body, parse_bulk_response};
pub use client::{normalize_url, OpenSearchClient, DEFAULT_PORT};
pub use index_config::{event_index_settings, work_index_settings};
