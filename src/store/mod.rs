//! Store clients that execute remote read queries.
//!
//! This module provides:
//! - [`SeriesStore`]: The capability the read pipeline depends on.
//! - [`InMemoryStore`]: Rows held in process, for development and tests.
//! - [`ElasticsearchStore`]: Rows fetched from an Elasticsearch index.
//! - [`create_store`]: Builds the store selected by [`StoreConfig`].

mod elasticsearch;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::Row;
use crate::proto::Query;

pub use elasticsearch::ElasticsearchStore;
pub use memory::InMemoryStore;

/// Trait for executing a remote read query against a backing store.
///
/// Implementations return every row matching the query. No ordering is
/// required; the pipeline keeps per-series sample order as returned. Errors
/// are reported to the remote read client as server errors and never retried.
///
/// # Example
///
/// ```ignore
/// async fn count_rows(store: &dyn SeriesStore, query: &Query) -> Result<usize> {
///     Ok(store.read(query).await?.len())
/// }
/// ```
#[async_trait]
pub trait SeriesStore: Send + Sync {
    /// Execute a query and return its rows.
    async fn read(&self, query: &Query) -> Result<Vec<Row>>;
}

/// Store backend configuration.
///
/// Defaults to an empty in-memory store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum StoreConfig {
    InMemory(InMemoryStoreConfig),
    Elasticsearch(ElasticsearchStoreConfig),
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::InMemory(InMemoryStoreConfig::default())
    }
}

/// In-memory store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InMemoryStoreConfig {
    /// Optional YAML file holding a list of rows to serve.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Elasticsearch store configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElasticsearchStoreConfig {
    /// Base URL of the cluster (e.g., "http://localhost:9200").
    pub url: String,

    /// Index (or alias/pattern) holding the samples.
    pub index: String,

    /// Document field holding the RFC 3339 sample timestamp.
    #[serde(default = "default_timestamp_field")]
    pub timestamp_field: String,

    /// Maximum number of documents fetched per query.
    #[serde(default = "default_max_hits")]
    pub max_hits: usize,
}

fn default_timestamp_field() -> String {
    crate::model::TIMESTAMP_FIELD.to_string()
}

fn default_max_hits() -> usize {
    10_000
}

/// Create the store described by `config`.
pub fn create_store(config: &StoreConfig) -> Result<Arc<dyn SeriesStore>> {
    match config {
        StoreConfig::InMemory(cfg) => {
            let store = match &cfg.path {
                Some(path) => InMemoryStore::load(path)?,
                None => InMemoryStore::default(),
            };
            Ok(Arc::new(store))
        }
        StoreConfig::Elasticsearch(cfg) => Ok(Arc::new(ElasticsearchStore::new(cfg.clone())?)),
    }
}
