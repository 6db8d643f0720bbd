//! Remote Read - a Prometheus remote read endpoint over pluggable stores.
//!
//! Prometheus sends a snappy-compressed protobuf `ReadRequest`; this crate
//! decodes it, runs its single query against a [`SeriesStore`], groups the
//! returned rows into time series and answers with a snappy-compressed
//! `ReadResponse`.
//!
//! # Key Concepts
//!
//! - **ReadPipeline**: decode -> validate -> query -> group -> encode.
//! - **SeriesStore**: the capability that turns a query into [`Row`]s.
//! - **Row**: one sample with its value, RFC 3339 timestamp and labels.
//! - **Series key**: the identity used to collapse rows into one series,
//!   built from the sorted label values by default (see [`SeriesIdentity`]).
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use remote_read::{InMemoryStore, ReadPipeline, Row};
//!
//! let store = InMemoryStore::new(vec![
//!     Row::new(1.0, "2024-01-01T00:00:00Z").with_label("host", "a"),
//! ]);
//! let pipeline = ReadPipeline::new(Arc::new(store));
//!
//! // body: snappy-compressed ReadRequest with exactly one query
//! let response_body = pipeline.execute(&body).await?;
//! ```

pub mod codec;
mod config;
mod error;
mod matcher;
mod model;
mod pipeline;
pub mod proto;
mod series;
#[cfg(feature = "http-server")]
pub mod server;
mod store;

pub use config::{Config, load_config};
pub use error::{Error, Result};
pub use matcher::Matcher;
pub use model::{Row, TIMESTAMP_FIELD, VALUE_FIELD};
pub use pipeline::{NoopObserver, ReadObserver, ReadOutcome, ReadPipeline};
pub use series::{
    GroupingOptions, SeriesIdentity, SeriesKey, TimestampPolicy, group_rows,
    parse_timestamp_millis, series_key,
};
pub use store::{
    ElasticsearchStore, ElasticsearchStoreConfig, InMemoryStore, InMemoryStoreConfig,
    SeriesStore, StoreConfig, create_store,
};
