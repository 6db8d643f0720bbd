//! Configuration for the remote read endpoint.
//!
//! Settings are read from a YAML file; every field has a default so an empty
//! file (or no file at all) yields a working in-memory setup.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::series::{GroupingOptions, SeriesIdentity, TimestampPolicy};
use crate::store::StoreConfig;

/// Root configuration.
///
/// # Example
///
/// ```yaml
/// store:
///   type: Elasticsearch
///   url: http://localhost:9200
///   index: prometheus
/// series_identity: label_values
/// timestamp_policy: strict
/// max_body_bytes: 8388608
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Config {
    /// Backing store queried for rows.
    #[serde(default)]
    pub store: StoreConfig,

    /// How rows are grouped into series.
    #[serde(default)]
    pub series_identity: SeriesIdentity,

    /// Handling of rows with malformed timestamps.
    #[serde(default)]
    pub timestamp_policy: TimestampPolicy,

    /// Largest accepted request body, in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_max_body_bytes() -> usize {
    8 * 1024 * 1024
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            series_identity: SeriesIdentity::default(),
            timestamp_policy: TimestampPolicy::default(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Config {
    /// Grouping options derived from this configuration.
    pub fn grouping(&self) -> GroupingOptions {
        GroupingOptions {
            identity: self.series_identity,
            timestamp_policy: self.timestamp_policy,
        }
    }
}

/// Load configuration from a YAML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref())
        .map_err(|e| Error::InvalidInput(format!("Failed to read config file: {}", e)))?;

    serde_yaml::from_str(&contents)
        .map_err(|e| Error::InvalidInput(format!("Failed to parse config file: {}", e)))
}
