use std::path::Path;

use async_trait::async_trait;

use super::SeriesStore;
use crate::error::{Error, Result};
use crate::matcher::compile_all;
use crate::model::Row;
use crate::proto::Query;
use crate::series::parse_timestamp_millis;

/// A store serving rows held in memory.
///
/// Queries are evaluated by scanning every row: the time range is inclusive
/// on both ends and all matchers must hold. Rows whose timestamp cannot be
/// parsed are not filtered by time so the pipeline's timestamp policy decides
/// what happens to them.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    rows: Vec<Row>,
}

impl InMemoryStore {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Load rows from a YAML file containing a sequence of rows.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidInput(format!("Failed to read rows file {}: {}", path.display(), e))
        })?;
        let rows: Vec<Row> = serde_yaml::from_str(&contents).map_err(|e| {
            Error::InvalidInput(format!("Failed to parse rows file {}: {}", path.display(), e))
        })?;
        tracing::info!("Loaded {} rows from {}", rows.len(), path.display());
        Ok(Self::new(rows))
    }

    /// Number of rows held.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn in_range(row: &Row, query: &Query) -> bool {
    match parse_timestamp_millis(&row.timestamp) {
        Ok(ts) => ts >= query.start_timestamp_ms && ts <= query.end_timestamp_ms,
        Err(_) => true,
    }
}

#[async_trait]
impl SeriesStore for InMemoryStore {
    async fn read(&self, query: &Query) -> Result<Vec<Row>> {
        let matchers = compile_all(&query.matchers)?;

        Ok(self
            .rows
            .iter()
            .filter(|row| in_range(row, query))
            .filter(|row| matchers.iter().all(|m| m.matches(row)))
            .cloned()
            .collect())
    }
}
