//! The remote read transcoding pipeline.
//!
//! [`ReadPipeline::execute`] runs one request end to end:
//! decode -> validate -> query -> group -> encode.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::codec::{decode_read_request, encode_read_response, single_query};
use crate::error::{Error, Result};
use crate::proto::TimeSeries;
use crate::series::{GroupingOptions, group_rows};
use crate::store::SeriesStore;

/// Outcome of a remote read request, as reported to a [`ReadObserver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadOutcome {
    Success,
    ClientError,
    ServerError,
}

impl ReadOutcome {
    fn of(result: &Result<Vec<u8>>) -> Self {
        match result {
            Ok(_) => ReadOutcome::Success,
            Err(e) if e.is_client_error() => ReadOutcome::ClientError,
            Err(_) => ReadOutcome::ServerError,
        }
    }
}

/// Observability hooks for the pipeline.
///
/// Injected into [`ReadPipeline`] so that counters and timers live with the
/// caller instead of in process-wide state. All methods default to no-ops.
pub trait ReadObserver: Send + Sync {
    /// Called once per request with its outcome and total duration.
    fn observe_read(&self, _outcome: ReadOutcome, _elapsed: Duration) {}

    /// Called for every successful response with the amount of data returned.
    fn observe_result(&self, _series: usize, _samples: usize) {}
}

/// Observer that records nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ReadObserver for NoopObserver {}

/// Decodes remote read requests, runs them against a store and encodes the result.
#[derive(Clone)]
pub struct ReadPipeline {
    store: Arc<dyn SeriesStore>,
    options: GroupingOptions,
    observer: Arc<dyn ReadObserver>,
}

impl ReadPipeline {
    /// Create a pipeline with default grouping options and no observer.
    pub fn new(store: Arc<dyn SeriesStore>) -> Self {
        Self {
            store,
            options: GroupingOptions::default(),
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_options(mut self, options: GroupingOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ReadObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Serve one compressed request body, returning the compressed response body.
    pub async fn execute(&self, body: &[u8]) -> Result<Vec<u8>> {
        let started = Instant::now();
        let result = self.run(body).await;

        match &result {
            Ok(_) => {}
            Err(e) if e.is_client_error() => tracing::warn!("Rejected read request: {}", e),
            Err(e) => tracing::error!("Failed to serve read request: {}", e),
        }
        self.observer
            .observe_read(ReadOutcome::of(&result), started.elapsed());

        result
    }

    async fn run(&self, body: &[u8]) -> Result<Vec<u8>> {
        let request = decode_read_request(body)?;
        let query = single_query(request)?;

        let rows = self
            .store
            .read(&query)
            .await
            .map_err(|e| {
                if matches!(e, Error::Storage(_) | Error::InvalidRow(_)) {
                    e
                } else {
                    Error::Storage(e.to_string())
                }
            })?;
        tracing::debug!("Store returned {} rows", rows.len());

        let series = group_rows(rows, self.options)?;
        let (series_count, sample_count) = totals(&series);
        tracing::debug!("Returned {} time series", series_count);

        let encoded = encode_read_response(series)?;
        self.observer.observe_result(series_count, sample_count);
        Ok(encoded)
    }
}

fn totals(series: &[TimeSeries]) -> (usize, usize) {
    let samples = series.iter().map(|s| s.samples.len()).sum();
    (series.len(), samples)
}
