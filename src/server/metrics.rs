//! Prometheus metrics for the remote read server.

use std::time::Duration;

use axum::http::Method;
use prometheus_client::encoding::{EncodeLabelSet, EncodeLabelValue};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;

use crate::pipeline::{ReadObserver, ReadOutcome};

/// Labels for HTTP request metrics.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct HttpLabelsWithStatus {
    pub method: HttpMethod,
    pub endpoint: String,
    pub status: u16,
}

/// HTTP method label value.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Other,
}

impl From<&Method> for HttpMethod {
    fn from(method: &Method) -> Self {
        match *method {
            Method::GET => HttpMethod::Get,
            Method::POST => HttpMethod::Post,
            Method::PUT => HttpMethod::Put,
            Method::DELETE => HttpMethod::Delete,
            Method::PATCH => HttpMethod::Patch,
            Method::HEAD => HttpMethod::Head,
            Method::OPTIONS => HttpMethod::Options,
            _ => HttpMethod::Other,
        }
    }
}

/// Labels for HTTP request latency histogram (without status, since status is unknown at start).
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct HttpLabels {
    pub method: HttpMethod,
    pub endpoint: String,
}

/// Labels for remote read request outcomes.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ReadLabels {
    pub outcome: String,
}

impl From<ReadOutcome> for ReadLabels {
    fn from(outcome: ReadOutcome) -> Self {
        let outcome = match outcome {
            ReadOutcome::Success => "success",
            ReadOutcome::ClientError => "client_error",
            ReadOutcome::ServerError => "server_error",
        };
        Self {
            outcome: outcome.to_string(),
        }
    }
}

/// Container for all Prometheus metrics.
pub struct Metrics {
    registry: Registry,

    /// Counter of remote read requests by outcome.
    pub remote_read_requests_total: Family<ReadLabels, Counter>,

    /// Histogram of remote read processing time in seconds.
    pub remote_read_duration_seconds: Histogram,

    /// Counter of series returned to remote read clients.
    pub remote_read_series_total: Counter,

    /// Counter of samples returned to remote read clients.
    pub remote_read_samples_total: Counter,

    /// Counter of HTTP requests.
    pub http_requests_total: Family<HttpLabelsWithStatus, Counter>,

    /// Histogram of HTTP request latency in seconds.
    pub http_request_duration_seconds: Family<HttpLabels, Histogram>,

    /// Gauge of currently in-flight requests.
    pub http_requests_in_flight: Gauge,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics registry with all metrics registered.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let remote_read_requests_total = Family::<ReadLabels, Counter>::default();
        registry.register(
            "remote_read_requests",
            "Total number of remote read requests by outcome",
            remote_read_requests_total.clone(),
        );

        // Remote read duration histogram (buckets from 1ms to ~16s)
        let remote_read_duration_seconds = Histogram::new(exponential_buckets(0.001, 2.0, 15));
        registry.register(
            "remote_read_duration_seconds",
            "Time spent serving remote read requests in seconds",
            remote_read_duration_seconds.clone(),
        );

        let remote_read_series_total = Counter::default();
        registry.register(
            "remote_read_series",
            "Total number of series returned by remote read",
            remote_read_series_total.clone(),
        );

        let remote_read_samples_total = Counter::default();
        registry.register(
            "remote_read_samples",
            "Total number of samples returned by remote read",
            remote_read_samples_total.clone(),
        );

        // HTTP requests total counter
        let http_requests_total = Family::<HttpLabelsWithStatus, Counter>::default();
        registry.register(
            "http_requests",
            "Total number of HTTP requests",
            http_requests_total.clone(),
        );

        // HTTP request duration histogram (buckets from 1ms to ~8s)
        let http_request_duration_seconds =
            Family::<HttpLabels, Histogram>::new_with_constructor(|| {
                Histogram::new(exponential_buckets(0.001, 2.0, 14))
            });
        registry.register(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
            http_request_duration_seconds.clone(),
        );

        // In-flight requests gauge
        let http_requests_in_flight = Gauge::default();
        registry.register(
            "http_requests_in_flight",
            "Number of HTTP requests currently being processed",
            http_requests_in_flight.clone(),
        );

        Self {
            registry,
            remote_read_requests_total,
            remote_read_duration_seconds,
            remote_read_series_total,
            remote_read_samples_total,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
        }
    }

    /// Encode all metrics to Prometheus text format.
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        prometheus_client::encoding::text::encode(&mut buffer, &self.registry)
            .expect("encoding metrics should not fail");
        buffer
    }
}

impl ReadObserver for Metrics {
    fn observe_read(&self, outcome: ReadOutcome, elapsed: Duration) {
        self.remote_read_requests_total
            .get_or_create(&ReadLabels::from(outcome))
            .inc();
        self.remote_read_duration_seconds
            .observe(elapsed.as_secs_f64());
    }

    fn observe_result(&self, series: usize, samples: usize) {
        self.remote_read_series_total.inc_by(series as u64);
        self.remote_read_samples_total.inc_by(samples as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_create_default_metrics() {
        // given/when
        let metrics = Metrics::new();

        // then
        let encoded = metrics.encode();
        assert!(encoded.contains("# HELP remote_read_requests"));
        assert!(encoded.contains("# HELP remote_read_duration_seconds"));
        assert!(encoded.contains("# HELP remote_read_series"));
        assert!(encoded.contains("# HELP remote_read_samples"));
        assert!(encoded.contains("# HELP http_requests Total number of HTTP requests"));
        assert!(encoded.contains("# HELP http_request_duration_seconds"));
        assert!(encoded.contains("# HELP http_requests_in_flight"));
    }

    #[test]
    fn should_convert_http_method_to_label() {
        // given
        let method = Method::POST;

        // when
        let label = HttpMethod::from(&method);

        // then
        assert!(matches!(label, HttpMethod::Post));
    }

    #[test]
    fn should_count_read_outcomes_and_returned_data() {
        // given
        let metrics = Metrics::new();

        // when
        metrics.observe_read(ReadOutcome::Success, Duration::from_millis(5));
        metrics.observe_read(ReadOutcome::ClientError, Duration::from_millis(1));
        metrics.observe_result(2, 3);

        // then
        assert_eq!(
            metrics
                .remote_read_requests_total
                .get_or_create(&ReadLabels::from(ReadOutcome::Success))
                .get(),
            1
        );
        assert_eq!(
            metrics
                .remote_read_requests_total
                .get_or_create(&ReadLabels::from(ReadOutcome::ClientError))
                .get(),
            1
        );
        assert_eq!(metrics.remote_read_series_total.get(), 2);
        assert_eq!(metrics.remote_read_samples_total.get(), 3);

        let encoded = metrics.encode();
        assert!(encoded.contains(r#"remote_read_requests_total{outcome="client_error"} 1"#));
    }
}
