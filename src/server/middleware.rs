//! Tower middleware for request tracing and HTTP metrics.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::response::Response;
use tower::{Layer, Service};
use tracing::Instrument;

use super::metrics::{HttpLabels, HttpLabelsWithStatus, HttpMethod, Metrics};

type BoxFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send>>;

/// Route template of a request, falling back to the raw path for unmatched routes.
fn endpoint(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

/// Layer that records request counts, latency and in-flight requests.
#[derive(Clone)]
pub struct MetricsLayer {
    metrics: Arc<Metrics>,
}

impl MetricsLayer {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self { metrics }
    }
}

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsService {
            inner,
            metrics: self.metrics.clone(),
        }
    }
}

#[derive(Clone)]
pub struct MetricsService<S> {
    inner: S,
    metrics: Arc<Metrics>,
}

impl<S> Service<Request> for MetricsService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<Response, S::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let method = HttpMethod::from(request.method());
        let endpoint = endpoint(&request);
        let metrics = self.metrics.clone();

        // The clone is not guaranteed to be ready; use the instance poll_ready was called on.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            metrics.http_requests_in_flight.inc();
            let start = Instant::now();

            let result = inner.call(request).await;

            metrics.http_requests_in_flight.dec();
            metrics
                .http_request_duration_seconds
                .get_or_create(&HttpLabels {
                    method: method.clone(),
                    endpoint: endpoint.clone(),
                })
                .observe(start.elapsed().as_secs_f64());

            if let Ok(response) = &result {
                metrics
                    .http_requests_total
                    .get_or_create(&HttpLabelsWithStatus {
                        method,
                        endpoint,
                        status: response.status().as_u16(),
                    })
                    .inc();
            }

            result
        })
    }
}

/// Layer that wraps every request in a tracing span.
#[derive(Clone, Default)]
pub struct TracingLayer;

impl TracingLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for TracingLayer {
    type Service = TracingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TracingService { inner }
    }
}

#[derive(Clone)]
pub struct TracingService<S> {
    inner: S,
}

impl<S> Service<Request> for TracingService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<Response, S::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let span = tracing::info_span!(
            "http_request",
            method = %request.method(),
            endpoint = %endpoint(&request),
        );

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(
            async move {
                let start = Instant::now();
                let result = inner.call(request).await;
                if let Ok(response) = &result {
                    tracing::debug!(
                        status = response.status().as_u16(),
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Request completed"
                    );
                }
                result
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn should_record_request_metrics_by_route() {
        // given
        let metrics = Arc::new(Metrics::new());
        let app = Router::new()
            .route("/-/healthy", get(|| async { "OK" }))
            .layer(TracingLayer::new())
            .layer(MetricsLayer::new(metrics.clone()));
        let request = Request::builder()
            .uri("/-/healthy")
            .body(Body::empty())
            .unwrap();

        // when
        let response = app.oneshot(request).await.unwrap();

        // then
        assert_eq!(response.status(), StatusCode::OK);
        let count = metrics
            .http_requests_total
            .get_or_create(&HttpLabelsWithStatus {
                method: HttpMethod::Get,
                endpoint: "/-/healthy".to_string(),
                status: 200,
            })
            .get();
        assert_eq!(count, 1);
        assert_eq!(metrics.http_requests_in_flight.get(), 0);
    }
}
