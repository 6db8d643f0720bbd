//! HTTP server exposing the remote read endpoint.
//!
//! Routes:
//! - `POST /api/v1/read`: Prometheus remote read (snappy + protobuf).
//! - `GET /metrics`: Prometheus text exposition of server metrics.
//! - `GET /-/healthy`, `GET /-/ready`: liveness and readiness probes.

mod config;
pub mod error;
pub mod handlers;
mod http;
pub mod metrics;
mod middleware;
pub mod response;

pub use config::{CliArgs, ReadServerConfig};
pub use http::ReadServer;
