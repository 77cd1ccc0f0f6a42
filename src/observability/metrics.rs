//! Metrics collection and exposition.
//!
//! # Metrics
//! - `portfolio_requests_total` (counter): requests by method, status
//! - `portfolio_request_duration_seconds` (histogram): latency distribution
//! - `portfolio_store_retries_total` (counter): retried store calls by code
//! - `portfolio_store_failures_total` (counter): failed store calls by class
//! - `portfolio_auth_decisions_total` (counter): gate decisions
//! - `portfolio_uploads_total` (counter): uploads by outcome
//! - `portfolio_rate_limited_total` (counter): rejected requests by scope
//!
//! Recording is a no-op until `init_metrics` installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::resilience::ErrorClass;

/// Install the Prometheus recorder and serve it on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start_time: Instant) {
    let status = status.to_string();
    ::metrics::counter!(
        "portfolio_requests_total",
        "method" => method.to_string(),
        "status" => status
    )
    .increment(1);
    ::metrics::histogram!("portfolio_request_duration_seconds", "method" => method.to_string())
        .record(start_time.elapsed().as_secs_f64());
}

pub fn record_retry(code: &str) {
    ::metrics::counter!("portfolio_store_retries_total", "code" => code.to_string()).increment(1);
}

pub fn record_permanent_failure(class: ErrorClass) {
    let class = match class {
        ErrorClass::Transient(_) => "transient",
        ErrorClass::Permanent => "permanent",
    };
    ::metrics::counter!("portfolio_store_failures_total", "class" => class).increment(1);
}

pub fn record_auth_decision(decision: &'static str) {
    ::metrics::counter!("portfolio_auth_decisions_total", "decision" => decision).increment(1);
}

pub fn record_upload(outcome: &'static str) {
    ::metrics::counter!("portfolio_uploads_total", "outcome" => outcome).increment(1);
}

pub fn record_rate_limited(scope: &'static str) {
    ::metrics::counter!("portfolio_rate_limited_total", "scope" => scope).increment(1);
}

/// Middleware recording request count and latency.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start_time = Instant::now();
    let method = request.method().as_str().to_string();
    let response = next.run(request).await;
    record_request(&method, response.status().as_u16(), start_time);
    response
}
