//! Prometheus metrics.
//!
//! HTTP request metrics are recorded by [`metrics_middleware`]; the engine
//! and delivery sinks record through the `record_*` helpers below.

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{header, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Records `http_requests_total` and `http_request_duration_seconds`,
/// labelled by the matched route rather than the raw path.
pub async fn metrics_middleware(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = method_to_str(req.method());
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!(
        "http_requests_total",
        "method" => method,
        "path" => path.clone(),
        "status" => status
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path
    )
    .record(duration);

    response
}

fn method_to_str(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        Method::PATCH => "PATCH",
        Method::HEAD => "HEAD",
        Method::OPTIONS => "OPTIONS",
        _ => "OTHER",
    }
}

pub fn record_notification_created(notification_type: &'static str, priority: &'static str) {
    counter!(
        "rescue_notifications_created_total",
        "type" => notification_type,
        "priority" => priority
    )
    .increment(1);
}

/// A candidate dropped because an equivalent notification is still recent.
pub fn record_notification_suppressed(notification_type: &'static str) {
    counter!("rescue_notifications_suppressed_total", "type" => notification_type).increment(1);
}

pub fn record_evaluation_error(stage: &'static str) {
    counter!("rescue_evaluation_errors_total", "stage" => stage).increment(1);
}

pub fn record_sweep(scope: &'static str, duration_secs: f64) {
    counter!("rescue_sweeps_total", "scope" => scope).increment(1);
    histogram!("rescue_sweep_duration_seconds", "scope" => scope).record(duration_secs);
}

pub fn record_recheck_dropped(scope: &'static str) {
    counter!("rescue_rechecks_dropped_total", "scope" => scope).increment(1);
}

/// `outcome` is `delivered` or `failed`.
pub fn record_delivery(sink: &'static str, outcome: &'static str) {
    counter!("rescue_deliveries_total", "sink" => sink, "outcome" => outcome).increment(1);
}

pub fn record_webhook_attempt() {
    counter!("rescue_webhook_attempts_total").increment(1);
}

/// Handler for `/metrics`, Prometheus text format.
pub async fn metrics_handler() -> impl IntoResponse {
    match PROMETHEUS_HANDLE.get() {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        ),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain")],
            "Metrics not initialized".to_string(),
        ),
    }
}

/// Installs the global Prometheus recorder. Calling it again is a no-op.
pub fn init_metrics() -> Result<(), BuildError> {
    if PROMETHEUS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets(&[0.001, 0.005, 0.01, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0, 10.0])?
        .install_recorder()?;

    // Lost race: the other caller's handle is already serving
    let _ = PROMETHEUS_HANDLE.set(handle);
    Ok(())
}
