/// Metrics and telemetry for Study Gate
///
/// Provides Prometheus-compatible metrics for monitoring:
/// - HTTP request counts and latencies
/// - Registrations and student login outcomes
/// - Admin authorizations and mutations

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    // ========== HTTP Metrics ==========

    /// Total HTTP requests by method, path, and status
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    /// HTTP request duration in seconds
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request latencies in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .unwrap();

    // ========== Account Metrics ==========

    /// Registrations by result (created, duplicate)
    pub static ref REGISTRATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "registrations_total",
        "Total number of registration attempts",
        &["result"]
    )
    .unwrap();

    /// Student login outcomes (allowed or the denial reason)
    pub static ref LOGIN_OUTCOMES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "login_outcomes_total",
        "Total number of student login decisions",
        &["outcome"]
    )
    .unwrap();

    // ========== Admin Metrics ==========

    /// Admin authorizations by result (granted, rejected)
    pub static ref ADMIN_AUTHORIZATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "admin_authorizations_total",
        "Total number of admin authorization attempts",
        &["result"]
    )
    .unwrap();

    /// Admin mutations by kind
    pub static ref ADMIN_MUTATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "admin_mutations_total",
        "Total number of administrative mutations",
        &["kind"]
    )
    .unwrap();
}

/// Render metrics in Prometheus text format
pub fn render_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration);
}
