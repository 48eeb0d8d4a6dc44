//! Prometheus metrics for the Leadline server.
//!
//! Counts lead lifecycle events, attachment traffic and request failures.
//! The `/metrics` endpoint is unauthenticated; restrict it at the network
//! level when the server is publicly reachable.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::{LazyLock, Once};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// Lead lifecycle
pub static LEADS_CREATED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new("leadline_leads_created_total", "Total number of leads created")
        .expect("metric creation failed")
});

pub static LEADS_UPDATED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new("leadline_leads_updated_total", "Total number of leads updated")
        .expect("metric creation failed")
});

pub static LEADS_DELETED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new("leadline_leads_deleted_total", "Total number of leads deleted")
        .expect("metric creation failed")
});

// Attachments
pub static ATTACHMENTS_STORED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "leadline_attachments_stored_total",
        "Total number of attachments written to the file store",
    )
    .expect("metric creation failed")
});

pub static ATTACHMENT_BYTES_STORED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "leadline_attachment_bytes_stored_total",
        "Total attachment bytes written to the file store",
    )
    .expect("metric creation failed")
});

pub static ATTACHMENT_CLEANUP_FAILURES: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "leadline_attachment_cleanup_failures_total",
        "Replaced or orphaned attachments that could not be deleted",
    )
    .expect("metric creation failed")
});

// Errors
pub static REQUEST_FAILURES: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "leadline_request_failures_total",
            "Total failed contact requests by error code",
        ),
        &["code"],
    )
    .expect("metric creation failed")
});

/// Guard to ensure metrics are only registered once.
static REGISTER_ONCE: Once = Once::new();

/// Register all metrics with the global registry.
///
/// Idempotent, so tests can build several routers in one process.
pub fn register_metrics() {
    REGISTER_ONCE.call_once(|| {
        let collectors: [Box<dyn prometheus::core::Collector>; 7] = [
            Box::new(LEADS_CREATED.clone()),
            Box::new(LEADS_UPDATED.clone()),
            Box::new(LEADS_DELETED.clone()),
            Box::new(ATTACHMENTS_STORED.clone()),
            Box::new(ATTACHMENT_BYTES_STORED.clone()),
            Box::new(ATTACHMENT_CLEANUP_FAILURES.clone()),
            Box::new(REQUEST_FAILURES.clone()),
        ];
        for collector in collectors {
            REGISTRY
                .register(collector)
                .expect("metric registration failed");
        }
    });
}

/// GET /metrics - Prometheus metrics endpoint.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        ),
    }
}

/// Record a failed contact request by its error code.
pub fn record_request_failure(code: &str) {
    REQUEST_FAILURES.with_label_values(&[code]).inc();
}

/// Record an attachment written to the file store.
pub fn record_attachment_stored(bytes: u64) {
    ATTACHMENTS_STORED.inc();
    ATTACHMENT_BYTES_STORED.inc_by(bytes);
}
