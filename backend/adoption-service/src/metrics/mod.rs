//! Prometheus metrics for adoption-service.
//!
//! Collectors for proxied upstream calls, similarity searches and view
//! recording, plus the `/metrics` handler.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    /// Upstream HTTP calls by service and outcome (ok, http_error, transport_error).
    pub static ref UPSTREAM_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "adoption_upstream_requests_total",
        "Upstream API calls segmented by service and outcome",
        &["service", "outcome"]
    )
    .expect("failed to register adoption_upstream_requests_total");

    pub static ref UPSTREAM_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "adoption_upstream_request_duration_seconds",
        "Upstream API call latency segmented by service",
        &["service"]
    )
    .expect("failed to register adoption_upstream_request_duration_seconds");

    /// Similarity searches by outcome (ok, quota_exceeded, error).
    pub static ref AI_SEARCH_TOTAL: IntCounterVec = register_int_counter_vec!(
        "adoption_ai_search_total",
        "Image similarity searches segmented by outcome",
        &["outcome"]
    )
    .expect("failed to register adoption_ai_search_total");

    /// View record attempts by outcome (counted, duplicate, too_short).
    pub static ref VIEW_RECORD_TOTAL: IntCounterVec = register_int_counter_vec!(
        "adoption_view_record_total",
        "Article view record attempts segmented by outcome",
        &["outcome"]
    )
    .expect("failed to register adoption_view_record_total");
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
