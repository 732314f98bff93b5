//! Request logging.
//!
//! Hooks for `tower_http::trace::TraceLayer`: one span per request carrying
//! method and URI, and one event per response with status and latency.

use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use tracing::Span;

/// Create the span for a request.
pub(crate) fn make_span(request: &Request<Body>) -> Span {
    tracing::info_span!("request", method = %request.method(), uri = %request.uri())
}

/// Log a finished response; error statuses are logged as warnings.
pub(crate) fn on_response(response: &Response, latency: Duration, _span: &Span) {
    let status = response.status();
    let latency_ms = latency.as_secs_f64() * 1000.0;
    if status.is_client_error() || status.is_server_error() {
        tracing::warn!(status = status.as_u16(), latency_ms, "Request failed");
    } else {
        tracing::info!(status = status.as_u16(), latency_ms, "Request served");
    }
}
