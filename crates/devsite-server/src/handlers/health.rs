//! Health check endpoint.

use axum::http::StatusCode;

/// Prefix matched for health checks (`/healthz`, `/healthz/ready`, ...).
pub(crate) const HEALTH_PATH: &str = "/healthz";

/// Report that the server is up.
pub(crate) fn healthz() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
