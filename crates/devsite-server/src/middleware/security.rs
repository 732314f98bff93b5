//! Response header middleware.
//!
//! Adds headers to all responses:
//! - X-Content-Type-Options
//! - Cache-Control (development mode only)

use axum::http::HeaderValue;
use axum::http::header::{CACHE_CONTROL, HeaderName};
use tower_http::set_header::SetResponseHeaderLayer;

/// Cache-Control value used in development, so a reload always refetches.
const NO_STORE: &str = "no-store";

/// Create layer that adds X-Content-Type-Options header.
pub(crate) fn content_type_options_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    )
}

/// Create layer that disables browser caching.
pub(crate) fn no_store_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(CACHE_CONTROL, HeaderValue::from_static(NO_STORE))
}
