//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::live_reload;
use crate::middleware::{logging, security};
use crate::state::AppState;

/// Create the application router.
///
/// # Arguments
///
/// * `state` - Shared application state
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new();

    // WebSocket for live reload
    if state.live_reload_enabled() {
        router = router.route(live_reload::SOCKET_PATH, get(live_reload::ws_handler));
    }

    // Health check, templated pages and static files
    router = router.fallback(handlers::dispatch);

    if state.mode.is_development() {
        router = router.layer(security::no_store_layer());
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(logging::make_span)
                        .on_response(logging::on_response),
                )
                .layer(security::content_type_options_layer()),
        )
        .with_state(state)
}
