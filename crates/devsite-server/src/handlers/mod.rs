//! HTTP request handlers.

pub(crate) mod client_ip;
pub(crate) mod health;
pub(crate) mod pages;

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::response::{IntoResponse, Response};

use crate::state::AppState;
use crate::static_files;

/// Route every request that is not the live reload socket.
///
/// Health checks first, then templated pages (directory indexes and `.html`
/// files), then plain static files.
pub(crate) async fn dispatch(State(state): State<Arc<AppState>>, req: Request<Body>) -> Response {
    let path = req.uri().path();

    if path.starts_with(health::HEALTH_PATH) {
        return health::healthz().into_response();
    }

    if is_page_path(path) {
        let (parts, _) = req.into_parts();
        return pages::render(&state, &parts).await.into_response();
    }

    static_files::serve(&state.site_dir, req).await
}

/// Whether `path` is rendered as a template rather than served verbatim.
fn is_page_path(path: &str) -> bool {
    path.ends_with('/') || path.ends_with(".html")
}
