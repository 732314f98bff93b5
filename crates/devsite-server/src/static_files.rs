//! Static file serving.
//!
//! Serves files from the site directory verbatim with `tower-http`'s
//! `ServeDir`, which answers 404 for missing files.

use std::convert::Infallible;
use std::path::Path;

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeDir;

/// Serve the file addressed by `req` from `site_dir`.
pub(crate) async fn serve(site_dir: &Path, req: Request<Body>) -> Response {
    let result: Result<_, Infallible> = ServeDir::new(site_dir).oneshot(req).await;
    match result {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}
