//! Server error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use devsite_config::ConfigError;

use crate::live_reload::WatchError;

/// Server error.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Invalid configuration.
    #[error("{0}")]
    Config(#[from] ConfigError),
    /// The live reload watcher could not be started.
    #[error("live reload: {0}")]
    Watch(#[from] WatchError),
    /// I/O error (binding the listener, reading a page).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Requested page does not exist.
    #[error("page not found: {0}")]
    NotFound(String),
    /// Page template failed to parse or render.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound(path) => {
                tracing::warn!(path = %path, "Page not found");
                (StatusCode::NOT_FOUND, "404 page not found\n").into_response()
            }
            other => {
                tracing::error!(error = %other, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()).into_response()
            }
        }
    }
}
