//! HTTP server for devsite.
//!
//! This crate provides a static-site development server using axum, serving:
//! - Static files from the site directory
//! - `.html` pages and directory indexes rendered as `minijinja` templates,
//!   including a "what is my IP" page under `/ip/`
//! - A `/healthz` endpoint
//! - A WebSocket endpoint for live reload during development
//!
//! # Run Modes
//!
//! - **Development**: the site directory is watched and every change sends
//!   `reload` to all connected browsers; a small script that listens for it
//!   is injected into every rendered page.
//! - **Production**: plain serving. No watcher, hub or socket route exists.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use devsite_config::RunMode;
//! use devsite_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         addr: "127.0.0.1:8000".parse().unwrap(),
//!         site_dir: PathBuf::from("site"),
//!         mode: RunMode::Development,
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum server (devsite-server)
//!                        │
//!                        ├─► /healthz
//!                        │
//!                        ├─► /ws (development) ──► ReloadHub ◄── bridge ◄── detector (notify)
//!                        │
//!                        ├─► *.html, */ ──► minijinja + reload script
//!                        │
//!                        └─► everything else ──► tower-http ServeDir
//! ```

mod app;
mod error;
mod handlers;
mod live_reload;
mod middleware;
mod state;
mod static_files;
mod templates;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use devsite_config::{Config, RunMode};
use state::AppState;

pub use error::ServerError;
pub use live_reload::WatchError;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Address to bind to.
    pub addr: SocketAddr,
    /// Directory to serve (and watch in development).
    pub site_dir: PathBuf,
    /// Run mode.
    pub mode: RunMode,
}

/// Run the server until Ctrl-C.
///
/// In development mode the file watcher is started before binding; failing
/// to start it is fatal.
///
/// # Arguments
///
/// * `config` - Server configuration
///
/// # Errors
///
/// Returns an error if the watcher cannot be started or the server fails to
/// bind or run.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    // Create live reload hub and watcher in development only
    let live_reload = if config.mode.is_development() {
        Some(live_reload::start(&config.site_dir)?)
    } else {
        None
    };

    let state = Arc::new(AppState::new(
        config.site_dir.clone(),
        config.mode,
        live_reload,
    ));

    let app = app::create_router(Arc::clone(&state));

    tracing::info!(
        address = %config.addr,
        mode = %config.mode,
        site_dir = %config.site_dir.display(),
        "Starting server"
    );

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(state))
    .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C), then close live reload connections.
async fn shutdown_signal(state: Arc<AppState>) {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");

    if let Some(hub) = &state.live_reload {
        hub.close_all().await;
    }
}

/// Create server configuration from devsite config.
///
/// # Errors
///
/// Returns `ServerError::Config` if the listen address cannot be resolved.
pub fn server_config_from_config(config: &Config) -> Result<ServerConfig, ServerError> {
    Ok(ServerConfig {
        addr: config.server.socket_addr()?,
        site_dir: config.site_resolved.root_dir.clone(),
        mode: config.mode,
    })
}
