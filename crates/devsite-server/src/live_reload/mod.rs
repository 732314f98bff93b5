//! Live reload for development mode.
//!
//! A [`ReloadHub`] tracks the browsers connected to [`SOCKET_PATH`], the
//! detector watches the site directory, and the bridge broadcasts
//! [`RELOAD_MESSAGE`] to every client on each change. None of this is
//! constructed in production mode.

mod bridge;
mod detector;
mod hub;
mod inject;
#[cfg(test)]
pub(crate) mod testing;
mod websocket;

use std::path::Path;
use std::sync::Arc;

pub use detector::WatchError;
pub(crate) use hub::ReloadHub;
pub(crate) use inject::inject_reload_script;
pub(crate) use websocket::ws_handler;

/// Path of the live reload WebSocket endpoint.
pub(crate) const SOCKET_PATH: &str = "/ws";

/// Message sent to clients when the site changes.
pub(crate) const RELOAD_MESSAGE: &str = "reload";

/// Start watching `site_dir` and return the hub that reload clients join.
///
/// Must be called from within a tokio runtime; the bridge runs as a
/// background task for the lifetime of the process.
///
/// # Errors
///
/// Returns an error if the file watcher cannot be set up.
pub(crate) fn start(site_dir: &Path) -> Result<Arc<ReloadHub>, WatchError> {
    let changes = detector::watch(site_dir)?;
    let hub = Arc::new(ReloadHub::new());
    tokio::spawn(bridge::run(changes, Arc::clone(&hub)));
    Ok(hub)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_start_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = start(&dir.path().join("missing"));
        assert!(matches!(result, Err(WatchError::Walk { .. })));
    }
}
