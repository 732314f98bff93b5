//! Application state.
//!
//! Shared state for all request handlers.

use std::path::PathBuf;
use std::sync::Arc;

use devsite_config::RunMode;
use minijinja::Environment;

use crate::live_reload::ReloadHub;
use crate::templates;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Directory served over HTTP.
    pub(crate) site_dir: PathBuf,
    /// Run mode, fixed at startup.
    pub(crate) mode: RunMode,
    /// Template environment for HTML pages.
    pub(crate) templates: Environment<'static>,
    /// Live reload hub (development mode only).
    pub(crate) live_reload: Option<Arc<ReloadHub>>,
}

impl AppState {
    /// Create application state.
    pub(crate) fn new(
        site_dir: PathBuf,
        mode: RunMode,
        live_reload: Option<Arc<ReloadHub>>,
    ) -> Self {
        Self {
            site_dir,
            mode,
            templates: templates::environment(),
            live_reload,
        }
    }

    /// Check if live reload is enabled.
    #[must_use]
    pub(crate) fn live_reload_enabled(&self) -> bool {
        self.live_reload.is_some()
    }
}
