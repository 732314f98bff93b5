//! `devsite serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use devsite_config::{CliSettings, Config, RunMode};
use devsite_server::{run_server, server_config_from_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover devsite.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Site directory to serve (overrides config).
    #[arg(short, long)]
    root_dir: Option<PathBuf>,

    /// Address to listen on, e.g. `:8000` or `127.0.0.1:8000` (overrides config).
    #[arg(short, long, env = "LISTEN_ADDR")]
    listen_addr: Option<String>,

    /// Run mode; `development` enables live reload (overrides config).
    #[arg(long, env = "DEVSITE_ENV")]
    mode: Option<RunMode>,

    /// Shorthand for `--mode development`.
    #[arg(long)]
    dev: bool,

    /// Enable verbose output (debug logging).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            mode: self.resolve_mode(),
            listen_addr: self.listen_addr,
            root_dir: self.root_dir,
        };

        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        tracing::debug!(?config, "Configuration loaded");
        let server_config = server_config_from_config(&config)?;

        output.banner(server_config.addr);
        output.field("site", server_config.site_dir.display());
        output.field("mode", config.mode);
        if let Some(path) = &config.config_path {
            output.field("config", path.display());
        }
        output.live_reload(config.mode.is_development());
        if !config.mode.is_development() && !server_config.site_dir.is_dir() {
            output.warning("site directory does not exist, every request will 404");
        }

        run_server(server_config).await?;

        Ok(())
    }

    /// Resolve the run mode from --dev/--mode.
    fn resolve_mode(&self) -> Option<RunMode> {
        self.dev.then_some(RunMode::Development).or(self.mode)
    }
}
