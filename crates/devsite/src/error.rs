//! CLI error types.

use devsite_config::ConfigError;
use devsite_server::ServerError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Server(#[from] ServerError),
}
