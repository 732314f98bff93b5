//! Configuration management for devsite.
//!
//! Parses `devsite.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings (including values that clap reads from the environment,
//! such as `LISTEN_ADDR` and `DEVSITE_ENV`) are applied during load via
//! [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.listen_addr`
//! - `site.root_dir`

mod expand;

use std::convert::Infallible;
use std::fmt;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override listen address.
    pub listen_addr: Option<String>,
    /// Override site root directory.
    pub root_dir: Option<PathBuf>,
    /// Override run mode.
    pub mode: Option<RunMode>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "devsite.toml";

/// Default listen address (all interfaces, port 8000).
const DEFAULT_LISTEN_ADDR: &str = ":8000";

/// Process run mode, fixed at startup.
///
/// Development mode enables the live reload subsystem: the reload hub,
/// the file watcher and the script injected into HTML pages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Live reload enabled, pages rendered with relative root links.
    Development,
    /// Plain static serving.
    #[default]
    Production,
}

impl RunMode {
    /// Whether this is development mode.
    #[must_use]
    pub fn is_development(self) -> bool {
        self == Self::Development
    }
}

impl FromStr for RunMode {
    type Err = Infallible;

    /// Anything other than `development` (or `dev`) means production, so an
    /// unexpected `DEVSITE_ENV` value never turns on the watcher.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if value.eq_ignore_ascii_case("development") || value.eq_ignore_ascii_case("dev") {
            Ok(Self::Development)
        } else {
            Ok(Self::Production)
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => f.write_str("development"),
            Self::Production => f.write_str("production"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Run mode.
    pub mode: RunMode,
    /// Server configuration.
    pub server: ServerConfig,
    /// Site configuration (paths are relative strings from TOML).
    site: SiteConfigRaw,

    /// Resolved site configuration (set after loading).
    #[serde(skip)]
    pub site_resolved: SiteConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address. A leading `:` (e.g. `:8000`) binds all interfaces.
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_owned(),
        }
    }
}

impl ServerConfig {
    /// Resolve the listen address to a socket address.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the address cannot be resolved.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        resolve_listen_addr(&self.listen_addr)
    }
}

/// Resolve a listen address, accepting the `:port` shorthand.
fn resolve_listen_addr(addr: &str) -> Result<SocketAddr, ConfigError> {
    let addr = addr.trim();
    let full = if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr.to_owned()
    };

    full.to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .ok_or_else(|| {
            ConfigError::Validation(format!("server.listen_addr is not a valid address: {addr}"))
        })
}

/// Raw site configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SiteConfigRaw {
    root_dir: Option<String>,
}

/// Resolved site configuration with absolute paths.
#[derive(Debug, Default)]
pub struct SiteConfig {
    /// Directory whose files are served and watched.
    pub root_dir: PathBuf,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`server.listen_addr`").
        field: String,
        /// Error message (e.g., "${`LISTEN_ADDR`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `devsite.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values. The final
    /// configuration is validated.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(listen_addr) = &settings.listen_addr {
            self.server.listen_addr.clone_from(listen_addr);
        }
        if let Some(root_dir) = &settings.root_dir {
            self.site_resolved.root_dir.clone_from(root_dir);
        }
        if let Some(mode) = settings.mode {
            self.mode = mode;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            mode: RunMode::default(),
            server: ServerConfig::default(),
            site: SiteConfigRaw::default(),
            site_resolved: SiteConfig {
                root_dir: base.join("site"),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.listen_addr, "server.listen_addr")?;
        self.server.socket_addr()?;
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.listen_addr =
            expand::expand_env(&self.server.listen_addr, "server.listen_addr")?;

        if let Some(ref root_dir) = self.site.root_dir {
            self.site.root_dir = Some(expand::expand_env(root_dir, "site.root_dir")?);
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.site_resolved = SiteConfig {
            root_dir: config_dir.join(self.site.root_dir.as_deref().unwrap_or("site")),
        };
    }
}
