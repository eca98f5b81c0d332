//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.gitchat/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::chat_log::DEFAULT_LOG_CAPACITY;
use crate::core::history::DEFAULT_HISTORY_CAPACITY;
use crate::core::store::DEFAULT_STORE_PATH;
use crate::core::wire::Identity;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GitchatConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UserConfig {
    pub username: Option<String>,
    pub repo_uri: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct StoreConfig {
    pub path: Option<String>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UiConfig {
    pub log_capacity: Option<usize>,
    pub history_capacity: Option<usize>,
    pub mouse: Option<bool>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_HOST: &str = "go-myvit.eastasia.cloudapp.azure.com";
pub const DEFAULT_PORT: u16 = 1025;

// ============================================================================
// CLI overrides
// ============================================================================

/// Values given on the command line (None = not specified).
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub repo_uri: Option<String>,
    pub store_path: Option<String>,
    pub no_store: bool,
    pub mouse: bool,
}

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub host: String,
    pub port: u16,
    pub identity: Identity,
    /// `None` when persistence is disabled.
    pub store_path: Option<PathBuf>,
    pub log_capacity: usize,
    pub history_capacity: usize,
    pub mouse: bool,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    /// A required value has no default and was not given anywhere.
    Missing(&'static str),
    /// A value that cannot be sent as a single protocol token.
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
            ConfigError::Missing(what) => write!(
                f,
                "no {what} configured (set it in ~/.gitchat/config.toml, the environment, or on the command line)"
            ),
            ConfigError::Invalid(what) => write!(f, "{what} must not contain whitespace"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.gitchat/`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".gitchat"))
}

/// Returns the path to `~/.gitchat/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load config from `~/.gitchat/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `GitchatConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<GitchatConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(GitchatConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(GitchatConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: GitchatConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# GitChat Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [server]
# host = "go-myvit.eastasia.cloudapp.azure.com"   # Or GITCHAT_HOST
# port = 1025                                     # Or GITCHAT_PORT

# [user]
# username = "octocat"                 # Or GITCHAT_USERNAME, falls back to $USER
# repo_uri = "github.com/acme/widgets" # Or GITCHAT_REPO

# [store]
# path = ".git/.gitchat_store"         # Relative to the working directory
# enabled = true

# [ui]
# log_capacity = 1000                  # Lines kept in the chat pane
# history_capacity = 1000              # Input lines reachable with Up/Down
# mouse = false                        # Click to focus, wheel to scroll
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &GitchatConfig, cli: &CliOverrides) -> Result<ResolvedConfig, ConfigError> {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// [`resolve`] with an injectable environment lookup.
fn resolve_with_env(
    config: &GitchatConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedConfig, ConfigError> {
    // Host: CLI → env → config → default
    let host = cli
        .host
        .clone()
        .or_else(|| env("GITCHAT_HOST"))
        .or_else(|| config.server.host.clone())
        .unwrap_or_else(|| DEFAULT_HOST.to_string());

    // Port: CLI → env (ignored if unparsable) → config → default
    let port = cli
        .port
        .or_else(|| {
            env("GITCHAT_PORT").and_then(|p| match p.parse() {
                Ok(port) => Some(port),
                Err(_) => {
                    warn!("Ignoring invalid GITCHAT_PORT: {}", p);
                    None
                }
            })
        })
        .or(config.server.port)
        .unwrap_or(DEFAULT_PORT);

    // Username: CLI → env → config → login name
    let username = cli
        .username
        .clone()
        .or_else(|| env("GITCHAT_USERNAME"))
        .or_else(|| config.user.username.clone())
        .or_else(|| env("USER"))
        .filter(|u| !u.trim().is_empty())
        .ok_or(ConfigError::Missing("username"))?;

    // Repo URI: CLI → env → config (no default)
    let repo_uri = cli
        .repo_uri
        .clone()
        .or_else(|| env("GITCHAT_REPO"))
        .or_else(|| config.user.repo_uri.clone())
        .filter(|r| !r.trim().is_empty())
        .ok_or(ConfigError::Missing("repository URI"))?;

    // Both travel as single space-separated tokens on the wire
    let username = username.trim();
    let repo_uri = repo_uri.trim();
    if username.contains(char::is_whitespace) {
        return Err(ConfigError::Invalid("username"));
    }
    if repo_uri.contains(char::is_whitespace) {
        return Err(ConfigError::Invalid("repository URI"));
    }

    let store_enabled = !cli.no_store && config.store.enabled.unwrap_or(true);
    let store_path = store_enabled.then(|| {
        PathBuf::from(
            cli.store_path
                .clone()
                .or_else(|| config.store.path.clone())
                .unwrap_or_else(|| DEFAULT_STORE_PATH.to_string()),
        )
    });

    Ok(ResolvedConfig {
        host,
        port,
        identity: Identity::new(username, repo_uri),
        store_path,
        log_capacity: config.ui.log_capacity.unwrap_or(DEFAULT_LOG_CAPACITY),
        history_capacity: config
            .ui
            .history_capacity
            .unwrap_or(DEFAULT_HISTORY_CAPACITY),
        mouse: cli.mouse || config.ui.mouse.unwrap_or(false),
    })
}
