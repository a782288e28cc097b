//! Configuration loading and service settings resolution
//!
//! Each setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or unreadable config file is never fatal: a warning is logged
//! and the remaining tiers are used.

use crate::{Error, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const ENV_CONFIG_FILE: &str = "QIRAAT_CONFIG";
pub const ENV_LOG_LEVEL: &str = "QIRAAT_LOG_LEVEL";
pub const ENV_ID_BIND: &str = "QIRAAT_ID_BIND";
pub const ENV_UI_BIND: &str = "QIRAAT_UI_BIND";
pub const ENV_PREDICT_URL: &str = "QIRAAT_PREDICT_URL";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "QIRAAT_REQUEST_TIMEOUT_SECS";

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional; absent fields fall through to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default)]
    pub log_level: Option<String>,

    /// Listen address of the classification endpoint (qiraat-id)
    #[serde(default)]
    pub id_bind: Option<SocketAddr>,

    /// Listen address of the analyzer page (qiraat-ui)
    #[serde(default)]
    pub ui_bind: Option<SocketAddr>,

    /// Full URL of the classification endpoint used by qiraat-ui
    #[serde(default)]
    pub predict_url: Option<String>,

    /// Timeout for one classification request
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

/// Compiled default settings
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub log_level: String,
    pub id_bind: SocketAddr,
    pub ui_bind: SocketAddr,
    pub predict_url: String,
    pub request_timeout: Duration,
}

impl Default for CompiledDefaults {
    fn default() -> Self {
        let id_bind = SocketAddr::from(([127, 0, 0, 1], 5770));
        Self {
            log_level: "info".to_string(),
            id_bind,
            ui_bind: SocketAddr::from(([127, 0, 0, 1], 5771)),
            predict_url: format!("http://{}{}", id_bind, crate::api::PREDICT_PATH),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Settings supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_file: Option<PathBuf>,
    pub log_level: Option<String>,
    pub id_bind: Option<SocketAddr>,
    pub ui_bind: Option<SocketAddr>,
    pub predict_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

/// Fully resolved settings shared by both services
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub log_level: String,
    pub id_bind: SocketAddr,
    pub ui_bind: SocketAddr,
    pub predict_url: String,
    pub request_timeout: Duration,
}

impl ServiceConfig {
    /// Resolve all settings from CLI, environment, TOML file and defaults
    pub fn resolve(cli: &CliOverrides) -> Self {
        let toml = load_config(cli.config_file.as_deref());
        Self::resolve_with(cli, &toml, &CompiledDefaults::default())
    }

    /// Resolve against an already loaded TOML config
    pub fn resolve_with(cli: &CliOverrides, toml: &TomlConfig, defaults: &CompiledDefaults) -> Self {
        let timeout_secs = resolve_setting(
            cli.request_timeout_secs,
            ENV_REQUEST_TIMEOUT_SECS,
            toml.request_timeout_secs,
            defaults.request_timeout.as_secs(),
        );

        Self {
            log_level: resolve_setting(
                cli.log_level.clone(),
                ENV_LOG_LEVEL,
                toml.log_level.clone(),
                defaults.log_level.clone(),
            ),
            id_bind: resolve_setting(cli.id_bind, ENV_ID_BIND, toml.id_bind, defaults.id_bind),
            ui_bind: resolve_setting(cli.ui_bind, ENV_UI_BIND, toml.ui_bind, defaults.ui_bind),
            predict_url: resolve_setting(
                cli.predict_url.clone(),
                ENV_PREDICT_URL,
                toml.predict_url.clone(),
                defaults.predict_url.clone(),
            ),
            request_timeout: Duration::from_secs(timeout_secs),
        }
    }
}

/// Pick the highest-priority value for one setting.
///
/// An environment value that fails to parse is ignored with a warning.
pub fn resolve_setting<T: FromStr>(
    cli: Option<T>,
    env_var_name: &str,
    toml: Option<T>,
    default: T,
) -> T {
    // Priority 1: Command-line argument
    if let Some(value) = cli {
        return value;
    }

    // Priority 2: Environment variable
    if let Ok(raw) = std::env::var(env_var_name) {
        match raw.parse::<T>() {
            Ok(value) => return value,
            Err(_) => warn!("Ignoring unparseable {}={:?}", env_var_name, raw),
        }
    }

    // Priority 3: TOML config file, then compiled default
    toml.unwrap_or(default)
}

/// Load the TOML config, degrading to defaults on any failure.
///
/// An explicit path (CLI) wins over `QIRAAT_CONFIG`, which wins over the
/// platform search locations.
pub fn load_config(explicit: Option<&Path>) -> TomlConfig {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(ENV_CONFIG_FILE).ok().map(PathBuf::from))
        .or_else(find_config_file);

    let Some(path) = path else {
        info!("No config file found, using defaults");
        return TomlConfig::default();
    };

    match load_toml_file(&path) {
        Ok(config) => {
            info!("Loaded config file: {}", path.display());
            config
        }
        Err(e) => {
            warn!("{} (continuing with defaults)", e);
            TomlConfig::default()
        }
    }
}

/// Parse a TOML config file
pub fn load_toml_file(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid TOML in {}: {}", path.display(), e)))
}

/// Candidate config locations, highest priority first
pub fn config_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("qiraat").join("config.toml"));
    }
    if cfg!(unix) {
        candidates.push(PathBuf::from("/etc/qiraat/config.toml"));
    }
    candidates
}

fn find_config_file() -> Option<PathBuf> {
    config_file_candidates().into_iter().find(|p| p.exists())
}
