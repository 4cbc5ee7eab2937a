use crate::error::{BeaconErrorExt, BeaconResult};
use beacon_logger::{LogLevel, LoggingConfig};
use config::{Config, Environment, File};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::info;

const ENV_PREFIX: &str = "BEACON";
const DEFAULT_CONFIG_FILE: &str = "beacon";

/// Top-level application settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BeaconConfig {
    pub logging: LoggingConfig,
    pub bootstrap: BootstrapConfig,
}

/// Which default services get registered into every new current resolver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Register a tracing-backed log manager when none is present.
    pub register_log_manager: bool,
    /// Minimum level of loggers handed out by that manager.
    pub log_level: LogLevel,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self { register_log_manager: true, log_level: LogLevel::Info }
    }
}

/// Loads configuration from a file, overlaid with environment variables.
///
/// 1. **Base File**: `path`, or `beacon` (any supported extension) in the working directory.
/// 2. **Environment Overrides**: variables prefixed with `BEACON__`, nested keys separated
///    by double underscores (e.g. `BEACON__LOGGING__LEVEL=debug` maps to `logging.level`).
///
/// # Errors
/// Returns [`crate::BeaconError::Config`] if the file is missing or the merged values do
/// not match `T`.
///
/// # Example
/// ```rust
/// use beacon::{BeaconConfig, load_config};
///
/// let cfg: BeaconConfig = load_config(Some("config/local")).unwrap_or_default();
/// assert!(cfg.bootstrap.register_log_manager);
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> BeaconResult<T>
where
    T: DeserializeOwned,
{
    load_layered(path, None)
}

fn load_layered<T>(
    path: Option<impl AsRef<Path>>,
    env: Option<config::Map<String, String>>,
) -> BeaconResult<T>
where
    T: DeserializeOwned,
{
    let effective_path =
        path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .convert_case(config::Case::Snake)
                .source(env),
        );

    info!("Loading config from {}", effective_path.display());

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
