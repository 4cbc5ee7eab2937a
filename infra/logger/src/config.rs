use crate::adapter::LogLevel;
use serde::Deserialize;
use std::path::PathBuf;
use tracing_appender::rolling::Rotation;

const DEFAULT_MAX_FILES: usize = 10;

/// How often the file appender starts a new log file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Never,
}

impl From<RotationPolicy> for Rotation {
    fn from(policy: RotationPolicy) -> Self {
        match policy {
            RotationPolicy::Minutely => Self::MINUTELY,
            RotationPolicy::Hourly => Self::HOURLY,
            RotationPolicy::Daily => Self::DAILY,
            RotationPolicy::Never => Self::NEVER,
        }
    }
}

/// Settings for the process-wide tracing subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Identifier of the application; prefixes rolling log files.
    pub name: String,
    pub level: LogLevel,
    pub console: bool,
    /// Emit JSON lines to the log files.
    pub json: bool,
    /// Directory for rolling log files. No file output when unset.
    pub path: Option<PathBuf>,
    pub max_files: usize,
    pub rotation: RotationPolicy,
    /// Extra directives such as `beacon_resolver=trace`.
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            name: "beacon".to_owned(),
            level: LogLevel::Info,
            console: true,
            json: false,
            path: None,
            max_files: DEFAULT_MAX_FILES,
            rotation: RotationPolicy::default(),
            env_filter: None,
        }
    }
}
