//! Loggers handed out through the resolver.
//!
//! Subsystems never build loggers themselves: they resolve a [`LogManager`]
//! from the current resolver and ask it for a named [`ServiceLogger`]. When no
//! manager is registered they get a [`NullLogger`].

use crate::error::LoggerError;
use beacon_resolver::{DependencyResolver, ResolverExt};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info, warn};

/// Severity of a log message, ordered from least to most severe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "fatal" | "critical" => Ok(Self::Fatal),
            other => Err(LoggerError::InvalidConfiguration {
                message: format!("Unknown log level '{other}'").into(),
                context: None,
            }),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = LoggerError;

    fn try_from(raw: String) -> Result<Self, <Self as TryFrom<String>>::Error> {
        raw.parse()
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error | LogLevel::Fatal => Self::ERROR,
        }
    }
}

/// A named sink for messages of a given minimum level.
pub trait ServiceLogger: fmt::Debug + Send + Sync {
    /// Minimum level this logger emits.
    fn level(&self) -> LogLevel;

    /// Writes `message` unconditionally. Callers check [`Self::is_enabled`].
    fn write(&self, message: &str, level: LogLevel);

    /// Writes `message` together with the error that caused it.
    fn write_error(&self, error: &dyn std::error::Error, message: &str, level: LogLevel) {
        self.write(&format!("{message}: {error}"), level);
    }

    fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.level()
    }
}

/// Level-gated helpers over any [`ServiceLogger`].
///
/// Messages are built lazily and only when the level is enabled.
pub trait ServiceLoggerExt: ServiceLogger {
    fn log_with(&self, level: LogLevel, message: impl FnOnce() -> String) {
        if self.is_enabled(level) {
            self.write(&message(), level);
        }
    }

    fn debug(&self, message: impl FnOnce() -> String) {
        self.log_with(LogLevel::Debug, message);
    }

    fn info(&self, message: impl FnOnce() -> String) {
        self.log_with(LogLevel::Info, message);
    }

    fn warn(&self, message: impl FnOnce() -> String) {
        self.log_with(LogLevel::Warn, message);
    }

    fn error(&self, message: impl FnOnce() -> String) {
        self.log_with(LogLevel::Error, message);
    }

    fn fatal(&self, message: impl FnOnce() -> String) {
        self.log_with(LogLevel::Fatal, message);
    }
}

impl<L: ServiceLogger + ?Sized> ServiceLoggerExt for L {}

/// Forwards messages to `tracing` under the `beacon::service` target.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    name: Arc<str>,
    level: LogLevel,
}

impl TracingLogger {
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, level: LogLevel) -> Self {
        Self { name: name.into(), level }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ServiceLogger for TracingLogger {
    fn level(&self) -> LogLevel {
        self.level
    }

    fn write(&self, message: &str, level: LogLevel) {
        let logger = &*self.name;
        match level {
            LogLevel::Debug => debug!(target: "beacon::service", logger, "{message}"),
            LogLevel::Info => info!(target: "beacon::service", logger, "{message}"),
            LogLevel::Warn => warn!(target: "beacon::service", logger, "{message}"),
            LogLevel::Error => error!(target: "beacon::service", logger, "{message}"),
            LogLevel::Fatal => error!(target: "beacon::service", logger, fatal = true, "{message}"),
        }
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl ServiceLogger for NullLogger {
    fn level(&self) -> LogLevel {
        LogLevel::Fatal
    }

    fn write(&self, _message: &str, _level: LogLevel) {}

    fn is_enabled(&self, _level: LogLevel) -> bool {
        false
    }
}

/// Hands out named loggers. Registered in the resolver as `Arc<dyn LogManager>`.
pub trait LogManager: fmt::Debug + Send + Sync {
    fn logger(&self, name: &str) -> Arc<dyn ServiceLogger>;
}

/// The registration type under which a log manager is resolved.
pub type SharedLogManager = Arc<dyn LogManager>;

/// Builds a [`TracingLogger`] per name, all at one level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogManager {
    level: LogLevel,
}

impl TracingLogManager {
    #[must_use]
    pub const fn new(level: LogLevel) -> Self {
        Self { level }
    }
}

impl LogManager for TracingLogManager {
    fn logger(&self, name: &str) -> Arc<dyn ServiceLogger> {
        Arc::new(TracingLogger::new(name, self.level))
    }
}

type LoggerFactory = dyn Fn(&str) -> Arc<dyn ServiceLogger> + Send + Sync;

/// A log manager backed by a closure.
#[derive(Clone)]
pub struct FuncLogManager {
    make: Arc<LoggerFactory>,
}

impl FuncLogManager {
    pub fn new(make: impl Fn(&str) -> Arc<dyn ServiceLogger> + Send + Sync + 'static) -> Self {
        Self { make: Arc::new(make) }
    }
}

impl fmt::Debug for FuncLogManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuncLogManager").finish_non_exhaustive()
    }
}

impl LogManager for FuncLogManager {
    fn logger(&self, name: &str) -> Arc<dyn ServiceLogger> {
        (self.make)(name)
    }
}

/// Resolves the current [`LogManager`] from `resolver` and asks it for `name`.
///
/// Falls back to [`NullLogger`] when no manager is registered or the lookup fails.
pub fn resolve_logger(resolver: &dyn DependencyResolver, name: &str) -> Arc<dyn ServiceLogger> {
    match resolver.get_service::<SharedLogManager>(None) {
        Ok(Some(manager)) => manager.logger(name),
        Ok(None) => Arc::new(NullLogger),
        Err(err) => {
            warn!(error = %err, logger = name, "Log manager lookup failed, using a null logger");
            Arc::new(NullLogger)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_resolver::{ModernResolver, MutableResolverExt};
    use parking_lot::Mutex;

    #[derive(Debug, Default)]
    struct RecordingLogger {
        level: LogLevel,
        lines: Mutex<Vec<(LogLevel, String)>>,
    }

    impl ServiceLogger for RecordingLogger {
        fn level(&self) -> LogLevel {
            self.level
        }

        fn write(&self, message: &str, level: LogLevel) {
            self.lines.lock().push((level, message.to_owned()));
        }
    }

    #[test]
    fn levels_are_ordered() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Fatal);
    }

    #[test]
    fn levels_parse_case_insensitively() {
        assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!(" critical ".parse::<LogLevel>().unwrap(), LogLevel::Fatal);
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn fatal_maps_to_error_filter() {
        assert_eq!(LevelFilter::from(LogLevel::Fatal), LevelFilter::ERROR);
    }

    #[test]
    fn disabled_level_never_builds_message() {
        let logger = RecordingLogger { level: LogLevel::Warn, ..RecordingLogger::default() };
        let mut built = false;

        logger.debug(|| {
            built = true;
            "noisy".to_owned()
        });
        logger.error(|| "loud".to_owned());

        assert!(!built);
        assert_eq!(*logger.lines.lock(), vec![(LogLevel::Error, "loud".to_owned())]);
    }

    #[test]
    fn write_error_appends_cause() {
        let logger = RecordingLogger::default();
        let cause = std::io::Error::other("disk full");

        logger.write_error(&cause, "flush failed", LogLevel::Error);
        assert_eq!(logger.lines.lock()[0].1, "flush failed: disk full");
    }

    #[test]
    fn null_logger_is_never_enabled() {
        assert!(!NullLogger.is_enabled(LogLevel::Fatal));
    }

    #[test]
    fn missing_manager_yields_null_logger() {
        let resolver = ModernResolver::new();
        let logger = resolve_logger(&resolver, "orphan");
        assert!(!logger.is_enabled(LogLevel::Fatal));
    }

    #[test]
    fn registered_manager_names_loggers() {
        let resolver = ModernResolver::new();
        let manager: SharedLogManager = Arc::new(FuncLogManager::new(|name| -> Arc<dyn ServiceLogger> {
            Arc::new(TracingLogger::new(format!("app::{name}"), LogLevel::Debug))
        }));
        resolver.register_constant(manager, None).unwrap();

        let logger = resolve_logger(&resolver, "db");
        assert!(logger.is_enabled(LogLevel::Debug));
        assert!(format!("{logger:?}").contains("app::db"));
    }

    #[test]
    fn newest_manager_wins() {
        let resolver = ModernResolver::new();
        let quiet: SharedLogManager = Arc::new(TracingLogManager::new(LogLevel::Error));
        let chatty: SharedLogManager = Arc::new(TracingLogManager::new(LogLevel::Debug));
        resolver.register_constant(quiet, None).unwrap();
        resolver.register_constant(chatty, None).unwrap();

        assert!(resolve_logger(&resolver, "svc").is_enabled(LogLevel::Debug));

        resolver.unregister_current_service::<SharedLogManager>(None).unwrap();
        assert!(!resolve_logger(&resolver, "svc").is_enabled(LogLevel::Debug));
    }
}
