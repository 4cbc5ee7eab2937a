//! # Logger
//!
//! Logging for beacon-based applications, in two halves:
//!
//! * **Subscriber setup**: [`Logger::builder`] / [`Logger::from_config`] install the
//!   global `tracing` subscriber with console output, rolling files (optionally
//!   JSON) and `RUST_LOG`-style filtering.
//! * **Registry loggers**: components resolve a [`LogManager`] from the current
//!   resolver with [`resolve_logger`] and log through a named [`ServiceLogger`].
//!
//! ## Example
//!
//! ```rust
//! use beacon_logger::{LogLevel, ServiceLoggerExt, SharedLogManager, TracingLogManager, resolve_logger};
//! use beacon_resolver::{ModernResolver, MutableResolverExt};
//! use std::sync::Arc;
//!
//! let resolver = ModernResolver::new();
//! let manager: SharedLogManager = Arc::new(TracingLogManager::new(LogLevel::Debug));
//! resolver.register_constant(manager, None).unwrap();
//!
//! let logger = resolve_logger(&resolver, "cache");
//! logger.info(|| "warmed up".to_owned());
//! ```

mod adapter;
mod config;
mod error;
mod subscriber;

pub use crate::adapter::{
    FuncLogManager, LogLevel, LogManager, NullLogger, ServiceLogger, ServiceLoggerExt,
    SharedLogManager, TracingLogManager, TracingLogger, resolve_logger,
};
pub use crate::config::{LoggingConfig, RotationPolicy};
pub use crate::error::{LoggerError, LoggerErrorExt, LoggerResult};
pub use crate::subscriber::{Logger, LoggerBuilder};
pub use tracing::level_filters::LevelFilter;
