use beacon_logger::LoggerError;
use beacon_resolver::ResolverError;
use std::borrow::Cow;

/// Errors surfaced by the facade.
#[beacon_derive::beacon_error]
pub enum BeaconError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    #[error("Logger error{}: {source}", format_context(.context))]
    Logger { source: LoggerError, context: Option<Cow<'static, str>> },

    #[error("Resolver error{}: {source}", format_context(.context))]
    Resolver { source: ResolverError, context: Option<Cow<'static, str>> },
}
