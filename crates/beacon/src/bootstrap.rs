use crate::config::{BeaconConfig, BootstrapConfig};
use crate::error::{BeaconErrorExt, BeaconResult};
use beacon_locator::{Locator, locator};
use beacon_logger::{Logger, ServiceLogger, SharedLogManager, TracingLogManager, resolve_logger};
use beacon_resolver::{
    MutableDependencyResolver, MutableResolverExt, ResolverResult, ResolverExt, Subscription,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Keeps default services registered in whichever resolver is current.
///
/// Runs once right away and again after every resolver swap on `locator`.
/// Services the current resolver already has are left alone, so repeated
/// invocation is harmless. Read-only resolvers are skipped.
pub fn bootstrap(locator: &'static Locator, config: &BootstrapConfig) -> Subscription {
    let config = config.clone();
    locator.register_resolver_changed_callback(move || {
        let Some(resolver) = locator.current_mutable() else {
            debug!("Current resolver is read-only, skipping default registrations");
            return;
        };
        if let Err(err) = register_defaults(&*resolver, &config) {
            warn!(error = %err, "Failed to register default services");
        }
    })
}

/// Registers the configured default services into `resolver` where missing.
///
/// # Errors
/// Fails only if `resolver` was disposed.
pub fn register_defaults(
    resolver: &dyn MutableDependencyResolver,
    config: &BootstrapConfig,
) -> ResolverResult<()> {
    if config.register_log_manager && !resolver.has_service::<SharedLogManager>(None)? {
        let manager: SharedLogManager = Arc::new(TracingLogManager::new(config.log_level));
        resolver.register_constant(manager, None)?;
        debug!(level = %config.log_level, "Registered default log manager");
    }
    Ok(())
}

/// A named logger from the process-wide locator's current resolver.
#[must_use]
pub fn logger_for(name: &str) -> Arc<dyn ServiceLogger> {
    resolve_logger(locator().current().as_ref(), name)
}

/// Everything [`init`] set up. Keep it alive for the lifetime of the process.
///
/// Dropping it stops default registrations into later resolvers and flushes
/// buffered file logging.
#[must_use = "Dropping the handle stops default registrations and flushes file logging."]
#[derive(Debug)]
pub struct Beacon {
    subscription: Subscription,
    logger: Logger,
}

impl Beacon {
    #[must_use]
    pub const fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Same as dropping the handle, spelled out at the call site.
    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for Beacon {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
        debug!("Beacon shut down");
    }
}

/// Registers defaults into the process-wide locator's current resolver,
/// installs the global subscriber, then keeps the defaults registered across
/// resolver swaps.
///
/// # Errors
/// Returns [`crate::BeaconError::Resolver`] when the current resolver was
/// disposed, or [`crate::BeaconError::Logger`] when the subscriber cannot be
/// installed, e.g. because one already is.
pub fn init(config: &BeaconConfig) -> BeaconResult<Beacon> {
    if let Some(resolver) = locator().current_mutable() {
        register_defaults(&*resolver, &config.bootstrap)
            .context("Failed to register default services")?;
    }
    let logger = Logger::from_config(&config.logging).context("Failed to initialize logging")?;
    let subscription = bootstrap(locator(), &config.bootstrap);
    debug!(name = %config.logging.name, "Beacon initialized");
    Ok(Beacon { subscription, logger })
}
