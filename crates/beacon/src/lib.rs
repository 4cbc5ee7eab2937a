//! Facade crate for the beacon service registry.
//! Re-exports the resolver, locator and logger APIs and wires them together
//! at startup. Keep this crate thin: it composes the infra crates.
//!
//! ## Usage
//! - Load a [`BeaconConfig`] with [`load_config`] (or build one by hand).
//! - Call [`init`] once at startup and keep the returned [`Beacon`] alive.
//! - Register services into `locator().current_mutable()`; resolve them from
//!   `locator().current()`.

pub use beacon_logger as logging;
pub use beacon_resolver as resolver;

pub use beacon_locator::{Locator, in_test_context, isolated, isolated_async, locator};
pub use beacon_resolver::{
    DependencyResolver, ModernResolver, MutableDependencyResolver, MutableResolverExt, ResolverExt,
    ServiceKey, Subscription,
};

mod bootstrap;
mod config;
mod error;

pub use crate::bootstrap::{Beacon, bootstrap, init, logger_for, register_defaults};
pub use crate::config::{BeaconConfig, BootstrapConfig, load_config};
pub use crate::error::{BeaconError, BeaconErrorExt, BeaconResult};

