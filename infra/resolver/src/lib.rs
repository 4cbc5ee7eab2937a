//! # Resolver
//!
//! An ordered multi-binding service registry.
//!
//! ## Overview
//!
//! Registrations map a [`ServiceKey`] (service type + contract name) to a stack of
//! factory closures. Resolving a key runs the newest factory; resolving all runs
//! every factory in registration order. Nothing is cached by the registry, so
//! singleton behavior lives inside the closure.
//!
//! ## Features
//!
//! * **Type-Safe**: Keys are built from the requested Rust type; typed lookups
//!   verify what the factory produced.
//! * **Override-Friendly**: Register a replacement, pop it later to restore the
//!   previous binding.
//! * **Registration Callbacks**: Watch a key for new registrations, with replay of
//!   what is already registered and dispose-to-unsubscribe handles.
//! * **Forkable**: [`ModernResolver::duplicate`] copies the registry for temporary scopes.
//!
//! # Example
//!
//! ```rust
//! use beacon_resolver::{ModernResolver, MutableResolverExt, ResolverError, ResolverExt};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Endpoint(&'static str);
//!
//! fn main() -> Result<(), ResolverError> {
//!     let resolver = ModernResolver::new();
//!
//!     resolver.register(|| Endpoint("primary"), None)?;
//!     resolver.register(|| Endpoint("fallback"), None)?;
//!     assert_eq!(resolver.get_service::<Endpoint>(None)?, Some(Endpoint("fallback")));
//!
//!     resolver.unregister_current_service::<Endpoint>(None)?;
//!     assert_eq!(resolver.get_service::<Endpoint>(None)?, Some(Endpoint("primary")));
//!     Ok(())
//! }
//! ```

mod error;
mod factory;
mod key;
mod modern;
mod subscription;
mod traits;

pub use error::{ResolverError, ResolverErrorExt, ResolverResult};
pub use factory::{ServiceFactory, ServiceInstance};
pub use key::{Service, ServiceKey};
pub use modern::ModernResolver;
pub use subscription::{RegistrationHandle, Subscription};
pub use traits::{
    DependencyResolver, MutableDependencyResolver, MutableResolverExt, RegistrationCallback,
    ResolverExt,
};
