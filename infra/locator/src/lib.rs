//! # Locator
//!
//! The single access point to "the current resolver".
//!
//! ## Overview
//!
//! A [`Locator`] holds one current [`DependencyResolver`](beacon_resolver::DependencyResolver)
//! and tells subscribers when it is replaced, so dependent subsystems can
//! re-initialize against the new registry. The process-wide instance is reached
//! through [`locator()`] and created lazily on first use.
//!
//! ## Features
//!
//! * **Atomic publication**: the shared resolver lives in an `ArcSwap`.
//! * **Change notification**: synchronous, in subscription order, re-entrant safe.
//! * **Suppression**: nestable RAII guards drop (never defer) notifications.
//! * **Test isolation**: inside [`isolated`]/[`isolated_async`], swaps only affect
//!   the calling context.
//!
//! # Example
//!
//! ```rust
//! use beacon_locator::Locator;
//! use beacon_resolver::{ModernResolver, MutableResolverExt, ResolverError, ResolverExt};
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), ResolverError> {
//!     let locator = Locator::new();
//!     let _subscription = locator.register_resolver_changed_callback(|| {
//!         // Re-initialize whatever depends on the registry.
//!     });
//!
//!     let replacement = Arc::new(ModernResolver::new());
//!     replacement.register_constant("replacement", None)?;
//!     locator.set_current(replacement);
//!
//!     assert_eq!(locator.current().get_service::<&str>(None)?, Some("replacement"));
//!     Ok(())
//! }
//! ```

mod context;
mod locator;
mod scope;

pub use context::{in_test_context, isolated, isolated_async};
pub use locator::{Locator, ResolverChangedCallback};
pub use scope::{NotificationSuppression, ResolverScope};

use std::sync::OnceLock;
use tracing::debug;

static GLOBAL_LOCATOR: OnceLock<Locator> = OnceLock::new();

/// Access the lazily initialized process-wide locator.
///
/// The first call installs an empty [`ModernResolver`](beacon_resolver::ModernResolver)
/// as the current resolver.
pub fn locator() -> &'static Locator {
    GLOBAL_LOCATOR.get_or_init(|| {
        debug!("Initializing process-wide locator");
        Locator::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_locator_singleton() {
        let first = locator() as *const Locator;
        let second = locator() as *const Locator;
        assert_eq!(first, second);
    }
}
