//! Execution-context-scoped resolver overrides.
//!
//! Code running inside [`isolated`] or [`isolated_async`] is a test execution
//! context: replacing a locator's resolver there only affects that context.
//! The storage is task-local, so it follows `.await` points, but tasks spawned
//! from inside a context do not inherit it.

use beacon_resolver::DependencyResolver;
use fxhash::FxHashMap;
use std::cell::RefCell;
use std::future::Future;
use std::sync::Arc;

tokio::task_local! {
    static OVERRIDES: ContextOverrides;
}

/// Per-context resolvers, keyed by locator identity.
#[derive(Debug, Default)]
struct ContextOverrides {
    slots: RefCell<FxHashMap<u64, Arc<dyn DependencyResolver>>>,
}

impl ContextOverrides {
    /// A nested context starts from the overrides of the enclosing one.
    fn inherit() -> Self {
        let slots = OVERRIDES.try_with(|outer| outer.slots.borrow().clone()).unwrap_or_default();
        Self { slots: RefCell::new(slots) }
    }
}

/// Runs `f` inside a fresh test execution context.
pub fn isolated<R>(f: impl FnOnce() -> R) -> R {
    OVERRIDES.sync_scope(ContextOverrides::inherit(), f)
}

/// Runs `future` inside a fresh test execution context.
pub async fn isolated_async<F: Future>(future: F) -> F::Output {
    OVERRIDES.scope(ContextOverrides::inherit(), future).await
}

/// Whether the caller runs inside [`isolated`] or [`isolated_async`].
#[must_use]
pub fn in_test_context() -> bool {
    OVERRIDES.try_with(|_| ()).is_ok()
}

pub(crate) fn lookup(locator: u64) -> Option<Arc<dyn DependencyResolver>> {
    OVERRIDES.try_with(|ctx| ctx.slots.borrow().get(&locator).cloned()).ok().flatten()
}

/// Stores `resolver` for `locator` in the current context.
/// Returns `false` when there is no context to store it in.
pub(crate) fn store(locator: u64, resolver: &Arc<dyn DependencyResolver>) -> bool {
    OVERRIDES
        .try_with(|ctx| {
            // The replaced resolver may call back into the locator when dropped.
            let replaced = ctx.slots.borrow_mut().insert(locator, Arc::clone(resolver));
            drop(replaced);
        })
        .is_ok()
}
