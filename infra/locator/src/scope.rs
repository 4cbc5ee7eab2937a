use crate::locator::Locator;
use beacon_resolver::DependencyResolver;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::trace;

/// Keeps resolver change notifications suppressed while alive.
///
/// Guards nest: notifications resume once every guard is released.
#[must_use = "Notifications resume as soon as the guard is dropped"]
#[derive(Debug)]
pub struct NotificationSuppression {
    counter: Option<Arc<AtomicUsize>>,
}

impl NotificationSuppression {
    pub(crate) fn acquire(counter: Arc<AtomicUsize>) -> Self {
        let depth = counter.fetch_add(1, Ordering::AcqRel) + 1;
        trace!(depth, "Resolver change notifications suppressed");
        Self { counter: Some(counter) }
    }

    /// Releases the guard early. Dropping it afterwards does nothing.
    pub fn release(&mut self) {
        if let Some(counter) = self.counter.take() {
            let depth = counter.fetch_sub(1, Ordering::AcqRel) - 1;
            trace!(depth, "Resolver change notification suppression released");
        }
    }
}

impl Drop for NotificationSuppression {
    fn drop(&mut self) {
        self.release();
    }
}

/// A temporarily installed resolver.
///
/// Dropping the scope reinstalls the previous resolver, then releases the
/// notification suppression taken for it, if any.
#[must_use = "The previous resolver is restored as soon as the scope is dropped"]
#[derive(Debug)]
pub struct ResolverScope<'a> {
    locator: &'a Locator,
    previous: Option<Arc<dyn DependencyResolver>>,
    suppression: Option<NotificationSuppression>,
}

impl<'a> ResolverScope<'a> {
    pub(crate) const fn new(
        locator: &'a Locator,
        previous: Arc<dyn DependencyResolver>,
        suppression: Option<NotificationSuppression>,
    ) -> Self {
        Self { locator, previous: Some(previous), suppression }
    }

    /// The resolver that will be restored.
    #[must_use]
    pub fn previous(&self) -> Option<&Arc<dyn DependencyResolver>> {
        self.previous.as_ref()
    }
}

impl Drop for ResolverScope<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.locator.set_current(previous);
        }
        drop(self.suppression.take());
    }
}
