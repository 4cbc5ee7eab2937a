use crate::context;
use crate::scope::{NotificationSuppression, ResolverScope};
use arc_swap::ArcSwap;
use beacon_resolver::{DependencyResolver, ModernResolver, MutableDependencyResolver, Subscription};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// Callback invoked whenever the current resolver is replaced.
pub type ResolverChangedCallback = Arc<dyn Fn() + Send + Sync>;

type Subscribers = Mutex<Vec<(u64, ResolverChangedCallback)>>;

static NEXT_LOCATOR_ID: AtomicU64 = AtomicU64::new(1);

/// Holder of "the current resolver" with change notification.
///
/// The shared resolver is published atomically and may be read from any
/// thread. Inside a test execution context (see [`crate::isolated`]) writes go
/// to a context-local override instead, leaving every other context untouched.
pub struct Locator {
    id: u64,
    shared: ArcSwap<Arc<dyn DependencyResolver>>,
    subscribers: Arc<Subscribers>,
    next_subscriber_id: AtomicU64,
    suppressed: Arc<AtomicUsize>,
}

impl Default for Locator {
    fn default() -> Self {
        Self::new()
    }
}

impl Locator {
    /// Creates a locator whose current resolver is an empty [`ModernResolver`].
    #[must_use]
    pub fn new() -> Self {
        Self::from_resolver(Arc::new(ModernResolver::new()))
    }

    #[must_use]
    pub fn from_resolver(resolver: Arc<dyn DependencyResolver>) -> Self {
        let id = NEXT_LOCATOR_ID.fetch_add(1, Ordering::Relaxed);
        trace!(locator = id, "Locator initialized");
        Self {
            id,
            shared: ArcSwap::from_pointee(resolver),
            subscribers: Arc::default(),
            next_subscriber_id: AtomicU64::new(0),
            suppressed: Arc::default(),
        }
    }

    /// The context-local override if one is set, otherwise the shared resolver.
    #[must_use]
    pub fn current(&self) -> Arc<dyn DependencyResolver> {
        context::lookup(self.id).unwrap_or_else(|| {
            let guard = self.shared.load();
            let shared: &Arc<dyn DependencyResolver> = &guard;
            Arc::clone(shared)
        })
    }

    /// Replaces the current resolver and, unless suppressed, notifies every
    /// subscriber synchronously in subscription order.
    pub fn set_current(&self, resolver: Arc<dyn DependencyResolver>) {
        let scoped = context::store(self.id, &resolver);
        if !scoped {
            self.shared.store(Arc::new(resolver));
        }
        debug!(locator = self.id, scoped, "Current resolver replaced");

        if self.are_notifications_enabled() {
            self.notify_resolver_changed();
        } else {
            trace!(locator = self.id, "Resolver change notification dropped while suppressed");
        }
    }

    /// The current resolver, if it also supports registration.
    #[must_use]
    pub fn current_mutable(&self) -> Option<Arc<dyn MutableDependencyResolver>> {
        self.current().into_mutable()
    }

    pub fn set_current_mutable(&self, resolver: Arc<dyn MutableDependencyResolver>) {
        self.set_current(resolver);
    }

    /// Subscribes `callback` to every future resolver swap.
    ///
    /// The callback also runs once right away (unless notifications are
    /// suppressed) so it can set itself up against the current resolver.
    /// Callbacks must tolerate repeated invocation.
    pub fn register_resolver_changed_callback(
        &self,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> Subscription {
        let callback: ResolverChangedCallback = Arc::new(callback);
        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().push((id, callback.clone()));

        if self.are_notifications_enabled() {
            callback();
        }

        let subscribers: Weak<Subscribers> = Arc::downgrade(&self.subscribers);
        Subscription::new(move || {
            if let Some(subscribers) = subscribers.upgrade() {
                subscribers.lock().retain(|(entry, _)| *entry != id);
            }
        })
    }

    /// Drops swap notifications until every returned guard is released.
    ///
    /// Notifications raised meanwhile are discarded, not replayed later.
    pub fn suppress_resolver_changed_notifications(&self) -> NotificationSuppression {
        NotificationSuppression::acquire(self.suppressed.clone())
    }

    #[must_use]
    pub fn are_notifications_enabled(&self) -> bool {
        self.suppressed.load(Ordering::Acquire) == 0
    }

    /// Installs `resolver` until the returned scope is dropped, then restores
    /// the resolver that was current before.
    ///
    /// With `suppress_notifications`, neither the install nor the restore
    /// notifies subscribers.
    pub fn with_resolver(
        &self,
        resolver: Arc<dyn DependencyResolver>,
        suppress_notifications: bool,
    ) -> ResolverScope<'_> {
        let suppression = suppress_notifications.then(|| self.suppress_resolver_changed_notifications());
        let previous = self.current();
        self.set_current(resolver);
        ResolverScope::new(self, previous, suppression)
    }

    fn notify_resolver_changed(&self) {
        // Snapshot so a callback may re-enter the setter without deadlocking.
        let callbacks: Vec<ResolverChangedCallback> =
            self.subscribers.lock().iter().map(|(_, callback)| callback.clone()).collect();

        trace!(locator = self.id, subscribers = callbacks.len(), "Notifying resolver change");
        for callback in callbacks {
            callback();
        }
    }
}

impl fmt::Debug for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Locator")
            .field("id", &self.id)
            .field("subscribers", &self.subscribers.lock().len())
            .field("suppressed", &self.suppressed.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
