use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

type Revoke = Box<dyn FnOnce() + Send>;

/// A revocable subscription.
///
/// [`Subscription::unsubscribe`] runs the revocation closure at most once, no
/// matter how many clones call it. Dropping the handle does **not**
/// unsubscribe; a subscription whose handle is ignored stays active.
#[derive(Clone)]
#[must_use = "Keep the subscription if you ever need to unsubscribe"]
pub struct Subscription {
    revoke: Arc<Mutex<Option<Revoke>>>,
}

impl Subscription {
    pub fn new(revoke: impl FnOnce() + Send + 'static) -> Self {
        Self { revoke: Arc::new(Mutex::new(Some(Box::new(revoke)))) }
    }

    /// Removes the subscription. Subsequent calls are no-ops.
    pub fn unsubscribe(&self) {
        let revoke = self.revoke.lock().take();
        if let Some(revoke) = revoke {
            revoke();
        }
    }

    /// Whether [`Subscription::unsubscribe`] has not run yet.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.revoke.lock().is_some()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("active", &self.is_active()).finish()
    }
}

/// Handle passed to a registration callback for a single invocation.
///
/// Disposing it asks the resolver to drop the callback once the current
/// notification batch has finished.
#[derive(Debug, Default)]
pub struct RegistrationHandle {
    disposed: AtomicBool,
}

impl RegistrationHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}
