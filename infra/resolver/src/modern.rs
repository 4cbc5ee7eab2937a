use crate::error::{ResolverError, ResolverResult};
use crate::factory::{ServiceFactory, ServiceInstance};
use crate::key::ServiceKey;
use crate::subscription::{RegistrationHandle, Subscription};
use crate::traits::{DependencyResolver, MutableDependencyResolver, RegistrationCallback};
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

#[derive(Clone)]
struct CallbackEntry {
    id: u64,
    callback: RegistrationCallback,
}

impl fmt::Debug for CallbackEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackEntry").field("id", &self.id).finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    registry: FxHashMap<ServiceKey, Vec<ServiceFactory>>,
    callbacks: FxHashMap<ServiceKey, Vec<CallbackEntry>>,
    next_callback_id: u64,
    disposed: bool,
}

impl RegistryState {
    fn ensure_live(&self) -> ResolverResult<()> {
        if self.disposed {
            return Err(ResolverError::Disposed {
                message: "registry has been released".into(),
                context: None,
            });
        }
        Ok(())
    }

    fn is_subscribed(&self, key: &ServiceKey, id: u64) -> bool {
        self.callbacks.get(key).is_some_and(|entries| entries.iter().any(|e| e.id == id))
    }

    fn remove_callbacks(&mut self, key: &ServiceKey, ids: &[u64]) {
        if let Some(entries) = self.callbacks.get_mut(key) {
            entries.retain(|e| !ids.contains(&e.id));
            if entries.is_empty() {
                self.callbacks.remove(key);
            }
        }
    }
}

/// The default resolver: every registration is a factory closure.
///
/// Closures cover the usual lifetimes (per-call construction, lazy or eager
/// singletons), so no IoC container is needed on top. For each key the
/// factories form a stack: the newest one wins, and popping it restores the
/// previous binding.
///
/// Internal locks only keep the registry memory-safe behind an `Arc`. The
/// resolver is not meant for concurrent mutation; the order in which racing
/// writers land is unspecified. No lock is held while factories or callbacks
/// run, so both may call back into the resolver.
#[derive(Debug, Default)]
pub struct ModernResolver {
    state: Arc<RwLock<RegistryState>>,
}

impl ModernResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an independent copy of every registration.
    ///
    /// The per-key lists are copied, the factories inside them are shared.
    /// Registration callbacks are not carried over.
    ///
    /// # Errors
    /// Returns [`ResolverError::Disposed`] if this resolver was disposed.
    pub fn duplicate(&self) -> ResolverResult<Self> {
        let registry = {
            let state = self.state.read();
            state.ensure_live()?;
            state.registry.clone()
        };
        debug!(keys = registry.len(), "Duplicating resolver");

        Ok(Self { state: Arc::new(RwLock::new(RegistryState { registry, ..Default::default() })) })
    }

    /// Whether [`DependencyResolver::dispose`] has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.state.read().disposed
    }

    fn notify(&self, key: &ServiceKey, entries: &[CallbackEntry]) {
        let mut finished = Vec::new();

        for entry in entries {
            if !self.state.read().is_subscribed(key, entry.id) {
                continue;
            }
            let handle = RegistrationHandle::new();
            (entry.callback)(&handle);
            if handle.is_disposed() {
                finished.push(entry.id);
            }
        }

        if !finished.is_empty() {
            trace!(service = %key, removed = finished.len(), "Pruning disposed registration callbacks");
            self.state.write().remove_callbacks(key, &finished);
        }
    }

    fn revoker(&self, key: ServiceKey, id: u64) -> impl FnOnce() + Send + 'static {
        let state: Weak<RwLock<RegistryState>> = Arc::downgrade(&self.state);
        move || {
            if let Some(state) = state.upgrade() {
                state.write().remove_callbacks(&key, &[id]);
            }
        }
    }
}

impl DependencyResolver for ModernResolver {
    fn resolve(&self, key: &ServiceKey) -> ResolverResult<Option<ServiceInstance>> {
        let factory = {
            let state = self.state.read();
            state.ensure_live()?;
            state.registry.get(key).and_then(|list| list.last().cloned())
        };

        if factory.is_none() {
            trace!(service = %key, "No registration found");
        }
        Ok(factory.map(|f| f.create()))
    }

    fn resolve_all(&self, key: &ServiceKey) -> ResolverResult<Vec<ServiceInstance>> {
        let factories = {
            let state = self.state.read();
            state.ensure_live()?;
            state.registry.get(key).cloned().unwrap_or_default()
        };

        Ok(factories.iter().map(ServiceFactory::create).collect())
    }

    fn has_registration(&self, key: &ServiceKey) -> ResolverResult<bool> {
        let state = self.state.read();
        state.ensure_live()?;
        Ok(state.registry.get(key).is_some_and(|list| !list.is_empty()))
    }

    fn dispose(&self) {
        let mut state = self.state.write();
        if state.disposed {
            return;
        }
        state.registry.clear();
        state.callbacks.clear();
        state.disposed = true;
        drop(state);
        debug!("Resolver disposed");
    }

    fn into_mutable(self: Arc<Self>) -> Option<Arc<dyn MutableDependencyResolver>> {
        Some(self)
    }
}

impl MutableDependencyResolver for ModernResolver {
    fn register_factory(&self, key: ServiceKey, factory: ServiceFactory) -> ResolverResult<()> {
        if factory.produces() != key.type_id() {
            return Err(ResolverError::InvalidArgument {
                message: format!(
                    "factory producing {} cannot be registered as {key}",
                    factory.produces_name()
                )
                .into(),
                context: None,
            });
        }

        let watchers = {
            let mut state = self.state.write();
            state.ensure_live()?;
            let list = state.registry.entry(key.clone()).or_default();
            list.push(factory);
            trace!(service = %key, depth = list.len(), "Service factory registered");
            state.callbacks.get(&key).cloned().unwrap_or_default()
        };

        self.notify(&key, &watchers);
        Ok(())
    }

    fn unregister_current(&self, key: &ServiceKey) -> ResolverResult<()> {
        let mut state = self.state.write();
        state.ensure_live()?;
        if let Some(list) = state.registry.get_mut(key)
            && list.pop().is_some()
        {
            trace!(service = %key, depth = list.len(), "Current service factory removed");
        }
        Ok(())
    }

    fn unregister_all(&self, key: &ServiceKey) -> ResolverResult<()> {
        let mut state = self.state.write();
        state.ensure_live()?;
        let previous = state.registry.insert(key.clone(), Vec::new());
        trace!(service = %key, removed = previous.map_or(0, |l| l.len()), "Service factories cleared");
        Ok(())
    }

    fn registration_callback(
        &self,
        key: ServiceKey,
        callback: RegistrationCallback,
    ) -> ResolverResult<Subscription> {
        let (id, existing) = {
            let mut state = self.state.write();
            state.ensure_live()?;
            let id = state.next_callback_id;
            state.next_callback_id += 1;
            state
                .callbacks
                .entry(key.clone())
                .or_default()
                .push(CallbackEntry { id, callback: callback.clone() });
            (id, state.registry.get(&key).map_or(0, Vec::len))
        };

        trace!(service = %key, replay = existing, "Registration callback subscribed");
        let subscription = Subscription::new(self.revoker(key, id));

        let mut disposed = false;
        for _ in 0..existing {
            let handle = RegistrationHandle::new();
            callback(&handle);
            disposed |= handle.is_disposed();
        }
        if disposed {
            trace!(id, "Registration callback disposed during replay");
            subscription.unsubscribe();
        }

        Ok(subscription)
    }
}
