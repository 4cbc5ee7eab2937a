use crate::error::{ResolverError, ResolverResult};
use crate::factory::{ServiceFactory, ServiceInstance};
use crate::key::{Service, ServiceKey};
use crate::subscription::{RegistrationHandle, Subscription};
use std::fmt::Debug;
use std::sync::{Arc, OnceLock};

/// Callback invoked for each registration added under a watched key.
pub type RegistrationCallback = Arc<dyn Fn(&RegistrationHandle) + Send + Sync>;

/// Read side of a resolver.
///
/// Lookups for keys without registrations succeed with `None` or an empty
/// list. Every method fails with [`ResolverError::Disposed`] once the resolver
/// was disposed.
pub trait DependencyResolver: Debug + Send + Sync {
    /// Invokes the most recently registered factory for `key`.
    ///
    /// # Errors
    /// Returns [`ResolverError::Disposed`] after disposal.
    fn resolve(&self, key: &ServiceKey) -> ResolverResult<Option<ServiceInstance>>;

    /// Invokes every factory registered for `key`, oldest first.
    ///
    /// # Errors
    /// Returns [`ResolverError::Disposed`] after disposal.
    fn resolve_all(&self, key: &ServiceKey) -> ResolverResult<Vec<ServiceInstance>>;

    /// Whether at least one factory is registered for `key`.
    ///
    /// # Errors
    /// Returns [`ResolverError::Disposed`] after disposal.
    fn has_registration(&self, key: &ServiceKey) -> ResolverResult<bool>;

    /// Releases the registry. Calling it again is a no-op.
    fn dispose(&self);

    /// Exposes the mutation side when this resolver supports it.
    fn into_mutable(self: Arc<Self>) -> Option<Arc<dyn MutableDependencyResolver>> {
        None
    }
}

/// Mutation side of a resolver.
///
/// Implementations are not required to be safe for concurrent mutation:
/// callers serialize writers themselves or keep one resolver per context.
pub trait MutableDependencyResolver: DependencyResolver {
    /// Appends `factory` to the list for `key`, then notifies every live
    /// registration callback for `key` once.
    ///
    /// # Errors
    /// Returns [`ResolverError::InvalidArgument`] when the factory produces a
    /// type other than the key's, or [`ResolverError::Disposed`] after disposal.
    fn register_factory(&self, key: ServiceKey, factory: ServiceFactory) -> ResolverResult<()>;

    /// Pops the most recently registered factory for `key`, if any.
    ///
    /// # Errors
    /// Returns [`ResolverError::Disposed`] after disposal.
    fn unregister_current(&self, key: &ServiceKey) -> ResolverResult<()>;

    /// Removes every factory registered for `key`.
    ///
    /// # Errors
    /// Returns [`ResolverError::Disposed`] after disposal.
    fn unregister_all(&self, key: &ServiceKey) -> ResolverResult<()>;

    /// Watches `key` for new registrations.
    ///
    /// The callback is first replayed synchronously once per factory already
    /// registered. Disposing the per-call [`RegistrationHandle`] removes the
    /// callback; so does [`Subscription::unsubscribe`] on the returned value.
    ///
    /// # Errors
    /// Returns [`ResolverError::Disposed`] after disposal.
    fn registration_callback(
        &self,
        key: ServiceKey,
        callback: RegistrationCallback,
    ) -> ResolverResult<Subscription>;
}

fn downcast<T: Service>(key: &ServiceKey, instance: ServiceInstance) -> ResolverResult<T> {
    instance.downcast::<T>().map(|boxed| *boxed).map_err(|_| ResolverError::TypeMismatch {
        message: format!("{key} did not produce {}", std::any::type_name::<T>()).into(),
        context: None,
    })
}

/// Typed lookups over any [`DependencyResolver`].
pub trait ResolverExt: DependencyResolver {
    /// Resolves the current instance of `T`, or `None` when nothing is registered.
    ///
    /// # Errors
    /// Returns [`ResolverError::TypeMismatch`] if the factory produced a different
    /// type, or [`ResolverError::Disposed`] after disposal.
    fn get_service<T: Service>(&self, contract: Option<&str>) -> ResolverResult<Option<T>> {
        let key = ServiceKey::of::<T>(contract);
        self.resolve(&key)?.map(|instance| downcast(&key, instance)).transpose()
    }

    /// Resolves every registered instance of `T`, in registration order.
    ///
    /// # Errors
    /// Same as [`ResolverExt::get_service`].
    fn get_services<T: Service>(&self, contract: Option<&str>) -> ResolverResult<Vec<T>> {
        let key = ServiceKey::of::<T>(contract);
        self.resolve_all(&key)?.into_iter().map(|instance| downcast(&key, instance)).collect()
    }

    /// # Errors
    /// Returns [`ResolverError::Disposed`] after disposal.
    fn has_service<T: Service>(&self, contract: Option<&str>) -> ResolverResult<bool> {
        self.has_registration(&ServiceKey::of::<T>(contract))
    }
}

impl<R: DependencyResolver + ?Sized> ResolverExt for R {}

/// Typed registration helpers over any [`MutableDependencyResolver`].
///
/// All errors are those of the underlying [`MutableDependencyResolver`] method.
#[allow(clippy::missing_errors_doc)]
pub trait MutableResolverExt: MutableDependencyResolver {
    /// Registers a factory that is invoked on every resolution.
    fn register<T, F>(&self, factory: F, contract: Option<&str>) -> ResolverResult<()>
    where
        T: Service,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.register_factory(ServiceKey::of::<T>(contract), ServiceFactory::new(factory))
    }

    /// Registers an existing value; each resolution returns a clone of it.
    fn register_constant<T>(&self, value: T, contract: Option<&str>) -> ResolverResult<()>
    where
        T: Service + Clone + Sync,
    {
        self.register(move || value.clone(), contract)
    }

    /// Registers a value built on first resolution and cloned afterwards.
    fn register_lazy_singleton<T, F>(&self, factory: F, contract: Option<&str>) -> ResolverResult<()>
    where
        T: Service + Clone + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let cell = Arc::new(OnceLock::new());
        self.register(move || cell.get_or_init(&factory).clone(), contract)
    }

    fn unregister_current_service<T: Service>(&self, contract: Option<&str>) -> ResolverResult<()> {
        self.unregister_current(&ServiceKey::of::<T>(contract))
    }

    fn unregister_all_services<T: Service>(&self, contract: Option<&str>) -> ResolverResult<()> {
        self.unregister_all(&ServiceKey::of::<T>(contract))
    }

    fn service_registration_callback<T, C>(
        &self,
        contract: Option<&str>,
        callback: C,
    ) -> ResolverResult<Subscription>
    where
        T: Service,
        C: Fn(&RegistrationHandle) + Send + Sync + 'static,
    {
        self.registration_callback(ServiceKey::of::<T>(contract), Arc::new(callback))
    }
}

impl<R: MutableDependencyResolver + ?Sized> MutableResolverExt for R {}
