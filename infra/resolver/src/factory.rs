use crate::key::Service;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A type-erased instance produced by a [`ServiceFactory`].
pub type ServiceInstance = Box<dyn Any + Send>;

type MakeFn = dyn Fn() -> ServiceInstance + Send + Sync;

/// A shared, zero-argument constructor tagged with the type it produces.
///
/// Cloning is cheap: clones share the same closure. The registry never caches
/// what the closure returns, so every resolution calls it again.
#[derive(Clone)]
pub struct ServiceFactory {
    produces: TypeId,
    produces_name: &'static str,
    make: Arc<MakeFn>,
}

impl ServiceFactory {
    pub fn new<T, F>(factory: F) -> Self
    where
        T: Service,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            produces: TypeId::of::<T>(),
            produces_name: std::any::type_name::<T>(),
            make: Arc::new(move || Box::new(factory()) as ServiceInstance),
        }
    }

    /// The [`TypeId`] of the values this factory creates.
    #[must_use]
    pub const fn produces(&self) -> TypeId {
        self.produces
    }

    #[must_use]
    pub const fn produces_name(&self) -> &'static str {
        self.produces_name
    }

    /// Invokes the underlying closure.
    #[must_use]
    pub fn create(&self) -> ServiceInstance {
        (self.make)()
    }

    /// Whether both handles share the same closure.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.make, &other.make)
    }
}

impl fmt::Debug for ServiceFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceFactory").field("produces", &self.produces_name).finish_non_exhaustive()
    }
}
