use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Marker trait for values a factory can produce.
///
/// Any type that is `Send + 'static` automatically implements this trait.
pub trait Service: Any + Send + 'static {}
impl<T: Any + Send + 'static> Service for T {}

/// Identity of a registration slot: the service type plus a contract name.
///
/// Two keys are equal when both the [`TypeId`] and the contract match. The
/// type name is carried for diagnostics only.
#[derive(Clone)]
pub struct ServiceKey {
    type_id: TypeId,
    type_name: &'static str,
    contract: Cow<'static, str>,
}

impl ServiceKey {
    /// Builds a key for `T`, mapping a missing contract to the empty one.
    #[must_use]
    pub fn of<T: ?Sized + 'static>(contract: Option<&str>) -> Self {
        Self::with_contract::<T>(contract.map_or(Cow::Borrowed(""), |c| Cow::Owned(c.to_owned())))
    }

    /// Builds a key for `T` under an owned or static contract name.
    #[must_use]
    pub fn with_contract<T: ?Sized + 'static>(contract: impl Into<Cow<'static, str>>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            contract: contract.into(),
        }
    }

    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub fn contract(&self) -> &str {
        &self.contract
    }
}

impl PartialEq for ServiceKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.contract == other.contract
    }
}

impl Eq for ServiceKey {}

impl Hash for ServiceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.contract.hash(state);
    }
}

impl fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceKey")
            .field("type", &self.type_name)
            .field("contract", &self.contract)
            .finish()
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.contract.is_empty() {
            f.write_str(self.type_name)
        } else {
            write!(f, "{}[{}]", self.type_name, self.contract)
        }
    }
}
