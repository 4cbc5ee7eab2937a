use std::borrow::Cow;

/// Errors that can occur during resolver operations.
///
/// A lookup that finds nothing is not an error: typed and raw lookups
/// report it as `None` or an empty list.
#[beacon_derive::beacon_error]
pub enum ResolverError {
    /// The resolver was disposed and no longer holds a registry.
    #[error("Resolver disposed{}: {message}", format_context(.context))]
    Disposed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A registration argument does not fit the key it was registered under.
    #[error("Invalid argument{}: {message}", format_context(.context))]
    InvalidArgument { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A resolved instance is not of the type requested at the call site.
    /// This indicates an invariant violation in the type registry.
    #[error("Type mismatch{}: {message}", format_context(.context))]
    TypeMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
