#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros for the beacon infrastructure crates.
//!
//! ## Usage
//! Depend on the crate from any workspace member that declares an error enum:
//! ```toml
//! [dependencies]
//! beacon-derive.workspace = true
//! thiserror.workspace = true
//! ```

mod error;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Turns a plain enum into a crate error type.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * `<Stem>Result<T>` alias, where `<Stem>` is the enum name without its `Error` suffix
///   (`ResolverError` yields `ResolverResult<T>`).
/// * `<Name>Ext` trait adding `.context(...)` to `Result<T, Name>` and to
///   `Result<T, Source>` for every variant carrying a `source` field.
/// * `From<Source>` for every variant carrying a `source` field.
/// * `From<&'static str>` and `From<String>` when an `Internal { message, context }`
///   variant exists.
/// * A private `format_context` helper for `#[error(...)]` strings.
///
/// # Requirements
///
/// Variants use named fields only. A `context` field must be typed
/// `Option<Cow<'static, str>>`, and every variant with a source needs one.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[beacon_derive::beacon_error]
/// pub enum StoreError {
///     #[error("I/O failure{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal store error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn open() -> StoreResult<std::fs::File> {
///     std::fs::File::open("store.bin").context("Opening the store file")
/// }
/// ```
#[proc_macro_attribute]
pub fn beacon_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    error::expand(input).into()
}
