//! Compile-time dependency injection macros for schemafinder.
//!
//! - `#[derive(Context)]` makes each field of a context struct extractable
//! - `#[derive(FromContext)]` builds a struct by extracting every field
//!
//! Generated code refers to `crate::FromRef`, so the consuming crate must
//! define or re-export that trait at its root.

use proc_macro::TokenStream;
use syn::punctuated::Punctuated;
use syn::token::Comma;
use syn::{Data, DeriveInput, Field, Fields};

mod context;
mod from_context;

/// Derive `FromRef<Self>` for the type of every field.
///
/// ```ignore
/// #[derive(Context, Clone)]
/// pub struct Context {
///     pub config: Arc<Config>,
///     pub fetcher: AppFetcher,
/// }
///
/// // impl FromRef<Context> for Arc<Config> { ... }
/// // impl FromRef<Context> for AppFetcher { ... }
/// ```
///
/// Every field type must be `Clone` and appear only once.
#[proc_macro_derive(Context)]
pub fn derive_context(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    context::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Derive `FromRef<Context>` by extracting each field from the context.
///
/// ```ignore
/// #[derive(FromContext, Clone)]
/// pub struct FinderService {
///     config: Arc<Config>,
///     fetcher: AppFetcher,
/// }
/// ```
///
/// The context type defaults to `Context` in scope at the derive site and can
/// be named explicitly with `#[from_context(Context = path::To::Ctx)]` (a
/// string literal is accepted too).
#[proc_macro_derive(FromContext, attributes(from_context))]
pub fn derive_from_context(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    from_context::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Named fields of a struct, or an error naming the derive.
pub(crate) fn named_fields<'a>(
    input: &'a DeriveInput,
    derive: &str,
) -> syn::Result<&'a Punctuated<Field, Comma>> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(&fields.named),
            _ => Err(syn::Error::new_spanned(
                input,
                format!("{derive} can only be derived for structs with named fields"),
            )),
        },
        _ => Err(syn::Error::new_spanned(
            input,
            format!("{derive} can only be derived for structs"),
        )),
    }
}
