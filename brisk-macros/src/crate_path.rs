//! Crate path resolution for generated code.
//!
//! Generated impls name `brisk_core` items. Users depend either on the
//! `brisk` facade or on `brisk-core` directly, possibly renamed.

use proc_macro2::{Span, TokenStream};
use proc_macro_crate::{crate_name, FoundCrate};
use quote::quote;

fn found_path(found: FoundCrate) -> TokenStream {
    match found {
        FoundCrate::Itself => quote!(crate),
        FoundCrate::Name(name) => {
            let ident = syn::Ident::new(&name, Span::call_site());
            quote!(::#ident)
        }
    }
}

/// Path to the crate exporting `Describe`, `TypeShape` and friends.
///
/// Prefers the facade (`::brisk`), then `::brisk_core`.
pub fn brisk_core_path() -> TokenStream {
    crate_name("brisk")
        .or_else(|_| crate_name("brisk-core"))
        .map(found_path)
        .unwrap_or_else(|_| quote!(::brisk_core))
}
