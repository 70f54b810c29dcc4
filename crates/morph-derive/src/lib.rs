//! Procedural macros for Morph
//!
//! This crate provides `#[derive(Record)]`, which describes a struct's fields
//! and annotations to the `morph-core` engine. Use it through the
//! `morph_core::Record` re-export.

use proc_macro::TokenStream;

mod record;

/// Derive `Record` and `Reflect` for a struct with named fields.
///
/// Only `pub` fields are visited. Every other field is listed in the shape as
/// unexported and never touched, so it does not need to implement `Reflect`.
///
/// # Attributes
///
/// - `#[morph("trim,lower")]` - Annotation under the default `morph` key
/// - `#[morph(change = "upper")]` - Annotation under another key, for `Morpher::with_tag`
///
/// Both forms can be mixed in one attribute or spread over several.
///
/// # Example
///
/// ```ignore
/// #[derive(Record)]
/// pub struct Customer {
///     #[morph("trim,lower", legacy = "trim")]
///     pub email: String,
///     #[morph("dive,keys,trim,exit,upper")]
///     pub labels: HashMap<String, String>,
///     pub address: Address,
///     #[morph("-")]
///     pub raw: Address,
/// }
/// ```
#[proc_macro_derive(Record, attributes(morph))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record_impl(input)
}
