#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

mod emit;
mod parse;

/// Derives `Shaped` for a struct with named fields.
///
/// Field attributes:
/// - `#[gale(tag = "name")]` sets the wire name (text before the first comma;
///   an empty name keeps the field's own). A tag of `"-"` excludes the field.
/// - `#[gale(ignore)]` excludes the field.
///
/// Every field type must implement `Shaped`. Generic structs, tuple structs,
/// unit structs, enums and unions are rejected.
#[proc_macro_derive(Shaped, attributes(gale))]
pub fn derive_shaped(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    match parse::parse_struct(input.into()) {
        Ok(parsed) => emit::emit_shaped(&parsed).into(),
        Err(err) => err.into_compile_error().into(),
    }
}
