use proc_macro2::{Ident, Span, TokenStream};
use quote::{format_ident, quote};

use crate::parse::ParsedStruct;

/// Emits `impl ::gale::Shaped` with one `Field` per serialized field.
///
/// Accessors are nested fns inside `shape()` so the field table can live in a
/// `static`; they name the struct directly because `Self` is not in scope there.
pub(crate) fn emit_shaped(parsed: &ParsedStruct) -> TokenStream {
    let name = &parsed.name;
    let mut accessors = Vec::new();
    let mut fields = Vec::new();

    for (index, field) in parsed
        .fields
        .iter()
        .filter(|field| field.is_serialized())
        .enumerate()
    {
        let ident = &field.ident;
        let ty = &field.ty;
        let field_name = field.name();
        let get = format_ident!("__gale_get_{}", index, span = Span::mixed_site());
        let get_mut = format_ident!("__gale_get_mut_{}", index, span = Span::mixed_site());
        let tag = match &field.tag {
            Some(tag) => quote! { ::core::option::Option::Some(#tag) },
            None => quote! { ::core::option::Option::None },
        };

        accessors.push(quote! {
            fn #get(
                value: &dyn ::core::any::Any,
            ) -> ::gale::Access<&dyn ::core::any::Any> {
                ::core::result::Result::Ok(&::gale::downcast_ref::<#name>(value)?.#ident)
            }

            fn #get_mut(
                value: &mut dyn ::core::any::Any,
            ) -> ::gale::Access<&mut dyn ::core::any::Any> {
                ::core::result::Result::Ok(&mut ::gale::downcast_mut::<#name>(value)?.#ident)
            }
        });

        fields.push(quote! {
            ::gale::Field {
                name: #field_name,
                tag: #tag,
                shape: <#ty as ::gale::Shaped>::shape,
                get: #get,
                get_mut: #get_mut,
            }
        });
    }

    let fields_static = Ident::new("__GALE_FIELDS", Span::mixed_site());

    quote! {
        #[automatically_derived]
        impl ::gale::Shaped for #name {
            fn shape() -> ::gale::Shape {
                #(#accessors)*

                static #fields_static: &[::gale::Field] = &[#(#fields),*];

                ::gale::Shape::of::<Self>(::gale::Def::Struct(::gale::StructDef {
                    fields: #fields_static,
                }))
            }
        }
    }
}
