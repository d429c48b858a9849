//! `#[derive(Record)]` for rowbind.
//!
//! Generates the field accessor table for a struct with named fields and,
//! for non-generic structs, registers the type for cache warm-up.
//!
//! Field attributes:
//! - `#[rowbind(column = "name")]` maps the field to another column name.
//! - `#[rowbind(skip)]` leaves the field out of the mapping.
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use std::collections::HashMap;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Field, Fields, LitStr, parse_macro_input};

#[proc_macro_derive(Record, attributes(rowbind))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

struct FieldAttrs {
    column: Option<LitStr>,
    skip: bool,
}

fn parse_attrs(field: &Field) -> syn::Result<FieldAttrs> {
    let mut attrs = FieldAttrs {
        column: None,
        skip: false,
    };
    for attr in &field.attrs {
        if !attr.path().is_ident("rowbind") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("column") {
                attrs.column = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("skip") {
                attrs.skip = true;
                Ok(())
            } else {
                Err(meta.error("expected `column = \"...\"` or `skip`"))
            }
        })?;
    }
    Ok(attrs)
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Record can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Record can only be derived for structs",
            ));
        }
    };

    let mut seen: HashMap<String, String> = HashMap::new();
    let mut descriptors = Vec::new();
    for field in fields {
        let attrs = parse_attrs(field)?;
        if attrs.skip {
            continue;
        }
        // Named fields always carry an ident.
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let field_name = ident.unraw().to_string();
        let column_name = attrs
            .column
            .as_ref()
            .map(LitStr::value)
            .unwrap_or_else(|| field_name.clone())
            .to_lowercase();
        if let Some(previous) = seen.insert(column_name.clone(), field_name.clone()) {
            let span_source = attrs
                .column
                .as_ref()
                .map(|lit| lit.span())
                .unwrap_or_else(|| ident.span());
            return Err(syn::Error::new(
                span_source,
                format!(
                    "fields `{}` and `{}` both map to column `{}`",
                    previous, field_name, column_name
                ),
            ));
        }

        let ty = &field.ty;
        let column = match &attrs.column {
            Some(lit) => quote!(::core::option::Option::Some(#lit)),
            None => quote!(::core::option::Option::None),
        };
        descriptors.push(quote! {
            ::rowbind::FieldDescriptor::new::<#ty>(
                #field_name,
                #column,
                |record: &mut Self, value: ::rowbind::Value| {
                    <#ty as ::rowbind::ColumnValue>::from_value(value)
                        .map(|converted| record.#ident = converted)
                },
                |record: &mut Self| {
                    record.#ident = <#ty as ::rowbind::ColumnValue>::null_value();
                },
            )
        });
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let record_name = name.to_string();

    let registration = if input.generics.params.is_empty() {
        quote! {
            ::rowbind::inventory::submit! {
                ::rowbind::Registration {
                    record: #record_name,
                    preload: ::rowbind::MappingCache::preload::<#name>,
                }
            }
        }
    } else {
        quote!()
    };

    Ok(quote! {
        impl #impl_generics ::rowbind::Record for #name #ty_generics #where_clause {
            fn fields() -> ::std::vec::Vec<::rowbind::FieldDescriptor<Self>> {
                ::std::vec![#(#descriptors),*]
            }

            fn record_name() -> &'static str {
                #record_name
            }
        }

        #registration
    })
}
