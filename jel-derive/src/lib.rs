//! `#[derive(Record)]` for jel record descriptors
//!
//! Only fields carrying a `#[jel(...)]` attribute are exposed to clients:
//!
//! ```ignore
//! #[derive(jel::Record)]
//! #[jel(name = "External")]
//! struct External {
//!     #[jel(name = "externalName", column = "external_name")]
//!     external_name: String,
//!     #[jel(column = "internal", nested)]
//!     internal: Internal,
//!     #[jel(embed)]
//!     audit: Audit,
//!     secret: String, // not exposed
//! }
//! ```
//!
//! Field options:
//!
//! - `name = "..."`: public name, defaults to the field ident
//! - `column = "..."`: storage column; fields without one are known but
//!   can't be referenced
//! - `nested`: the field type implements `Record` and can be traversed with
//!   dotted paths
//! - `embed`: the nested record's fields are flattened into this one
//! - `skip`: not exposed

use std::collections::HashSet;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, parse_macro_input, spanned::Spanned};

#[proc_macro_derive(Record, attributes(jel))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_record(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

#[derive(Default)]
struct FieldOptions {
    name: Option<String>,
    column: Option<String>,
    nested: bool,
    embed: bool,
    skip: bool,
}

fn expand_record(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            input.generics,
            "Record does not support generic structs",
        ));
    }

    let type_name = parse_record_name(&input.attrs)?.unwrap_or_else(|| struct_name.to_string());

    let data_struct = match input.data {
        Data::Struct(data) => data,
        _ => {
            return Err(syn::Error::new(
                struct_name.span(),
                "Record can only be derived for structs",
            ));
        }
    };

    let named_fields = match data_struct.fields {
        Fields::Named(fields) => fields,
        Fields::Unit => return Ok(expand_impl(&struct_name, &type_name, &[])),
        Fields::Unnamed(_) => {
            return Err(syn::Error::new(
                struct_name.span(),
                "Record requires named fields",
            ));
        }
    };

    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for field in named_fields.named {
        let Some(options) = parse_field_options(&field.attrs)? else {
            continue;
        };
        if options.skip {
            continue;
        }

        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new(field.span(), "Record requires named fields"))?;
        let name = options.name.unwrap_or_else(|| ident.to_string());
        let column = options.column.unwrap_or_default();
        let embedded = options.embed;

        if !options.embed && !seen.insert(name.clone()) {
            return Err(syn::Error::new(
                field.span(),
                format!("Duplicate public field name {:?}", name),
            ));
        }

        let ty = &field.ty;
        let field_type_name = quote!(#ty).to_string().replace(' ', "");

        let (decode, nested) = if options.nested || options.embed {
            (
                quote!(::core::option::Option::None),
                quote!(::core::option::Option::Some(
                    <#ty as ::jel::Record>::descriptor as ::jel::schema::DescriptorFn
                )),
            )
        } else {
            (
                quote!(::core::option::Option::Some(
                    <#ty as ::jel::FieldValue>::decode_json as ::jel::schema::DecodeFn
                )),
                quote!(::core::option::Option::None),
            )
        };

        entries.push(quote! {
            ::jel::schema::StaticField {
                name: #name,
                column: #column,
                type_name: #field_type_name,
                embedded: #embedded,
                decode: #decode,
                nested: #nested,
            }
        });
    }

    Ok(expand_impl(&struct_name, &type_name, &entries))
}

fn expand_impl(struct_name: &syn::Ident, type_name: &str, entries: &[TokenStream2]) -> TokenStream2 {
    quote! {
        impl ::jel::Record for #struct_name {
            fn descriptor() -> &'static dyn ::jel::RecordDescriptor {
                static FIELDS: &[::jel::schema::StaticField] = &[#(#entries),*];
                static DESCRIPTOR: ::jel::schema::StaticRecord = ::jel::schema::StaticRecord {
                    name: #type_name,
                    fields: FIELDS,
                };
                &DESCRIPTOR
            }
        }
    }
}

fn parse_record_name(attrs: &[syn::Attribute]) -> syn::Result<Option<String>> {
    let mut name = None;

    for attr in attrs {
        if !attr.path().is_ident("jel") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let lit: LitStr = meta.value()?.parse()?;
                name = Some(lit.value());
                return Ok(());
            }

            Err(meta.error("Unsupported #[jel(...)] option on struct. Supported: name = \"...\""))
        })?;
    }

    Ok(name)
}

fn parse_field_options(attrs: &[syn::Attribute]) -> syn::Result<Option<FieldOptions>> {
    let mut options: Option<FieldOptions> = None;

    for attr in attrs {
        if !attr.path().is_ident("jel") {
            continue;
        }

        if options.is_some() {
            return Err(syn::Error::new(
                attr.span(),
                "Duplicate #[jel(...)] attribute on field",
            ));
        }

        let mut parsed = FieldOptions::default();
        match &attr.meta {
            syn::Meta::Path(_) => {}
            syn::Meta::List(list) => {
                list.parse_nested_meta(|meta| {
                    if meta.path.is_ident("nested") {
                        parsed.nested = true;
                        return Ok(());
                    }

                    if meta.path.is_ident("embed") {
                        parsed.embed = true;
                        return Ok(());
                    }

                    if meta.path.is_ident("skip") {
                        parsed.skip = true;
                        return Ok(());
                    }

                    if meta.path.is_ident("name") {
                        let lit: LitStr = meta.value()?.parse()?;
                        if lit.value().is_empty() {
                            return Err(syn::Error::new(lit.span(), "Field name must not be empty"));
                        }
                        parsed.name = Some(lit.value());
                        return Ok(());
                    }

                    if meta.path.is_ident("column") {
                        let lit: LitStr = meta.value()?.parse()?;
                        if lit.value().contains('"') {
                            return Err(syn::Error::new(
                                lit.span(),
                                "Column name must not contain '\"'",
                            ));
                        }
                        parsed.column = Some(lit.value());
                        return Ok(());
                    }

                    Err(meta.error(
                        "Unsupported #[jel(...)] option. Supported: name = \"...\", column = \"...\", nested, embed, skip",
                    ))
                })?;
            }
            syn::Meta::NameValue(_) => {
                return Err(syn::Error::new(
                    attr.span(),
                    "Unsupported #[jel = ...] syntax. Use #[jel(name = \"...\", column = \"...\")]",
                ));
            }
        }

        if parsed.skip && (parsed.nested || parsed.embed || parsed.column.is_some()) {
            return Err(syn::Error::new(
                attr.span(),
                "#[jel(skip)] cannot be combined with other options",
            ));
        }

        options = Some(parsed);
    }

    Ok(options)
}
