//! # apiquery Derive Macro
//!
//! Provides `#[derive(QueryEncode)]` for structs. The generated implementation
//! builds the struct's stringifier with `apiquery::StructEncoder`, one field
//! call per field carrying a `#[query("…")]` directive.
//!
//! Compatible with `syn 2.0`.

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse_macro_input, parse_quote, Attribute, Data, DeriveInput, Fields, Index, LitStr, Member,
    Visibility,
};

/// Derives `apiquery::QueryEncode` for a struct.
///
/// Named fields are exported when declared `pub`. Tuple-struct fields are
/// treated as embedded fields.
///
/// The generated `is_zero` only looks at fields carrying `#[query("…")]`:
/// the value is zero when every tagged field is zero, whatever its untagged
/// fields hold. Untagged fields need not implement `QueryEncode`.
#[proc_macro_derive(QueryEncode, attributes(query))]
pub fn derive_query_encode(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

struct TaggedField {
    member: Member,
    ident: String,
    directive: LitStr,
    exported: bool,
    embedded: bool,
}

fn expand(mut input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(ds) => &ds.fields,
        _ => {
            return Err(syn::Error::new(
                name.span(),
                "QueryEncode can only be derived for structs",
            ))
        }
    };

    let mut tagged = Vec::new();
    let embedded = matches!(fields, Fields::Unnamed(_));
    for (index, field) in fields.iter().enumerate() {
        let Some(directive) = parse_directive(&field.attrs)? else {
            continue;
        };
        let (member, ident) = match &field.ident {
            Some(ident) => (Member::Named(ident.clone()), ident.to_string()),
            None => (Member::Unnamed(Index::from(index)), index.to_string()),
        };
        tagged.push(TaggedField {
            member,
            ident,
            directive,
            exported: matches!(field.vis, Visibility::Public(_)),
            embedded,
        });
    }

    let type_params: Vec<_> = input
        .generics
        .type_params()
        .map(|param| param.ident.clone())
        .collect();
    let where_clause = input.generics.make_where_clause();
    for param in type_params {
        where_clause
            .predicates
            .push(parse_quote!(#param: ::apiquery::QueryEncode));
    }
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let field_calls = tagged.iter().map(|f| {
        let member = &f.member;
        let ident = &f.ident;
        let directive = &f.directive;
        let exported = f.exported;
        let embedded = f.embedded;
        quote! {
            .field(
                ::apiquery::Field {
                    ident: #ident,
                    tag: ::core::option::Option::Some(#directive),
                    exported: #exported,
                    embedded: #embedded,
                },
                |value: &Self| &value.#member,
            )?
        }
    });

    let zero_checks = tagged.iter().map(|f| {
        let member = &f.member;
        quote! { && ::apiquery::QueryEncode::is_zero(&self.#member) }
    });

    Ok(quote! {
        impl #impl_generics ::apiquery::QueryEncode for #name #ty_generics #where_clause {
            const KIND: ::apiquery::Kind = ::apiquery::Kind::Struct;

            fn build_stringifier(
                encoder: &::apiquery::Encoder,
            ) -> ::apiquery::Result<::apiquery::Stringifier<Self>> {
                ::core::result::Result::Ok(
                    ::apiquery::StructEncoder::<Self>::new(encoder)
                        #(#field_calls)*
                        .finish(),
                )
            }

            fn is_zero(&self) -> bool {
                true #(#zero_checks)*
            }
        }
    })
}

/// Returns the field's `#[query("…")]` directive, if any.
fn parse_directive(attrs: &[Attribute]) -> syn::Result<Option<LitStr>> {
    let mut directive = None;
    for attr in attrs {
        if !attr.path().is_ident("query") {
            continue;
        }
        if directive.is_some() {
            return Err(syn::Error::new_spanned(
                attr,
                "duplicate #[query] attribute",
            ));
        }
        directive = Some(attr.parse_args::<LitStr>()?);
    }
    Ok(directive)
}
