//! `#[derive(Record)]` for starconv-core.
//!
//! Generates `Record`, `Decode` and `Encode` impls for a struct with named
//! fields. Public fields map to dynamic fields named by the options' name
//! converter; private fields are ignored. Generic records get a where-clause
//! bound per field type rather than per type parameter. Two field attributes
//! are recognised:
//!
//! - `#[starconv(embed)]` promotes the members of a nested record into the
//!   parent's namespace (the field itself may be private). Any field the
//!   parent declares shadows a promoted member of the same name.
//! - `#[starconv(skip)]` hides a public field.
//!
//! Enums, unions, tuple structs and unit structs have no record shape and are
//! rejected at compile time.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    ext::IdentExt, parse_macro_input, parse_quote, Data, DeriveInput, Error, Field, Fields,
    Visibility,
};

#[proc_macro_derive(Record, attributes(starconv))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_record(input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

enum FieldRole {
    Plain,
    Embed,
    Skip,
}

fn field_role(field: &Field) -> Result<FieldRole, Error> {
    let mut role = None;
    for attr in &field.attrs {
        if !attr.path().is_ident("starconv") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("embed") {
                role = Some(FieldRole::Embed);
                Ok(())
            } else if meta.path.is_ident("skip") {
                role = Some(FieldRole::Skip);
                Ok(())
            } else {
                Err(meta.error("unknown starconv attribute, expected `embed` or `skip`"))
            }
        })?;
    }

    Ok(match role {
        Some(role) => role,
        None if matches!(field.vis, Visibility::Public(_)) => FieldRole::Plain,
        None => FieldRole::Skip,
    })
}

fn expand_record(input: DeriveInput) -> Result<TokenStream2, Error> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            Fields::Unnamed(_) => {
                return Err(Error::new(
                    input.ident.span(),
                    "#[derive(Record)] does not support tuple structs",
                ))
            }
            Fields::Unit => {
                return Err(Error::new(
                    input.ident.span(),
                    "#[derive(Record)] does not support unit structs",
                ))
            }
        },
        Data::Enum(data) => {
            return Err(Error::new(
                data.enum_token.span,
                "#[derive(Record)] does not support enums",
            ))
        }
        Data::Union(data) => {
            return Err(Error::new(
                data.union_token.span,
                "#[derive(Record)] does not support unions",
            ))
        }
    };

    let mut decode_steps = Vec::new();
    let mut encode_steps = Vec::new();
    let mut own_names = Vec::new();
    let mut predicates = Vec::new();
    let mut has_embed = false;
    for field in fields {
        let Some(ident) = &field.ident else {
            continue;
        };
        let name = ident.unraw().to_string();
        let ty = &field.ty;
        match field_role(field)? {
            FieldRole::Plain => {
                decode_steps.push(quote! {
                    if !hidden.contains(&#name) {
                        ::starconv_core::record::decode_field(source, #name, &mut self.#ident, ctx)?;
                    }
                });
                encode_steps.push(quote! {
                    if !hidden.contains(&#name) {
                        ::starconv_core::record::encode_field(out, #name, &self.#ident, ctx)?;
                    }
                });
                predicates.push(quote!(#ty: ::starconv_core::Decode + ::starconv_core::Encode));
                own_names.push(name);
            }
            FieldRole::Embed => {
                has_embed = true;
                decode_steps.push(quote! {
                    ::starconv_core::Record::decode_fields(&mut self.#ident, source, &promoted_hidden, ctx)?;
                });
                encode_steps.push(quote! {
                    ::starconv_core::Record::encode_fields(&self.#ident, out, &promoted_hidden, ctx)?;
                });
                predicates.push(quote!(#ty: ::starconv_core::Record));
            }
            // Private and skipped fields still shadow promoted members.
            FieldRole::Skip => own_names.push(name),
        }
    }

    // Members promoted from embedded records are hidden by every name this
    // record declares itself, on top of what the enclosing records hide.
    let promote = has_embed.then(|| {
        quote! {
            let promoted_hidden: ::std::vec::Vec<&str> =
                hidden.iter().copied().chain([#(#own_names),*]).collect();
        }
    });

    let ident = &input.ident;
    let type_name = ident.unraw().to_string();

    let mut generics = input.generics.clone();
    let has_lifetimes = generics.lifetimes().next().is_some();
    if generics.type_params().next().is_some() {
        let type_params: Vec<_> = generics.type_params().map(|p| p.ident.clone()).collect();
        let where_clause = generics.make_where_clause();
        for predicate in &predicates {
            where_clause.predicates.push(parse_quote!(#predicate));
        }
        if !has_lifetimes {
            for param in &type_params {
                where_clause.predicates.push(parse_quote!(#param: 'static));
            }
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    // The value hook inspects sources through `Any`, which needs `'static`.
    let as_any = (!has_lifetimes).then(|| {
        quote! {
            fn as_any(&self) -> ::core::option::Option<&dyn ::core::any::Any> {
                ::core::option::Option::Some(self)
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::starconv_core::Record for #ident #ty_generics #where_clause {
            const TYPE_NAME: &'static str = #type_name;

            #[allow(unused_variables)]
            fn decode_fields(
                &mut self,
                source: &::starconv_core::FieldSource<'_>,
                hidden: &[&str],
                ctx: &::starconv_core::DecodeContext<'_>,
            ) -> ::starconv_core::Result<()> {
                #promote
                #(#decode_steps)*
                ::core::result::Result::Ok(())
            }

            #[allow(unused_variables)]
            fn encode_fields(
                &self,
                out: &mut ::starconv_core::Struct,
                hidden: &[&str],
                ctx: &::starconv_core::EncodeContext<'_>,
            ) -> ::starconv_core::Result<()> {
                #promote
                #(#encode_steps)*
                ::core::result::Result::Ok(())
            }
        }

        impl #impl_generics ::starconv_core::Decode for #ident #ty_generics #where_clause {
            fn decode_from(
                &mut self,
                value: &::starconv_core::Value,
                ctx: &::starconv_core::DecodeContext<'_>,
            ) -> ::starconv_core::Result<()> {
                ::starconv_core::record::decode_record(self, value, ctx)
            }
        }

        impl #impl_generics ::starconv_core::Encode for #ident #ty_generics #where_clause {
            fn encode(
                &self,
                ctx: &::starconv_core::EncodeContext<'_>,
            ) -> ::starconv_core::Result<::starconv_core::Value> {
                ::starconv_core::record::encode_record(self, ctx)
            }

            #as_any
        }
    })
}
