use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse_quote, Data, DataEnum, DeriveInput, Fields, FieldsNamed, Generics};

use crate::attrs::{self, ContainerAttrs};
use crate::crate_path::brisk_core_path;
use crate::rename::RenameRule;

pub fn expand(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    match expand_inner(input) {
        Ok(ts) => ts.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_inner(input: DeriveInput) -> syn::Result<TokenStream> {
    let krate = brisk_core_path();
    let container = attrs::container(&input.attrs)?;

    let (shape, validates, named) = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) if container.transparent => {
                (transparent_shape(&krate, named)?, false, false)
            }
            Fields::Named(named) => (record_shape(&krate, &container, named)?, true, true),
            Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
                let ty = &unnamed.unnamed[0].ty;
                (quote!(<#ty as #krate::Describe>::shape()), false, false)
            }
            _ => (quote!(#krate::TypeShape::Any), false, false),
        },
        Data::Enum(data) => match enum_shape(&krate, &container, data)? {
            Some(shape) => (shape, false, true),
            None => (quote!(#krate::TypeShape::Any), false, false),
        },
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Describe cannot be derived for unions",
            ))
        }
    };

    let describe_impl = describe_impl(&krate, &input, shape, named);
    let validatable_impl = if validates && !container.skip_validation {
        garde_validatable_impl(&krate, &input)
    } else {
        passing_validatable_impl(&krate, &input)
    };

    Ok(quote! {
        #describe_impl
        #validatable_impl
    })
}

/// The schema name schemars gives `Self`, one per generic instantiation.
fn schema_name(krate: &TokenStream) -> TokenStream {
    quote!(<Self as #krate::__private::schemars::JsonSchema>::schema_name())
}

fn side_key(explicit: &Option<String>, rule: Option<RenameRule>, member: &str) -> String {
    match (explicit, rule) {
        (Some(rename), _) => rename.clone(),
        (None, Some(rule)) => rule.apply_to_field(member),
        (None, None) => member.to_owned(),
    }
}

fn record_shape(
    krate: &TokenStream,
    container: &ContainerAttrs,
    fields: &FieldsNamed,
) -> syn::Result<TokenStream> {
    let mut entries = Vec::new();

    for field in &fields.named {
        let Some(ident) = &field.ident else { continue };
        let ty = &field.ty;
        let attrs = attrs::field(&field.attrs)?;

        let member = ident.to_string();
        let member = member.strip_prefix("r#").unwrap_or(&member).to_string();
        let key = side_key(&attrs.rename.serialize, container.rename_all.serialize, &member);
        let input_key = side_key(
            &attrs.rename.deserialize,
            container.rename_all.deserialize,
            &member,
        );

        // Fully skipped fields may hold types with no shape at all.
        let resolve = if attrs.is_skipped() {
            quote!(|| #krate::TypeShape::Any)
        } else {
            quote!(<#ty as #krate::Describe>::shape)
        };

        let mut entry = quote!(#krate::FieldShape::new(#member, #resolve).key(#key));
        if input_key != key {
            entry = quote!(#entry.input_key(#input_key));
        }
        if attrs.skip_serializing {
            entry = quote!(#entry.skip_serializing());
        }
        if attrs.skip_deserializing {
            entry = quote!(#entry.skip_deserializing());
        }
        if attrs.flatten {
            entry = quote!(#entry.flattened());
        }
        if attrs.default || container.default {
            entry = quote!(#entry.defaulted());
        }
        if attrs.skip_serializing_if {
            entry = quote!(#entry.skip_if());
        }
        if attrs.required {
            entry = quote!(#entry.force_required());
        }
        entries.push(entry);
    }

    let name = schema_name(krate);
    Ok(quote! {
        #krate::TypeShape::Record(#krate::RecordShape::named(
            #name,
            ::std::vec![#(#entries),*],
        ))
    })
}

fn transparent_shape(krate: &TokenStream, fields: &FieldsNamed) -> syn::Result<TokenStream> {
    let mut visible = Vec::new();
    for field in &fields.named {
        if !attrs::field(&field.attrs)?.is_skipped() {
            visible.push(&field.ty);
        }
    }
    match visible.as_slice() {
        [ty] => Ok(quote!(<#ty as #krate::Describe>::shape())),
        _ => Err(syn::Error::new_spanned(
            fields,
            "#[serde(transparent)] requires exactly one non-skipped field",
        )),
    }
}

/// `None` when the enum is not a plain string enum.
fn enum_shape(
    krate: &TokenStream,
    container: &ContainerAttrs,
    data: &DataEnum,
) -> syn::Result<Option<TokenStream>> {
    let unit_only = data.variants.iter().all(|v| matches!(v.fields, Fields::Unit));
    if !unit_only || container.tagged {
        return Ok(None);
    }

    // Variant names follow the serialize side.
    let mut names = Vec::new();
    for variant in &data.variants {
        let attrs = attrs::variant(&variant.attrs)?;
        if attrs.skip {
            continue;
        }
        let name = match (attrs.rename.serialize, container.rename_all.serialize) {
            (Some(rename), _) => rename,
            (None, Some(rule)) => rule.apply_to_variant(&variant.ident.to_string()),
            (None, None) => variant.ident.to_string(),
        };
        names.push(name);
    }

    let name = schema_name(krate);
    Ok(Some(quote! {
        #krate::TypeShape::Enum(#krate::EnumShape {
            name: #name,
            variants: ::std::vec![#(#names),*],
        })
    }))
}

fn describe_impl(
    krate: &TokenStream,
    input: &DeriveInput,
    shape: TokenStream,
    named: bool,
) -> TokenStream {
    let name = &input.ident;
    let mut generics = bound_type_params(&input.generics, quote!(#krate::Describe));
    if named && !input.generics.params.is_empty() {
        generics
            .make_where_clause()
            .predicates
            .push(parse_quote!(Self: #krate::__private::schemars::JsonSchema));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    quote! {
        impl #impl_generics #krate::Describe for #name #ty_generics #where_clause {
            fn shape() -> #krate::TypeShape {
                #shape
            }
        }
    }
}

fn garde_validatable_impl(krate: &TokenStream, input: &DeriveInput) -> TokenStream {
    let name = &input.ident;
    let garde = quote!(#krate::__private::garde);
    let mut generics = input.generics.clone();
    generics.make_where_clause().predicates.extend::<[syn::WherePredicate; 2]>([
        parse_quote!(Self: #garde::Validate + ::core::marker::Send + ::core::marker::Sync),
        parse_quote!(<Self as #garde::Validate>::Context: ::core::default::Default),
    ]);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    quote! {
        impl #impl_generics #krate::Validatable for #name #ty_generics #where_clause {
            fn check(&self) -> ::core::result::Result<(), #garde::Report> {
                <Self as #garde::Validate>::validate(self)
            }
        }
    }
}

fn passing_validatable_impl(krate: &TokenStream, input: &DeriveInput) -> TokenStream {
    let name = &input.ident;
    let mut generics = input.generics.clone();
    generics
        .make_where_clause()
        .predicates
        .push(parse_quote!(Self: ::core::marker::Send + ::core::marker::Sync));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    quote! {
        impl #impl_generics #krate::Validatable for #name #ty_generics #where_clause {
            fn check(&self) -> ::core::result::Result<(), #krate::__private::garde::Report> {
                ::core::result::Result::Ok(())
            }
        }
    }
}

fn bound_type_params(generics: &Generics, bound: TokenStream) -> Generics {
    let mut generics = generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!(#bound));
    }
    generics
}
