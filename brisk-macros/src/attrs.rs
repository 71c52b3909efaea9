//! Reading `serde`, `garde` and `describe` attributes.
//!
//! Only the parts that change the serialized shape are kept; every other
//! serde or garde option is parsed and ignored so that valid attributes never
//! trip the derive. Options that serde splits by direction
//! (`rename(serialize = .., deserialize = ..)`, `skip_serializing`) are kept
//! per side.

use proc_macro2::TokenStream;
use syn::meta::ParseNestedMeta;
use syn::{Attribute, LitStr, Token};

use crate::rename::RenameRule;

/// A serde option that may differ between serializing and deserializing.
#[derive(Clone)]
pub struct Sided<T> {
    pub serialize: Option<T>,
    pub deserialize: Option<T>,
}

impl<T> Default for Sided<T> {
    fn default() -> Self {
        Self {
            serialize: None,
            deserialize: None,
        }
    }
}

#[derive(Default)]
pub struct ContainerAttrs {
    pub rename_all: Sided<RenameRule>,
    pub transparent: bool,
    pub default: bool,
    /// `tag`, `untagged`: enums are no longer plain strings.
    pub tagged: bool,
    pub skip_validation: bool,
}

#[derive(Default)]
pub struct FieldAttrs {
    pub rename: Sided<String>,
    pub skip_serializing: bool,
    pub skip_deserializing: bool,
    pub default: bool,
    pub skip_serializing_if: bool,
    pub flatten: bool,
    pub required: bool,
}

impl FieldAttrs {
    pub fn is_skipped(&self) -> bool {
        self.skip_serializing && self.skip_deserializing
    }
}

#[derive(Default)]
pub struct VariantAttrs {
    pub rename: Sided<String>,
    pub skip: bool,
}

pub fn container(attrs: &[Attribute]) -> syn::Result<ContainerAttrs> {
    let mut out = ContainerAttrs::default();
    for attr in attrs {
        if attr.path().is_ident("serde") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename_all") {
                    let names = sided_names(&meta)?;
                    out.rename_all = Sided {
                        serialize: names.serialize.map(|r| rule(&meta, &r)).transpose()?,
                        deserialize: names.deserialize.map(|r| rule(&meta, &r)).transpose()?,
                    };
                } else if meta.path.is_ident("transparent") {
                    out.transparent = true;
                } else if meta.path.is_ident("default") {
                    out.default = true;
                    skip_value(&meta)?;
                } else if meta.path.is_ident("tag") || meta.path.is_ident("untagged") {
                    out.tagged = true;
                    skip_value(&meta)?;
                } else {
                    skip_value(&meta)?;
                }
                Ok(())
            })?;
        } else if attr.path().is_ident("describe") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip_validation") {
                    out.skip_validation = true;
                    Ok(())
                } else {
                    Err(meta.error("unknown describe option, expected `skip_validation`"))
                }
            })?;
        }
    }
    Ok(out)
}

pub fn field(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut out = FieldAttrs::default();
    for attr in attrs {
        if attr.path().is_ident("serde") {
            attr.parse_nested_meta(|meta| {
                let path = &meta.path;
                if path.is_ident("rename") {
                    out.rename = sided_names(&meta)?;
                } else if path.is_ident("skip") {
                    out.skip_serializing = true;
                    out.skip_deserializing = true;
                } else if path.is_ident("skip_serializing") {
                    out.skip_serializing = true;
                } else if path.is_ident("skip_deserializing") {
                    out.skip_deserializing = true;
                } else if path.is_ident("default") {
                    out.default = true;
                    skip_value(&meta)?;
                } else if path.is_ident("skip_serializing_if") {
                    out.skip_serializing_if = true;
                    skip_value(&meta)?;
                } else if path.is_ident("flatten") {
                    out.flatten = true;
                } else {
                    skip_value(&meta)?;
                }
                Ok(())
            })?;
        } else if attr.path().is_ident("garde") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("required") {
                    out.required = true;
                }
                skip_value(&meta)
            })?;
        }
    }
    Ok(out)
}

pub fn variant(attrs: &[Attribute]) -> syn::Result<VariantAttrs> {
    let mut out = VariantAttrs::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                out.rename = sided_names(&meta)?;
            } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                out.skip = true;
            } else {
                skip_value(&meta)?;
            }
            Ok(())
        })?;
    }
    Ok(out)
}

/// `name = "x"` sets both sides; `name(serialize = "x", deserialize = "y")`
/// sets each side it names.
fn sided_names(meta: &ParseNestedMeta) -> syn::Result<Sided<String>> {
    if meta.input.peek(Token![=]) {
        let lit: LitStr = meta.value()?.parse()?;
        return Ok(Sided {
            serialize: Some(lit.value()),
            deserialize: Some(lit.value()),
        });
    }

    let mut out = Sided::default();
    meta.parse_nested_meta(|inner| {
        let lit: LitStr = inner.value()?.parse()?;
        if inner.path.is_ident("serialize") {
            out.serialize = Some(lit.value());
        } else if inner.path.is_ident("deserialize") {
            out.deserialize = Some(lit.value());
        } else {
            return Err(inner.error("expected `serialize` or `deserialize`"));
        }
        Ok(())
    })?;
    Ok(out)
}

fn rule(meta: &ParseNestedMeta, name: &str) -> syn::Result<RenameRule> {
    RenameRule::parse(name).ok_or_else(|| meta.error(format!("unknown rename rule `{name}`")))
}

/// Consume `= value` or `(...)` after an option we do not interpret.
fn skip_value(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        let _: syn::Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        let _: TokenStream = content.parse()?;
    }
    Ok(())
}
