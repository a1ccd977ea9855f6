use std::fmt;

use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ExprAssign, ExprLit, ExprPath, Lit, LitStr, Meta, Token, Type, TypePath};

const ACCESS_TYPES: [(&str, &str); 4] = [
    ("READ", "Read"),
    ("WRITE", "Write"),
    ("DELETE", "Delete"),
    ("ALL", "All"),
];

/// Resource type named in `#[access(..., resource = ...)]`.
pub enum ResourceArg {
    /// `resource = Document`
    Type(Type),
    /// `resource = "document"`
    Named(LitStr),
}

/// One parsed `#[access(...)]` parameter attribute.
pub struct ParameterAccessAttr {
    pub index: usize,
    access: Vec<syn::Ident>,
    resource: Option<ResourceArg>,
}

impl fmt::Display for ParameterAccessAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let access: Vec<String> = self.access.iter().map(|a| a.to_string()).collect();
        write!(f, "Access{{ index: {}, types: [{}] }}", self.index, access.join(", "))
    }
}

impl ParameterAccessAttr {
    /// Parses `#[access]`, `#[access(WRITE, READ)]` or
    /// `#[access(WRITE, resource = Document)]`. No access type means READ.
    pub fn from_attribute(index: usize, attr: &Attribute) -> syn::Result<Self> {
        let mut parsed = ParameterAccessAttr {
            index,
            access: Vec::new(),
            resource: None,
        };

        let args: Punctuated<Expr, Token![,]> = match &attr.meta {
            Meta::Path(_) => Punctuated::new(),
            Meta::List(list) => list.parse_args_with(Punctuated::parse_terminated)?,
            Meta::NameValue(nv) => {
                return Err(syn::Error::new_spanned(
                    nv,
                    "expected #[access] or #[access(READ, ...)]",
                ))
            }
        };

        for arg in args {
            match arg {
                Expr::Path(path) => parsed.push_access(access_name(&path)?, &path)?,
                Expr::Lit(ExprLit {
                    lit: Lit::Str(lit_str),
                    ..
                }) => parsed.push_access(lit_str.value(), &lit_str)?,
                Expr::Assign(assign) => parsed.set_resource(assign)?,
                _ => {
                    return Err(syn::Error::new_spanned(
                        arg,
                        "expected an access type like WRITE or resource = Type",
                    ));
                }
            }
        }

        Ok(parsed)
    }

    fn push_access<T: quote::ToTokens>(&mut self, name: String, span: &T) -> syn::Result<()> {
        let upper = name.to_uppercase();
        let variant = ACCESS_TYPES
            .iter()
            .find(|(keyword, _)| *keyword == upper)
            .map(|(_, variant)| *variant)
            .ok_or_else(|| {
                syn::Error::new_spanned(span, "expected one of READ, WRITE, DELETE, ALL")
            })?;

        let ident = syn::Ident::new(variant, proc_macro2::Span::call_site());
        if !self.access.contains(&ident) {
            self.access.push(ident);
        }
        Ok(())
    }

    fn set_resource(&mut self, assign: ExprAssign) -> syn::Result<()> {
        let key = match assign.left.as_ref() {
            Expr::Path(path) => path.path.get_ident().map(|i| i.to_string()),
            _ => None,
        };
        if key.as_deref() != Some("resource") {
            return Err(syn::Error::new_spanned(assign.left, "expected `resource = ...`"));
        }
        if self.resource.is_some() {
            return Err(syn::Error::new_spanned(assign, "resource declared twice"));
        }

        self.resource = Some(match *assign.right {
            Expr::Path(ExprPath { qself, path, .. }) => {
                ResourceArg::Type(Type::Path(TypePath { qself, path }))
            }
            Expr::Lit(ExprLit {
                lit: Lit::Str(name),
                ..
            }) => ResourceArg::Named(name),
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "expected a type path or a string literal",
                ))
            }
        });
        Ok(())
    }

    /// Builds the `ParameterAccess` expression.
    pub fn to_tokens(&self, core: &TokenStream2) -> TokenStream2 {
        let index = self.index;
        let access = &self.access;
        let security = quote! { #core::http::security };

        let resource = match &self.resource {
            Some(ResourceArg::Type(ty)) => quote! {
                .resource_type(#security::ResourceType::of::<#ty>())
            },
            Some(ResourceArg::Named(name)) => quote! {
                .resource_type(#security::ResourceType::named(#name))
            },
            None => quote! {},
        };

        quote! {
            #security::ParameterAccess::new(#index)
                .access_types(&[#(#security::AccessType::#access),*])
                #resource
        }
    }
}

fn access_name(path: &ExprPath) -> syn::Result<String> {
    path.path
        .get_ident()
        .map(|ident| ident.to_string())
        .ok_or_else(|| syn::Error::new_spanned(path, "expected a string literal or identifier"))
}
