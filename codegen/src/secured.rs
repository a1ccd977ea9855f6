//! The `#[secured]` macro.
//!
//! On a function it emits a sibling `<name>_requirements()` returning the
//! function's `OperationDeclaration`. On an inherent `impl` block it declares
//! type-level requirements and collects a declaration for every method.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Expr, ExprLit, ImplItem, Item, ItemFn, ItemImpl, Lit, LitStr, Meta, Token, Type};

use crate::helpers::{core_crate_path, is_attr, take_parameter_access};

/// Parsed arguments of `#[secured(...)]`.
#[derive(Default)]
pub struct SecuredArgs {
    roles: Option<Vec<LitStr>>,
    any_mode: Option<bool>,
    any_role: bool,
    unsecured: bool,
    declaring_type: Option<LitStr>,
}

impl Parse for SecuredArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = SecuredArgs::default();

        while !input.is_empty() {
            // #[secured("ADMIN", "USER")] shorthand
            if input.peek(LitStr) {
                let role: LitStr = input.parse()?;
                args.roles.get_or_insert_with(Vec::new).push(role);
            } else {
                let meta: Meta = input.parse()?;
                args.apply(meta)?;
            }

            if input.is_empty() {
                break;
            }
            input.parse::<Token![,]>()?;
        }

        Ok(args)
    }
}

impl SecuredArgs {
    fn apply(&mut self, meta: Meta) -> syn::Result<()> {
        let name = meta
            .path()
            .get_ident()
            .map(|i| i.to_string())
            .unwrap_or_default();

        match (name.as_str(), meta) {
            ("any_role", Meta::Path(_)) => self.any_role = true,
            ("unsecured", Meta::Path(_)) => self.unsecured = true,
            ("roles", Meta::List(list)) => {
                let roles = list.parse_args_with(Punctuated::<LitStr, Token![,]>::parse_terminated)?;
                self.roles
                    .get_or_insert_with(Vec::new)
                    .extend(roles.into_iter());
            }
            ("mode", Meta::NameValue(nv)) => {
                let mode = match &nv.value {
                    Expr::Path(path) => path.path.get_ident().map(|i| i.to_string()),
                    Expr::Lit(ExprLit {
                        lit: Lit::Str(s), ..
                    }) => Some(s.value()),
                    _ => None,
                };
                self.any_mode = Some(match mode.as_deref().map(str::to_lowercase).as_deref() {
                    Some("any") => true,
                    Some("all") => false,
                    _ => return Err(syn::Error::new_spanned(nv.value, "expected `all` or `any`")),
                });
            }
            ("declaring_type", Meta::NameValue(nv)) => match nv.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(s), ..
                }) => self.declaring_type = Some(s),
                other => return Err(syn::Error::new_spanned(other, "expected a string literal")),
            },
            (_, meta) => {
                return Err(syn::Error::new_spanned(
                    meta,
                    r#"expected "ROLE", roles("..."), mode = any|all, any_role, unsecured or declaring_type = "...""#,
                ))
            }
        }
        Ok(())
    }

    fn roles_tokens(&self) -> TokenStream2 {
        match &self.roles {
            Some(roles) => quote! { .roles(&[#(#roles),*]) },
            None => quote! {},
        }
    }

    fn mode_tokens(&self, core: &TokenStream2) -> TokenStream2 {
        let variant = match self.any_mode {
            Some(true) => format_ident!("Any"),
            Some(false) => format_ident!("All"),
            None => return quote! {},
        };
        quote! { .mode(#core::http::security::RolesMode::#variant) }
    }

    fn flag_tokens(&self) -> TokenStream2 {
        let any_role = self.any_role.then(|| quote! { .any_role() });
        let unsecured = self.unsecured.then(|| quote! { .unsecured() });
        quote! { #any_role #unsecured }
    }
}

pub fn secured_impl(attrs: TokenStream, input: TokenStream) -> TokenStream {
    let args = match syn::parse::<SecuredArgs>(attrs) {
        Ok(args) => args,
        Err(err) => return err.to_compile_error().into(),
    };

    let expanded = match syn::parse::<Item>(input) {
        Ok(Item::Fn(item_fn)) => secured_fn(args, item_fn),
        Ok(Item::Impl(item_impl)) => secured_type(args, item_impl),
        Ok(other) => Err(syn::Error::new_spanned(
            other,
            "#[secured] applies to functions and inherent impl blocks",
        )),
        Err(err) => Err(err),
    };

    expanded.unwrap_or_else(|err| err.to_compile_error()).into()
}

/// Builds the `OperationDeclaration` expression for one function signature,
/// stripping its `#[access]` parameter attributes.
fn operation_declaration(
    args: &SecuredArgs,
    declaring_type: &TokenStream2,
    sig: &mut syn::Signature,
) -> syn::Result<TokenStream2> {
    let core = core_crate_path();
    let method = sig.ident.to_string();
    let parameters = take_parameter_access(sig)?
        .iter()
        .map(|access| access.to_tokens(&core))
        .collect::<Vec<_>>();

    let roles = args.roles_tokens();
    let mode = args.mode_tokens(&core);
    let flags = args.flag_tokens();

    Ok(quote! {
        #core::http::security::OperationDeclaration::new(#declaring_type, #method)
            #roles
            #mode
            #flags
            #(.access(#parameters))*
    })
}

fn secured_fn(args: SecuredArgs, mut item_fn: ItemFn) -> syn::Result<TokenStream2> {
    let core = core_crate_path();
    let declaring_type = match &args.declaring_type {
        Some(name) => quote! { #name },
        None => quote! { ::std::module_path!() },
    };

    let declaration = operation_declaration(&args, &declaring_type, &mut item_fn.sig)?;
    let vis = &item_fn.vis;
    let requirements = format_ident!("{}_requirements", item_fn.sig.ident);

    Ok(quote! {
        #item_fn

        #[allow(dead_code)]
        #vis fn #requirements() -> #core::http::security::OperationDeclaration {
            #declaration
        }
    })
}

fn secured_type(args: SecuredArgs, mut item_impl: ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &item_impl.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[secured] on a trait impl is not supported; annotate an inherent impl",
        ));
    }

    let core = core_crate_path();
    let type_name = match &args.declaring_type {
        Some(name) => name.value(),
        None => self_type_name(&item_impl.self_ty)?,
    };
    let declaring_type = quote! { #type_name };

    let mut operations = Vec::new();
    for item in item_impl.items.iter_mut() {
        let ImplItem::Fn(method) = item else {
            continue;
        };

        let mut method_args = SecuredArgs::default();
        let mut kept = Vec::with_capacity(method.attrs.len());
        for attr in method.attrs.drain(..) {
            if is_attr(&attr, "secured") {
                method_args = match &attr.meta {
                    Meta::Path(_) => SecuredArgs::default(),
                    _ => attr.parse_args::<SecuredArgs>()?,
                };
                if method_args.declaring_type.is_some() {
                    return Err(syn::Error::new_spanned(
                        attr,
                        "declaring_type belongs on the impl block",
                    ));
                }
            } else {
                kept.push(attr);
            }
        }
        method.attrs = kept;

        operations.push(operation_declaration(
            &method_args,
            &declaring_type,
            &mut method.sig,
        )?);
    }

    let roles = args.roles_tokens();
    let mode = args.mode_tokens(&core);
    let any_role = args.any_role.then(|| quote! { .any_role() });
    if args.unsecured {
        return Err(syn::Error::new(
            proc_macro2::Span::call_site(),
            "unsecured applies to single operations only",
        ));
    }

    let (impl_generics, _, where_clause) = item_impl.generics.split_for_impl();
    let self_ty = &item_impl.self_ty;

    Ok(quote! {
        #item_impl

        impl #impl_generics #self_ty #where_clause {
            /// Requirements declared on this type.
            #[allow(dead_code)]
            pub fn acl_type() -> #core::http::security::TypeDeclaration {
                #core::http::security::TypeDeclaration::new(#type_name)
                    #roles
                    #mode
                    #any_role
            }

            /// Declarations of every method of this impl block.
            #[allow(dead_code)]
            pub fn acl_operations() -> ::std::vec::Vec<#core::http::security::OperationDeclaration> {
                ::std::vec![#(#operations),*]
            }
        }
    })
}

fn self_type_name(self_ty: &Type) -> syn::Result<String> {
    match self_ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string())
            .ok_or_else(|| syn::Error::new_spanned(self_ty, "expected a named type")),
        other => Err(syn::Error::new_spanned(
            other,
            "expected a named type; set declaring_type = \"...\"",
        )),
    }
}
