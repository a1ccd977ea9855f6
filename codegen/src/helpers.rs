//! Common helper functions for the requirement macros.

use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Attribute, FnArg, Signature};

use crate::access::ParameterAccessAttr;

/// Path of the core crate in generated code.
pub fn core_crate_path() -> TokenStream2 {
    quote! { ::actix_acl_core }
}

pub fn is_attr(attr: &Attribute, name: &str) -> bool {
    attr.path().is_ident(name)
}

/// Collects `#[access(...)]` declarations from the typed parameters of
/// `sig` and strips them, since they are not real attributes.
///
/// Indexes count typed parameters only; `self` is not an argument.
pub fn take_parameter_access(sig: &mut Signature) -> syn::Result<Vec<ParameterAccessAttr>> {
    let mut declarations = Vec::new();
    let mut index = 0;

    for input in sig.inputs.iter_mut() {
        let pat_type = match input {
            FnArg::Receiver(receiver) => {
                if let Some(attr) = receiver.attrs.iter().find(|a| is_attr(a, "access")) {
                    return Err(syn::Error::new_spanned(
                        attr,
                        "#[access] cannot be placed on the receiver",
                    ));
                }
                continue;
            }
            FnArg::Typed(pat_type) => pat_type,
        };

        let mut kept = Vec::with_capacity(pat_type.attrs.len());
        for attr in pat_type.attrs.drain(..) {
            if is_attr(&attr, "access") {
                if declarations
                    .iter()
                    .any(|d: &ParameterAccessAttr| d.index == index)
                {
                    return Err(syn::Error::new_spanned(attr, "duplicate #[access] on parameter"));
                }
                declarations.push(ParameterAccessAttr::from_attribute(index, &attr)?);
            } else {
                kept.push(attr);
            }
        }
        pat_type.attrs = kept;
        index += 1;
    }

    Ok(declarations)
}
