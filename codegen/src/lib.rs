//! Procedural macros declaring access requirements.
//!
//! | Attribute | Declares |
//! |-----------|----------|
//! | `#[secured]` | an operation with no role requirement |
//! | `#[secured("ADMIN")]`, `#[secured(roles("ADMIN", "USER"))]` | required roles (every role by default) |
//! | `#[secured(roles("ADMIN", "USER"), mode = any)]` | at least one of the roles |
//! | `#[secured(any_role)]` | a caller must be present |
//! | `#[secured(unsecured)]` | no check at all, even inherited ones |
//! | `#[access]`, `#[access(WRITE, READ)]` on a parameter | resource checks on that argument (READ by default) |
//! | `#[access(READ, resource = Document)]` | the argument is resolved into a `Document` first |
//!
//! The macros only declare; nothing is checked at the call site. Register
//! the generated declarations in a `RequirementRegistry` and call
//! `Security::evaluate` before running the operation.
//!
//! # Usage
//!
//! ```ignore
//! use actix_acl_codegen::secured;
//!
//! // Free function: emits `save_requirements()`
//! #[secured(roles("USER"))]
//! fn save(#[access(WRITE)] doc: &Document) { /* ... */ }
//!
//! // Impl block: type-level requirements, plus one declaration per method
//! pub struct RestrictedService;
//!
//! #[secured(roles("ADMIN"))]
//! impl RestrictedService {
//!     fn change_everything(&self) {}
//!
//!     #[secured(unsecured)]
//!     fn do_simple_change(&self) {}
//! }
//!
//! let registry = RequirementRegistry::new()
//!     .with_operation(save_requirements())
//!     .with_type(RestrictedService::acl_type())
//!     .with_operations(RestrictedService::acl_operations());
//! ```

use proc_macro::TokenStream;

mod access;
mod helpers;
mod secured;

/// Declares the access requirements of a function or of an impl block.
///
/// # On a function
/// Emits `fn <name>_requirements() -> OperationDeclaration` next to the
/// function, with the same visibility. The declaring type defaults to the
/// enclosing module path; override it with `declaring_type = "Name"`.
/// Parameter indexes skip the `self` receiver.
///
/// ```ignore
/// #[secured(roles("ADMIN", "USER"), mode = any)]
/// fn access_for_admin_or_user() {}
///
/// #[secured(declaring_type = "ACLService")]
/// fn save(#[access(WRITE, READ)] user: &User) {}
/// ```
///
/// # On an inherent impl block
/// The attribute arguments become the type's `TypeDeclaration` (named after
/// the type unless `declaring_type` is given). Every method gets an
/// operation declaration; methods may carry their own `#[secured(...)]`
/// overriding the type's roles. Emits `acl_type()` and `acl_operations()`.
///
/// ```ignore
/// #[secured(any_role)]
/// impl Application {
///     fn list_documents(&self) {}
///
///     fn show_document(&self, #[access] doc: &Document) {}
/// }
/// ```
#[proc_macro_attribute]
pub fn secured(attrs: TokenStream, input: TokenStream) -> TokenStream {
    secured::secured_impl(attrs, input)
}
