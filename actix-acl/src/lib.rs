//! # Actix ACL
//!
//! Method-level role and resource authorization for Actix Web.
//!
//! This crate provides a unified API combining:
//! - `actix-acl-core`: requirement descriptors, the `Security` evaluator,
//!   access resolvers, request-scope middleware
//! - `actix-acl-codegen`: the `#[secured]` attribute macro
//!
//! ## Quick Start
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! actix-web = "4"
//! actix-acl = "0.1"
//! actix-acl-core = "0.1"
//! ```
//!
//! The macro expands to paths in `actix_acl_core`, so the core crate must be
//! a direct dependency when `#[secured]` is used.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use actix_web::{web, App, HttpRequest, HttpResponse};
//! use actix_acl::prelude::*;
//!
//! #[secured(roles("ADMIN"))]
//! fn delete_everything() {}
//!
//! async fn handler(req: HttpRequest) -> Result<HttpResponse, SecurityError> {
//!     req.evaluate(delete_everything_requirements().operation(), &[])?;
//!     delete_everything();
//!     Ok(HttpResponse::Ok().finish())
//! }
//!
//! let security = Security::new(Arc::new(provider), Arc::new(ResolverManager::role_based()))
//!     .registry(RequirementRegistry::new().with_operation(delete_everything_requirements()));
//!
//! App::new()
//!     .app_data(web::Data::new(security))
//!     .wrap(SecurityTransform::new())
//!     .route("/delete", web::post().to(handler));
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `macros` | Yes | The `#[secured]` macro |
//! | `audit` | Yes | Security audit events |
//!
//! ## Modules
//!
//! - [`http::security`] - Evaluator, declarations, resolvers, middleware
//! - [`http::error`] - Error types

pub use actix_acl_core::*;

#[cfg(feature = "macros")]
pub use actix_acl_codegen::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use actix_acl_core::http::error::{AccessDenied, ConfigurationError, SecurityError};
    pub use actix_acl_core::http::security::{
        AccessDecision, AccessResolver, AccessType, AclManaged, Argument, CallerProvider,
        OperationDeclaration, OperationId, ParameterAccess, RequestScope, RequirementRegistry,
        ResolverManager, ResourceType, RoleAccessResolver, RoleHolder, RolesMode, Security,
        SecurityConfig, SecurityExt, SecurityTransform, TypeDeclaration, User,
    };

    #[cfg(feature = "audit")]
    pub use actix_acl_core::http::security::{AuditLogger, InMemoryEventStore};

    #[cfg(feature = "macros")]
    pub use actix_acl_codegen::secured;
}
