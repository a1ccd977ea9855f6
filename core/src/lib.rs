//! # Actix ACL Core
//!
//! Method-level authorization for Actix Web applications: role requirements
//! declared per operation, per-parameter ACL checks delegated to a pluggable
//! [`AccessResolver`](http::security::AccessResolver), and a request-scoped
//! caller cache.
//!
//! Most applications depend on the `actix-acl` facade crate, which re-exports
//! this crate together with the `#[secured]` macro.

pub mod http;
