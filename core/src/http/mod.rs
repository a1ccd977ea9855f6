//! HTTP-facing security: the evaluator and its actix-web glue live in
//! [`security`], error types in [`error`].

pub mod error;
pub mod security;
