//! Extractors for accessing the request scope and the evaluator in handlers.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpMessage, HttpRequest};

use crate::http::error::{ConfigurationError, SecurityError};
use crate::http::security::context::RequestScope;
use crate::http::security::evaluator::Security;
use crate::http::security::resource::Argument;
use crate::http::security::requirement::OperationId;

/// Extracts the scope created by
/// [`SecurityTransform`](super::middleware::SecurityTransform).
///
/// # Usage
/// ```ignore
/// async fn handler(scope: RequestScope, security: web::Data<Security>) -> impl Responder {
///     if security.is_caller_present(&scope) { "hello" } else { "hello, guest" }
/// }
/// ```
///
/// # Errors
/// Fails with a configuration error (`500`) when the middleware is not
/// installed.
impl FromRequest for RequestScope {
    type Error = SecurityError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(request_scope(req))
    }
}

fn request_scope(req: &HttpRequest) -> Result<RequestScope, SecurityError> {
    req.extensions()
        .get::<RequestScope>()
        .cloned()
        .ok_or_else(|| not_installed("RequestScope"))
}

fn not_installed(component: &'static str) -> SecurityError {
    SecurityError::Configuration(ConfigurationError::NotInstalled { component })
}

/// Extension trait for `HttpRequest` to run security checks from handlers
/// and view helpers.
///
/// Requires `web::Data<Security>` in the app data and the
/// [`SecurityTransform`](super::middleware::SecurityTransform) middleware.
pub trait SecurityExt {
    /// Evaluates `operation` for this request.
    fn evaluate(
        &self,
        operation: &OperationId,
        args: &[Option<Argument>],
    ) -> Result<(), SecurityError>;

    /// Checks if the caller has ALL of the given roles.
    fn has_roles(&self, roles: &[&str]) -> bool;

    /// Returns true if a caller is present.
    fn is_caller_present(&self) -> bool;
}

impl SecurityExt for HttpRequest {
    fn evaluate(
        &self,
        operation: &OperationId,
        args: &[Option<Argument>],
    ) -> Result<(), SecurityError> {
        let security = self
            .app_data::<web::Data<Security>>()
            .ok_or_else(|| not_installed("Security"))?;
        security.evaluate(&request_scope(self)?, operation, args)
    }

    fn has_roles(&self, roles: &[&str]) -> bool {
        match (self.app_data::<web::Data<Security>>(), request_scope(self)) {
            (Some(security), Ok(scope)) => security.has_roles(&scope, roles),
            _ => false,
        }
    }

    fn is_caller_present(&self) -> bool {
        match (self.app_data::<web::Data<Security>>(), request_scope(self)) {
            (Some(security), Ok(scope)) => security.is_caller_present(&scope),
            _ => false,
        }
    }
}
