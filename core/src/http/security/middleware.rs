//! Request-scope middleware for Actix Web.
//!
//! Wraps every request in its own [`RequestScope`]: the scope is created
//! when the request enters, optionally seeded with the caller found by an
//! [`Authenticator`], made available to extractors and to
//! [`RequestScope::current`], and cleared when the inner service completes,
//! whatever the outcome.

use std::rc::Rc;

use actix_service::{Service, Transform};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::{Error, HttpMessage};
use futures_util::future::{ok, LocalBoxFuture, Ready};

use crate::http::security::context::RequestScope;
use crate::http::security::role::Caller;

/// Extracts an already-authenticated caller from the request (a header set
/// by a gateway, a session, an upstream middleware).
pub trait Authenticator {
    fn caller(&self, req: &ServiceRequest) -> Option<Caller>;
}

/// Authenticator that never seeds a caller; the evaluator falls back to its
/// caller provider.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAuthenticator;

impl Authenticator for NoAuthenticator {
    fn caller(&self, _req: &ServiceRequest) -> Option<Caller> {
        None
    }
}

/// Middleware factory.
///
/// # Example
/// ```ignore
/// App::new()
///     .app_data(web::Data::new(security))
///     .wrap(SecurityTransform::new().authenticator(header_authenticator))
/// ```
pub struct SecurityTransform<A = NoAuthenticator> {
    authenticator: Option<fn() -> A>,
}

impl SecurityTransform<NoAuthenticator> {
    pub fn new() -> Self {
        SecurityTransform {
            authenticator: None,
        }
    }
}

impl<A> SecurityTransform<A> {
    /// Seeds each request scope with the caller `authenticator` finds.
    pub fn authenticator<B>(self, authenticator: fn() -> B) -> SecurityTransform<B> {
        SecurityTransform {
            authenticator: Some(authenticator),
        }
    }
}

impl Default for SecurityTransform<NoAuthenticator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, B, A> Transform<S, ServiceRequest> for SecurityTransform<A>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    A: Authenticator + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = SecurityService<A, S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(SecurityService {
            authenticator: self.authenticator.map(|f| f()),
            service: Rc::new(service),
        })
    }
}

/// Middleware service.
pub struct SecurityService<A, S> {
    authenticator: Option<A>,
    service: Rc<S>,
}

impl<A, S, B> Service<ServiceRequest> for SecurityService<A, S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    A: Authenticator,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let scope = RequestScope::new();

        if let Some(caller) = self
            .authenticator
            .as_ref()
            .and_then(|auth| auth.caller(&req))
        {
            tracing::trace!(path = req.path(), "request scope seeded with caller");
            scope.set_caller(Some(caller));
        }
        req.extensions_mut().insert(scope.clone());

        let service = Rc::clone(&self.service);
        Box::pin(scope.run_with(async move { service.call(req).await }))
    }
}
