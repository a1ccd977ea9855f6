use std::sync::Arc;

use actix_web::{error, http::StatusCode, HttpResponse, HttpResponseBuilder};
use derive_more::{Display, Error, From};

use crate::http::security::{AclManaged, OperationId, ResourceType};

/// Why an evaluation was denied.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    #[display("no caller present")]
    NoCaller,
    #[display("caller lacks required role(s)")]
    MissingRoles,
    #[display("resource access denied")]
    ResourceDenied,
}

/// An expected, recoverable denial.
///
/// Carries the operation that was refused and, for resource-level denials,
/// the resource that failed its check. Hosts convert it into a rejection
/// response at their outermost request-handling boundary; with actix-web that
/// happens through [`ResponseError`](actix_web::ResponseError) on
/// [`SecurityError`].
#[derive(Debug, Display, Error, Clone)]
#[display("access denied to {operation}: {reason}")]
pub struct AccessDenied {
    operation: OperationId,
    reason: DenialReason,
    resources: Vec<Arc<dyn AclManaged>>,
}

impl AccessDenied {
    pub fn new(
        operation: OperationId,
        reason: DenialReason,
        resources: Vec<Arc<dyn AclManaged>>,
    ) -> Self {
        AccessDenied {
            operation,
            reason,
            resources,
        }
    }

    /// The operation access was denied to.
    pub fn operation(&self) -> &OperationId {
        &self.operation
    }

    pub fn reason(&self) -> DenialReason {
        self.reason
    }

    /// Resources that failed their check. Empty for role denials.
    pub fn resources(&self) -> &[Arc<dyn AclManaged>] {
        &self.resources
    }
}

/// A fatal setup problem. Never retried.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[display("acl.caller-provider must be defined")]
    MissingProvider,
    #[display("unable to create caller provider instance: [{name}]")]
    UnknownProvider { name: String },
    #[display("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
    #[display("no requirements declared for {operation}")]
    UnknownOperation { operation: OperationId },
    #[display("{operation}: argument {parameter} could not be resolved to {resource_type}: {message}")]
    Resolution {
        operation: OperationId,
        parameter: usize,
        resource_type: ResourceType,
        message: String,
    },
    #[display("{operation}: argument {parameter} is not access-managed and declares no resource type")]
    UnmanagedArgument {
        operation: OperationId,
        parameter: usize,
    },
    #[display("{operation}: access declared on argument {parameter} but only {supplied} supplied")]
    MissingArgument {
        operation: OperationId,
        parameter: usize,
        supplied: usize,
    },
    #[display("{component} is not installed on this application")]
    NotInstalled { component: &'static str },
}

/// Every error `evaluate` can return.
#[derive(Debug, Display, From, Clone)]
pub enum SecurityError {
    #[display("{_0}")]
    AccessDenied(AccessDenied),
    #[display("{_0}")]
    Configuration(ConfigurationError),
}

impl SecurityError {
    pub fn is_access_denied(&self) -> bool {
        matches!(self, SecurityError::AccessDenied(_))
    }

    pub fn as_access_denied(&self) -> Option<&AccessDenied> {
        match self {
            SecurityError::AccessDenied(denied) => Some(denied),
            SecurityError::Configuration(_) => None,
        }
    }
}

impl std::error::Error for SecurityError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SecurityError::AccessDenied(denied) => Some(denied),
            SecurityError::Configuration(err) => Some(err),
        }
    }
}

impl error::ResponseError for SecurityError {
    fn status_code(&self) -> StatusCode {
        match *self {
            SecurityError::AccessDenied(_) => StatusCode::FORBIDDEN,
            SecurityError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            SecurityError::AccessDenied(denied) => {
                HttpResponseBuilder::new(self.status_code()).body(denied.to_string())
            }
            // Setup details stay in the logs.
            SecurityError::Configuration(err) => {
                tracing::error!(error = %err, "security configuration error");
                HttpResponseBuilder::new(self.status_code()).body("security configuration error")
            }
        }
    }
}
