//! The requirement evaluator.
//!
//! [`Security`] holds everything one application needs to authorize an
//! operation: the caller provider, the access resolver, the failure sink and
//! the requirement registry. It is built once at start-up, shared (usually
//! as `web::Data<Security>`), and called before each protected operation.
//!
//! # Evaluation order
//! 1. unsecured operations pass without a caller lookup
//! 2. the caller is obtained (request scope cache, then provider)
//! 3. any-role: a caller must be present
//! 4. required roles, matched per [`RolesMode`](super::RolesMode)
//! 5. parameter access checks, in declaration order
//!
//! The first failing step ends evaluation. A denial is reported to the
//! failure sink exactly once and returned as [`SecurityError::AccessDenied`].
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use actix_acl_core::http::security::{
//!     OperationDeclaration, OperationId, RequestScope, RequirementRegistry,
//!     RoleAccessResolver, Security, User,
//! };
//!
//! let registry = RequirementRegistry::new()
//!     .with_operation(OperationDeclaration::new("Service", "accessForAdmin").roles(&["ADMIN"]));
//!
//! let security = Security::new(
//!     Arc::new(|| Some(User::new("john").roles(&["USER"]).into_caller())),
//!     Arc::new(RoleAccessResolver::new()),
//! )
//! .registry(registry);
//!
//! let scope = RequestScope::new();
//! let result = security.evaluate(&scope, &OperationId::new("Service", "accessForAdmin"), &[]);
//! assert!(result.unwrap_err().is_access_denied());
//! ```

use std::sync::Arc;

use crate::http::error::{AccessDenied, ConfigurationError, DenialReason, SecurityError};
use crate::http::security::access::{AccessDecision, AccessType};
#[cfg(feature = "audit")]
use crate::http::security::audit::AuditLogger;
use crate::http::security::config::{
    CallerProvider, CallerProviders, FailureSink, LoggingFailureSink, NotSpecifiedPolicy,
    SecurityConfig,
};
use crate::http::security::context::RequestScope;
use crate::http::security::registry::{RequirementRegistry, UnknownOperationPolicy};
use crate::http::security::requirement::{OperationId, ParameterAccess, RequirementDescriptor};
use crate::http::security::resolver::{AccessResolver, ResourceAccess};
use crate::http::security::resource::{AclManaged, Argument};
use crate::http::security::role::{contains_role_with_name, Caller, RoleHolder};

/// Authorization entry point.
///
/// Cheap to clone; every collaborator is reference counted.
#[derive(Clone)]
pub struct Security {
    provider: Arc<dyn CallerProvider>,
    resolver: Arc<dyn AccessResolver>,
    failure_sink: Arc<dyn FailureSink>,
    registry: Arc<RequirementRegistry>,
    cache_caller_per_request: bool,
    not_specified: NotSpecifiedPolicy,
    unknown_operation: Option<UnknownOperationPolicy>,
    #[cfg(feature = "audit")]
    audit: Option<AuditLogger>,
}

impl Security {
    /// Creates an evaluator with an empty registry and a logging failure sink.
    pub fn new(provider: Arc<dyn CallerProvider>, resolver: Arc<dyn AccessResolver>) -> Self {
        Security {
            provider,
            resolver,
            failure_sink: Arc::new(LoggingFailureSink),
            registry: Arc::new(RequirementRegistry::new()),
            cache_caller_per_request: false,
            not_specified: NotSpecifiedPolicy::default(),
            unknown_operation: None,
            #[cfg(feature = "audit")]
            audit: None,
        }
    }

    /// Creates an evaluator from configuration, instantiating the named
    /// caller provider.
    ///
    /// The configured unknown-operation policy is applied to the registry
    /// set afterwards with [`Security::registry`] as well.
    ///
    /// # Errors
    /// Returns a [`ConfigurationError`] when the provider is not named or not
    /// registered.
    pub fn from_config(
        config: &SecurityConfig,
        providers: &CallerProviders,
        resolver: Arc<dyn AccessResolver>,
    ) -> Result<Self, ConfigurationError> {
        let provider = config.create_provider(providers)?;
        tracing::debug!(
            provider = config.caller_provider.as_deref().unwrap_or_default(),
            cache_caller_per_request = config.cache_caller_per_request,
            "security configured"
        );

        let mut security = Security::new(provider, resolver)
            .cache_caller_per_request(config.cache_caller_per_request)
            .not_specified(config.not_specified);
        security.unknown_operation = Some(config.unknown_operation);
        Ok(security.registry(RequirementRegistry::new()))
    }

    pub fn failure_sink(mut self, sink: Arc<dyn FailureSink>) -> Self {
        self.failure_sink = sink;
        self
    }

    /// Replaces the registry.
    ///
    /// When the current registry came from [`Security::from_config`], its
    /// unknown-operation policy carries over to `registry`.
    pub fn registry(mut self, registry: RequirementRegistry) -> Self {
        self.registry = Arc::new(match self.unknown_operation {
            Some(policy) => registry.unknown_operation(policy),
            None => registry,
        });
        self
    }

    /// Caches the resolved caller in the request scope for the rest of the
    /// request.
    pub fn cache_caller_per_request(mut self, enabled: bool) -> Self {
        self.cache_caller_per_request = enabled;
        self
    }

    pub fn not_specified(mut self, policy: NotSpecifiedPolicy) -> Self {
        self.not_specified = policy;
        self
    }

    #[cfg(feature = "audit")]
    pub fn audit_logger(mut self, logger: AuditLogger) -> Self {
        self.audit = Some(logger);
        self
    }

    pub fn get_registry(&self) -> &RequirementRegistry {
        &self.registry
    }

    /// Evaluates `operation` against the caller of `scope`.
    ///
    /// `args` holds the live arguments in declaration order, receiver
    /// excluded; `None` stands for a null argument.
    ///
    /// # Errors
    /// [`SecurityError::AccessDenied`] when a check fails,
    /// [`SecurityError::Configuration`] for a setup problem.
    pub fn evaluate(
        &self,
        scope: &RequestScope,
        operation: &OperationId,
        args: &[Option<Argument>],
    ) -> Result<(), SecurityError> {
        let descriptor = self
            .registry
            .descriptor(operation)
            .map_err(|err| self.configuration_failure(operation, err))?;
        self.evaluate_descriptor(scope, &descriptor, args)
    }

    /// Evaluates `operation` in the request scope of the current task.
    ///
    /// Outside a request a fresh scope is used, so nothing is cached.
    pub fn evaluate_current(
        &self,
        operation: &OperationId,
        args: &[Option<Argument>],
    ) -> Result<(), SecurityError> {
        let scope = RequestScope::current().unwrap_or_default();
        self.evaluate(&scope, operation, args)
    }

    /// Evaluates an already derived descriptor.
    pub fn evaluate_descriptor(
        &self,
        scope: &RequestScope,
        descriptor: &RequirementDescriptor,
        args: &[Option<Argument>],
    ) -> Result<(), SecurityError> {
        let operation = descriptor.operation();
        if descriptor.is_unsecured() {
            tracing::trace!(%operation, "unsecured operation");
            return Ok(());
        }

        let caller = self.caller(scope);
        match self.check(descriptor, caller.as_deref(), args) {
            Ok(()) => {
                tracing::debug!(%operation, "access granted");
                #[cfg(feature = "audit")]
                if let Some(audit) = &self.audit {
                    audit.log_access_granted(operation, caller.as_deref().and_then(|c| c.name()));
                }
                Ok(())
            }
            Err(Failure::Denied(denied)) => Err(self.deny(denied, caller.as_deref())),
            Err(Failure::Configuration(err)) => Err(self.configuration_failure(operation, err)),
        }
    }

    /// Returns the current caller.
    ///
    /// Runs the provider's `before_role_check` hook, then serves the caller
    /// cached in `scope` or asks the provider.
    pub fn caller(&self, scope: &RequestScope) -> Option<Caller> {
        self.provider.before_role_check();
        if let Some(cached) = scope.cached_caller() {
            return cached;
        }

        let caller = self.provider.current_caller();
        if self.cache_caller_per_request {
            scope.set_caller(caller.clone());
        }
        caller
    }

    /// Checks that the caller holds every role in `names`.
    ///
    /// False without a caller, and for an empty list.
    pub fn has_roles(&self, scope: &RequestScope, names: &[&str]) -> bool {
        match self.caller(scope) {
            Some(caller) if !names.is_empty() => names
                .iter()
                .all(|name| contains_role_with_name(caller.get_roles(), name)),
            _ => false,
        }
    }

    pub fn is_caller_present(&self, scope: &RequestScope) -> bool {
        self.caller(scope).is_some()
    }

    /// Asks the resolver whether the caller may access `resource`.
    ///
    /// Only an explicit `Allowed` counts. Nothing is reported to the failure
    /// sink.
    pub fn has_access(
        &self,
        scope: &RequestScope,
        resource: &dyn AclManaged,
        access_types: &[AccessType],
    ) -> bool {
        let caller = self.caller(scope);
        self.resolver
            .check_access(caller.as_deref(), resource, access_types)
            .is_allowed()
    }

    /// Batch variant of [`Security::has_access`].
    pub fn has_access_all(&self, scope: &RequestScope, resources: &[ResourceAccess]) -> bool {
        let caller = self.caller(scope);
        self.resolver
            .check_access_all(caller.as_deref(), resources)
            .is_allowed()
    }

    /// Checks several resources on behalf of `operation`.
    ///
    /// Entries are checked in order and the first refused one ends the
    /// check; the denial names exactly that resource.
    pub fn check_resources(
        &self,
        scope: &RequestScope,
        operation: &OperationId,
        resources: &[ResourceAccess],
    ) -> Result<(), SecurityError> {
        let caller = self.caller(scope);
        for entry in resources {
            let decision =
                self.resolver
                    .check_access(caller.as_deref(), entry.resource().as_ref(), entry.access_types());
            if self.refuses(decision) {
                let denied = AccessDenied::new(
                    operation.clone(),
                    DenialReason::ResourceDenied,
                    vec![Arc::clone(entry.resource())],
                );
                return Err(self.deny(denied, caller.as_deref()));
            }
        }
        Ok(())
    }

    fn check(
        &self,
        descriptor: &RequirementDescriptor,
        caller: Option<&dyn RoleHolder>,
        args: &[Option<Argument>],
    ) -> Result<(), Failure> {
        let operation = descriptor.operation();

        if descriptor.any_role_required() && caller.is_none() {
            return Err(denial(operation, DenialReason::NoCaller, Vec::new()));
        }

        let required = descriptor.required_roles();
        if !required.is_empty() {
            let caller =
                caller.ok_or_else(|| denial(operation, DenialReason::NoCaller, Vec::new()))?;
            if !descriptor.roles_mode().is_satisfied(caller.get_roles(), required) {
                return Err(denial(operation, DenialReason::MissingRoles, Vec::new()));
            }
        }

        for parameter in descriptor.parameters() {
            let argument = match args.get(parameter.index()) {
                Some(Some(argument)) => argument,
                Some(None) => {
                    tracing::trace!(%operation, parameter = parameter.index(), "null argument, skipped");
                    continue;
                }
                None => {
                    return Err(Failure::Configuration(ConfigurationError::MissingArgument {
                        operation: operation.clone(),
                        parameter: parameter.index(),
                        supplied: args.len(),
                    }))
                }
            };

            let resource = self.resource_for(operation, parameter, argument)?;
            let decision =
                self.resolver
                    .check_access(caller, resource.as_ref(), parameter.get_access_types());
            tracing::trace!(%operation, parameter = parameter.index(), ?decision, "resource checked");

            if self.refuses(decision) {
                return Err(denial(operation, DenialReason::ResourceDenied, vec![resource]));
            }
        }

        Ok(())
    }

    fn resource_for(
        &self,
        operation: &OperationId,
        parameter: &ParameterAccess,
        argument: &Argument,
    ) -> Result<Arc<dyn AclManaged>, ConfigurationError> {
        match (argument.as_managed(), parameter.get_resource_type()) {
            (Some(resource), None) => Ok(Arc::clone(resource)),
            (Some(resource), Some(declared)) if resource.resource_type() == *declared => {
                Ok(Arc::clone(resource))
            }
            (_, Some(declared)) => self.resolver.resolve(argument, declared).map_err(|err| {
                ConfigurationError::Resolution {
                    operation: operation.clone(),
                    parameter: parameter.index(),
                    resource_type: declared.clone(),
                    message: err.message().to_string(),
                }
            }),
            (None, None) => Err(ConfigurationError::UnmanagedArgument {
                operation: operation.clone(),
                parameter: parameter.index(),
            }),
        }
    }

    fn refuses(&self, decision: AccessDecision) -> bool {
        match decision {
            AccessDecision::Allowed => false,
            AccessDecision::Denied => true,
            AccessDecision::NotSpecified => self.not_specified == NotSpecifiedPolicy::Deny,
        }
    }

    #[cfg_attr(not(feature = "audit"), allow(unused_variables))]
    fn deny(&self, denied: AccessDenied, caller: Option<&dyn RoleHolder>) -> SecurityError {
        tracing::debug!(
            operation = %denied.operation(),
            reason = %denied.reason(),
            resources = ?denied.resources(),
            "access denied"
        );
        self.failure_sink
            .on_access_failure(denied.operation(), denied.resources());
        #[cfg(feature = "audit")]
        if let Some(audit) = &self.audit {
            audit.log_access_denied(&denied, caller.and_then(|c| c.name()));
        }
        SecurityError::AccessDenied(denied)
    }

    fn configuration_failure(&self, operation: &OperationId, err: ConfigurationError) -> SecurityError {
        tracing::error!(%operation, error = %err, "security configuration error");
        #[cfg(feature = "audit")]
        if let Some(audit) = &self.audit {
            audit.log_configuration_error(operation, &err);
        }
        SecurityError::Configuration(err)
    }
}

enum Failure {
    Denied(AccessDenied),
    Configuration(ConfigurationError),
}

impl From<ConfigurationError> for Failure {
    fn from(err: ConfigurationError) -> Self {
        Failure::Configuration(err)
    }
}

fn denial(
    operation: &OperationId,
    reason: DenialReason,
    resources: Vec<Arc<dyn AclManaged>>,
) -> Failure {
    Failure::Denied(AccessDenied::new(operation.clone(), reason, resources))
}
