//! Host-side collaborators and configuration.
//!
//! The evaluator consumes a [`CallerProvider`] (who is calling) and a
//! [`FailureSink`] (who hears about denials). Which provider to instantiate
//! and whether the caller is cached per request are read once from a
//! [`SecurityConfig`].

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::http::error::ConfigurationError;
use crate::http::security::registry::UnknownOperationPolicy;
use crate::http::security::requirement::OperationId;
use crate::http::security::resource::AclManaged;
use crate::http::security::role::Caller;

/// Supplies the current caller.
pub trait CallerProvider: Send + Sync {
    /// Invoked before every caller lookup, for host-side authentication
    /// bootstrapping.
    fn before_role_check(&self) {}

    /// Returns the current caller, or `None` for an anonymous request.
    fn current_caller(&self) -> Option<Caller>;
}

impl<F> CallerProvider for F
where
    F: Fn() -> Option<Caller> + Send + Sync,
{
    fn current_caller(&self) -> Option<Caller> {
        self()
    }
}

/// Receives every denial, exactly once, before it is returned to the caller
/// of `evaluate`.
pub trait FailureSink: Send + Sync {
    /// `denied` is empty for role denials.
    fn on_access_failure(&self, operation: &OperationId, denied: &[Arc<dyn AclManaged>]);
}

/// Default sink: logs the denial.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingFailureSink;

impl FailureSink for LoggingFailureSink {
    fn on_access_failure(&self, operation: &OperationId, denied: &[Arc<dyn AclManaged>]) {
        tracing::info!(%operation, denied = ?denied, "access failure");
    }
}

/// Provider that never finds a caller. Useful for anonymous-only hosts and
/// for requests whose caller is seeded into the request scope.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnonymousCallerProvider;

impl CallerProvider for AnonymousCallerProvider {
    fn current_caller(&self) -> Option<Caller> {
        None
    }
}

/// How a `NotSpecified` resolver decision is treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotSpecifiedPolicy {
    /// The parameter passes; the role checks already performed decide.
    #[default]
    FallBackToRoles,
    /// The parameter is denied.
    Deny,
}

/// Table of caller providers a configuration can name.
///
/// # Example
/// ```
/// use actix_acl_core::http::security::{AnonymousCallerProvider, CallerProviders};
/// use std::sync::Arc;
///
/// let providers = CallerProviders::new()
///     .register("anonymous", || Arc::new(AnonymousCallerProvider));
///
/// assert!(providers.create("anonymous").is_ok());
/// assert!(providers.create("session").is_err());
/// ```
#[derive(Default, Clone)]
pub struct CallerProviders {
    factories: HashMap<String, fn() -> Arc<dyn CallerProvider>>,
}

impl CallerProviders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, name: &str, factory: fn() -> Arc<dyn CallerProvider>) -> Self {
        self.factories.insert(name.to_string(), factory);
        self
    }

    /// Instantiates the provider registered under `name`.
    pub fn create(&self, name: &str) -> Result<Arc<dyn CallerProvider>, ConfigurationError> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| ConfigurationError::UnknownProvider {
                name: name.to_string(),
            })
    }
}

/// Security configuration, read once at initialization.
///
/// Deserializable with kebab-case keys, or built from flat `acl.*`
/// properties with [`SecurityConfig::from_properties`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SecurityConfig {
    /// Name of the caller provider to instantiate.
    pub caller_provider: Option<String>,
    /// Cache the resolved caller for the rest of the request.
    pub cache_caller_per_request: bool,
    pub unknown_operation: UnknownOperationPolicy,
    pub not_specified: NotSpecifiedPolicy,
}

impl SecurityConfig {
    pub const CALLER_PROVIDER_KEY: &'static str = "acl.caller-provider";
    pub const CACHE_CALLER_KEY: &'static str = "acl.cache-caller-per-request";
    pub const UNKNOWN_OPERATION_KEY: &'static str = "acl.unknown-operation";
    pub const NOT_SPECIFIED_KEY: &'static str = "acl.not-specified";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn caller_provider(mut self, name: impl Into<String>) -> Self {
        self.caller_provider = Some(name.into());
        self
    }

    pub fn cache_caller_per_request(mut self, enabled: bool) -> Self {
        self.cache_caller_per_request = enabled;
        self
    }

    pub fn unknown_operation(mut self, policy: UnknownOperationPolicy) -> Self {
        self.unknown_operation = policy;
        self
    }

    pub fn not_specified(mut self, policy: NotSpecifiedPolicy) -> Self {
        self.not_specified = policy;
        self
    }

    /// Reads `acl.*` keys from flat properties. Other keys are ignored.
    ///
    /// # Errors
    /// [`ConfigurationError::InvalidValue`] for an unparsable value.
    pub fn from_properties<'a, I>(properties: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut config = SecurityConfig::default();
        for (key, value) in properties {
            let value = value.trim();
            match key {
                Self::CALLER_PROVIDER_KEY => {
                    if !value.is_empty() {
                        config.caller_provider = Some(value.to_string());
                    }
                }
                Self::CACHE_CALLER_KEY => {
                    config.cache_caller_per_request =
                        value.parse().map_err(|_| invalid(key, value))?;
                }
                Self::UNKNOWN_OPERATION_KEY => {
                    config.unknown_operation = match value {
                        "reject" => UnknownOperationPolicy::Reject,
                        "unsecured" => UnknownOperationPolicy::Unsecured,
                        _ => return Err(invalid(key, value)),
                    };
                }
                Self::NOT_SPECIFIED_KEY => {
                    config.not_specified = match value {
                        "fall-back-to-roles" => NotSpecifiedPolicy::FallBackToRoles,
                        "deny" => NotSpecifiedPolicy::Deny,
                        _ => return Err(invalid(key, value)),
                    };
                }
                _ => {}
            }
        }
        Ok(config)
    }

    /// Instantiates the configured caller provider.
    ///
    /// # Errors
    /// [`ConfigurationError::MissingProvider`] when none is named,
    /// [`ConfigurationError::UnknownProvider`] when the name is not registered.
    pub fn create_provider(
        &self,
        providers: &CallerProviders,
    ) -> Result<Arc<dyn CallerProvider>, ConfigurationError> {
        let name = self
            .caller_provider
            .as_deref()
            .ok_or(ConfigurationError::MissingProvider)?;
        providers.create(name)
    }
}

fn invalid(key: &str, value: &str) -> ConfigurationError {
    ConfigurationError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}
