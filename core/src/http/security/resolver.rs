//! Resource-level access resolution.
//!
//! An [`AccessResolver`] decides whether a caller may access a given
//! resource with a set of [`AccessType`]s, and converts plain arguments
//! (ids, keys) into the resources they address.

use std::collections::HashMap;
use std::sync::Arc;

use derive_more::{Display, Error};

use crate::http::security::access::{declared_or_default, AccessDecision, AccessType};
use crate::http::security::resource::{AclManaged, Argument, ResourceType};
use crate::http::security::role::RoleHolder;

/// A resolver could not produce the requested resource type.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
#[display("{message}")]
pub struct ResolutionError {
    message: String,
}

impl ResolutionError {
    pub fn new(message: impl Into<String>) -> Self {
        ResolutionError {
            message: message.into(),
        }
    }

    /// The resolver has no conversion for `resource_type`.
    pub fn unsupported(resource_type: &ResourceType) -> Self {
        Self::new(format!("no resolution registered for {}", resource_type))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// One entry of a batch check: a resource and the access requested on it.
#[derive(Clone, Debug)]
pub struct ResourceAccess {
    resource: Arc<dyn AclManaged>,
    access_types: Vec<AccessType>,
}

impl ResourceAccess {
    /// An empty `access_types` list means READ.
    pub fn new(resource: Arc<dyn AclManaged>, access_types: &[AccessType]) -> Self {
        ResourceAccess {
            resource,
            access_types: declared_or_default(access_types),
        }
    }

    pub fn resource(&self) -> &Arc<dyn AclManaged> {
        &self.resource
    }

    pub fn access_types(&self) -> &[AccessType] {
        &self.access_types
    }
}

/// Pluggable resource-level policy.
///
/// Implementations must not mutate the caller or the resource. They may
/// consult external ownership data and are responsible for their own
/// thread-safety.
pub trait AccessResolver: Send + Sync {
    /// Decides whether `caller` may access `resource` with `access_types`.
    ///
    /// `caller` is `None` for anonymous requests, which lets a policy permit
    /// guest reads.
    fn check_access(
        &self,
        caller: Option<&dyn RoleHolder>,
        resource: &dyn AclManaged,
        access_types: &[AccessType],
    ) -> AccessDecision;

    /// Checks several resources as a single decision.
    ///
    /// The first `Denied` short-circuits; the result is `Allowed` only when
    /// every entry is allowed.
    fn check_access_all(
        &self,
        caller: Option<&dyn RoleHolder>,
        resources: &[ResourceAccess],
    ) -> AccessDecision {
        let mut decision = AccessDecision::Allowed;
        for entry in resources {
            decision = decision.combine(self.check_access(
                caller,
                entry.resource.as_ref(),
                &entry.access_types,
            ));
            if decision == AccessDecision::Denied {
                break;
            }
        }
        decision
    }

    /// Converts `argument` into the resource of `resource_type` it addresses.
    fn resolve(
        &self,
        argument: &Argument,
        resource_type: &ResourceType,
    ) -> Result<Arc<dyn AclManaged>, ResolutionError> {
        let _ = argument;
        Err(ResolutionError::unsupported(resource_type))
    }
}

impl<R: AccessResolver + ?Sized> AccessResolver for Arc<R> {
    fn check_access(
        &self,
        caller: Option<&dyn RoleHolder>,
        resource: &dyn AclManaged,
        access_types: &[AccessType],
    ) -> AccessDecision {
        (**self).check_access(caller, resource, access_types)
    }

    fn check_access_all(
        &self,
        caller: Option<&dyn RoleHolder>,
        resources: &[ResourceAccess],
    ) -> AccessDecision {
        (**self).check_access_all(caller, resources)
    }

    fn resolve(
        &self,
        argument: &Argument,
        resource_type: &ResourceType,
    ) -> Result<Arc<dyn AclManaged>, ResolutionError> {
        (**self).resolve(argument, resource_type)
    }
}

type ResolveFn =
    Box<dyn Fn(&Argument) -> Result<Arc<dyn AclManaged>, ResolutionError> + Send + Sync>;

/// Role-based resource policy.
///
/// Each [`AccessType`] is granted to a set of roles. A caller may perform a
/// request when, for every requested access type, it holds a role granted
/// that type or a role granted [`AccessType::All`]. Access types can also be
/// opened to anonymous callers.
///
/// # Example
/// ```
/// use actix_acl_core::http::security::{
///     AccessDecision, AccessResolver, AccessType, AclManaged, RoleAccessResolver, User,
/// };
///
/// #[derive(Debug)]
/// struct Document;
/// impl AclManaged for Document {}
///
/// let resolver = RoleAccessResolver::new()
///     .grant(AccessType::Read, &["USER"])
///     .grant(AccessType::All, &["ADMIN"]);
///
/// let user = User::new("user").roles(&["USER"]);
/// assert_eq!(
///     resolver.check_access(Some(&user), &Document, &[AccessType::Write]),
///     AccessDecision::Denied
/// );
/// ```
#[derive(Default)]
pub struct RoleAccessResolver {
    grants: HashMap<AccessType, Vec<String>>,
    anonymous: Vec<AccessType>,
    resolutions: HashMap<ResourceType, ResolveFn>,
}

impl RoleAccessResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants `access_type` to holders of any of `roles`.
    pub fn grant(mut self, access_type: AccessType, roles: &[&str]) -> Self {
        let granted = self.grants.entry(access_type).or_default();
        for role in roles {
            if !granted.iter().any(|r| r == role) {
                granted.push(role.to_string());
            }
        }
        self
    }

    /// Allows `access_type` without a caller.
    pub fn anonymous(mut self, access_type: AccessType) -> Self {
        if !self.anonymous.contains(&access_type) {
            self.anonymous.push(access_type);
        }
        self
    }

    /// Registers how plain arguments are turned into `resource_type`.
    pub fn resolution<F>(mut self, resource_type: ResourceType, resolve: F) -> Self
    where
        F: Fn(&Argument) -> Result<Arc<dyn AclManaged>, ResolutionError> + Send + Sync + 'static,
    {
        self.resolutions.insert(resource_type, Box::new(resolve));
        self
    }

    fn granted(&self, caller: &dyn RoleHolder, access_type: AccessType) -> bool {
        let holds = |access: AccessType| {
            self.grants
                .get(&access)
                .is_some_and(|roles| roles.iter().any(|role| caller.has_role(role)))
        };
        holds(access_type) || holds(AccessType::All)
    }
}

impl AccessResolver for RoleAccessResolver {
    fn check_access(
        &self,
        caller: Option<&dyn RoleHolder>,
        _resource: &dyn AclManaged,
        access_types: &[AccessType],
    ) -> AccessDecision {
        let requested = declared_or_default(access_types);
        let allowed = match caller {
            None => requested
                .iter()
                .all(|access| self.anonymous.contains(access)),
            Some(caller) => requested.iter().all(|access| {
                self.anonymous.contains(access) || self.granted(caller, *access)
            }),
        };
        AccessDecision::from(allowed)
    }

    fn resolve(
        &self,
        argument: &Argument,
        resource_type: &ResourceType,
    ) -> Result<Arc<dyn AclManaged>, ResolutionError> {
        match self.resolutions.get(resource_type) {
            Some(resolve) => resolve(argument),
            None => Err(ResolutionError::unsupported(resource_type)),
        }
    }
}
