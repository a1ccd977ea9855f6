//! Declared access requirements and the descriptors derived from them.
//!
//! Requirements are declared per operation ([`OperationDeclaration`]) and per
//! declaring type ([`TypeDeclaration`]), either with the builders below or
//! with the `#[secured]` attribute macro. The registry merges both into an
//! immutable [`RequirementDescriptor`] the first time an operation is
//! evaluated.
//!
//! # Example
//! ```
//! use actix_acl_core::http::security::{
//!     AccessType, OperationDeclaration, ParameterAccess, RolesMode, TypeDeclaration,
//! };
//!
//! let restricted = TypeDeclaration::new("RestrictedService").roles(&["ADMIN"]);
//!
//! let save = OperationDeclaration::new("ACLService", "save")
//!     .access(ParameterAccess::new(0).access_types(&[AccessType::Write, AccessType::Read]));
//!
//! let either = OperationDeclaration::new("Service", "accessForAdminOrUser")
//!     .roles(&["ADMIN", "USER"])
//!     .mode(RolesMode::Any);
//! ```

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::http::security::access::{declared_or_default, AccessType};
use crate::http::security::resource::ResourceType;
use crate::http::security::role::{contains_role_with_name, Role};

/// Identity of a protected operation: declaring type plus method name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId {
    declaring_type: Cow<'static, str>,
    method: Cow<'static, str>,
}

impl OperationId {
    pub fn new(
        declaring_type: impl Into<Cow<'static, str>>,
        method: impl Into<Cow<'static, str>>,
    ) -> Self {
        OperationId {
            declaring_type: declaring_type.into(),
            method: method.into(),
        }
    }

    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    pub fn method(&self) -> &str {
        &self.method
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.declaring_type, self.method)
    }
}

/// How a multi-role requirement is matched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RolesMode {
    /// The caller must hold every listed role.
    #[default]
    All,
    /// The caller must hold at least one listed role.
    Any,
}

impl RolesMode {
    /// Tests the caller's roles against `required`.
    pub fn is_satisfied(self, roles: &[Role], required: &[String]) -> bool {
        match self {
            RolesMode::All => required
                .iter()
                .all(|name| contains_role_with_name(roles, name)),
            RolesMode::Any => required
                .iter()
                .any(|name| contains_role_with_name(roles, name)),
        }
    }
}

/// Access declared on one operation parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterAccess {
    index: usize,
    access_types: Vec<AccessType>,
    resource_type: Option<ResourceType>,
}

impl ParameterAccess {
    /// Declares READ access on the parameter at `index`.
    pub fn new(index: usize) -> Self {
        ParameterAccess {
            index,
            access_types: vec![AccessType::DEFAULT],
            resource_type: None,
        }
    }

    /// Sets the access types checked. An empty list means READ.
    pub fn access_types(mut self, access_types: &[AccessType]) -> Self {
        self.access_types = declared_or_default(access_types);
        self
    }

    /// Checks the argument as a resource of `resource_type`, resolving it
    /// through the access resolver when it is not already of that type.
    pub fn resource_type(mut self, resource_type: ResourceType) -> Self {
        self.resource_type = Some(resource_type);
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get_access_types(&self) -> &[AccessType] {
        &self.access_types
    }

    pub fn get_resource_type(&self) -> Option<&ResourceType> {
        self.resource_type.as_ref()
    }
}

/// Requirements declared on a type; operations without their own role or
/// any-role declaration inherit them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeDeclaration {
    name: String,
    any_role: bool,
    roles: Option<Vec<String>>,
    mode: RolesMode,
}

impl TypeDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        TypeDeclaration {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn any_role(mut self) -> Self {
        self.any_role = true;
        self
    }

    pub fn roles(mut self, roles: &[&str]) -> Self {
        self.roles = Some(roles.iter().map(|r| r.to_string()).collect());
        self
    }

    pub fn mode(mut self, mode: RolesMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Requirements declared on one operation and its parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperationDeclaration {
    operation: OperationId,
    unsecured: bool,
    any_role: bool,
    roles: Option<Vec<String>>,
    mode: Option<RolesMode>,
    parameters: Vec<ParameterAccess>,
}

impl OperationDeclaration {
    pub fn new(
        declaring_type: impl Into<Cow<'static, str>>,
        method: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::for_operation(OperationId::new(declaring_type, method))
    }

    pub fn for_operation(operation: OperationId) -> Self {
        OperationDeclaration {
            operation,
            unsecured: false,
            any_role: false,
            roles: None,
            mode: None,
            parameters: Vec::new(),
        }
    }

    /// Exempts the operation from every check, including inherited ones.
    pub fn unsecured(mut self) -> Self {
        self.unsecured = true;
        self
    }

    /// Requires a caller to be present, whatever its roles.
    pub fn any_role(mut self) -> Self {
        self.any_role = true;
        self
    }

    /// Requires roles, overriding the declaring type's requirement.
    pub fn roles(mut self, roles: &[&str]) -> Self {
        self.roles = Some(roles.iter().map(|r| r.to_string()).collect());
        self
    }

    pub fn mode(mut self, mode: RolesMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Adds a parameter access declaration. Declaration order is check order.
    pub fn access(mut self, access: ParameterAccess) -> Self {
        self.parameters.push(access);
        self
    }

    pub fn operation(&self) -> &OperationId {
        &self.operation
    }

    /// Merges this declaration with its declaring type's declaration.
    ///
    /// Role requirements and the any-role flag come from the operation when
    /// declared there, otherwise from the type. `unsecured` is never
    /// inherited.
    pub fn derive(&self, declaring_type: Option<&TypeDeclaration>) -> RequirementDescriptor {
        let (roles, mode) = match (&self.roles, declaring_type) {
            (Some(roles), _) => (roles.clone(), self.mode.unwrap_or_default()),
            (None, Some(ty)) => (
                ty.roles.clone().unwrap_or_default(),
                self.mode.unwrap_or(ty.mode),
            ),
            (None, None) => (Vec::new(), self.mode.unwrap_or_default()),
        };

        let mut required_roles: Vec<String> = Vec::with_capacity(roles.len());
        for role in roles {
            if !required_roles.contains(&role) {
                required_roles.push(role);
            }
        }

        RequirementDescriptor {
            operation: self.operation.clone(),
            unsecured: self.unsecured,
            any_role_required: self.any_role || declaring_type.is_some_and(|ty| ty.any_role),
            required_roles,
            roles_mode: mode,
            parameters: self.parameters.clone(),
        }
    }
}

/// Immutable, precomputed access rules for one operation.
///
/// Depends only on static declarations, never on the caller, so one
/// descriptor is shared by every evaluation of its operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequirementDescriptor {
    operation: OperationId,
    unsecured: bool,
    any_role_required: bool,
    required_roles: Vec<String>,
    roles_mode: RolesMode,
    parameters: Vec<ParameterAccess>,
}

impl RequirementDescriptor {
    /// A descriptor with no requirement at all.
    pub fn unrestricted(operation: OperationId) -> Self {
        RequirementDescriptor {
            operation,
            unsecured: false,
            any_role_required: false,
            required_roles: Vec::new(),
            roles_mode: RolesMode::All,
            parameters: Vec::new(),
        }
    }

    /// A descriptor that skips every check.
    pub fn unsecured(operation: OperationId) -> Self {
        RequirementDescriptor {
            unsecured: true,
            ..Self::unrestricted(operation)
        }
    }

    pub fn operation(&self) -> &OperationId {
        &self.operation
    }

    pub fn is_unsecured(&self) -> bool {
        self.unsecured
    }

    pub fn any_role_required(&self) -> bool {
        self.any_role_required
    }

    pub fn required_roles(&self) -> &[String] {
        &self.required_roles
    }

    pub fn roles_mode(&self) -> RolesMode {
        self.roles_mode
    }

    pub fn parameters(&self) -> &[ParameterAccess] {
        &self.parameters
    }
}
