//! Role model: named roles and the callers holding them.

use std::fmt;
use std::sync::Arc;

/// A named permission group. Equality is by name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Role {
    name: String,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Role { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for Role {
    fn from(name: &str) -> Self {
        Role::new(name)
    }
}

impl From<String> for Role {
    fn from(name: String) -> Self {
        Role { name }
    }
}

/// The authenticated entity whose permissions are checked.
///
/// Role order is irrelevant to evaluation and duplicates are tolerated. An
/// unauthenticated request has no role holder at all (`None`), which is
/// distinct from a holder with an empty role list even though both fail
/// every role requirement.
pub trait RoleHolder: fmt::Debug + Send + Sync {
    /// Returns the roles of this holder.
    fn get_roles(&self) -> &[Role];

    /// A display name for audit records.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Checks if the holder has a role with the given name.
    fn has_role(&self, name: &str) -> bool {
        contains_role_with_name(self.get_roles(), name)
    }

    /// Checks if the holder has ALL of the given roles (AND logic).
    fn has_all_roles(&self, names: &[&str]) -> bool {
        names.iter().all(|name| self.has_role(name))
    }

    /// Checks if the holder has ANY of the given roles (OR logic).
    fn has_any_role(&self, names: &[&str]) -> bool {
        names.iter().any(|name| self.has_role(name))
    }
}

/// The current caller, shared between the request scope, the evaluator and
/// access resolvers.
pub type Caller = Arc<dyn RoleHolder>;

/// Checks whether `roles` contains a role named exactly `name`.
///
/// Case sensitive. Role sets are small, so this is a linear scan.
pub fn contains_role_with_name(roles: &[Role], name: &str) -> bool {
    roles.iter().any(|role| role.name() == name)
}

/// A ready-made role holder: a username and its roles.
///
/// # Example
/// ```
/// use actix_acl_core::http::security::{RoleHolder, User};
///
/// let user = User::new("admin").roles(&["ADMIN", "USER"]);
///
/// assert!(user.has_role("ADMIN"));
/// assert!(user.has_all_roles(&["ADMIN", "USER"]));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    username: String,
    roles: Vec<Role>,
}

impl User {
    /// Creates a user without roles.
    pub fn new(username: impl Into<String>) -> Self {
        User {
            username: username.into(),
            roles: Vec::new(),
        }
    }

    /// Returns the username.
    pub fn get_username(&self) -> &str {
        &self.username
    }

    /// Adds roles to the user (builder pattern).
    pub fn roles(mut self, roles: &[&str]) -> Self {
        self.roles.extend(roles.iter().map(|name| Role::new(*name)));
        self
    }

    /// Adds a single role (builder pattern).
    pub fn role(mut self, role: impl Into<Role>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Wraps the user as a [`Caller`].
    pub fn into_caller(self) -> Caller {
        Arc::new(self)
    }
}

impl RoleHolder for User {
    fn get_roles(&self) -> &[Role] {
        &self.roles
    }

    fn name(&self) -> Option<&str> {
        Some(&self.username)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.roles.iter().map(Role::name).collect();
        write!(f, "User {{ username: {}, roles: {:?} }}", self.username, names)
    }
}
