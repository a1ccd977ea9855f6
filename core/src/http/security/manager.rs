use std::sync::Arc;

use crate::http::security::config::{AnonymousCallerProvider, CallerProviders};
use crate::http::security::registry::RequirementRegistry;
use crate::http::security::resolver::RoleAccessResolver;

pub struct ResolverManager {}

impl ResolverManager {
    pub fn role_based() -> RoleAccessResolver {
        RoleAccessResolver::new()
    }
}

pub struct RequirementManager {}

impl RequirementManager {
    pub fn registry() -> RequirementRegistry {
        RequirementRegistry::new()
    }
}

pub struct ProviderManager {}

impl ProviderManager {
    /// Provider table with `anonymous` pre-registered.
    pub fn providers() -> CallerProviders {
        CallerProviders::new().register("anonymous", || Arc::new(AnonymousCallerProvider))
    }
}
