//! Authorization of protected operations.
//!
//! # Module Structure
//!
//! - `role` - Roles, role holders (callers) and the ready-made `User`
//! - `resource` - Access-managed resources and live arguments
//! - `access` - Access types and resolver decisions
//! - `requirement` - Operation / type declarations and derived descriptors
//! - `registry` - Descriptor source keyed by operation id
//! - `resolver` - Access resolver contract and `RoleAccessResolver`
//! - `config` - Caller provider, failure sink, `SecurityConfig`
//! - `context` - Per-request scope caching the caller
//! - `evaluator` - The `Security` evaluator
//! - `middleware` - Request-scope middleware (`SecurityTransform`)
//! - `extractor` - Actix Web extractor and `SecurityExt`
//! - `manager` - Factory methods
//! - `audit` - Security audit logging
//!
//! # Feature Flags
//! - `audit`: Enables `AuditLogger` and security events (default)

pub use access::{AccessDecision, AccessType};
#[cfg(feature = "audit")]
pub use audit::{
    AuditLogger, ClosureHandler, InMemoryEventStore, SecurityEvent, SecurityEventHandler,
    SecurityEventSeverity, SecurityEventType, TracingHandler,
};
pub use config::{
    AnonymousCallerProvider, CallerProvider, CallerProviders, FailureSink, LoggingFailureSink,
    NotSpecifiedPolicy, SecurityConfig,
};
pub use context::{RequestScope, RequestScopeGuard};
pub use evaluator::Security;
pub use extractor::SecurityExt;
pub use manager::{ProviderManager, RequirementManager, ResolverManager};
pub use middleware::{Authenticator, NoAuthenticator, SecurityTransform};
pub use registry::{RequirementRegistry, UnknownOperationPolicy};
pub use requirement::{
    OperationDeclaration, OperationId, ParameterAccess, RequirementDescriptor, RolesMode,
    TypeDeclaration,
};
pub use resolver::{AccessResolver, ResolutionError, ResourceAccess, RoleAccessResolver};
pub use resource::{AclManaged, Argument, AsAny, ResourceType};
pub use role::{contains_role_with_name, Caller, Role, RoleHolder, User};

mod extractor;

pub mod access;
#[cfg(feature = "audit")]
pub mod audit;
pub mod config;
pub mod context;
pub mod evaluator;
pub mod manager;
pub mod middleware;
pub mod registry;
pub mod requirement;
pub mod resolver;
pub mod resource;
pub mod role;
