//! Descriptor source: declarations registered at start-up, descriptors
//! derived lazily and shared afterwards.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::http::error::ConfigurationError;
use crate::http::security::requirement::{
    OperationDeclaration, OperationId, RequirementDescriptor, TypeDeclaration,
};

/// What to do when an operation has no registered declaration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownOperationPolicy {
    /// Raise a [`ConfigurationError::UnknownOperation`].
    #[default]
    Reject,
    /// Legacy fail-open behaviour: evaluate the operation as unsecured.
    Unsecured,
}

struct Entry {
    declaration: OperationDeclaration,
    descriptor: OnceLock<Arc<RequirementDescriptor>>,
}

/// Registry of declared requirements keyed by [`OperationId`].
///
/// Built once and then shared read-only. Each descriptor is derived on
/// first lookup; concurrent first lookups may race, but derivation is pure
/// so every caller observes the same descriptor.
///
/// # Example
/// ```
/// use actix_acl_core::http::security::{OperationDeclaration, OperationId, RequirementRegistry, TypeDeclaration};
///
/// let registry = RequirementRegistry::new()
///     .with_type(TypeDeclaration::new("RestrictedService").roles(&["ADMIN"]))
///     .with_operation(OperationDeclaration::new("RestrictedService", "changeEverything"));
///
/// let descriptor = registry
///     .descriptor(&OperationId::new("RestrictedService", "changeEverything"))
///     .unwrap();
/// assert_eq!(descriptor.required_roles(), &["ADMIN".to_string()]);
/// ```
#[derive(Default)]
pub struct RequirementRegistry {
    types: HashMap<String, TypeDeclaration>,
    operations: HashMap<OperationId, Entry>,
    unknown_operation: UnknownOperationPolicy,
}

impl RequirementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a declaring-type requirement.
    pub fn with_type(mut self, declaration: TypeDeclaration) -> Self {
        self.types.insert(declaration.name().to_string(), declaration);
        self
    }

    /// Registers an operation. A later declaration for the same operation
    /// replaces the earlier one.
    pub fn with_operation(mut self, declaration: OperationDeclaration) -> Self {
        self.operations.insert(
            declaration.operation().clone(),
            Entry {
                declaration,
                descriptor: OnceLock::new(),
            },
        );
        self
    }

    /// Registers several operations at once.
    pub fn with_operations<I>(self, declarations: I) -> Self
    where
        I: IntoIterator<Item = OperationDeclaration>,
    {
        declarations
            .into_iter()
            .fold(self, |registry, declaration| registry.with_operation(declaration))
    }

    /// Sets the lookup-failure policy (default: [`UnknownOperationPolicy::Reject`]).
    pub fn unknown_operation(mut self, policy: UnknownOperationPolicy) -> Self {
        self.unknown_operation = policy;
        self
    }

    pub fn get_unknown_operation(&self) -> UnknownOperationPolicy {
        self.unknown_operation
    }

    pub fn contains(&self, operation: &OperationId) -> bool {
        self.operations.contains_key(operation)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Returns the descriptor for `operation`, deriving it on first use.
    ///
    /// # Errors
    /// [`ConfigurationError::UnknownOperation`] when nothing is registered for
    /// the operation and the policy is [`UnknownOperationPolicy::Reject`].
    pub fn descriptor(
        &self,
        operation: &OperationId,
    ) -> Result<Arc<RequirementDescriptor>, ConfigurationError> {
        match self.operations.get(operation) {
            Some(entry) => Ok(Arc::clone(entry.descriptor.get_or_init(|| {
                let declaring_type = self.types.get(operation.declaring_type());
                tracing::trace!(%operation, "deriving requirement descriptor");
                Arc::new(entry.declaration.derive(declaring_type))
            }))),
            None => match self.unknown_operation {
                UnknownOperationPolicy::Reject => Err(ConfigurationError::UnknownOperation {
                    operation: operation.clone(),
                }),
                UnknownOperationPolicy::Unsecured => {
                    tracing::warn!(%operation, "no requirements declared, treating as unsecured");
                    Ok(Arc::new(RequirementDescriptor::unsecured(operation.clone())))
                }
            },
        }
    }
}
