//! Access-managed resources and live operation arguments.

use std::any::{self, Any};
use std::fmt;
use std::sync::Arc;

/// Type tag naming the kind of resource an access declaration refers to.
///
/// Equality is by name. [`ResourceType::of`] derives the name from a Rust
/// type, [`ResourceType::named`] takes any stable string.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceType(&'static str);

impl ResourceType {
    pub fn of<T: ?Sized + 'static>() -> Self {
        ResourceType(any::type_name::<T>())
    }

    pub const fn named(name: &'static str) -> Self {
        ResourceType(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Upcast helper so managed resources can be downcast to their concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Marks a domain type as subject to fine-grained access control.
///
/// When such a value is passed to an operation parameter carrying an access
/// declaration, the current caller is checked against it by the
/// [`AccessResolver`](super::AccessResolver).
///
/// # Example
/// ```
/// use actix_acl_core::http::security::{AclManaged, ResourceType};
///
/// #[derive(Debug)]
/// struct Document {
///     owner: String,
/// }
///
/// impl AclManaged for Document {}
///
/// let doc = Document { owner: "alice".into() };
/// assert_eq!(doc.resource_type(), ResourceType::of::<Document>());
/// ```
pub trait AclManaged: AsAny + fmt::Debug + Send + Sync {
    /// The resource type this value is checked as.
    fn resource_type(&self) -> ResourceType {
        ResourceType::of::<Self>()
    }
}

impl dyn AclManaged {
    /// Returns the concrete resource if it is of type `T`.
    pub fn downcast_ref<T: AclManaged>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn is<T: AclManaged>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// A live argument of a protected operation.
///
/// Null arguments are modelled as `None` in the argument slice handed to the
/// evaluator, so an `Argument` always holds a value.
#[derive(Clone)]
pub enum Argument {
    /// A value that is itself access-managed.
    Managed(Arc<dyn AclManaged>),
    /// A plain value (an id, a key) that a resolver can turn into a resource.
    Value(Arc<dyn Any + Send + Sync>),
}

impl Argument {
    pub fn managed<T: AclManaged>(resource: T) -> Self {
        Argument::Managed(Arc::new(resource))
    }

    pub fn value<T: Any + Send + Sync>(value: T) -> Self {
        Argument::Value(Arc::new(value))
    }

    /// The resource, if the argument is access-managed.
    pub fn as_managed(&self) -> Option<&Arc<dyn AclManaged>> {
        match self {
            Argument::Managed(resource) => Some(resource),
            Argument::Value(_) => None,
        }
    }

    /// Borrows the argument as a `T`, whichever variant holds it.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Argument::Managed(resource) => (**resource).as_any().downcast_ref::<T>(),
            Argument::Value(value) => (**value).downcast_ref::<T>(),
        }
    }
}

impl From<Arc<dyn AclManaged>> for Argument {
    fn from(resource: Arc<dyn AclManaged>) -> Self {
        Argument::Managed(resource)
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Managed(resource) => f.debug_tuple("Managed").field(resource).finish(),
            Argument::Value(_) => f.write_str("Value(..)"),
        }
    }
}
