//! Error types raised by requirement evaluation.

mod security_error;

pub use security_error::{AccessDenied, ConfigurationError, DenialReason, SecurityError};
