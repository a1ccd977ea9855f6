//! Access types and resource-level decisions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::http::error::ConfigurationError;

/// Kind of access requested on a resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessType {
    Read,
    Write,
    Delete,
    All,
}

impl AccessType {
    /// Access assumed when a declaration lists no explicit access types.
    pub const DEFAULT: AccessType = AccessType::Read;
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessType::Read => write!(f, "READ"),
            AccessType::Write => write!(f, "WRITE"),
            AccessType::Delete => write!(f, "DELETE"),
            AccessType::All => write!(f, "ALL"),
        }
    }
}

impl FromStr for AccessType {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "READ" => Ok(AccessType::Read),
            "WRITE" => Ok(AccessType::Write),
            "DELETE" => Ok(AccessType::Delete),
            "ALL" => Ok(AccessType::All),
            _ => Err(ConfigurationError::InvalidValue {
                key: "access type".into(),
                value: s.into(),
            }),
        }
    }
}

/// Result of a resource-level check.
///
/// Decisions are produced per check and never cached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    Denied,
    /// The resolver has no opinion; role checks alone decide.
    NotSpecified,
}

impl AccessDecision {
    pub fn is_allowed(self) -> bool {
        self == AccessDecision::Allowed
    }

    /// Folds per-resource decisions into one: the first `Denied` wins, then
    /// any `NotSpecified`, otherwise `Allowed`.
    pub fn combine(self, other: AccessDecision) -> AccessDecision {
        match (self, other) {
            (AccessDecision::Denied, _) | (_, AccessDecision::Denied) => AccessDecision::Denied,
            (AccessDecision::NotSpecified, _) | (_, AccessDecision::NotSpecified) => {
                AccessDecision::NotSpecified
            }
            _ => AccessDecision::Allowed,
        }
    }
}

impl From<bool> for AccessDecision {
    fn from(allowed: bool) -> Self {
        if allowed {
            AccessDecision::Allowed
        } else {
            AccessDecision::Denied
        }
    }
}

/// Normalizes a declared access list: an empty list means READ.
pub(crate) fn declared_or_default(access_types: &[AccessType]) -> Vec<AccessType> {
    if access_types.is_empty() {
        vec![AccessType::DEFAULT]
    } else {
        access_types.to_vec()
    }
}
