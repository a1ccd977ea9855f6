//! Security audit events.
//!
//! Every decision the evaluator takes can be reported as a [`SecurityEvent`]
//! to an [`AuditLogger`], which fans it out to its handlers. This is separate
//! from the failure sink: the sink is the host's denial hook, the audit log
//! is a record of what happened.
//!
//! # Example
//!
//! ```
//! use actix_acl_core::http::security::audit::{AuditLogger, InMemoryEventStore, SecurityEventType};
//! use actix_acl_core::http::security::OperationId;
//!
//! let store = InMemoryEventStore::new();
//! let logger = AuditLogger::new().add_handler(store.clone());
//!
//! logger.log_access_granted(&OperationId::new("Service", "list"), Some("admin"));
//!
//! assert_eq!(store.get_events_by_type(&SecurityEventType::AccessGranted).len(), 1);
//! ```

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Serialize, Serializer};

use crate::http::error::{AccessDenied, ConfigurationError};
use crate::http::security::requirement::OperationId;

/// What an audit event records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityEventType {
    /// Every check of an operation passed.
    AccessGranted,
    /// A role or resource check failed.
    AccessDenied,
    /// Evaluation hit a setup problem (unknown operation, failed resolution).
    ConfigurationError,
    /// Host-defined event
    Custom(String),
}

impl SecurityEventType {
    pub fn default_severity(&self) -> SecurityEventSeverity {
        match self {
            SecurityEventType::AccessDenied => SecurityEventSeverity::Warning,
            SecurityEventType::ConfigurationError => SecurityEventSeverity::Critical,
            SecurityEventType::AccessGranted | SecurityEventType::Custom(_) => {
                SecurityEventSeverity::Info
            }
        }
    }
}

impl fmt::Display for SecurityEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityEventType::AccessGranted => f.write_str("ACCESS_GRANTED"),
            SecurityEventType::AccessDenied => f.write_str("ACCESS_DENIED"),
            SecurityEventType::ConfigurationError => f.write_str("CONFIGURATION_ERROR"),
            SecurityEventType::Custom(name) => write!(f, "CUSTOM_{}", name.to_uppercase()),
        }
    }
}

/// Severity of an event, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum SecurityEventSeverity {
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for SecurityEventSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SecurityEventSeverity::Info => "INFO",
            SecurityEventSeverity::Warning => "WARNING",
            SecurityEventSeverity::Error => "ERROR",
            SecurityEventSeverity::Critical => "CRITICAL",
        })
    }
}

fn as_string<T: fmt::Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// One audit record.
///
/// Its `Display` form is a single log line; [`SecurityEvent::to_json`]
/// renders it as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityEvent {
    /// Unique event ID
    pub id: String,
    /// Unix epoch milliseconds
    pub timestamp: u64,
    #[serde(serialize_with = "as_string")]
    pub event_type: SecurityEventType,
    #[serde(serialize_with = "as_string")]
    pub severity: SecurityEventSeverity,
    /// Caller name, if a caller was present
    pub username: Option<String>,
    /// Operation being evaluated, as `Type::method`
    pub operation: Option<String>,
    /// Why access was denied
    pub reason: Option<String>,
    /// Debug rendering of each denied resource
    pub resources: Vec<String>,
    pub details: BTreeMap<String, String>,
    pub error: Option<String>,
}

impl SecurityEvent {
    pub fn new(event_type: SecurityEventType) -> Self {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();

        SecurityEvent {
            id: format!(
                "{:x}-{:08x}",
                since_epoch.as_micros(),
                rand::thread_rng().gen::<u32>()
            ),
            timestamp: since_epoch.as_millis() as u64,
            severity: event_type.default_severity(),
            event_type,
            username: None,
            operation: None,
            reason: None,
            resources: Vec::new(),
            details: BTreeMap::new(),
            error: None,
        }
    }

    pub fn access_granted(operation: &OperationId, username: Option<&str>) -> Self {
        let mut event = Self::new(SecurityEventType::AccessGranted).operation(operation);
        event.username = username.map(str::to_string);
        event
    }

    pub fn access_denied(denied: &AccessDenied, username: Option<&str>) -> Self {
        let mut event = Self::new(SecurityEventType::AccessDenied)
            .operation(denied.operation())
            .reason(denied.reason().to_string());
        event.username = username.map(str::to_string);
        event.resources = denied
            .resources()
            .iter()
            .map(|resource| format!("{:?}", resource))
            .collect();
        event
    }

    pub fn configuration_error(operation: &OperationId, error: &ConfigurationError) -> Self {
        Self::new(SecurityEventType::ConfigurationError)
            .operation(operation)
            .error(error.to_string())
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn operation(mut self, operation: &OperationId) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resources.push(resource.into());
        self
    }

    /// Overrides the event type's default severity.
    pub fn severity(mut self, severity: SecurityEventSeverity) -> Self {
        self.severity = severity;
        self
    }

    pub fn detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.to_string())
    }
}

impl fmt::Display for SecurityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] [{}]", self.severity, self.event_type)?;
        if let Some(operation) = &self.operation {
            write!(f, " operation={}", operation)?;
        }
        if let Some(username) = &self.username {
            write!(f, " user={}", username)?;
        }
        if let Some(reason) = &self.reason {
            write!(f, " reason={:?}", reason)?;
        }
        for resource in &self.resources {
            write!(f, " resource={}", resource)?;
        }
        if let Some(error) = &self.error {
            write!(f, " error={:?}", error)?;
        }
        for (key, value) in &self.details {
            write!(f, " {}={}", key, value)?;
        }
        Ok(())
    }
}

/// Receives audit events.
pub trait SecurityEventHandler: Send + Sync {
    fn handle(&self, event: &SecurityEvent);
}

/// Emits events on the `acl::audit` tracing target, at a level matching
/// their severity.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingHandler {
    min_severity: SecurityEventSeverity,
}

impl TracingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops events below `severity`.
    pub fn min_severity(mut self, severity: SecurityEventSeverity) -> Self {
        self.min_severity = severity;
        self
    }
}

impl SecurityEventHandler for TracingHandler {
    fn handle(&self, event: &SecurityEvent) {
        if event.severity < self.min_severity {
            return;
        }
        let id = event.id.as_str();
        let operation = event.operation.as_deref().unwrap_or_default();
        match event.severity {
            SecurityEventSeverity::Info => {
                tracing::info!(target: "acl::audit", event_id = id, operation, "{}", event)
            }
            SecurityEventSeverity::Warning => {
                tracing::warn!(target: "acl::audit", event_id = id, operation, "{}", event)
            }
            SecurityEventSeverity::Error | SecurityEventSeverity::Critical => {
                tracing::error!(target: "acl::audit", event_id = id, operation, "{}", event)
            }
        }
    }
}

/// Adapts a closure into a handler.
pub struct ClosureHandler<F>(F);

impl<F> ClosureHandler<F>
where
    F: Fn(&SecurityEvent) + Send + Sync,
{
    pub fn new(handler: F) -> Self {
        ClosureHandler(handler)
    }
}

impl<F> SecurityEventHandler for ClosureHandler<F>
where
    F: Fn(&SecurityEvent) + Send + Sync,
{
    fn handle(&self, event: &SecurityEvent) {
        (self.0)(event)
    }
}

/// Bounded in-memory event buffer, for tests and diagnostics.
///
/// Clones share the same buffer. Once `max_events` is reached the oldest
/// event is evicted.
#[derive(Clone)]
pub struct InMemoryEventStore {
    events: Arc<RwLock<VecDeque<SecurityEvent>>>,
    max_events: usize,
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEventStore {
    pub const DEFAULT_CAPACITY: usize = 10_000;

    pub fn new() -> Self {
        InMemoryEventStore {
            events: Arc::new(RwLock::new(VecDeque::new())),
            max_events: Self::DEFAULT_CAPACITY,
        }
    }

    pub fn max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    pub fn get_events(&self) -> Vec<SecurityEvent> {
        self.matching(|_| true)
    }

    pub fn get_events_by_type(&self, event_type: &SecurityEventType) -> Vec<SecurityEvent> {
        self.matching(|e| &e.event_type == event_type)
    }

    pub fn get_events_by_operation(&self, operation: &OperationId) -> Vec<SecurityEvent> {
        let operation = operation.to_string();
        self.matching(|e| e.operation.as_deref() == Some(operation.as_str()))
    }

    pub fn get_events_by_user(&self, username: &str) -> Vec<SecurityEvent> {
        self.matching(|e| e.username.as_deref() == Some(username))
    }

    pub fn clear(&self) {
        self.events
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn matching(&self, predicate: impl Fn(&SecurityEvent) -> bool) -> Vec<SecurityEvent> {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| predicate(e))
            .cloned()
            .collect()
    }
}

impl SecurityEventHandler for InMemoryEventStore {
    fn handle(&self, event: &SecurityEvent) {
        let mut events = self.events.write().unwrap_or_else(PoisonError::into_inner);
        if events.len() >= self.max_events {
            events.pop_front();
        }
        if self.max_events > 0 {
            events.push_back(event.clone());
        }
    }
}

/// Fans events out to its handlers. Cheap to clone.
#[derive(Clone)]
pub struct AuditLogger {
    handlers: Arc<Vec<Arc<dyn SecurityEventHandler>>>,
    enabled: bool,
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditLogger {
    /// A logger with no handlers.
    pub fn new() -> Self {
        AuditLogger {
            handlers: Arc::new(Vec::new()),
            enabled: true,
        }
    }

    /// A logger writing to `tracing`.
    pub fn with_tracing() -> Self {
        Self::new().add_handler(TracingHandler::new())
    }

    pub fn add_handler<H: SecurityEventHandler + 'static>(mut self, handler: H) -> Self {
        Arc::make_mut(&mut self.handlers).push(Arc::new(handler));
        self
    }

    pub fn with_handler<F>(self, handler: F) -> Self
    where
        F: Fn(&SecurityEvent) + Send + Sync + 'static,
    {
        self.add_handler(ClosureHandler::new(handler))
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn log(&self, event: SecurityEvent) {
        if self.enabled {
            self.handlers.iter().for_each(|handler| handler.handle(&event));
        }
    }

    pub fn log_access_granted(&self, operation: &OperationId, username: Option<&str>) {
        self.log(SecurityEvent::access_granted(operation, username));
    }

    pub fn log_access_denied(&self, denied: &AccessDenied, username: Option<&str>) {
        self.log(SecurityEvent::access_denied(denied, username));
    }

    pub fn log_configuration_error(&self, operation: &OperationId, error: &ConfigurationError) {
        self.log(SecurityEvent::configuration_error(operation, error));
    }
}
