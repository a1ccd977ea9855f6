//! Request scope holding the per-request caller cache.
//!
//! # Overview
//! A [`RequestScope`] is created when a request starts and cleared when it
//! ends. The evaluator stores the resolved caller in it (when per-request
//! caching is enabled) so repeated checks within one request do not hit the
//! caller provider again. Nothing is cached beyond the scope, so a worker
//! reused for the next request starts empty.
//!
//! The scope is passed explicitly to the evaluator. For code that cannot
//! thread it through (view helpers, service layers), [`RequestScope::run_with`]
//! also makes it available through [`RequestScope::current`] for the
//! duration of a future, using task-local storage.
//!
//! # Usage
//! ```
//! use actix_acl_core::http::security::{RequestScope, User};
//!
//! let scope = RequestScope::new();
//! scope.set_caller(Some(User::new("admin").roles(&["ADMIN"]).into_caller()));
//! assert!(scope.cached_caller().is_some());
//!
//! scope.clear();
//! assert!(scope.cached_caller().is_none());
//! ```

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::http::security::role::Caller;

tokio::task_local! {
    static CURRENT_SCOPE: RequestScope;
}

#[derive(Default)]
enum CallerSlot {
    #[default]
    Unresolved,
    Resolved(Option<Caller>),
}

/// Container scoped to exactly one inbound request.
///
/// Cloning shares the same slot; all clones belong to the same request.
#[derive(Clone, Default)]
pub struct RequestScope {
    slot: Arc<Mutex<CallerSlot>>,
}

impl RequestScope {
    /// Creates an empty scope at the start of a request.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, CallerSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached lookup result.
    ///
    /// - `None` if no lookup has been cached in this scope
    /// - `Some(None)` if the cached result is "no caller"
    /// - `Some(Some(caller))` otherwise
    pub fn cached_caller(&self) -> Option<Option<Caller>> {
        match &*self.slot() {
            CallerSlot::Unresolved => None,
            CallerSlot::Resolved(caller) => Some(caller.clone()),
        }
    }

    /// Stores the caller for the rest of the request.
    ///
    /// Hosts call this to seed an already-authenticated caller; the evaluator
    /// calls it after a provider lookup when per-request caching is enabled.
    pub fn set_caller(&self, caller: Option<Caller>) {
        *self.slot() = CallerSlot::Resolved(caller);
    }

    /// Forgets the cached caller.
    pub fn clear(&self) {
        *self.slot() = CallerSlot::Unresolved;
    }

    /// Returns a guard that clears this scope when dropped, even on panic.
    pub fn guard(&self) -> RequestScopeGuard {
        RequestScopeGuard(self.clone())
    }

    /// Returns the scope of the request being handled by the current task.
    pub fn current() -> Option<RequestScope> {
        CURRENT_SCOPE.try_with(RequestScope::clone).ok()
    }

    /// Runs `f` with this scope installed as [`RequestScope::current`].
    ///
    /// The scope is cleared once `f` completes, whatever its outcome.
    pub async fn run_with<F, R>(self, f: F) -> R
    where
        F: Future<Output = R>,
    {
        let _guard = self.guard();
        CURRENT_SCOPE.scope(self, f).await
    }

    /// Synchronous variant of [`RequestScope::run_with`].
    pub fn sync_scope<F, R>(self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = self.guard();
        CURRENT_SCOPE.sync_scope(self, f)
    }
}

impl fmt::Debug for RequestScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.slot() {
            CallerSlot::Unresolved => "unresolved",
            CallerSlot::Resolved(None) => "anonymous",
            CallerSlot::Resolved(Some(_)) => "caller",
        };
        f.debug_struct("RequestScope").field("state", &state).finish()
    }
}

/// Guard that clears a request scope when dropped.
pub struct RequestScopeGuard(RequestScope);

impl Drop for RequestScopeGuard {
    fn drop(&mut self) {
        self.0.clear();
    }
}
