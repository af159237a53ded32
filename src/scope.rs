//! Execution scope: the cancellable, capability-carrying handle threaded
//! through one invocation.
//!
//! A scope is cheap to clone (it is an `Arc` internally) so subcommands can
//! hand it to spawned threads or tasks. Capabilities are keyed by their Rust
//! type and are fixed when the scope is built. Deriving a child scope links
//! its cancellation to the parent and inherits every parent capability; a
//! capability of the same type attached to the child shadows the parent's.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use crate::cli::ParsedFlags;
use crate::config::GlobalConfigStore;
use crate::status::StatusReporter;

type CapabilityMap = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

/// Set of capabilities to attach to a new scope.
#[derive(Default, Clone)]
pub struct Capabilities {
    entries: CapabilityMap,
}

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a capability. A later value of the same type replaces an
    /// earlier one in this set.
    pub fn with<T: Any + Send + Sync>(mut self, capability: T) -> Self {
        self.entries.insert(TypeId::of::<T>(), Arc::new(capability));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct ScopeInner {
    token: CancellationToken,
    capabilities: CapabilityMap,
}

#[derive(Clone)]
pub struct ExecutionScope {
    inner: Arc<ScopeInner>,
}

/// Build a scope, optionally derived from `parent`.
pub fn new_execution_scope(
    parent: Option<&ExecutionScope>,
    capabilities: Capabilities,
) -> ExecutionScope {
    match parent {
        Some(parent) => parent.derive(capabilities),
        None => ExecutionScope::root(capabilities),
    }
}

impl ExecutionScope {
    /// Top-level scope with its own cancellation signal.
    pub fn root(capabilities: Capabilities) -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                token: CancellationToken::new(),
                capabilities: capabilities.entries,
            }),
        }
    }

    /// Child scope. Cancelling `self` cancels the child; cancelling the child
    /// leaves `self` untouched.
    pub fn derive(&self, capabilities: Capabilities) -> Self {
        let mut merged = self.inner.capabilities.clone();
        merged.extend(capabilities.entries);
        Self {
            inner: Arc::new(ScopeInner {
                token: self.inner.token.child_token(),
                capabilities: merged,
            }),
        }
    }

    pub fn lookup<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.inner
            .capabilities
            .get(&TypeId::of::<T>())
            .and_then(|cap| Arc::clone(cap).downcast::<T>().ok())
    }

    pub fn has<T: Any + Send + Sync>(&self) -> bool {
        self.inner.capabilities.contains_key(&TypeId::of::<T>())
    }

    /// Attached status reporter, or the no-op reporter when none is attached.
    pub fn status(&self) -> StatusReporter {
        self.lookup::<StatusReporter>()
            .map(|reporter| (*reporter).clone())
            .unwrap_or_default()
    }

    /// Global configuration resolved for this invocation, if dispatch has
    /// attached one.
    pub fn config(&self) -> Option<Arc<GlobalConfigStore>> {
        self.lookup::<GlobalConfigStore>()
    }

    /// Flag values along the dispatched path.
    pub fn flags(&self) -> Option<Arc<ParsedFlags>> {
        self.lookup::<ParsedFlags>()
    }

    /// Trigger cancellation. Idempotent.
    pub fn cancel(&self) {
        self.inner.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// Resolves once this scope (or any ancestor) is cancelled.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.inner.token.cancelled()
    }

    /// Token linked to this scope, for work that must not hold the scope itself.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.inner.token.clone()
    }
}

impl fmt::Debug for ExecutionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionScope")
            .field("capabilities", &self.inner.capabilities.len())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
