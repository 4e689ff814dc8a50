//! Computations
//!
//! A Computation is a named, derived cell local to a view-model: a getter
//! over the current values of an explicit list of dependency cells.
//!
//! # How Computations Work
//!
//! 1. The getter is not run on creation. It runs on first read.
//!
//! 2. The result is cached until a dependency reports a change, at which
//!    point the computation is marked dirty.
//!
//! 3. The next read re-runs the getter against fresh dependency values.
//!
//! Computations are read-only. Writing through a computed cell (or any cell
//! joined beneath it) fails with `Error::ReadOnly`.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use super::cell::Model;
use super::subscriber::SubscriberId;

/// The getter of a computation. Receives dependency values in declaration order.
pub type Getter = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// Dirty state for a computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputationState {
    /// The cached value is up-to-date.
    Clean,

    /// A dependency changed (or the getter never ran).
    Dirty,
}

/// A cached derived value over a fixed set of dependency cells.
pub struct Computation {
    /// Human-readable identity, e.g. `fullName`.
    signature: String,

    dependencies: Vec<Model>,

    getter: Getter,

    /// The id its dependency subscriptions are registered under.
    subscriber: SubscriberId,

    /// The cached value (None if never computed).
    value: RwLock<Option<Value>>,

    state: RwLock<ComputationState>,

    /// Number of times the getter has run.
    evaluations: AtomicU64,
}

impl Computation {
    /// Create a new computation. The getter runs lazily.
    pub fn new<F>(signature: impl Into<String>, dependencies: Vec<Model>, getter: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            signature: signature.into(),
            dependencies,
            getter: Arc::new(getter),
            subscriber: SubscriberId::new(),
            value: RwLock::new(None),
            state: RwLock::new(ComputationState::Dirty),
            evaluations: AtomicU64::new(0),
        }
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn dependencies(&self) -> &[Model] {
        &self.dependencies
    }

    pub fn subscriber(&self) -> SubscriberId {
        self.subscriber
    }

    /// Get the current value, recomputing if necessary.
    pub fn get(&self) -> Value {
        if self.state() == ComputationState::Clean {
            if let Some(value) = self.value.read().as_ref() {
                return value.clone();
            }
        }
        self.recompute()
    }

    /// Mark the computation as needing a recompute on next read.
    pub fn mark_dirty(&self) {
        *self.state.write() = ComputationState::Dirty;
    }

    pub fn state(&self) -> ComputationState {
        *self.state.read()
    }

    /// How many times the getter has run.
    pub fn evaluations(&self) -> u64 {
        self.evaluations.load(Ordering::Relaxed)
    }

    fn recompute(&self) -> Value {
        let inputs: Vec<Value> = self.dependencies.iter().map(Model::get).collect();
        let value = (self.getter)(&inputs);
        self.evaluations.fetch_add(1, Ordering::Relaxed);

        *self.value.write() = Some(value.clone());
        *self.state.write() = ComputationState::Clean;

        value
    }
}

impl Debug for Computation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Computation")
            .field("signature", &self.signature)
            .field("state", &self.state())
            .field("dependencies", &self.dependencies.len())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
