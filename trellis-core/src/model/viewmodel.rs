//! View-Models
//!
//! A `ViewModel` is the root scope of one component instance. Besides its own
//! data it keeps two name tables:
//!
//! - `mappings`: names bound in from a container (or installed lazily by the
//!   resolver after it crossed a component boundary), each aliasing a cell
//!   that usually lives in another view-model;
//! - `computations`: names of derived cells local to this view-model.
//!
//! Both tables shadow the data: `join_key` consults mappings first, then
//! computations, and only then joins into the data.

use std::fmt::{self, Debug};
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;

use super::cell::Model;
use super::computation::Computation;
use crate::error::Result;

/// Root scope for one instance.
pub struct ViewModel {
    this: Weak<ViewModel>,
    model: Model,
    mappings: RwLock<IndexMap<String, Model>>,
    computations: RwLock<IndexMap<String, Model>>,
}

impl ViewModel {
    /// Create a view-model owning `data`.
    pub fn new(data: Value) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            model: Model::root_cell(this.clone(), data),
            mappings: RwLock::new(IndexMap::new()),
            computations: RwLock::new(IndexMap::new()),
        })
    }

    /// The root cell holding this view-model's own data.
    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn get(&self) -> Value {
        self.model.get()
    }

    pub fn set(&self, value: Value) -> Result<()> {
        self.model.set(value)
    }

    /// Alias `key` to `model`.
    ///
    /// Returns `false` when the same cell was already mapped under `key`, in
    /// which case nothing changes. A different cell replaces the old mapping.
    pub fn map(&self, key: &str, model: Model) -> bool {
        let mut mappings = self.mappings.write();
        if mappings.get(key).is_some_and(|existing| *existing == model) {
            return false;
        }
        mappings.insert(key.to_string(), model);
        true
    }

    pub fn unmap(&self, key: &str) -> Option<Model> {
        self.mappings.write().shift_remove(key)
    }

    pub fn mapping(&self, key: &str) -> Option<Model> {
        self.mappings.read().get(key).cloned()
    }

    /// Mapped names in installation order.
    pub fn mapping_keys(&self) -> Vec<String> {
        self.mappings.read().keys().cloned().collect()
    }

    pub fn mapping_count(&self) -> usize {
        self.mappings.read().len()
    }

    /// Declare a computed cell named `name` over `dependencies`.
    ///
    /// The computation is marked dirty whenever a dependency changes. A
    /// second declaration under the same name replaces the first and drops
    /// the old one's dependency subscriptions.
    pub fn compute<F>(&self, name: &str, dependencies: Vec<Model>, getter: F) -> Model
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        let computation = Computation::new(name, dependencies, getter);
        let subscriber = computation.subscriber();
        let model = Model::computed(self.this.clone(), computation);

        for dependency in model.computation().map(Computation::dependencies).unwrap_or_default() {
            let target = model.downgrade();
            dependency.subscribe(subscriber, move || {
                if let Some(model) = Model::upgrade(&target) {
                    model.invalidate();
                }
            });
        }

        let replaced = self
            .computations
            .write()
            .insert(name.to_string(), model.clone());
        if let Some(old) = replaced.as_ref().and_then(Model::computation) {
            for dependency in old.dependencies() {
                dependency.unsubscribe(old.subscriber());
            }
        }
        model
    }

    pub fn computation(&self, key: &str) -> Option<Model> {
        self.computations.read().get(key).cloned()
    }

    /// True if `key` is mapped, computed, or a member of the data.
    pub fn has(&self, key: &str) -> bool {
        self.mappings.read().contains_key(key)
            || self.computations.read().contains_key(key)
            || self.model.has(key)
    }

    /// The cell for `key`: a mapping, else a computation, else a data child.
    pub fn join_key(&self, key: &str) -> Model {
        if let Some(mapped) = self.mapping(key) {
            return mapped;
        }
        if let Some(computed) = self.computation(key) {
            return computed;
        }
        self.model.join_key(key)
    }

    /// The cell for a whole path. The first segment goes through `join_key`.
    pub fn join_all<S: AsRef<str>>(&self, keys: &[S]) -> Model {
        match keys.split_first() {
            Some((key, rest)) => self.join_key(key.as_ref()).join_all(rest),
            None => self.model.clone(),
        }
    }
}

impl Debug for ViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewModel")
            .field("model", &self.model.id())
            .field("mappings", &self.mapping_keys())
            .field(
                "computations",
                &self.computations.read().keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}
