//! Instances
//!
//! An instance is one mounted template: a standalone root, or a component
//! mounted inside a container instance's fragment. Each instance owns a
//! view-model and an interpolator registry.
//!
//! # Isolation
//!
//! An isolated component never looks past its own root: reference resolution
//! does not cross into the container's scope, and named plugin lookup stops
//! at the isolated instance.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use super::fragment::FragmentId;
use super::tree::ViewTree;
use crate::interpolate::{default_interpolator, Interpolator, InterpolatorSource, NamedInterpolator, Registry};
use crate::model::ViewModel;

/// Index of an instance in its `ViewTree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(usize);

impl InstanceId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub(crate) fn index(self) -> usize {
        self.0
    }

    /// Get the raw ID value.
    pub fn raw(self) -> usize {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// How to create an instance.
///
/// # Example
///
/// ```rust,ignore
/// let options = InstanceOptions::new(json!({ "items": [] }))
///     .name("TodoList")
///     .isolated(true);
/// ```
#[derive(Debug, Clone)]
pub struct InstanceOptions {
    pub data: Value,
    pub name: Option<String>,
    pub isolated: bool,
    pub interpolators: Registry,
}

impl InstanceOptions {
    pub fn new(data: Value) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn isolated(mut self, isolated: bool) -> Self {
        self.isolated = isolated;
        self
    }

    pub fn interpolator<F>(mut self, name: &str, interpolator: F) -> Self
    where
        F: Fn(&Value, &Value) -> Option<Interpolator> + Send + Sync + 'static,
    {
        self.interpolators.register(name, interpolator);
        self
    }
}

impl Default for InstanceOptions {
    fn default() -> Self {
        Self {
            data: Value::Object(Default::default()),
            name: None,
            isolated: false,
            interpolators: Registry::new(),
        }
    }
}

/// One mounted template.
#[derive(Debug)]
pub struct Instance {
    pub(crate) id: InstanceId,
    pub(crate) name: String,
    pub(crate) viewmodel: Arc<ViewModel>,
    pub(crate) container: Option<InstanceId>,
    pub(crate) isolated: bool,
    pub(crate) root_fragment: FragmentId,
    pub(crate) interpolators: Registry,
}

impl Instance {
    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn viewmodel(&self) -> &Arc<ViewModel> {
        &self.viewmodel
    }

    /// The instance this component is mounted in.
    pub fn container(&self) -> Option<InstanceId> {
        self.container
    }

    /// True when mounted inside another instance.
    pub fn is_component(&self) -> bool {
        self.container.is_some()
    }

    pub fn is_isolated(&self) -> bool {
        self.isolated
    }

    pub fn root_fragment(&self) -> FragmentId {
        self.root_fragment
    }

    pub fn interpolators(&self) -> &Registry {
        &self.interpolators
    }

    pub fn interpolators_mut(&mut self) -> &mut Registry {
        &mut self.interpolators
    }
}

/// An instance seen as a plugin source: its own registry, the defaults,
/// then each non-isolated container in turn.
#[derive(Debug, Clone, Copy)]
pub struct InstanceScope<'a> {
    tree: &'a ViewTree,
    instance: InstanceId,
}

impl<'a> InstanceScope<'a> {
    pub(crate) fn new(tree: &'a ViewTree, instance: InstanceId) -> Self {
        Self { tree, instance }
    }
}

impl InterpolatorSource for InstanceScope<'_> {
    fn find_interpolator(&self, name: &str) -> Option<NamedInterpolator> {
        let mut current = self.tree.instance(self.instance);

        while let Some(instance) = current {
            if let Some(found) = instance
                .interpolators
                .get(name)
                .or_else(|| default_interpolator(name))
            {
                trace!(interpolator = name, instance = %instance.id, "found interpolator");
                return Some(found);
            }
            if instance.isolated {
                return None;
            }
            current = instance.container.and_then(|id| self.tree.instance(id));
        }

        None
    }
}
