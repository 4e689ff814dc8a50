//! View Tree
//!
//! The arena holding every instance and fragment of a render. Nodes refer to
//! each other by `InstanceId` / `FragmentId`, so the resolver can walk the
//! tree through a shared borrow while mutating only view-model name tables.
//!
//! The tree is built by the (external) renderer as it expands templates:
//!
//! 1. `create_instance` for a standalone root, `mount_component` for a
//!    component placed inside a container fragment. Both create the
//!    instance's root fragment, bound to its view-model.
//! 2. `add_fragment` for nested content, optionally with its own context.
//! 3. `add_section` for a repeated block and `add_iteration` for each row.

use serde_json::Value;
use tracing::debug;

use super::context::Context;
use super::fragment::{Fragment, FragmentId, FragmentKind};
use super::instance::{Instance, InstanceId, InstanceOptions, InstanceScope};
use crate::error::{Error, Result};
use crate::interpolate::{interpolate, Interpolator};
use crate::model::{Model, ViewModel};

/// Arena of instances and fragments.
#[derive(Debug, Default)]
pub struct ViewTree {
    instances: Vec<Instance>,
    fragments: Vec<Fragment>,
}

impl ViewTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a standalone instance.
    pub fn create_instance(&mut self, options: InstanceOptions) -> InstanceId {
        self.push_instance(options, None, None)
    }

    /// Mount a component inside the container fragment `host`.
    pub fn mount_component(
        &mut self,
        host: FragmentId,
        options: InstanceOptions,
    ) -> Result<InstanceId> {
        let container = self.get_fragment(host)?.instance;
        Ok(self.push_instance(options, Some(container), Some(host)))
    }

    /// Add a nested fragment. Without a context it renders against whatever
    /// its ancestors render against.
    pub fn add_fragment(
        &mut self,
        parent: FragmentId,
        context: Option<Context>,
    ) -> Result<FragmentId> {
        self.push_child(parent, context, FragmentKind::Plain)
    }

    /// Add a repeated section over `iterable`, exposing the given alias names
    /// to its rows.
    pub fn add_section(
        &mut self,
        parent: FragmentId,
        iterable: Model,
        key_ref: Option<&str>,
        index_ref: Option<&str>,
    ) -> Result<FragmentId> {
        self.push_child(
            parent,
            Some(Context::Model(iterable)),
            FragmentKind::Section {
                key_ref: key_ref.map(str::to_string),
                index_ref: index_ref.map(str::to_string),
            },
        )
    }

    /// Add row `index` to a section.
    ///
    /// The row is bound to the `index`-th member of the iterated cell: the
    /// element of an array, or the value under the `index`-th key of an
    /// object.
    pub fn add_iteration(&mut self, section: FragmentId, index: usize) -> Result<FragmentId> {
        let fragment = self.get_fragment(section)?;
        let (FragmentKind::Section { .. }, Some(iterable)) = (&fragment.kind, &fragment.context)
        else {
            return Err(Error::NotASection(section));
        };

        let iterable = iterable.model();
        let key = iterable
            .inspect(|value| match value {
                Some(Value::Object(map)) => map.keys().nth(index).cloned(),
                _ => None,
            })
            .unwrap_or_else(|| index.to_string());
        let row = iterable.join_key(&key);

        self.push_child(
            section,
            Some(Context::Model(row)),
            FragmentKind::Iteration { index },
        )
    }

    pub fn fragment(&self, id: FragmentId) -> Option<&Fragment> {
        self.fragments.get(id.index())
    }

    pub fn instance(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(id.index())
    }

    pub fn instance_mut(&mut self, id: InstanceId) -> Option<&mut Instance> {
        self.instances.get_mut(id.index())
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// The nearest context at or above `id`, following lexical parents only.
    pub fn find_context(&self, id: FragmentId) -> Option<&Context> {
        let mut current = self.fragment(id);
        while let Some(fragment) = current {
            if let Some(context) = &fragment.context {
                return Some(context);
            }
            current = fragment.parent.and_then(|parent| self.fragment(parent));
        }
        None
    }

    /// `instance` as a named-interpolator source.
    pub fn scope(&self, instance: InstanceId) -> Result<InstanceScope<'_>> {
        self.get_instance(instance)?;
        Ok(InstanceScope::new(self, instance))
    }

    /// Pick an interpolator for a transition owned by `owner`.
    pub fn interpolate(
        &self,
        from: &Value,
        to: &Value,
        owner: InstanceId,
        named: Option<&str>,
    ) -> Result<Interpolator> {
        interpolate(from, to, &self.scope(owner)?, named)
    }

    pub(crate) fn get_fragment(&self, id: FragmentId) -> Result<&Fragment> {
        self.fragment(id).ok_or(Error::UnknownFragment(id))
    }

    pub(crate) fn get_instance(&self, id: InstanceId) -> Result<&Instance> {
        self.instance(id).ok_or(Error::UnknownInstance(id))
    }

    fn push_instance(
        &mut self,
        options: InstanceOptions,
        container: Option<InstanceId>,
        component_parent: Option<FragmentId>,
    ) -> InstanceId {
        let id = InstanceId::new(self.instances.len());
        let root_fragment = FragmentId::new(self.fragments.len());
        let viewmodel = ViewModel::new(options.data);
        let name = options.name.unwrap_or_else(|| format!("instance{}", id.raw()));

        self.fragments.push(Fragment {
            id: root_fragment,
            instance: id,
            parent: None,
            component_parent,
            context: Some(Context::Root(viewmodel.clone())),
            kind: FragmentKind::Plain,
            is_root: true,
        });
        self.instances.push(Instance {
            id,
            name,
            viewmodel,
            container,
            isolated: options.isolated,
            root_fragment,
            interpolators: options.interpolators,
        });

        debug!(
            instance = %id,
            container = ?container,
            isolated = options.isolated,
            "created instance"
        );
        id
    }

    fn push_child(
        &mut self,
        parent: FragmentId,
        context: Option<Context>,
        kind: FragmentKind,
    ) -> Result<FragmentId> {
        let instance = self.get_fragment(parent)?.instance;
        let id = FragmentId::new(self.fragments.len());

        self.fragments.push(Fragment {
            id,
            instance,
            parent: Some(parent),
            component_parent: None,
            context,
            kind,
            is_root: false,
        });
        Ok(id)
    }
}
