//! Fragments
//!
//! A fragment is one node of the live render tree, positioned at a specific
//! point in a template's expansion. Fragments live in the `ViewTree` arena
//! and point at each other by `FragmentId`.
//!
//! Two kinds of outward edge matter to the resolver:
//!
//! - `parent`: the lexically enclosing fragment within the same instance;
//! - `component_parent`: set only on a component's root fragment, pointing
//!   at the container fragment the component is mounted in.

use std::fmt;

use super::context::Context;
use super::instance::InstanceId;

/// Index of a fragment in its `ViewTree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FragmentId(usize);

impl FragmentId {
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

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a fragment renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentKind {
    /// Ordinary content: an instance root, an element body, a `{{#with}}`.
    Plain,

    /// A repeated section (`{{#each items:i}}`). Owns the alias names its
    /// iterations expose. Its context is the iterated cell.
    Section {
        key_ref: Option<String>,
        index_ref: Option<String>,
    },

    /// One row of a repeated section. Its lexical parent is the section and
    /// its context is the row cell.
    Iteration { index: usize },
}

/// One node of the render tree.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub(crate) id: FragmentId,
    pub(crate) instance: InstanceId,
    pub(crate) parent: Option<FragmentId>,
    pub(crate) component_parent: Option<FragmentId>,
    pub(crate) context: Option<Context>,
    pub(crate) kind: FragmentKind,
    pub(crate) is_root: bool,
}

impl Fragment {
    pub fn id(&self) -> FragmentId {
        self.id
    }

    /// The instance whose template this fragment belongs to.
    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    pub fn parent(&self) -> Option<FragmentId> {
        self.parent
    }

    pub fn component_parent(&self) -> Option<FragmentId> {
        self.component_parent
    }

    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    pub fn kind(&self) -> &FragmentKind {
        &self.kind
    }

    /// True only for an instance's topmost fragment.
    pub fn is_root(&self) -> bool {
        self.is_root
    }

    pub fn is_iteration(&self) -> bool {
        matches!(self.kind, FragmentKind::Iteration { .. })
    }

    /// Row index, for iterations.
    pub fn index(&self) -> Option<usize> {
        match self.kind {
            FragmentKind::Iteration { index } => Some(index),
            _ => None,
        }
    }

    /// Key alias name, for sections.
    pub fn key_ref(&self) -> Option<&str> {
        match &self.kind {
            FragmentKind::Section { key_ref, .. } => key_ref.as_deref(),
            _ => None,
        }
    }

    /// Index alias name, for sections.
    pub fn index_ref(&self) -> Option<&str> {
        match &self.kind {
            FragmentKind::Section { index_ref, .. } => index_ref.as_deref(),
            _ => None,
        }
    }
}
