//! View Hierarchy and Reference Resolution
//!
//! This module models the live render tree the resolver walks, and the
//! resolver itself.
//!
//! # Overview
//!
//! The `ViewTree` is an arena of instances and fragments:
//!
//! - An `Instance` is one mounted template with its own `ViewModel`. A
//!   component instance records the container it was mounted in.
//! - A `Fragment` is a node of the render tree. It may carry a `Context`
//!   (the scope it renders against), may be a repeated section or one of its
//!   iterations, and, at a component's root, links to the container fragment.
//!
//! Template references are bound with `ViewTree::resolve_ambiguous_reference`,
//! which walks fragments outward across iterations and component boundaries.
//! See `resolve` for the precedence rules.

mod context;
mod fragment;
mod instance;
mod resolve;
mod tree;

pub use context::Context;
pub use fragment::{Fragment, FragmentId, FragmentKind};
pub use instance::{Instance, InstanceId, InstanceOptions, InstanceScope};
pub use resolve::resolve_ambiguous_reference;
pub use tree::ViewTree;
