//! Trellis Core
//!
//! This crate provides the reactive-binding core of the Trellis templating
//! engine. It implements:
//!
//! - Live cells and view-models (mappings, computations, subscriptions)
//! - The view hierarchy arena (instances, fragments, repeated sections)
//! - Ambiguous reference resolution across iterations and components
//! - Interpolator dispatch for transitions
//!
//! Template parsing, DOM patching and scheduling live elsewhere; they build
//! the `ViewTree` and consume the cells and interpolators produced here.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `model`: Live cells, view-models and computations
//! - `view`: The fragment/instance arena and the reference resolver
//! - `interpolate`: Generic and named interpolators
//! - `error`: The crate-wide error type
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use trellis_core::view::{InstanceOptions, ViewTree};
//!
//! let mut tree = ViewTree::new();
//! let app = tree.create_instance(InstanceOptions::new(json!({ "items": ["a", "b"] })));
//! let root = tree.instance(app).unwrap().root_fragment();
//! let items = tree.instance(app).unwrap().viewmodel().join_key("items");
//!
//! // {{#each items:i}}
//! let section = tree.add_section(root, items, None, Some("i"))?;
//! let row = tree.add_iteration(section, 1)?;
//!
//! let index = tree.resolve_ambiguous_reference(row, "i")?.unwrap();
//! assert_eq!(index.get(), json!(1));
//!
//! // Animate between two values.
//! let step = tree.interpolate(&json!(0), &json!(10), app, None)?;
//! assert_eq!(step(0.5), json!(5));
//! ```

pub mod error;
pub mod interpolate;
pub mod model;
pub mod view;

pub use error::{Error, Result};
pub use interpolate::{interpolate, snap, Interpolator};
pub use model::{Model, ViewModel};
pub use view::{resolve_ambiguous_reference, FragmentId, InstanceId, ViewTree};
