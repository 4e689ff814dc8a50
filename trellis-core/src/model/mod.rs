//! Live Cells and View-Models
//!
//! This module implements the data side of the binding core: the cells a
//! template reference ultimately resolves to.
//!
//! # Concepts
//!
//! ## Models
//!
//! A `Model` is one addressable storage location reached by a dotted keypath.
//! Cells are created lazily by joining keys onto other cells and are cached,
//! so a keypath always names one cell per view-model.
//!
//! ## View-Models
//!
//! A `ViewModel` owns the data of one instance plus two name tables:
//! mappings (aliases to cells elsewhere) and computations (derived cells).
//! Names in either table shadow same-named data.
//!
//! ## Computations
//!
//! A `Computation` is a cached getter over explicit dependency cells. It is
//! marked dirty when a dependency changes and re-runs on the next read.

mod cell;
mod computation;
mod keypath;
mod subscriber;
mod viewmodel;

pub use cell::Model;
pub use computation::{Computation, ComputationState, Getter};
pub use keypath::Keypath;
pub use subscriber::SubscriberId;
pub use viewmodel::ViewModel;
