//! Error types shared by the resolver, the live cells and the interpolators.

use thiserror::Error;

use crate::view::{FragmentId, InstanceId};

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while binding or animating a template.
///
/// Unresolved references and value pairs that no interpolator can handle are
/// not errors: they degrade to `None` and to a snap respectively.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An index or key alias was addressed with child properties (`i.foo`).
    #[error("An index or key reference ({key}) cannot have child properties")]
    BadReference { key: String },

    /// A named plugin was requested but no instance in the hierarchy has it.
    #[error("Missing \"{name}\" {kind} plugin")]
    MissingPlugin { name: String, kind: &'static str },

    /// The cell is derived (a computation or an iteration alias).
    #[error("Cannot set read-only keypath '{keypath}'")]
    ReadOnly { keypath: String },

    /// An ancestor of the cell no longer exists.
    #[error("Cannot set '{keypath}': the cell is detached from its view-model")]
    Detached { keypath: String },

    /// A write would grow an array to an unreasonable length.
    #[error("Cannot set '{keypath}': array index {index} is too large")]
    IndexTooLarge { keypath: String, index: usize },

    #[error("Unknown fragment {0}")]
    UnknownFragment(FragmentId),

    #[error("Unknown instance {0}")]
    UnknownInstance(InstanceId),

    /// Iterations can only be attached to a repeated section.
    #[error("Fragment {0} is not a repeated section")]
    NotASection(FragmentId),
}

impl Error {
    pub(crate) fn bad_reference(key: &str) -> Self {
        Error::BadReference {
            key: key.to_string(),
        }
    }

    pub(crate) fn missing_interpolator(name: &str) -> Self {
        Error::MissingPlugin {
            name: name.to_string(),
            kind: "interpolator",
        }
    }
}
