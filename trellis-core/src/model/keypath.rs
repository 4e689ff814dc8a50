//! Keypaths
//!
//! A template reference such as `user.address.city` is split on `.` into a
//! leading *key* (`user`) and a child path (`address.city`). The resolver
//! decides where the key lives; the child path is then joined onto whatever
//! cell the key resolved to.
//!
//! References are short, so segments are kept inline in a `SmallVec`.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Segments stored inline before spilling to the heap.
const INLINE_SEGMENTS: usize = 4;

/// A reference split into its dotted segments.
///
/// Always has at least one segment: parsing the empty string yields a single
/// empty key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Keypath {
    segments: SmallVec<[String; INLINE_SEGMENTS]>,
}

impl Keypath {
    /// Split a reference on `.`.
    pub fn parse(reference: &str) -> Self {
        Self {
            segments: reference.split('.').map(str::to_string).collect(),
        }
    }

    /// The leading segment.
    pub fn key(&self) -> &str {
        &self.segments[0]
    }

    /// Everything after the key.
    pub fn rest(&self) -> &[String] {
        &self.segments[1..]
    }

    /// All segments, key included.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True when the reference is a bare key with no child path.
    pub fn is_single(&self) -> bool {
        self.segments.len() == 1
    }

    /// Keypaths are never empty; provided for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for Keypath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl From<&str> for Keypath {
    fn from(reference: &str) -> Self {
        Self::parse(reference)
    }
}

impl From<String> for Keypath {
    fn from(reference: String) -> Self {
        Self::parse(&reference)
    }
}

impl From<Keypath> for String {
    fn from(keypath: Keypath) -> Self {
        keypath.to_string()
    }
}
