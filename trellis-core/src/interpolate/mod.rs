//! Interpolator Dispatch
//!
//! Transitions animate a bound value from one resolved value to another. The
//! dispatcher picks the function that produces the intermediate values.
//!
//! # Dispatch Order
//!
//! 1. Equal values snap: the result is a constant function returning `to`.
//!
//! 2. A named interpolator, when one is requested, is looked up through the
//!    owner (for an instance: its own registry, the defaults, then its
//!    containers). If it declines the pair the result snaps. If no level
//!    knows the name, dispatch fails with `Error::MissingPlugin`.
//!
//! 3. Otherwise the generic chain is tried in order: number, array, object.
//!    The first that accepts the pair wins; if none does, the result snaps.
//!
//! Every returned function is pure: it only reads the values it closed over,
//! so it can be sampled any number of times with progress in `[0, 1]`.

pub mod builtin;
mod registry;

use std::sync::Arc;

use serde_json::Value;
use tracing::{error, trace};

use crate::error::{Error, Result};

pub use registry::{
    default_interpolator, register_default_interpolator, Defaults, InterpolatorSource,
    NamedInterpolator, Registry,
};

/// Produces the value at a given progress.
pub type Interpolator = Arc<dyn Fn(f64) -> Value + Send + Sync>;

/// A constant interpolator that always yields `to`.
pub fn snap(to: Value) -> Interpolator {
    Arc::new(move |_: f64| to.clone())
}

/// Pick an interpolator for animating `from` into `to`.
pub fn interpolate<S>(
    from: &Value,
    to: &Value,
    owner: &S,
    named: Option<&str>,
) -> Result<Interpolator>
where
    S: InterpolatorSource + ?Sized,
{
    if from == to {
        return Ok(snap(to.clone()));
    }

    if let Some(name) = named {
        let Some(plugin) = owner.find_interpolator(name) else {
            error!(interpolator = name, "missing interpolator plugin");
            return Err(Error::missing_interpolator(name));
        };

        return Ok(plugin(from, to).unwrap_or_else(|| {
            trace!(interpolator = name, "named interpolator declined, snapping");
            snap(to.clone())
        }));
    }

    Ok(builtin::generic(from, to).unwrap_or_else(|| snap(to.clone())))
}
