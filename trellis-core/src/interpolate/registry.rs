//! Interpolator Registries
//!
//! Named interpolators are plugins: an instance can register its own, and a
//! process-wide default registry holds the ones every instance can see
//! (`number`, `array` and `object` are pre-registered there).
//!
//! Lookup goes through the `InterpolatorSource` trait, so the dispatcher does
//! not care whether it is asking a single registry or a whole chain of
//! container instances.

use std::fmt::{self, Debug};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use indexmap::IndexMap;
use serde_json::Value;

use super::{builtin, Interpolator};

/// A named interpolator plugin. Returns `None` to decline a pair of values.
pub type NamedInterpolator = Arc<dyn Fn(&Value, &Value) -> Option<Interpolator> + Send + Sync>;

/// Anything that can find a named interpolator.
pub trait InterpolatorSource {
    fn find_interpolator(&self, name: &str) -> Option<NamedInterpolator>;
}

// Process-wide default interpolators.
static DEFAULTS: OnceLock<DashMap<String, NamedInterpolator>> = OnceLock::new();

fn defaults() -> &'static DashMap<String, NamedInterpolator> {
    DEFAULTS.get_or_init(|| {
        let map: DashMap<String, NamedInterpolator> = DashMap::new();
        map.insert("number".to_string(), Arc::new(builtin::number));
        map.insert("array".to_string(), Arc::new(builtin::array));
        map.insert("object".to_string(), Arc::new(builtin::object));
        map
    })
}

/// Register an interpolator every instance can see.
pub fn register_default_interpolator<F>(name: &str, interpolator: F)
where
    F: Fn(&Value, &Value) -> Option<Interpolator> + Send + Sync + 'static,
{
    defaults().insert(name.to_string(), Arc::new(interpolator));
}

/// Look up a default interpolator by name.
pub fn default_interpolator(name: &str) -> Option<NamedInterpolator> {
    defaults().get(name).map(|entry| Arc::clone(entry.value()))
}

/// The default registry on its own, for callers with no owning instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct Defaults;

impl InterpolatorSource for Defaults {
    fn find_interpolator(&self, name: &str) -> Option<NamedInterpolator> {
        default_interpolator(name)
    }
}

/// Interpolators registered on one instance.
#[derive(Clone, Default)]
pub struct Registry {
    entries: IndexMap<String, NamedInterpolator>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: &str, interpolator: F)
    where
        F: Fn(&Value, &Value) -> Option<Interpolator> + Send + Sync + 'static,
    {
        self.entries.insert(name.to_string(), Arc::new(interpolator));
    }

    pub fn get(&self, name: &str) -> Option<NamedInterpolator> {
        self.entries.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A registry on its own sees its entries first, then the defaults.
impl InterpolatorSource for Registry {
    fn find_interpolator(&self, name: &str) -> Option<NamedInterpolator> {
        self.get(name).or_else(|| default_interpolator(name))
    }
}

impl Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}
