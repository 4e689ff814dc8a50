//! Live Cells
//!
//! A `Model` is one addressable, observable storage location: the root of a
//! view-model's data, a child reached by joining a key onto another cell, a
//! computed cell, or the opaque alias standing in for an iteration's key or
//! index.
//!
//! # Identity
//!
//! Children are created lazily on first join and cached on their parent, so
//! joining the same path twice from the same root yields the same `Model`.
//! Models compare by identity: two handles are equal when they point at the
//! same cell.
//!
//! # Storage
//!
//! Only root cells own data. A child reads through its ancestors by key
//! (numeric keys index into arrays). Writes go to the root's value at the
//! child's path, creating intermediate objects as needed, and then notify
//! every ancestor, the cell itself, and every cached descendant.
//!
//! Parents are held weakly by their children and view-models weakly by
//! their cells, so a view-model owns its whole tree.

use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::{Map, Value};

use super::computation::Computation;
use super::subscriber::SubscriberId;
use super::viewmodel::ViewModel;
use crate::error::{Error, Result};

/// Arrays are never grown past this length by a write.
const MAX_ARRAY_LEN: usize = 1 << 24;

/// Counter for generating unique model IDs.
static MODEL_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_model_id() -> u64 {
    MODEL_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

type Notifier = Box<dyn Fn() + Send + Sync>;

/// Handle to a live cell. Cloning the handle shares the cell.
#[derive(Clone)]
pub struct Model {
    inner: Arc<ModelInner>,
}

pub(crate) struct ModelInner {
    id: u64,
    kind: ModelKind,

    /// The view-model this cell belongs to.
    root: Weak<ViewModel>,

    /// Children created by `join_key`, keyed by segment.
    children: RwLock<IndexMap<String, Model>>,

    /// Alias cells handed to iterations over this cell.
    key_model: OnceLock<Model>,
    index_models: RwLock<IndexMap<usize, Model>>,

    notifiers: RwLock<Vec<(SubscriberId, Notifier)>>,
}

enum ModelKind {
    /// Owns the data of a view-model.
    Root { data: RwLock<Value> },

    /// Reads `key` out of its parent's value.
    Child { parent: Weak<ModelInner>, key: String },

    Computed(Computation),

    /// An iteration's key or index. Opaque and read-only.
    Alias { value: Value, label: String },
}

impl Model {
    fn new(kind: ModelKind, root: Weak<ViewModel>) -> Self {
        Self {
            inner: Arc::new(ModelInner {
                id: next_model_id(),
                kind,
                root,
                children: RwLock::new(IndexMap::new()),
                key_model: OnceLock::new(),
                index_models: RwLock::new(IndexMap::new()),
                notifiers: RwLock::new(Vec::new()),
            }),
        }
    }

    pub(crate) fn root_cell(root: Weak<ViewModel>, data: Value) -> Self {
        Self::new(
            ModelKind::Root {
                data: RwLock::new(data),
            },
            root,
        )
    }

    pub(crate) fn computed(root: Weak<ViewModel>, computation: Computation) -> Self {
        Self::new(ModelKind::Computed(computation), root)
    }

    pub(crate) fn downgrade(&self) -> Weak<ModelInner> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn upgrade(inner: &Weak<ModelInner>) -> Option<Self> {
        inner.upgrade().map(|inner| Self { inner })
    }

    /// Get the model's unique ID.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// True when both handles point at the same cell.
    pub fn ptr_eq(a: &Model, b: &Model) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// The view-model that owns this cell, if it is still alive.
    pub fn root(&self) -> Option<Arc<ViewModel>> {
        self.inner.root.upgrade()
    }

    /// The parent cell, for cells created by `join_key`.
    pub fn parent(&self) -> Option<Model> {
        match &self.inner.kind {
            ModelKind::Child { parent, .. } => Model::upgrade(parent),
            _ => None,
        }
    }

    /// The segment this cell was joined under, for child cells.
    pub fn key(&self) -> Option<&str> {
        match &self.inner.kind {
            ModelKind::Child { key, .. } => Some(key),
            _ => None,
        }
    }

    /// The computation behind a computed cell.
    pub fn computation(&self) -> Option<&Computation> {
        match &self.inner.kind {
            ModelKind::Computed(computation) => Some(computation),
            _ => None,
        }
    }

    /// Dotted path from the owning root. Computed cells render as
    /// `${signature}`, aliases as `<row>.@key` / `<row>.@index`.
    pub fn keypath(&self) -> String {
        match &self.inner.kind {
            ModelKind::Root { .. } => String::new(),
            ModelKind::Child { parent, key } => match Model::upgrade(parent) {
                Some(parent) => {
                    let base = parent.keypath();
                    if base.is_empty() {
                        key.clone()
                    } else {
                        format!("{base}.{key}")
                    }
                }
                None => key.clone(),
            },
            ModelKind::Computed(computation) => format!("${{{}}}", computation.signature()),
            ModelKind::Alias { label, .. } => label.clone(),
        }
    }

    /// Current value. Missing paths read as `null`.
    pub fn get(&self) -> Value {
        self.inspect(|value| value.cloned().unwrap_or(Value::Null))
    }

    /// True if `key` is a direct member of this cell's value: an object
    /// property, or an in-bounds index of an array.
    pub fn has(&self, key: &str) -> bool {
        self.inspect(|value| match value {
            Some(Value::Object(map)) => map.contains_key(key),
            Some(Value::Array(items)) => key.parse::<usize>().is_ok_and(|i| i < items.len()),
            _ => false,
        })
    }

    /// Write a value at this cell's path and notify subscribers.
    ///
    /// Writing past the end of an array pads it with `null`. An index that
    /// would grow the array beyond `MAX_ARRAY_LEN` elements is rejected with
    /// `Error::IndexTooLarge` and leaves the data untouched.
    pub fn set(&self, value: Value) -> Result<()> {
        let Some((base, path)) = self.base_and_path() else {
            return Err(Error::Detached {
                keypath: self.keypath(),
            });
        };

        match &base.kind {
            ModelKind::Root { data } => {
                let mut data = data.write();
                let slot = slot_mut(&mut data, &path).map_err(|index| Error::IndexTooLarge {
                    keypath: self.keypath(),
                    index,
                })?;
                *slot = value;
            }
            _ => {
                return Err(Error::ReadOnly {
                    keypath: self.keypath(),
                })
            }
        }

        self.notify_tree();
        Ok(())
    }

    /// The single-level child cell for `key`.
    pub fn join_key(&self, key: &str) -> Model {
        if let Some(child) = self.inner.children.read().get(key) {
            return child.clone();
        }

        self.inner
            .children
            .write()
            .entry(key.to_string())
            .or_insert_with(|| {
                Model::new(
                    ModelKind::Child {
                        parent: Arc::downgrade(&self.inner),
                        key: key.to_string(),
                    },
                    self.inner.root.clone(),
                )
            })
            .clone()
    }

    /// The cell for a whole path below this one. An empty path is `self`.
    pub fn join_all<S: AsRef<str>>(&self, keys: &[S]) -> Model {
        keys.iter()
            .fold(self.clone(), |model, key| model.join_key(key.as_ref()))
    }

    /// Alias cell holding this cell's own key, as seen by an iteration row.
    ///
    /// Rows of an array get a numeric key, rows of an object a string key.
    pub fn key_model(&self) -> Model {
        self.inner
            .key_model
            .get_or_init(|| self.alias(self.own_key(), "@key"))
            .clone()
    }

    /// Alias cell holding `index`, as seen by an iteration row.
    pub fn index_model(&self, index: usize) -> Model {
        if let Some(model) = self.inner.index_models.read().get(&index) {
            return model.clone();
        }

        self.inner
            .index_models
            .write()
            .entry(index)
            .or_insert_with(|| self.alias(Value::from(index), "@index"))
            .clone()
    }

    /// Register a callback invoked whenever this cell may have changed.
    pub fn subscribe<F>(&self, subscriber_id: SubscriberId, notify: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner
            .notifiers
            .write()
            .push((subscriber_id, Box::new(notify)));
    }

    pub fn unsubscribe(&self, subscriber_id: SubscriberId) {
        self.inner
            .notifiers
            .write()
            .retain(|(id, _)| *id != subscriber_id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.notifiers.read().len()
    }

    /// Mark a computed cell dirty and tell everything below it.
    pub(crate) fn invalidate(&self) {
        if let ModelKind::Computed(computation) = &self.inner.kind {
            computation.mark_dirty();
        }
        self.notify_downstream();
    }

    fn alias(&self, value: Value, suffix: &str) -> Model {
        let row = self.keypath();
        let label = if row.is_empty() {
            suffix.to_string()
        } else {
            format!("{row}.{suffix}")
        };
        Model::new(ModelKind::Alias { value, label }, self.inner.root.clone())
    }

    fn own_key(&self) -> Value {
        let ModelKind::Child { parent, key } = &self.inner.kind else {
            return Value::Null;
        };
        let in_array = Model::upgrade(parent)
            .is_some_and(|parent| parent.inspect(|value| matches!(value, Some(Value::Array(_)))));

        match key.parse::<u64>() {
            Ok(index) if in_array => Value::from(index),
            _ => Value::String(key.clone()),
        }
    }

    /// Walk up to the cell that actually holds a value, collecting the path.
    /// `None` when an ancestor has been dropped.
    fn base_and_path(&self) -> Option<(Arc<ModelInner>, Vec<String>)> {
        let mut path = Vec::new();
        let mut current = Arc::clone(&self.inner);

        loop {
            let parent = match &current.kind {
                ModelKind::Child { parent, key } => {
                    path.push(key.clone());
                    parent.upgrade()?
                }
                _ => break,
            };
            current = parent;
        }

        path.reverse();
        Some((current, path))
    }

    pub(crate) fn inspect<R>(&self, f: impl FnOnce(Option<&Value>) -> R) -> R {
        let Some((base, path)) = self.base_and_path() else {
            return f(None);
        };

        match &base.kind {
            ModelKind::Root { data } => {
                let data = data.read();
                f(lookup(&data, &path))
            }
            ModelKind::Computed(computation) => {
                let value = computation.get();
                f(lookup(&value, &path))
            }
            ModelKind::Alias { value, .. } => f(lookup(value, &path)),
            ModelKind::Child { .. } => f(None),
        }
    }

    fn notify_subscribers(&self) {
        let notifiers = self.inner.notifiers.read();
        for (_, notify) in notifiers.iter() {
            notify();
        }
    }

    fn notify_downstream(&self) {
        self.notify_subscribers();

        let children: Vec<Model> = self.inner.children.read().values().cloned().collect();
        for child in children {
            child.notify_downstream();
        }
    }

    fn notify_tree(&self) {
        let mut ancestor = self.parent();
        while let Some(model) = ancestor {
            model.notify_subscribers();
            ancestor = model.parent();
        }
        self.notify_downstream();
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        Model::ptr_eq(self, other)
    }
}

impl Eq for Model {}

impl Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("id", &self.inner.id)
            .field("keypath", &self.keypath())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

fn member<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn lookup<'a>(value: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |value, key| member(value, key))
}

/// The slot at `path`, or the offending index if an array would have to grow
/// past `MAX_ARRAY_LEN`.
///
/// Arrays only occur along the part of the path that already exists, so a
/// rejected index is found before anything has been written.
fn slot_mut<'a>(mut value: &'a mut Value, path: &[String]) -> std::result::Result<&'a mut Value, usize> {
    for key in path {
        value = child_slot(value, key)?;
    }
    Ok(value)
}

/// The slot for `key` inside `value`, growing arrays and replacing scalars
/// with empty objects on the way.
fn child_slot<'a>(value: &'a mut Value, key: &str) -> std::result::Result<&'a mut Value, usize> {
    let index = match &*value {
        Value::Array(_) => key.parse::<usize>().ok(),
        _ => None,
    };
    if let Some(index) = index.filter(|&index| index >= MAX_ARRAY_LEN) {
        return Err(index);
    }
    if index.is_none() && !value.is_object() {
        *value = Value::Object(Map::new());
    }

    match (value, index) {
        (Value::Array(items), Some(index)) => {
            if index >= items.len() {
                items.resize(index + 1, Value::Null);
            }
            Ok(&mut items[index])
        }
        (Value::Object(map), _) => Ok(map.entry(key).or_insert(Value::Null)),
        (other, _) => Ok(other),
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
