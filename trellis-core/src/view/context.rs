//! Context Chains
//!
//! A fragment's context is the scope its template section renders against:
//! the instance's view-model at a root fragment, or some data cell below it
//! (`{{#with user}}`, an `{{#each}}` row). The resolver only needs three
//! things from a context: membership (`has`), single-level join and full-path
//! join.

use std::sync::Arc;

use crate::model::{Model, ViewModel};

/// The scope a fragment is bound to.
#[derive(Debug, Clone)]
pub enum Context {
    /// A data cell somewhere below a view-model.
    Model(Model),

    /// An instance's root scope. Membership and joins see its mappings and
    /// computations as well as its data.
    Root(Arc<ViewModel>),
}

impl Context {
    /// True if `key` is a direct member of this scope.
    pub fn has(&self, key: &str) -> bool {
        match self {
            Context::Model(model) => model.has(key),
            Context::Root(viewmodel) => viewmodel.has(key),
        }
    }

    pub fn join_key(&self, key: &str) -> Model {
        match self {
            Context::Model(model) => model.join_key(key),
            Context::Root(viewmodel) => viewmodel.join_key(key),
        }
    }

    pub fn join_all<S: AsRef<str>>(&self, keys: &[S]) -> Model {
        match self {
            Context::Model(model) => model.join_all(keys),
            Context::Root(viewmodel) => viewmodel.join_all(keys),
        }
    }

    /// The view-model owning this scope.
    ///
    /// For a data cell this is the view-model the cell belongs to, which is
    /// not necessarily the instance rendering it: a mapped cell belongs to
    /// the container.
    pub fn root(&self) -> Option<Arc<ViewModel>> {
        match self {
            Context::Model(model) => model.root(),
            Context::Root(viewmodel) => Some(Arc::clone(viewmodel)),
        }
    }

    /// The cell behind this scope.
    pub fn model(&self) -> &Model {
        match self {
            Context::Model(model) => model,
            Context::Root(viewmodel) => viewmodel.model(),
        }
    }

    /// Key alias for an iteration row bound to this scope.
    pub fn key_model(&self) -> Model {
        self.model().key_model()
    }

    /// Index alias for an iteration row bound to this scope.
    pub fn index_model(&self, index: usize) -> Model {
        self.model().index_model(index)
    }
}

impl From<Model> for Context {
    fn from(model: Model) -> Self {
        Context::Model(model)
    }
}

impl From<Arc<ViewModel>> for Context {
    fn from(viewmodel: Arc<ViewModel>) -> Self {
        Context::Root(viewmodel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn root_context_sees_mappings() {
        let container = ViewModel::new(json!({ "theme": "dark" }));
        let viewmodel = ViewModel::new(json!({ "local": true }));
        viewmodel.map("theme", container.join_key("theme"));

        let context = Context::from(Arc::clone(&viewmodel));
        assert!(context.has("theme"));
        assert!(context.has("local"));
        assert_eq!(context.join_key("theme").get(), json!("dark"));
        assert!(Arc::ptr_eq(&context.root().unwrap(), &viewmodel));
    }

    #[test]
    fn model_context_root_is_the_owning_viewmodel() {
        let container = ViewModel::new(json!({ "user": { "name": "Ada" } }));
        let context = Context::from(container.join_key("user"));

        assert!(context.has("name"));
        assert!(!context.has("user"));
        assert_eq!(context.join_all(&["name"]).keypath(), "user.name");
        assert!(Arc::ptr_eq(&context.root().unwrap(), &container));
    }
}
