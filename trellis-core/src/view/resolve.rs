//! Reference Resolution
//!
//! Binds an ambiguous template reference (`foo.bar`, an index alias, a
//! computed name) to the cell it denotes at a given fragment.
//!
//! # Algorithm
//!
//! Resolution runs in three separate phases, in fixed precedence:
//!
//! 1. **Local names.** If the leading key is mapped or computed on the local
//!    view-model, that cell is the base and the child path is joined onto
//!    it. Nothing in an enclosing scope can shadow a local name.
//!
//! 2. **Ascent.** Walk outward from the fragment. An iteration whose section
//!    aliases the key answers with its key or index cell. A fragment whose
//!    context has the key answers with the context's cell for the full path.
//!    From a component's root fragment the walk continues into the
//!    container's fragment (unless the component is isolated), otherwise it
//!    follows the lexical parent. A match found after crossing a component
//!    boundary is also mapped into the local view-model, so the next lookup
//!    of the same key from this scope stops at phase 1.
//!
//! 3. **Fallback.** If the walk never met a real data scope (only the root
//!    of a standalone instance), the reference is joined onto the local
//!    view-model. If it did meet one and nothing claimed the key, the
//!    reference is unresolved.

use std::sync::Arc;

use tracing::{debug, trace};

use super::fragment::{Fragment, FragmentId, FragmentKind};
use super::tree::ViewTree;
use crate::error::{Error, Result};
use crate::model::{Keypath, Model, ViewModel};

/// Outcome of the ascent phase.
enum Ascent {
    Found(Model),
    Exhausted { has_context_chain: bool },
}

impl ViewTree {
    /// Resolve `reference` as seen from `fragment`.
    ///
    /// Returns `Ok(None)` when a data scope exists along the way but none of
    /// them has the key. Fails with `Error::BadReference` when an index or key
    /// alias is given a child path.
    pub fn resolve_ambiguous_reference(
        &self,
        fragment: FragmentId,
        reference: &str,
    ) -> Result<Option<Model>> {
        resolve_ambiguous_reference(self, fragment, reference)
    }
}

/// Resolve `reference` as seen from `fragment`. See the module docs.
pub fn resolve_ambiguous_reference(
    tree: &ViewTree,
    fragment: FragmentId,
    reference: &str,
) -> Result<Option<Model>> {
    let start = tree.get_fragment(fragment)?;
    let local = match tree.find_context(fragment).and_then(|context| context.root()) {
        Some(viewmodel) => viewmodel,
        None => Arc::clone(&tree.get_instance(start.instance)?.viewmodel),
    };
    let keypath = Keypath::parse(reference);

    if let Some(model) = resolve_local(&local, &keypath) {
        trace!(reference, fragment = %fragment, "resolved to a local name");
        return Ok(Some(model));
    }

    match ascend(tree, fragment, &local, &keypath)? {
        Ascent::Found(model) => {
            trace!(
                reference,
                fragment = %fragment,
                keypath = %model.keypath(),
                "resolved in scope chain"
            );
            Ok(Some(model))
        }
        Ascent::Exhausted {
            has_context_chain: false,
        } => {
            trace!(reference, fragment = %fragment, "resolved against local view-model");
            Ok(Some(local.join_all(keypath.segments())))
        }
        Ascent::Exhausted {
            has_context_chain: true,
        } => {
            trace!(reference, fragment = %fragment, "unresolved");
            Ok(None)
        }
    }
}

/// Phase 1: mappings, then computations, of the local view-model.
fn resolve_local(local: &ViewModel, keypath: &Keypath) -> Option<Model> {
    let key = keypath.key();
    let base = local.mapping(key).or_else(|| local.computation(key))?;

    if keypath.is_single() {
        Some(base)
    } else {
        Some(base.join_all(keypath.rest()))
    }
}

/// Phase 2: walk outward from `start` looking for a scope that claims the key.
fn ascend(
    tree: &ViewTree,
    start: FragmentId,
    local: &ViewModel,
    keypath: &Keypath,
) -> Result<Ascent> {
    let key = keypath.key();
    let mut has_context_chain = false;
    let mut crossed_component_boundary = false;
    let mut current = tree.fragment(start);

    while let Some(fragment) = current {
        let instance = tree.get_instance(fragment.instance)?;

        if let FragmentKind::Iteration { index } = fragment.kind {
            if let Some(alias) = iteration_alias(tree, fragment, index, keypath)? {
                return Ok(Ascent::Found(alias));
            }
        }

        if let Some(context) = &fragment.context {
            if !fragment.is_root || instance.is_component() {
                has_context_chain = true;
            }

            if context.has(key) {
                if crossed_component_boundary && local.map(key, context.join_key(key)) {
                    debug!(
                        key,
                        instance = %instance.id,
                        "mapped reference across component boundary"
                    );
                }
                return Ok(Ascent::Found(context.join_all(keypath.segments())));
            }
        }

        current = match fragment.component_parent {
            Some(container) if !instance.isolated => {
                crossed_component_boundary = true;
                tree.fragment(container)
            }
            _ => fragment.parent.and_then(|parent| tree.fragment(parent)),
        };
    }

    Ok(Ascent::Exhausted { has_context_chain })
}

/// The key or index cell of `iteration`, if its section aliases `key`.
fn iteration_alias(
    tree: &ViewTree,
    iteration: &Fragment,
    index: usize,
    keypath: &Keypath,
) -> Result<Option<Model>> {
    let key = keypath.key();
    let (Some(section), Some(row)) = (
        iteration.parent.and_then(|id| tree.fragment(id)),
        iteration.context.as_ref(),
    ) else {
        return Ok(None);
    };

    if section.key_ref() == Some(key) {
        if !keypath.is_single() {
            return Err(Error::bad_reference(key));
        }
        return Ok(Some(row.key_model()));
    }

    if section.index_ref() == Some(key) {
        if !keypath.is_single() {
            return Err(Error::bad_reference(key));
        }
        return Ok(Some(row.index_model(index)));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{Context, InstanceOptions};
    use serde_json::{json, Value};

    fn standalone(data: Value) -> (ViewTree, FragmentId, Arc<ViewModel>) {
        let mut tree = ViewTree::new();
        let app = tree.create_instance(InstanceOptions::new(data));
        let instance = tree.instance(app).unwrap();
        let (root, viewmodel) = (instance.root_fragment(), instance.viewmodel().clone());
        (tree, root, viewmodel)
    }

    #[test]
    fn standalone_root_falls_back_to_viewmodel() {
        let (mut tree, root, viewmodel) = standalone(json!({ "a": { "b": 1 } }));
        let inner = tree.add_fragment(root, None).unwrap();

        let found = tree.resolve_ambiguous_reference(inner, "a.b").unwrap().unwrap();
        assert_eq!(found, viewmodel.join_all(&["a", "b"]));
        assert_eq!(found.get(), json!(1));

        let missing = tree
            .resolve_ambiguous_reference(inner, "missing.x")
            .unwrap()
            .unwrap();
        assert_eq!(missing.keypath(), "missing.x");
        assert_eq!(missing.get(), Value::Null);
    }

    #[test]
    fn nested_context_claims_its_members() {
        let (mut tree, root, viewmodel) = standalone(json!({ "user": { "name": "Ada" } }));
        let with = tree
            .add_fragment(root, Some(viewmodel.join_key("user").into()))
            .unwrap();

        let name = tree.resolve_ambiguous_reference(with, "name").unwrap().unwrap();
        assert_eq!(name.keypath(), "user.name");
        assert_eq!(name.get(), json!("Ada"));

        // Keys the nested context lacks still reach the root's data.
        let user = tree.resolve_ambiguous_reference(with, "user").unwrap().unwrap();
        assert_eq!(user, viewmodel.join_key("user"));
    }

    #[test]
    fn unclaimed_key_under_a_context_chain_is_unresolved() {
        let (mut tree, root, viewmodel) = standalone(json!({ "user": {} }));
        let with = tree
            .add_fragment(root, Some(viewmodel.join_key("user").into()))
            .unwrap();

        assert_eq!(tree.resolve_ambiguous_reference(with, "nothing").unwrap(), None);
    }

    #[test]
    fn local_computation_wins() {
        let (mut tree, root, viewmodel) = standalone(json!({ "user": { "total": "data" } }));
        let total = viewmodel.compute("total", Vec::new(), |_| json!({ "value": 3 }));
        let with = tree
            .add_fragment(root, Some(viewmodel.join_key("user").into()))
            .unwrap();

        assert_eq!(
            tree.resolve_ambiguous_reference(with, "total").unwrap(),
            Some(total.clone())
        );
        let value = tree
            .resolve_ambiguous_reference(with, "total.value")
            .unwrap()
            .unwrap();
        assert_eq!(value, total.join_key("value"));
        assert_eq!(value.get(), json!(3));
    }

    #[test]
    fn index_and_key_aliases_resolve_to_row_cells() {
        let (mut tree, root, viewmodel) = standalone(json!({
            "items": ["a", "b", "c"],
            "byName": { "x": 1, "y": 2 }
        }));
        let items = tree
            .add_section(root, viewmodel.join_key("items"), None, Some("i"))
            .unwrap();
        let row = tree.add_iteration(items, 2).unwrap();

        let index = tree.resolve_ambiguous_reference(row, "i").unwrap().unwrap();
        assert_eq!(index.get(), json!(2));
        assert_eq!(
            tree.resolve_ambiguous_reference(row, "i.x"),
            Err(Error::bad_reference("i"))
        );

        let by_name = tree
            .add_section(root, viewmodel.join_key("byName"), Some("k"), None)
            .unwrap();
        let row = tree.add_iteration(by_name, 0).unwrap();
        let key = tree.resolve_ambiguous_reference(row, "k").unwrap().unwrap();
        assert_eq!(key.get(), json!("x"));
        assert_eq!(
            tree.resolve_ambiguous_reference(row, "k.length"),
            Err(Error::bad_reference("k"))
        );
    }

    #[test]
    fn outer_aliases_are_visible_from_nested_rows() {
        let (mut tree, root, viewmodel) = standalone(json!({
            "rows": [{ "cells": [1, 2] }, { "cells": [3, 4] }]
        }));
        let rows = tree
            .add_section(root, viewmodel.join_key("rows"), None, Some("r"))
            .unwrap();
        let row = tree.add_iteration(rows, 1).unwrap();
        let row_model = tree.fragment(row).unwrap().context().unwrap().model().clone();
        let cells = tree
            .add_section(row, row_model.join_key("cells"), None, Some("c"))
            .unwrap();
        let cell = tree.add_iteration(cells, 0).unwrap();

        let r = tree.resolve_ambiguous_reference(cell, "r").unwrap().unwrap();
        let c = tree.resolve_ambiguous_reference(cell, "c").unwrap().unwrap();
        assert_eq!((r.get(), c.get()), (json!(1), json!(0)));

        // Members of the outer row are reachable through the chain.
        let cells = tree.resolve_ambiguous_reference(cell, "cells").unwrap().unwrap();
        assert_eq!(cells.keypath(), "rows.1.cells");
    }

    #[test]
    fn crossing_into_the_container_installs_one_mapping() {
        let mut tree = ViewTree::new();
        let app = tree.create_instance(InstanceOptions::new(json!({ "theme": { "color": "dark" } })));
        let app_root = tree.instance(app).unwrap().root_fragment();
        let host = tree.add_fragment(app_root, None).unwrap();
        let widget = tree.mount_component(host, InstanceOptions::default()).unwrap();
        let widget_root = tree.instance(widget).unwrap().root_fragment();
        let widget_vm = tree.instance(widget).unwrap().viewmodel().clone();
        let app_vm = tree.instance(app).unwrap().viewmodel().clone();

        let first = tree
            .resolve_ambiguous_reference(widget_root, "theme")
            .unwrap()
            .unwrap();
        let second = tree
            .resolve_ambiguous_reference(widget_root, "theme")
            .unwrap()
            .unwrap();

        assert!(Model::ptr_eq(&first, &second));
        assert_eq!(first, app_vm.join_key("theme"));
        assert_eq!(widget_vm.mapping_keys(), vec!["theme".to_string()]);

        let color = tree
            .resolve_ambiguous_reference(widget_root, "theme.color")
            .unwrap()
            .unwrap();
        assert_eq!(color.get(), json!("dark"));
        assert_eq!(widget_vm.mapping_count(), 1);
    }

    #[test]
    fn component_data_is_checked_before_the_container() {
        let mut tree = ViewTree::new();
        let app = tree.create_instance(InstanceOptions::new(json!({ "label": "outer" })));
        let app_root = tree.instance(app).unwrap().root_fragment();
        let widget = tree
            .mount_component(app_root, InstanceOptions::new(json!({ "label": "inner" })))
            .unwrap();
        let widget_root = tree.instance(widget).unwrap().root_fragment();

        let label = tree
            .resolve_ambiguous_reference(widget_root, "label")
            .unwrap()
            .unwrap();
        assert_eq!(label.get(), json!("inner"));
        assert_eq!(tree.instance(widget).unwrap().viewmodel().mapping_count(), 0);
    }

    #[test]
    fn isolated_components_do_not_ascend() {
        let mut tree = ViewTree::new();
        let app = tree.create_instance(InstanceOptions::new(json!({ "theme": "dark" })));
        let app_root = tree.instance(app).unwrap().root_fragment();
        let widget = tree
            .mount_component(app_root, InstanceOptions::default().isolated(true))
            .unwrap();
        let widget_root = tree.instance(widget).unwrap().root_fragment();

        assert_eq!(
            tree.resolve_ambiguous_reference(widget_root, "theme").unwrap(),
            None
        );
        assert_eq!(tree.instance(widget).unwrap().viewmodel().mapping_count(), 0);
    }

    #[test]
    fn container_aliases_reach_components_in_rows() {
        let mut tree = ViewTree::new();
        let app = tree.create_instance(InstanceOptions::new(json!({ "items": [10, 20] })));
        let app_root = tree.instance(app).unwrap().root_fragment();
        let items = tree.instance(app).unwrap().viewmodel().join_key("items");
        let section = tree.add_section(app_root, items, None, Some("i")).unwrap();
        let row = tree.add_iteration(section, 1).unwrap();
        let widget = tree.mount_component(row, InstanceOptions::default()).unwrap();
        let widget_root = tree.instance(widget).unwrap().root_fragment();

        let index = tree.resolve_ambiguous_reference(widget_root, "i").unwrap().unwrap();
        assert_eq!(index.get(), json!(1));
    }

    #[test]
    fn mapped_context_uses_its_own_viewmodel_as_local() {
        // A `{{#with}}` over a cell that belongs to the container makes the
        // container's view-model the local one for fragments beneath it.
        let mut tree = ViewTree::new();
        let app = tree.create_instance(InstanceOptions::new(json!({ "shared": { "n": 1 } })));
        let app_root = tree.instance(app).unwrap().root_fragment();
        let app_vm = tree.instance(app).unwrap().viewmodel().clone();
        let widget = tree.mount_component(app_root, InstanceOptions::default()).unwrap();
        let widget_root = tree.instance(widget).unwrap().root_fragment();

        let with = tree
            .add_fragment(widget_root, Some(Context::Model(app_vm.join_key("shared"))))
            .unwrap();
        app_vm.map("alias", app_vm.join_key("shared"));

        let n = tree.resolve_ambiguous_reference(with, "alias.n").unwrap().unwrap();
        assert_eq!(n.get(), json!(1));
    }

    #[test]
    fn unknown_fragment_is_an_error() {
        let (tree, _, _) = standalone(json!({}));
        let missing = FragmentId::new(42);
        assert_eq!(
            tree.resolve_ambiguous_reference(missing, "a"),
            Err(Error::UnknownFragment(missing))
        );
    }
}
