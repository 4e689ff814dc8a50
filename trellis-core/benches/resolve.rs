//! Reference resolution and interpolation benchmarks.
//!
//! Measures lookups from deep inside iteration rows and nested components,
//! and the cost of sampling the generic interpolators.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use serde_json::{json, Value};
use trellis_core::view::{FragmentId, InstanceOptions, ViewTree};

/// A list of rows, each rendered through a stack of plain fragments.
fn rows(depth: usize) -> (ViewTree, FragmentId) {
    let items: Vec<Value> = (0..64).map(|i| json!({ "id": i, "label": "row" })).collect();

    let mut tree = ViewTree::new();
    let app = tree.create_instance(InstanceOptions::new(json!({ "title": "list", "items": items })));
    let root = tree.instance(app).unwrap().root_fragment();
    let list = tree.instance(app).unwrap().viewmodel().join_key("items");
    let section = tree.add_section(root, list, None, Some("i")).unwrap();

    let mut fragment = tree.add_iteration(section, 32).unwrap();
    for _ in 0..depth {
        fragment = tree.add_fragment(fragment, None).unwrap();
    }
    (tree, fragment)
}

/// Components mounted inside one another, `depth` levels down.
fn components(depth: usize) -> (ViewTree, FragmentId) {
    let mut tree = ViewTree::new();
    let app = tree.create_instance(InstanceOptions::new(json!({ "theme": "dark" })));
    let mut fragment = tree.instance(app).unwrap().root_fragment();
    for _ in 0..depth {
        let host = tree.add_fragment(fragment, None).unwrap();
        let widget = tree.mount_component(host, InstanceOptions::default()).unwrap();
        fragment = tree.instance(widget).unwrap().root_fragment();
    }
    (tree, fragment)
}

fn bench_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_rows");

    for depth in [1, 8, 32] {
        let (tree, fragment) = rows(depth);
        for reference in ["label", "i", "title"] {
            group.bench_with_input(
                BenchmarkId::new(reference, depth),
                &reference,
                |b, reference| {
                    b.iter(|| tree.resolve_ambiguous_reference(fragment, black_box(reference)))
                },
            );
        }
    }

    group.finish();
}

fn bench_components(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_components");

    for depth in [1, 4, 16] {
        // The first lookup installs mappings; later ones hit them.
        let (tree, fragment) = components(depth);
        group.bench_function(BenchmarkId::new("mapped", depth), |b| {
            b.iter(|| tree.resolve_ambiguous_reference(fragment, black_box("theme")))
        });

        group.bench_function(BenchmarkId::new("cold", depth), |b| {
            b.iter_batched(
                || components(depth),
                |(tree, fragment)| tree.resolve_ambiguous_reference(fragment, black_box("theme")),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_interpolate(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpolate");
    let (tree, root) = components(0);
    let owner = tree.fragment(root).unwrap().instance();

    let cases = [
        ("number", json!(0), json!(100)),
        ("array", json!([0, 1, 2, 3]), json!([10, 20, 30, 40])),
        (
            "object",
            json!({ "x": 0, "y": { "z": 1 } }),
            json!({ "x": 5, "y": { "z": 9 } }),
        ),
    ];

    for (name, from, to) in cases {
        let step = tree.interpolate(&from, &to, owner, None).unwrap();
        group.bench_function(name, |b| b.iter(|| step(black_box(0.5))));
    }

    group.finish();
}

criterion_group!(resolve_benches, bench_rows, bench_components, bench_interpolate);
criterion_main!(resolve_benches);
