// Benchmarks for allowed-combination enumeration and variation graph queries
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dimspace::{
    ConstraintTable, ContentDimension, ContentDimensionIdentifier, ContentDimensionValue,
    DimensionSpace, VariationEdge,
};
use rand::prelude::*;
use std::sync::Arc;

/// A dimension with `size` values, each attached to a random earlier value
fn generate_random_dimension(rng: &mut StdRng, name: &str, size: usize) -> ContentDimension {
    let values = (0..size).map(|i| ContentDimensionValue::new(format!("v{}", i))).collect();
    let edges = (1..size)
        .filter_map(|i| {
            rng.random_bool(0.8)
                .then(|| VariationEdge::new(format!("v{}", i), format!("v{}", rng.random_range(0..i))))
        })
        .collect();
    ContentDimension::new(ContentDimensionIdentifier::new(name).unwrap(), values, "v0", edges).unwrap()
}

fn generate_space(dimensions: usize, values: usize, constrained: bool) -> Arc<DimensionSpace> {
    let mut rng = StdRng::seed_from_u64(42);
    let dimensions: Vec<_> = (0..dimensions)
        .map(|i| generate_random_dimension(&mut rng, &format!("d{}", i), values))
        .collect();

    let mut constraints = ConstraintTable::new();
    if constrained {
        for pair in dimensions.windows(2) {
            for value in pair[0].values() {
                if !rng.random_bool(0.3) {
                    continue;
                }
                let disallowed = format!("v{}", rng.random_range(0..values));
                constraints = constraints.disallow(
                    pair[0].identifier().clone(),
                    value.value(),
                    pair[1].identifier().clone(),
                    [disallowed],
                );
            }
        }
    }

    DimensionSpace::builder()
        .dimensions(dimensions)
        .constraints(constraints)
        .build()
        .unwrap()
}

fn benchmark_enumeration(c: &mut Criterion) {
    let mut group = c.benchmark_group("allowed_combinations");

    for dimensions in [2, 3, 4].iter() {
        for constrained in [false, true] {
            let label = if constrained { "constrained" } else { "free" };
            group.bench_with_input(BenchmarkId::new(label, dimensions), dimensions, |b, &dimensions| {
                b.iter(|| {
                    let space = generate_space(dimensions, 8, constrained);
                    black_box(space.allowed_combinations().len())
                });
            });
        }
    }

    group.finish();
}

fn benchmark_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("variation_graph");
    let space = generate_space(3, 10, false);
    let points = space.allowed_combinations().points().to_vec();
    let mut rng = StdRng::seed_from_u64(7);

    group.bench_function("compare", |b| {
        b.iter(|| {
            let a = points.choose(&mut rng).unwrap();
            let other = points.choose(&mut rng).unwrap();
            black_box(space.compare(a, other).ok())
        });
    });

    group.bench_function("fallback_chain", |b| {
        b.iter(|| {
            let p = points.choose(&mut rng).unwrap();
            black_box(space.fallback_chain(p).unwrap())
        });
    });

    group.bench_function("specializations", |b| {
        b.iter(|| {
            let p = points.choose(&mut rng).unwrap();
            black_box(space.specializations(p, true).unwrap().len())
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_enumeration, benchmark_queries);
criterion_main!(benches);
