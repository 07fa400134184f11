use criterion::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use spatial_graph::generators::{random_geometric_graph_data, square_lattice_data};
use spatial_graph::{make_planar, SpatialGraph};

fn planarize_rgg(c: &mut Criterion) {
    const NUM_NODES: usize = 64;

    let mut rng = StdRng::seed_from_u64(42);
    let (nodes, edges) = random_geometric_graph_data(NUM_NODES, 0.12, &mut rng, "rgg");
    let graph = SpatialGraph::new(nodes, edges).unwrap();

    c.bench_function("planarize - random geometric graph", |b| {
        b.iter(|| {
            black_box(make_planar(&graph, true, "intersection").unwrap());
        })
    });
}

fn planarize_lattice(c: &mut Criterion) {
    let (nodes, edges) = square_lattice_data(1., 1., 8, 8, "square");
    let graph = SpatialGraph::new(nodes, edges).unwrap();

    c.bench_function("planarize - already planar lattice", |b| {
        b.iter(|| {
            black_box(make_planar(&graph, true, "intersection").unwrap());
        })
    });
}

criterion_group!(planarize, planarize_rgg, planarize_lattice);
criterion_main!(planarize);
