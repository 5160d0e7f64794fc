//! Benchmarks for mesh-extrude operations.
//!
//! Run with: cargo bench -p mesh-extrude
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p mesh-extrude -- --save-baseline main
//! 2. After changes: cargo bench -p mesh-extrude -- --baseline main

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mesh_core::{QuadMesh, TriSurface};
use mesh_extrude::{extrude_with_index, BruteForceIndex, BvhIndex, ExtrudeParams, SurfaceDistanceIndex};
use nalgebra::{Point2, Point3};

// =============================================================================
// Test Data Generation
// =============================================================================

/// Wavy height field on an `n x n` vertex grid over [0, 1000]^2.
fn create_surface(n: usize) -> TriSurface {
    let step = 1000.0 / (n - 1) as f64;
    let vertices = (0..n * n)
        .map(|k| {
            let (x, y) = ((k % n) as f64 * step, (k / n) as f64 * step);
            let z = -200.0 - 50.0 * (x / 97.0).sin() * (y / 131.0).cos();
            Point3::new(x, y, z)
        })
        .collect();

    let mut triangles = Vec::with_capacity(2 * (n - 1) * (n - 1));
    for j in 0..n - 1 {
        for i in 0..n - 1 {
            let a = (j * n + i) as u32;
            let d = a + n as u32;
            triangles.push([a, a + 1, d + 1]);
            triangles.push([a, d + 1, d]);
        }
    }
    TriSurface::new(vertices, triangles)
}

fn create_base(cells: usize) -> QuadMesh {
    QuadMesh::structured_grid(
        Point2::new(0.0, 0.0),
        Point2::new(1000.0, 1000.0),
        cells,
        cells,
        1,
    )
    .expect("grid")
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_distance_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("distance_index");
    let surface = create_surface(64);
    let queries: Vec<Point3<f64>> = (0..1000)
        .map(|i| Point3::new((i * 37 % 1000) as f64, (i * 91 % 1000) as f64, -300.0))
        .collect();

    let bvh = BvhIndex::build(&surface).expect("bvh");
    let brute = BruteForceIndex::build(&surface).expect("brute force");
    group.throughput(Throughput::Elements(queries.len() as u64));

    group.bench_function("bvh_1000_queries", |b| {
        b.iter(|| {
            for p in &queries {
                black_box(bvh.nearest_distance(p).expect("query"));
            }
        })
    });
    group.bench_function("brute_force_1000_queries", |b| {
        b.iter(|| {
            for p in &queries {
                black_box(brute.nearest_distance(p).expect("query"));
            }
        })
    });

    group.finish();
}

fn bench_extrude(c: &mut Criterion) {
    let mut group = c.benchmark_group("extrude");
    group.sample_size(10);
    let surface = create_surface(64);
    let params = ExtrudeParams::default();

    for cells in [16, 64] {
        let base = create_base(cells);
        group.throughput(Throughput::Elements(
            (base.element_count() * params.layers as usize) as u64,
        ));
        group.bench_with_input(BenchmarkId::new("bvh_30_layers", cells), &base, |b, base| {
            b.iter(|| extrude_with_index::<BvhIndex>(black_box(base), &surface, &params))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_distance_index, bench_extrude);
criterion_main!(benches);
