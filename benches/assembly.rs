//! Benchmarks for map assembly and traversal.

use criterion::{criterion_group, criterion_main, Criterion};
use darn::prelude::*;
use nalgebra::Point3;

/// Fill an import buffer with an `n` x `n` grid of triangle pairs.
fn fill_grid(import: &mut SurfaceImport, n: u32) {
    let positions = (0..=n)
        .flat_map(|j| (0..=n).map(move |i| Point3::new(i as f64, j as f64, 0.0)))
        .collect();
    import.set_positions(positions).unwrap();
    import.reserve((n * n * 2) as usize);

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            import.add_triangle(v00, v10, v11);
            import.add_triangle(v00, v11, v01);
        }
    }
}

fn create_grid_map(n: u32) -> CMap2 {
    let mut import = SurfaceImport::new();
    fill_grid(&mut import, n);
    let mut map = CMap2::new();
    import.create_map(&mut map);
    map
}

fn bench_assembly(c: &mut Criterion) {
    c.bench_function("assemble_grid_10x10", |b| {
        b.iter(|| create_grid_map(10));
    });

    c.bench_function("assemble_grid_100x100", |b| {
        b.iter(|| create_grid_map(100));
    });

    c.bench_function("assemble_grid_100x100_always_repair", |b| {
        let options = ImportOptions::default().with_vertex_repair(VertexRepair::Always);
        b.iter(|| {
            let mut import = SurfaceImport::new();
            fill_grid(&mut import, 100);
            let mut map: CMap2 = CMap2::new();
            import.create_map_with_options(&mut map, &options).unwrap();
            map
        });
    });
}

fn bench_traversal(c: &mut Criterion) {
    let map = create_grid_map(100);

    c.bench_function("vertex_degree_all", |b| {
        b.iter(|| {
            map.vertices()
                .into_iter()
                .map(|v| map.vertex_degree(v))
                .sum::<usize>()
        });
    });

    c.bench_function("face_vertices_all", |b| {
        b.iter(|| {
            map.faces()
                .map(|f| map.face_vertices(f).map(|v| v.index()).sum::<usize>())
                .sum::<usize>()
        });
    });

    c.bench_function("check_integrity_parallel", |b| {
        b.iter(|| map.check_integrity(true).is_ok());
    });

    c.bench_function("check_integrity_sequential", |b| {
        b.iter(|| map.check_integrity(false).is_ok());
    });
}

criterion_group!(benches, bench_assembly, bench_traversal);
criterion_main!(benches);
