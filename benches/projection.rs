//! Performance benchmarks for robinson-map
//!
//! Run with: cargo bench
//! Run specific benchmark: cargo bench -- forward

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use robinson_map::graticule::{bounding_box, graticule_labels, graticule_lines, GraticuleSpec};
use robinson_map::projection::project_points_with;
use robinson_map::{Config, CoordinateProjectionPipeline, GeoPoint, Projector, Robinson};

/// Benchmark single forward and inverse transforms
fn bench_transforms(c: &mut Criterion) {
    let robinson = Robinson::new();
    let mut group = c.benchmark_group("transform");

    for (name, lon, lat) in [("equator", 120.0, 0.0), ("mid", -73.5, 41.2), ("polar", 10.0, 87.5)] {
        group.bench_with_input(BenchmarkId::new("forward", name), &(lon, lat), |b, &(lon, lat)| {
            b.iter(|| robinson.forward(black_box(lon), black_box(lat)))
        });

        let (x, y) = robinson.forward(lon, lat).unwrap();
        group.bench_with_input(BenchmarkId::new("inverse", name), &(x, y), |b, &(x, y)| {
            b.iter(|| robinson.inverse(black_box(x), black_box(y)))
        });
    }

    group.finish();
}

/// Benchmark projecting site tables of increasing size
fn bench_sites(c: &mut Criterion) {
    let robinson = Robinson::new();
    let mut group = c.benchmark_group("sites");

    for size in [100usize, 1_000, 10_000] {
        let points: Vec<GeoPoint> = (0..size)
            .map(|i| {
                let t = i as f64 / size as f64;
                GeoPoint::new(i.to_string(), -180.0 + 360.0 * t, -90.0 + 180.0 * t)
            })
            .collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &points, |b, points| {
            b.iter(|| project_points_with(black_box(points), &robinson))
        });
    }

    group.finish();
}

/// Benchmark the graticule layers and labels used by every map
fn bench_graticule(c: &mut Criterion) {
    let pipeline = CoordinateProjectionPipeline::from_config(&Config::default()).unwrap();
    let spec = GraticuleSpec::default();
    let lines = graticule_lines(&spec);
    let outline = bounding_box(&spec);
    let labels = graticule_labels(&spec);

    c.bench_function("graticule_lines", |b| {
        b.iter(|| pipeline.project_layer(black_box(&lines)))
    });
    c.bench_function("bounding_box", |b| {
        b.iter(|| pipeline.project_layer(black_box(&outline)))
    });
    c.bench_function("labels", |b| {
        b.iter(|| pipeline.project_labels(black_box(&labels)))
    });
}

criterion_group!(benches, bench_transforms, bench_sites, bench_graticule);
criterion_main!(benches);
