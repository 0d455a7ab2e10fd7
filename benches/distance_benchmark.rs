// SPDX-License-Identifier: MIT

use chrono::Utc;
use criterion::{criterion_group, criterion_main, Criterion};
use geo::{LineString, Point};
use std::hint::black_box;
use uuid::Uuid;
use walk_tracker::distance::{haversine_m, path_length_m};
use walk_tracker::models::{LocationFix, WalkPoint};
use walk_tracker::services::route;

/// A one-hour walk sampled every second, wandering north-east.
fn hour_long_walk() -> Vec<(f64, f64)> {
    (0..3600)
        .map(|i| {
            let t = i as f64;
            (40.0 + t * 1e-5, -75.0 + (t / 60.0).sin() * 1e-4 + t * 5e-6)
        })
        .collect()
}

fn benchmark_distance(c: &mut Criterion) {
    let coords = hour_long_walk();
    let line: LineString<f64> = coords.iter().map(|&(lat, lng)| (lng, lat)).collect();

    let mut group = c.benchmark_group("distance");

    group.bench_function("haversine_single", |b| {
        let a = Point::new(-75.0, 40.0);
        let z = Point::new(-75.0, 40.001);
        b.iter(|| haversine_m(black_box(a), black_box(z)))
    });

    group.bench_function("path_length_one_hour", |b| {
        b.iter(|| path_length_m(black_box(&line)))
    });

    group.finish();
}

fn benchmark_route_summary(c: &mut Criterion) {
    let walk_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();
    let points: Vec<WalkPoint> = hour_long_walk()
        .into_iter()
        .enumerate()
        .map(|(i, (lat, lng))| WalkPoint {
            walk_id,
            user_id,
            seq: i as u64,
            fix: LocationFix::new(Utc::now(), lat, lng),
        })
        .collect();

    c.bench_function("route_summary_one_hour", |b| {
        b.iter(|| route::summarize(black_box(&points)))
    });
}

criterion_group!(benches, benchmark_distance, benchmark_route_summary);
criterion_main!(benches);
