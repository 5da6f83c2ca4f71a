use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use quad_carve::{
    config::MazeConfig,
    coordinator::{Generator, Maze},
    maze::MazeGrid,
};

// Fixed seed for deterministic benchmarks
const BENCHMARK_SEED: u64 = 12345;

fn bench_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential");

    for size in [50, 100, 200] {
        let config = MazeConfig::new(size, 10).with_seed(BENCHMARK_SEED);

        group.bench_with_input(BenchmarkId::from_parameter(size), &config, |b, config| {
            b.iter(|| {
                let mut maze = Maze::new(config).unwrap();
                black_box(maze.run().unwrap())
            })
        });
    }

    group.finish();
}

fn bench_threaded(c: &mut Criterion) {
    let mut group = c.benchmark_group("threaded");
    group.sample_size(20);

    for size in [50, 100] {
        let config = MazeConfig::new(size, 10).with_seed(BENCHMARK_SEED);

        group.bench_with_input(BenchmarkId::from_parameter(size), &config, |b, config| {
            b.iter(|| {
                let handle = Generator::new(config).unwrap().start().unwrap();
                black_box(handle.join().unwrap().report)
            })
        });
    }

    group.finish();
}

fn bench_neighbors(c: &mut Criterion) {
    let grid = MazeGrid::new(100, 10).unwrap();
    let (x, y) = grid.seed(quad_carve::Owner::North).unwrap();

    c.bench_function("neighbors_of", |b| b.iter(|| black_box(grid.neighbors_of(black_box(x), black_box(y)))));
}

fn bench_snapshot(c: &mut Criterion) {
    let config = MazeConfig::new(200, 10).with_seed(BENCHMARK_SEED);
    let mut maze = Maze::new(&config).unwrap();
    maze.run().unwrap();

    c.bench_function("snapshot_200", |b| b.iter(|| black_box(maze.snapshot())));
}

criterion_group!(benches, bench_sequential, bench_threaded, bench_neighbors, bench_snapshot);
criterion_main!(benches);
