//! Benchmark for terrain generation performance.
//!
//! Run with: cargo bench --package loam_procedural --bench terrain_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use loam_procedural::{
    ChunkCoord, DensityField, GradientNoise, NoiseQuality, NoiseSettings, SimplexNoise,
    TerrainGenerator, WorldSeed,
};

fn benchmark_single_chunk(c: &mut Criterion) {
    let generator = TerrainGenerator::new(&NoiseSettings::default());

    c.bench_function("single_chunk_generation", |b| {
        let mut coord = 0i32;
        b.iter(|| {
            coord = coord.wrapping_add(1);
            black_box(generator.generate(ChunkCoord::new(coord, coord / 2)))
        });
    });
}

fn benchmark_window_fill(c: &mut Criterion) {
    let generator = TerrainGenerator::new(&NoiseSettings::default());

    let mut group = c.benchmark_group("window_fill");
    group.sample_size(10);

    // A 9x9 streaming window
    group.throughput(Throughput::Elements(9 * 9));
    group.bench_function("9x9_chunks", |b| {
        b.iter(|| {
            for z in -4..=4 {
                for x in -4..=4 {
                    black_box(generator.generate(ChunkCoord::new(x, z)));
                }
            }
        });
    });

    group.finish();
}

fn benchmark_signals(c: &mut Criterion) {
    let field = DensityField::new(&NoiseSettings::default());
    let coord = ChunkCoord::new(3, 4);

    c.bench_function("ground_elevation", |b| {
        let mut x = 0i32;
        b.iter(|| {
            x = (x + 1) & 15;
            black_box(field.ground_elevation(coord, black_box(x), 7))
        });
    });

    c.bench_function("cell_sample_below_ground", |b| {
        let mut y = 3usize;
        b.iter(|| {
            y = 3 + (y + 1) % 40;
            black_box(field.sample(coord, 5, black_box(y), 9))
        });
    });
}

fn benchmark_noise(c: &mut Criterion) {
    let simplex = SimplexNoise::new(WorldSeed::new(42));

    c.bench_function("simplex_2d_sample", |b| {
        let mut x = 0.0f64;
        b.iter(|| {
            x += 0.37;
            black_box(simplex.sample(black_box(x), black_box(x * 0.7)))
        });
    });

    let mut group = c.benchmark_group("gradient_3d_sample");
    for quality in [NoiseQuality::Fast, NoiseQuality::Standard, NoiseQuality::Best] {
        group.bench_function(format!("{quality:?}"), |b| {
            let mut x = 0.0f64;
            b.iter(|| {
                x += 0.37;
                black_box(GradientNoise::sample(black_box(x), x * 0.5, x * 0.3, 7, quality))
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_single_chunk,
    benchmark_window_fill,
    benchmark_signals,
    benchmark_noise
);
criterion_main!(benches);
