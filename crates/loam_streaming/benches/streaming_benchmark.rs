//! Benchmark for window loading through the inline pipeline.
//!
//! Run with: cargo bench --package loam_streaming --bench streaming_benchmark

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use loam_meshing::{AtlasConfig, TextureAtlas};
use loam_procedural::NoiseSettings;
use loam_streaming::{GenerationPipeline, HeadlessSurfaces, StreamingConfig, StreamingWindow};

fn load_window(size: usize, settings: &Arc<NoiseSettings>, atlas: &Arc<TextureAtlas>) -> usize {
    let mut pipeline = GenerationPipeline::inline(StreamingConfig::testing(), Arc::clone(atlas));
    let mut surfaces = HeadlessSurfaces::new();
    let mut window = StreamingWindow::new(size, Arc::clone(settings)).expect("odd window");

    window.initialize(0.0, 0.0, &mut pipeline, &mut surfaces);
    while pipeline.is_loading() {
        pipeline.run_pending_jobs(usize::MAX);
        pipeline.tick(&mut window, &mut surfaces);
    }
    surfaces.total_quads()
}

fn benchmark_window_load(c: &mut Criterion) {
    let atlas = Arc::new(TextureAtlas::from_config(&AtlasConfig::default()).expect("default atlas"));
    let settings = Arc::new(NoiseSettings::default());

    let mut group = c.benchmark_group("window_load");
    group.sample_size(10);
    for size in [3usize, 5] {
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_function(format!("{size}x{size}"), |b| {
            b.iter(|| load_window(size, &settings, &atlas));
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_window_load);
criterion_main!(benches);
