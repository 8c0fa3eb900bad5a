//! # LOAM Flythrough
//!
//! Headless observer flight over streamed terrain.
//!
//! Loads the window around the origin, drops the observer on the surface,
//! then flies in a straight line at a fixed tick rate, logging every
//! window shift and a summary at the end. No GPU, no window.
//!
//! ```bash
//! RUST_LOG=loam=debug cargo run --release --bin flythrough -- crates/loam/config/world.toml
//! ```

use std::process::ExitCode;
use std::time::{Duration, Instant};

use loam::prelude::*;
use tracing_subscriber::EnvFilter;

/// Simulated frame time.
const TICK: Duration = Duration::from_micros(16_666);

/// Observer speed in blocks per second.
const SPEED: f32 = 48.0;

/// Flight duration in ticks.
const FLIGHT_TICKS: u32 = 600;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_thread_names(true)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "flythrough failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> StreamingResult<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => WorldConfig::load(path)?,
        None => WorldConfig::default(),
    };

    let mut world = World::new(&config, HeadlessSurfaces::new())?;
    let (mut x, mut z) = (0.5f32, 0.5f32);

    let started = Instant::now();
    world.start(x, z);
    let mut load_ticks = 0u32;
    while world.is_loading() {
        world.tick(x, z);
        load_ticks += 1;
        std::thread::sleep(Duration::from_millis(1));
    }
    let spawn = world.spawn_point(x, z);
    tracing::info!(
        chunks = world.registry().len(),
        ticks = load_ticks,
        elapsed_ms = started.elapsed().as_millis(),
        ?spawn,
        "initial window loaded"
    );

    let step = SPEED * TICK.as_secs_f32();
    let mut slowest = Duration::ZERO;
    for _ in 0..FLIGHT_TICKS {
        let frame = Instant::now();
        x += step;
        z += step * 0.25;

        let tick = world.tick(x, z);
        if tick.shift.evicted + tick.shift.requested > 0 {
            tracing::debug!(
                center = ?world.center(),
                evicted = tick.shift.evicted,
                requested = tick.shift.requested,
                "crossed chunk border"
            );
        }

        let spent = frame.elapsed();
        slowest = slowest.max(spent);
        if let Some(rest) = TICK.checked_sub(spent) {
            std::thread::sleep(rest);
        }
    }

    let stats = world.stats();
    let surfaces = world.surfaces();
    tracing::info!(
        generated = stats.generated,
        refreshed = stats.refreshed,
        stale = stats.stale,
        discarded = stats.discarded,
        visible = surfaces.visible_count(),
        quads = surfaces.total_quads(),
        slowest_tick_us = slowest.as_micros(),
        "flight finished"
    );

    let surfaces = world.shutdown();
    tracing::info!(despawned = surfaces.despawned(), "bye");
    Ok(())
}
