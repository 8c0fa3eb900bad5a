//! # World
//!
//! One-stop facade bundling the pipeline, the streaming window, the terrain
//! settings and the chunk surfaces.
//!
//! ```rust,ignore
//! let mut world = World::new(&WorldConfig::default(), HeadlessSurfaces::new())?;
//! world.start(0.0, 0.0);
//! while world.is_loading() {
//!     world.tick(0.0, 0.0);
//! }
//! let spawn = world.spawn_point(0.0, 0.0);
//! ```

use std::sync::Arc;

use loam_meshing::TextureAtlas;
use loam_procedural::{Cell, CellKind, ChunkCoord, NoiseSettings};

use crate::config::WorldConfig;
use crate::error::StreamingResult;
use crate::pipeline::{GenerationPipeline, PipelineStats, TickReport};
use crate::registry::ChunkRegistry;
use crate::surface::ChunkSurfaces;
use crate::window::{StreamingWindow, WindowShift};

/// Result of one [`World::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldTick {
    /// Window movement, if any.
    pub shift: WindowShift,
    /// Pipeline work.
    pub pipeline: TickReport,
}

/// A streamed voxel world around a single observer.
pub struct World<S: ChunkSurfaces> {
    pipeline: GenerationPipeline,
    window: StreamingWindow,
    settings: Arc<NoiseSettings>,
    surfaces: S,
}

impl<S: ChunkSurfaces> World<S> {
    /// Builds a world with background workers.
    ///
    /// # Errors
    ///
    /// Fails on an invalid window size, a rejected atlas table or a worker
    /// that cannot be started.
    pub fn new(config: &WorldConfig, surfaces: S) -> StreamingResult<Self> {
        let atlas = TextureAtlas::from_config(&config.atlas)?;
        let pipeline = GenerationPipeline::new(config.streaming.clone(), Arc::new(atlas))?;
        Self::assemble(config, pipeline, surfaces)
    }

    /// Builds a world whose jobs run only in
    /// [`run_pending_jobs`](Self::run_pending_jobs).
    ///
    /// # Errors
    ///
    /// Fails on an invalid window size or a rejected atlas table.
    pub fn inline(config: &WorldConfig, surfaces: S) -> StreamingResult<Self> {
        let atlas = TextureAtlas::from_config(&config.atlas)?;
        let pipeline = GenerationPipeline::inline(config.streaming.clone(), Arc::new(atlas));
        Self::assemble(config, pipeline, surfaces)
    }

    fn assemble(config: &WorldConfig, pipeline: GenerationPipeline, surfaces: S) -> StreamingResult<Self> {
        let settings = Arc::new(config.terrain.sanitized());
        let window = StreamingWindow::new(config.streaming.window_size, Arc::clone(&settings))?;
        Ok(Self {
            pipeline,
            window,
            settings,
            surfaces,
        })
    }

    /// Requests the full window around the observer.
    pub fn start(&mut self, world_x: f32, world_z: f32) -> usize {
        self.window
            .initialize(world_x, world_z, &mut self.pipeline, &mut self.surfaces)
    }

    /// Moves the window to the observer, then runs one pipeline tick.
    pub fn tick(&mut self, world_x: f32, world_z: f32) -> WorldTick {
        let shift = self
            .window
            .update(world_x, world_z, &mut self.pipeline, &mut self.surfaces);
        let pipeline = self.pipeline.tick(&mut self.window, &mut self.surfaces);
        WorldTick { shift, pipeline }
    }

    /// Runs queued jobs of an inline world on this thread.
    pub fn run_pending_jobs(&mut self, limit: usize) -> usize {
        self.pipeline.run_pending_jobs(limit)
    }

    /// Returns true while chunks are still being built.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.pipeline.is_loading()
    }

    /// Changes one cell; see [`GenerationPipeline::set_cell`].
    pub fn set_cell(&mut self, block_x: i32, block_y: i32, block_z: i32, kind: CellKind) -> Option<CellKind> {
        self.pipeline.set_cell(block_x, block_y, block_z, kind)
    }

    /// Cell at a block position.
    #[must_use]
    pub fn find_cell(&self, block_x: i32, block_y: i32, block_z: i32) -> Option<Cell> {
        self.pipeline.registry().find_cell(block_x, block_y, block_z)
    }

    /// Standing position on top of the terrain at a world column.
    ///
    /// `None` until the column's chunk is populated.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn spawn_point(&self, world_x: f32, world_z: f32) -> Option<[f32; 3]> {
        let (bx, bz) = (world_x.floor() as i32, world_z.floor() as i32);
        let top = self.pipeline.registry().surface_height(bx, bz)?;
        Some([world_x, (top + 1) as f32, world_z])
    }

    /// Chunk the observer stands in.
    #[must_use]
    pub fn center(&self) -> Option<ChunkCoord> {
        self.window.center()
    }

    /// Pipeline totals.
    #[must_use]
    pub fn stats(&self) -> PipelineStats {
        self.pipeline.stats()
    }

    /// Shared registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ChunkRegistry> {
        self.pipeline.registry()
    }

    /// Streaming window.
    #[must_use]
    pub fn window(&self) -> &StreamingWindow {
        &self.window
    }

    /// Terrain settings in use.
    #[must_use]
    pub fn settings(&self) -> &Arc<NoiseSettings> {
        &self.settings
    }

    /// Chunk surfaces.
    #[must_use]
    pub fn surfaces(&self) -> &S {
        &self.surfaces
    }

    /// Destroys every chunk, stops the workers and hands back the surfaces.
    pub fn shutdown(mut self) -> S {
        self.window.clear(&mut self.pipeline, &mut self.surfaces);
        let leftover = self.pipeline.destroy_all(&mut self.surfaces);
        let stats = self.pipeline.stats();
        tracing::info!(
            generated = stats.generated,
            refreshed = stats.refreshed,
            stale = stats.stale,
            leftover,
            "world shut down"
        );
        let Self { pipeline, surfaces, .. } = self;
        drop(pipeline);
        surfaces
    }
}

impl<S: ChunkSurfaces> std::fmt::Debug for World<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("pipeline", &self.pipeline)
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StreamingConfig;
    use crate::surface::HeadlessSurfaces;
    use crate::StreamingError;

    fn flat_config() -> WorldConfig {
        WorldConfig {
            streaming: StreamingConfig::testing(),
            terrain: NoiseSettings::flat(12),
            ..WorldConfig::default()
        }
    }

    fn load(world: &mut World<HeadlessSurfaces>, x: f32, z: f32) {
        for _ in 0..100 {
            world.run_pending_jobs(usize::MAX);
            world.tick(x, z);
            if !world.is_loading() {
                return;
            }
        }
        panic!("world never finished loading");
    }

    #[test]
    fn test_invalid_window_rejected() {
        let mut config = flat_config();
        config.streaming.window_size = 4;
        assert!(matches!(
            World::inline(&config, HeadlessSurfaces::new()),
            Err(StreamingError::InvalidWindowSize { size: 4 })
        ));
    }

    #[test]
    fn test_start_load_and_spawn() {
        let mut world = World::inline(&flat_config(), HeadlessSurfaces::new()).unwrap();
        assert_eq!(world.spawn_point(0.0, 0.0), None);
        assert_eq!(world.start(8.0, 8.0), 9);
        load(&mut world, 8.0, 8.0);

        assert_eq!(world.registry().populated_count(), 9);
        assert_eq!(world.surfaces().visible_count(), 9);
        assert_eq!(world.spawn_point(8.5, -3.5), Some([8.5, 13.0, -3.5]));
        assert_eq!(
            world.find_cell(-5, 12, 20).map(|cell| cell.kind),
            Some(CellKind::Grass)
        );
    }

    #[test]
    fn test_restart_keeps_loaded_chunks() {
        let mut world = World::inline(&flat_config(), HeadlessSurfaces::new()).unwrap();
        world.start(0.0, 0.0);
        load(&mut world, 0.0, 0.0);

        assert_eq!(world.start(0.0, 0.0), 0);
        assert!(!world.is_loading());
        assert_eq!(world.window().filled(), 9);
        assert_eq!(world.registry().len(), 9);
        assert_eq!(world.surfaces().visible_count(), 9);
    }

    #[test]
    fn test_shutdown_releases_everything() {
        let mut world = World::inline(&flat_config(), HeadlessSurfaces::new()).unwrap();
        world.start(0.0, 0.0);
        load(&mut world, 0.0, 0.0);

        let surfaces = world.shutdown();
        assert!(surfaces.is_empty());
        assert_eq!(surfaces.spawned(), surfaces.despawned());
    }
}
