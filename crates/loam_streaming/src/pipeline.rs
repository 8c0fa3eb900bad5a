//! # Generation Pipeline
//!
//! Moves chunks from "someone asked for this coordinate" to "grid and mesh
//! are on screen".
//!
//! ```text
//!  request() ──▶ [request queue] ──tick──▶ register + spawn + place
//!                                               │
//!                                           Job::Generate
//!                                               ▼
//!                                          [job queue] ──▶ workers
//!                                                             │
//!  tick ◀── [completion queue] ◀────────── Completion ────────┘
//!    │
//!    └─▶ publish grid, apply mesh, refresh neighbours
//! ```
//!
//! ## Ordering
//!
//! Within one tick every pending request is instantiated before any
//! completion is applied. For one chunk, the grid is always handed to the
//! surfaces before the mesh built from it.
//!
//! ## Staleness
//!
//! Nothing is ever cancelled. A completion is dropped when its chunk was
//! destroyed in the meantime (generation mismatch) or when a completion from
//! a later dispatch was already applied (epoch order). Dropped completions
//! still count as finished work.
//!
//! ## Neighbours
//!
//! A mesh only hides edge faces against neighbours whose grids it could see.
//! Publishing a grid therefore remeshes every populated lateral neighbour,
//! and a mesh that missed a neighbour which has since been populated is
//! rebuilt once more.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};

use loam_meshing::TextureIndexProvider;
use loam_procedural::{
    CellKind, ChunkCoord, NoiseSettings, Side, VolumeGrid, CHUNK_WIDTH,
};

use crate::config::StreamingConfig;
use crate::error::StreamingResult;
use crate::job::{Completion, Job, JobContext, JobKind};
use crate::registry::{ChunkId, ChunkRegistry};
use crate::surface::ChunkSurfaces;
use crate::worker::WorkerPool;

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const WIDTH: i32 = CHUNK_WIDTH as i32;

// =============================================================================
// PLACEMENT
// =============================================================================

/// Decision taken when a requested chunk is instantiated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Keep the chunk and make it visible.
    Show,
    /// Keep the chunk but leave it hidden.
    Hide,
    /// Nobody wants the chunk any more; destroy it before generating.
    Discard,
}

/// Callback run synchronously for every instantiated chunk.
pub trait PlacementHandler {
    /// Decides what happens to a freshly registered, still empty chunk.
    fn on_instantiated(&mut self, coord: ChunkCoord, id: ChunkId) -> Placement;
}

impl<F> PlacementHandler for F
where
    F: FnMut(ChunkCoord, ChunkId) -> Placement,
{
    fn on_instantiated(&mut self, coord: ChunkCoord, id: ChunkId) -> Placement {
        self(coord, id)
    }
}

// =============================================================================
// REPORTS
// =============================================================================

/// What one [`GenerationPipeline::tick`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Requests turned into chunks.
    pub instantiated: usize,
    /// Chunks destroyed at placement.
    pub discarded: usize,
    /// Completions applied.
    pub applied: usize,
    /// Completions dropped as stale.
    pub stale: usize,
    /// Remeshes dispatched.
    pub refreshed: usize,
}

/// Running totals over the pipeline's lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Requests accepted.
    pub requested: u64,
    /// Requests rejected as duplicates.
    pub rejected: u64,
    /// Chunks registered.
    pub instantiated: u64,
    /// Chunks destroyed at placement.
    pub discarded: u64,
    /// Chunks destroyed for any reason.
    pub destroyed: u64,
    /// Grids published.
    pub generated: u64,
    /// Remeshes dispatched.
    pub refreshed: u64,
    /// Meshes applied.
    pub applied: u64,
    /// Completions dropped as stale.
    pub stale: u64,
}

// =============================================================================
// EXECUTION
// =============================================================================

enum Executor {
    /// Jobs run on background threads.
    Pool(WorkerPool),
    /// Jobs wait until [`GenerationPipeline::run_pending_jobs`].
    Inline {
        jobs: Receiver<Job>,
        completions: Sender<Completion>,
        context: JobContext,
    },
}

// =============================================================================
// PIPELINE
// =============================================================================

/// Request queue, background generation and main-loop application.
pub struct GenerationPipeline {
    // Declared before `executor` so workers see the channel close before
    // the pool joins them.
    jobs: Sender<Job>,
    completions: Receiver<Completion>,
    executor: Executor,
    registry: Arc<ChunkRegistry>,
    config: StreamingConfig,
    requests: VecDeque<(ChunkCoord, Arc<NoiseSettings>)>,
    in_flight: HashSet<ChunkCoord>,
    outstanding: usize,
    next_epoch: u64,
    stats: PipelineStats,
}

impl GenerationPipeline {
    /// Creates a pipeline backed by a worker pool.
    ///
    /// # Errors
    ///
    /// Returns [`StreamingError::WorkerSpawn`](crate::StreamingError::WorkerSpawn)
    /// if a worker thread cannot be started.
    pub fn new(
        config: StreamingConfig,
        textures: Arc<dyn TextureIndexProvider>,
    ) -> StreamingResult<Self> {
        let registry = Arc::new(ChunkRegistry::new());
        let (job_tx, job_rx) = unbounded();
        let (done_tx, done_rx) = unbounded();
        let context = JobContext::new(Arc::clone(&registry), textures);
        let pool = WorkerPool::spawn(
            config.resolved_worker_threads(),
            &job_rx,
            &done_tx,
            &context,
        )?;

        Ok(Self::assemble(
            job_tx,
            done_rx,
            Executor::Pool(pool),
            registry,
            config,
        ))
    }

    /// Creates a pipeline whose jobs only run when
    /// [`run_pending_jobs`](Self::run_pending_jobs) is called.
    #[must_use]
    pub fn inline(config: StreamingConfig, textures: Arc<dyn TextureIndexProvider>) -> Self {
        let registry = Arc::new(ChunkRegistry::new());
        let (job_tx, job_rx) = unbounded();
        let (done_tx, done_rx) = unbounded();
        let context = JobContext::new(Arc::clone(&registry), textures);

        Self::assemble(
            job_tx,
            done_rx,
            Executor::Inline {
                jobs: job_rx,
                completions: done_tx,
                context,
            },
            registry,
            config,
        )
    }

    fn assemble(
        jobs: Sender<Job>,
        completions: Receiver<Completion>,
        executor: Executor,
        registry: Arc<ChunkRegistry>,
        config: StreamingConfig,
    ) -> Self {
        Self {
            jobs,
            completions,
            executor,
            registry,
            config,
            requests: VecDeque::new(),
            in_flight: HashSet::new(),
            outstanding: 0,
            next_epoch: 0,
            stats: PipelineStats::default(),
        }
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Shared chunk registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ChunkRegistry> {
        &self.registry
    }

    /// Streaming config in use.
    #[must_use]
    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    /// Returns true while any request or job is unfinished.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.outstanding > 0 || !self.requests.is_empty()
    }

    /// Returns true if `coord` was requested but not yet instantiated.
    #[must_use]
    pub fn is_requested(&self, coord: ChunkCoord) -> bool {
        self.in_flight.contains(&coord)
    }

    /// Requests waiting for the next tick.
    #[must_use]
    pub fn pending_requests(&self) -> usize {
        self.requests.len()
    }

    /// Jobs dispatched but not yet applied or dropped.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Lifetime totals.
    #[must_use]
    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Returns true if jobs run on background threads.
    #[must_use]
    pub fn is_threaded(&self) -> bool {
        matches!(self.executor, Executor::Pool(_))
    }

    // =========================================================================
    // INTAKE
    // =========================================================================

    /// Queues a chunk for creation.
    ///
    /// Returns false, changing nothing, if the coordinate is already in
    /// flight or already registered.
    pub fn request(&mut self, coord: ChunkCoord, settings: Arc<NoiseSettings>) -> bool {
        if self.in_flight.contains(&coord) || self.registry.contains(coord) {
            self.stats.rejected += 1;
            tracing::debug!(%coord, "duplicate chunk request ignored");
            return false;
        }
        self.in_flight.insert(coord);
        self.requests.push_back((coord, settings));
        self.stats.requested += 1;
        true
    }

    // =========================================================================
    // MAIN LOOP
    // =========================================================================

    /// Instantiates pending requests, then applies finished work.
    ///
    /// Never blocks on a worker.
    pub fn tick(
        &mut self,
        handler: &mut dyn PlacementHandler,
        surfaces: &mut dyn ChunkSurfaces,
    ) -> TickReport {
        let mut report = TickReport::default();
        self.instantiate_requests(handler, surfaces, &mut report);
        self.apply_completions(surfaces, &mut report);

        if report != TickReport::default() {
            tracing::trace!(?report, outstanding = self.outstanding, "pipeline tick");
        }
        report
    }

    fn instantiate_requests(
        &mut self,
        handler: &mut dyn PlacementHandler,
        surfaces: &mut dyn ChunkSurfaces,
        report: &mut TickReport,
    ) {
        let budget = budget(self.config.max_instantiations_per_tick);

        while report.instantiated + report.discarded < budget {
            let Some((coord, settings)) = self.requests.pop_front() else {
                break;
            };

            let id = self.registry.next_id(coord);
            if !self.registry.insert(id) {
                self.in_flight.remove(&coord);
                tracing::warn!(%coord, "request raced an existing chunk, dropped");
                continue;
            }
            surfaces.spawn(id);
            self.stats.instantiated += 1;

            let placement = handler.on_instantiated(coord, id);
            self.in_flight.remove(&coord);

            match placement {
                Placement::Discard => {
                    self.destroy(id, surfaces);
                    self.stats.discarded += 1;
                    report.discarded += 1;
                    continue;
                }
                Placement::Show => {
                    self.registry.set_visible(id, true);
                    surfaces.set_visible(id, true);
                }
                Placement::Hide => {}
            }

            let epoch = self.next_epoch();
            self.registry.mark_dispatched(id, epoch);
            self.dispatch(Job::Generate {
                id,
                settings,
                epoch,
            });
            report.instantiated += 1;
        }
    }

    fn apply_completions(&mut self, surfaces: &mut dyn ChunkSurfaces, report: &mut TickReport) {
        let budget = budget(self.config.max_completions_per_tick);

        while report.applied + report.stale < budget {
            let Ok(completion) = self.completions.try_recv() else {
                break;
            };
            self.outstanding = self.outstanding.saturating_sub(1);

            let id = completion.id;
            let grid = match completion.grid {
                Some(grid) if self.registry.accept_completion(id, completion.epoch) => grid,
                _ => {
                    tracing::debug!(%id, epoch = completion.epoch, "stale completion dropped");
                    self.stats.stale += 1;
                    report.stale += 1;
                    continue;
                }
            };

            let generated = completion.kind == JobKind::Generate;
            if generated {
                self.registry.publish_grid(id, Arc::clone(&grid));
                self.stats.generated += 1;
            }
            surfaces.apply_grid(id, &grid);
            surfaces.apply_mesh(id, &completion.mesh);
            self.stats.applied += 1;
            report.applied += 1;

            if generated {
                for side in Side::ALL {
                    let neighbor = id.coord.neighbor(side);
                    let populated = self
                        .registry
                        .record(neighbor)
                        .filter(|record| record.is_populated());
                    if let Some(record) = populated {
                        if self.refresh(record.id) {
                            report.refreshed += 1;
                        }
                    }
                }
            }

            let seen = completion.mesh.neighbors;
            let populated = self.registry.populated_sides(id.coord);
            let missed = Side::ALL
                .into_iter()
                .any(|side| populated.contains(side) && !seen.contains(side));
            let latest = self.registry.dispatched_epoch(id) == Some(completion.epoch);
            if missed && latest && self.refresh(id) {
                report.refreshed += 1;
            }
        }
    }

    // =========================================================================
    // CHUNK OPERATIONS
    // =========================================================================

    /// Rebuilds a chunk's mesh from its current grid.
    ///
    /// Returns false if the chunk is gone or has no grid yet.
    pub fn refresh(&mut self, id: ChunkId) -> bool {
        let Some(grid) = self.registry.grid_of(id) else {
            return false;
        };
        let epoch = self.next_epoch();
        self.registry.mark_dispatched(id, epoch);
        self.dispatch(Job::Remesh { id, grid, epoch });
        self.stats.refreshed += 1;
        true
    }

    /// Unregisters and despawns a chunk. Its in-flight work will be dropped.
    ///
    /// Populated neighbours are remeshed so the walls they hid against the
    /// chunk show again.
    pub fn destroy(&mut self, id: ChunkId, surfaces: &mut dyn ChunkSurfaces) -> bool {
        self.destroy_many(&[id], surfaces) == 1
    }

    /// Destroys a batch of chunks, then remeshes each surviving populated
    /// neighbour once. Returns how many were destroyed.
    pub fn destroy_many(&mut self, ids: &[ChunkId], surfaces: &mut dyn ChunkSurfaces) -> usize {
        let mut uncovered = Vec::new();
        let mut destroyed = 0;
        for &id in ids {
            let Some(record) = self.registry.remove(id) else {
                continue;
            };
            surfaces.despawn(id);
            self.stats.destroyed += 1;
            destroyed += 1;
            if record.is_populated() {
                uncovered.push(id.coord);
            }
        }

        let mut neighbors: Vec<ChunkId> = uncovered
            .iter()
            .flat_map(|coord| Side::ALL.into_iter().map(move |side| coord.neighbor(side)))
            .filter_map(|coord| self.registry.record(coord))
            .filter(|record| record.is_populated())
            .map(|record| record.id)
            .collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        let refreshed = neighbors.into_iter().filter(|&id| self.refresh(id)).count();

        if destroyed > 0 {
            tracing::debug!(destroyed, refreshed, "chunks destroyed");
        }
        destroyed
    }

    /// Destroys every registered chunk.
    pub fn destroy_all(&mut self, surfaces: &mut dyn ChunkSurfaces) -> usize {
        let ids = self.registry.ids();
        self.destroy_many(&ids, surfaces)
    }

    /// Changes one cell of a loaded chunk and remeshes what it touches.
    ///
    /// A cell on a chunk edge also remeshes the chunk across that edge.
    /// Returns the previous kind, or `None` if the chunk is not loaded or
    /// `block_y` is out of range.
    pub fn set_cell(
        &mut self,
        block_x: i32,
        block_y: i32,
        block_z: i32,
        kind: CellKind,
    ) -> Option<CellKind> {
        let (id, previous) = self.registry.set_cell(block_x, block_y, block_z, kind)?;
        if previous == kind {
            return Some(previous);
        }
        self.refresh(id);

        let (lx, lz) = (block_x.rem_euclid(WIDTH), block_z.rem_euclid(WIDTH));
        for (on_edge, side) in [
            (lx == 0, Side::Left),
            (lx == WIDTH - 1, Side::Right),
            (lz == 0, Side::Back),
            (lz == WIDTH - 1, Side::Forward),
        ] {
            if !on_edge {
                continue;
            }
            if let Some(neighbor) = self.registry.id_at(id.coord.neighbor(side)) {
                self.refresh(neighbor);
            }
        }

        tracing::debug!(block_x, block_y, block_z, ?previous, ?kind, "cell edited");
        Some(previous)
    }

    /// Current grid of the chunk at `coord`.
    #[must_use]
    pub fn grid(&self, coord: ChunkCoord) -> Option<Arc<VolumeGrid>> {
        self.registry.grid(coord)
    }

    // =========================================================================
    // INLINE EXECUTION
    // =========================================================================

    /// Runs up to `limit` queued jobs on the calling thread.
    ///
    /// Only inline pipelines hold jobs; a threaded pipeline returns 0.
    pub fn run_pending_jobs(&mut self, limit: usize) -> usize {
        let Executor::Inline {
            jobs,
            completions,
            context,
        } = &mut self.executor
        else {
            return 0;
        };

        let mut ran = 0;
        while ran < limit {
            let Ok(job) = jobs.try_recv() else {
                break;
            };
            let completion = context.run(job);
            ran += 1;
            if completions.send(completion).is_err() {
                break;
            }
        }
        ran
    }

    fn next_epoch(&mut self) -> u64 {
        self.next_epoch += 1;
        self.next_epoch
    }

    fn dispatch(&mut self, job: Job) {
        let id = job.id();
        match self.jobs.send(job) {
            Ok(()) => self.outstanding += 1,
            Err(_) => tracing::warn!(%id, "job queue closed, chunk will not be built"),
        }
    }
}

impl std::fmt::Debug for GenerationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationPipeline")
            .field("threaded", &self.is_threaded())
            .field("registry", &self.registry)
            .field("requests", &self.requests.len())
            .field("outstanding", &self.outstanding)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

/// Per-tick cap, with 0 meaning unbounded.
const fn budget(limit: usize) -> usize {
    if limit == 0 {
        usize::MAX
    } else {
        limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loam_meshing::{AtlasConfig, TextureAtlas};

    use crate::surface::HeadlessSurfaces;

    fn pipeline(config: StreamingConfig) -> GenerationPipeline {
        let atlas = TextureAtlas::from_config(&AtlasConfig::default()).unwrap();
        GenerationPipeline::inline(config, Arc::new(atlas))
    }

    fn show(_: ChunkCoord, _: ChunkId) -> Placement {
        Placement::Show
    }

    #[test]
    fn test_request_rejects_duplicates() {
        let mut pipeline = pipeline(StreamingConfig::testing());
        let settings = Arc::new(NoiseSettings::flat(5));
        let coord = ChunkCoord::new(0, 0);

        assert!(pipeline.request(coord, Arc::clone(&settings)));
        assert!(!pipeline.request(coord, Arc::clone(&settings)));
        assert!(pipeline.is_requested(coord));
        assert!(pipeline.is_loading());
        assert_eq!(pipeline.pending_requests(), 1);

        let mut surfaces = HeadlessSurfaces::new();
        pipeline.tick(&mut show, &mut surfaces);
        assert!(!pipeline.is_requested(coord));
        // Registered now, still a duplicate
        assert!(!pipeline.request(coord, settings));
        assert_eq!(pipeline.stats().rejected, 2);
    }

    #[test]
    fn test_instantiation_budget() {
        let mut pipeline = pipeline(StreamingConfig {
            max_instantiations_per_tick: 2,
            ..StreamingConfig::testing()
        });
        let settings = Arc::new(NoiseSettings::flat(5));
        for x in 0..5 {
            pipeline.request(ChunkCoord::new(x, 0), Arc::clone(&settings));
        }

        let mut surfaces = HeadlessSurfaces::new();
        assert_eq!(pipeline.tick(&mut show, &mut surfaces).instantiated, 2);
        assert_eq!(pipeline.tick(&mut show, &mut surfaces).instantiated, 2);
        assert_eq!(pipeline.tick(&mut show, &mut surfaces).instantiated, 1);
        assert_eq!(pipeline.pending_requests(), 0);
        assert_eq!(pipeline.outstanding(), 5);
    }

    #[test]
    fn test_discard_skips_generation() {
        let mut pipeline = pipeline(StreamingConfig::testing());
        pipeline.request(ChunkCoord::new(1, 1), Arc::new(NoiseSettings::flat(5)));

        let mut surfaces = HeadlessSurfaces::new();
        let mut discard = |_: ChunkCoord, _: ChunkId| Placement::Discard;
        let report = pipeline.tick(&mut discard, &mut surfaces);

        assert_eq!(report.discarded, 1);
        assert_eq!(report.instantiated, 0);
        assert!(pipeline.registry().is_empty());
        assert!(surfaces.is_empty());
        assert_eq!(surfaces.spawned(), 1);
        assert!(!pipeline.is_loading());
    }

    #[test]
    fn test_hidden_chunk_stays_invisible() {
        let mut pipeline = pipeline(StreamingConfig::testing());
        pipeline.request(ChunkCoord::new(0, 0), Arc::new(NoiseSettings::flat(5)));

        let mut surfaces = HeadlessSurfaces::new();
        let mut hide = |_: ChunkCoord, _: ChunkId| Placement::Hide;
        pipeline.tick(&mut hide, &mut surfaces);
        pipeline.run_pending_jobs(usize::MAX);
        let report = pipeline.tick(&mut hide, &mut surfaces);

        assert_eq!(report.applied, 1);
        assert_eq!(surfaces.visible_count(), 0);
        assert_eq!(surfaces.len(), 1);
    }

    #[test]
    fn test_refresh_and_set_cell_need_grid() {
        let mut pipeline = pipeline(StreamingConfig::testing());
        pipeline.request(ChunkCoord::new(0, 0), Arc::new(NoiseSettings::flat(5)));
        let mut surfaces = HeadlessSurfaces::new();
        pipeline.tick(&mut show, &mut surfaces);

        let id = pipeline.registry().id_at(ChunkCoord::new(0, 0)).unwrap();
        assert!(!pipeline.refresh(id));
        assert_eq!(pipeline.set_cell(1, 1, 1, CellKind::Empty), None);
    }

    #[test]
    fn test_destroy_all_leaves_nothing_to_refresh() {
        let mut pipeline = pipeline(StreamingConfig::testing());
        let settings = Arc::new(NoiseSettings::flat(5));
        for x in 0..3 {
            pipeline.request(ChunkCoord::new(x, 0), Arc::clone(&settings));
        }
        let mut surfaces = HeadlessSurfaces::new();
        pipeline.tick(&mut show, &mut surfaces);
        while pipeline.is_loading() {
            pipeline.run_pending_jobs(usize::MAX);
            pipeline.tick(&mut show, &mut surfaces);
        }
        let refreshed = pipeline.stats().refreshed;

        assert_eq!(pipeline.destroy_all(&mut surfaces), 3);
        assert_eq!(pipeline.stats().refreshed, refreshed);
        assert!(!pipeline.is_loading());
        assert!(surfaces.is_empty());
    }

    #[test]
    fn test_budget() {
        assert_eq!(budget(0), usize::MAX);
        assert_eq!(budget(7), 7);
    }
}
