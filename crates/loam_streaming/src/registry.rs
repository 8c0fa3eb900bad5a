//! # Chunk Registry
//!
//! The world-wide map from chunk coordinate to live chunk.
//!
//! The registry is the one place that knows which chunks exist and which
//! grid each one currently shows. It is shared between the main loop and
//! the workers as an `Arc<ChunkRegistry>`:
//!
//! - the main loop inserts, removes, publishes and edits;
//! - workers only clone `Arc<VolumeGrid>` snapshots of neighbours.
//!
//! Every lock is held for a handful of map operations, never across
//! generation or meshing.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use loam_procedural::{Cell, CellKind, ChunkCoord, Side, SideMask, VolumeGrid, CHUNK_WIDTH};

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const WIDTH: i32 = CHUNK_WIDTH as i32;

// =============================================================================
// CHUNK IDENTITY
// =============================================================================

/// Handle to one chunk instance.
///
/// The generation is issued by the registry and never reused, so a handle
/// to a destroyed chunk never matches a later chunk at the same coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId {
    /// Where the chunk sits.
    pub coord: ChunkCoord,
    /// Instance counter.
    pub generation: u64,
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.coord, self.generation)
    }
}

/// Registry entry for a live chunk.
#[derive(Clone, Debug)]
pub struct ChunkRecord {
    /// Chunk handle.
    pub id: ChunkId,
    /// Published grid, `None` until the first completion is applied.
    pub grid: Option<Arc<VolumeGrid>>,
    /// Whether the chunk was placed visibly.
    pub visible: bool,
    /// Epoch of the most recently dispatched job.
    pub dispatched_epoch: u64,
    /// Epoch of the most recently applied completion.
    pub applied_epoch: u64,
}

impl ChunkRecord {
    fn new(id: ChunkId) -> Self {
        Self {
            id,
            grid: None,
            visible: false,
            dispatched_epoch: 0,
            applied_epoch: 0,
        }
    }

    /// Returns true once a grid has been published.
    #[inline]
    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.grid.is_some()
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Thread-safe map of live chunks.
#[derive(Default)]
pub struct ChunkRegistry {
    chunks: Mutex<HashMap<ChunkCoord, ChunkRecord>>,
    next_generation: AtomicU64,
}

impl ChunkRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh handle for `coord`.
    #[must_use]
    pub fn next_id(&self, coord: ChunkCoord) -> ChunkId {
        ChunkId {
            coord,
            generation: self.next_generation.fetch_add(1, Ordering::Relaxed) + 1,
        }
    }

    /// Registers a new chunk. Fails if the coordinate is occupied.
    pub fn insert(&self, id: ChunkId) -> bool {
        let mut chunks = self.chunks.lock();
        if chunks.contains_key(&id.coord) {
            return false;
        }
        chunks.insert(id.coord, ChunkRecord::new(id));
        true
    }

    /// Unregisters a chunk if `id` is still the live instance.
    pub fn remove(&self, id: ChunkId) -> Option<ChunkRecord> {
        let mut chunks = self.chunks.lock();
        match chunks.get(&id.coord) {
            Some(record) if record.id == id => chunks.remove(&id.coord),
            _ => None,
        }
    }

    /// Number of registered chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.lock().len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.lock().is_empty()
    }

    /// Number of chunks with a published grid.
    #[must_use]
    pub fn populated_count(&self) -> usize {
        self.chunks
            .lock()
            .values()
            .filter(|record| record.is_populated())
            .count()
    }

    /// Returns true if any chunk occupies `coord`.
    #[must_use]
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.lock().contains_key(&coord)
    }

    /// Returns true if `id` is the live instance at its coordinate.
    #[must_use]
    pub fn is_current(&self, id: ChunkId) -> bool {
        self.chunks
            .lock()
            .get(&id.coord)
            .is_some_and(|record| record.id == id)
    }

    /// Live handle at a coordinate.
    #[must_use]
    pub fn id_at(&self, coord: ChunkCoord) -> Option<ChunkId> {
        self.chunks.lock().get(&coord).map(|record| record.id)
    }

    /// Copy of the record at a coordinate.
    #[must_use]
    pub fn record(&self, coord: ChunkCoord) -> Option<ChunkRecord> {
        self.chunks.lock().get(&coord).cloned()
    }

    /// Every live handle, sorted by coordinate.
    #[must_use]
    pub fn ids(&self) -> Vec<ChunkId> {
        let mut ids: Vec<_> = self.chunks.lock().values().map(|record| record.id).collect();
        ids.sort_unstable();
        ids
    }

    /// Snapshot of the grid at a coordinate.
    #[must_use]
    pub fn grid(&self, coord: ChunkCoord) -> Option<Arc<VolumeGrid>> {
        self.chunks.lock().get(&coord).and_then(|record| record.grid.clone())
    }

    /// Snapshot of the grid of a specific instance.
    #[must_use]
    pub fn grid_of(&self, id: ChunkId) -> Option<Arc<VolumeGrid>> {
        self.chunks
            .lock()
            .get(&id.coord)
            .filter(|record| record.id == id)
            .and_then(|record| record.grid.clone())
    }

    /// Grids of the four lateral neighbours, in [`Side::ALL`] order.
    #[must_use]
    pub fn neighbor_grids(&self, coord: ChunkCoord) -> [Option<Arc<VolumeGrid>>; 4] {
        let chunks = self.chunks.lock();
        Side::ALL.map(|side| {
            chunks
                .get(&coord.neighbor(side))
                .and_then(|record| record.grid.clone())
        })
    }

    /// Sides of `coord` whose neighbour has a published grid.
    #[must_use]
    pub fn populated_sides(&self, coord: ChunkCoord) -> SideMask {
        let chunks = self.chunks.lock();
        Side::ALL
            .into_iter()
            .filter(|&side| {
                chunks
                    .get(&coord.neighbor(side))
                    .is_some_and(ChunkRecord::is_populated)
            })
            .fold(SideMask::EMPTY, SideMask::with)
    }

    // =========================================================================
    // MUTATION (main loop only)
    // =========================================================================

    /// Swaps in a fully built grid.
    pub fn publish_grid(&self, id: ChunkId, grid: Arc<VolumeGrid>) -> bool {
        self.with_record(id, |record| record.grid = Some(grid))
            .is_some()
    }

    /// Records the visibility chosen at placement.
    pub fn set_visible(&self, id: ChunkId, visible: bool) -> bool {
        self.with_record(id, |record| record.visible = visible)
            .is_some()
    }

    /// Notes that a job with `epoch` was dispatched for `id`.
    pub fn mark_dispatched(&self, id: ChunkId, epoch: u64) -> bool {
        self.with_record(id, |record| {
            record.dispatched_epoch = record.dispatched_epoch.max(epoch);
        })
        .is_some()
    }

    /// Epoch of the latest job dispatched for `id`.
    #[must_use]
    pub fn dispatched_epoch(&self, id: ChunkId) -> Option<u64> {
        self.chunks
            .lock()
            .get(&id.coord)
            .filter(|record| record.id == id)
            .map(|record| record.dispatched_epoch)
    }

    /// Admits a completion for application.
    ///
    /// Returns false when the chunk is gone or replaced, or when a newer
    /// completion was already applied. Otherwise the applied epoch advances.
    pub fn accept_completion(&self, id: ChunkId, epoch: u64) -> bool {
        self.with_record(id, |record| {
            if epoch < record.applied_epoch {
                return false;
            }
            record.applied_epoch = epoch;
            true
        })
        .unwrap_or(false)
    }

    /// Writes one cell through copy-on-write.
    ///
    /// Workers holding the old snapshot keep it; the record gets a private
    /// copy if one is shared. Returns the chunk and the previous kind, or
    /// `None` when the chunk is not loaded or `by` is out of range.
    pub fn set_cell(
        &self,
        block_x: i32,
        block_y: i32,
        block_z: i32,
        kind: CellKind,
    ) -> Option<(ChunkId, CellKind)> {
        let coord = ChunkCoord::from_block_pos(block_x, block_z);
        let (lx, lz) = (block_x.rem_euclid(WIDTH), block_z.rem_euclid(WIDTH));
        VolumeGrid::index(lx, block_y, lz)?;

        let mut chunks = self.chunks.lock();
        let record = chunks.get_mut(&coord)?;
        let grid = record.grid.as_mut()?;
        let previous = Arc::make_mut(grid).set(lx, block_y, lz, kind)?;
        Some((record.id, previous))
    }

    fn with_record<R>(&self, id: ChunkId, f: impl FnOnce(&mut ChunkRecord) -> R) -> Option<R> {
        let mut chunks = self.chunks.lock();
        chunks
            .get_mut(&id.coord)
            .filter(|record| record.id == id)
            .map(f)
    }

    // =========================================================================
    // POINT QUERIES
    // =========================================================================

    /// Live chunk containing a block column.
    #[must_use]
    pub fn find_chunk(&self, block_x: i32, block_z: i32) -> Option<ChunkId> {
        self.id_at(ChunkCoord::from_block_pos(block_x, block_z))
    }

    /// Cell at a block position, `None` if its chunk is not populated.
    #[must_use]
    pub fn find_cell(&self, block_x: i32, block_y: i32, block_z: i32) -> Option<Cell> {
        let grid = self.grid(ChunkCoord::from_block_pos(block_x, block_z))?;
        grid.cell(block_x.rem_euclid(WIDTH), block_y, block_z.rem_euclid(WIDTH))
    }

    /// Height of the topmost solid cell in a block column.
    #[must_use]
    pub fn surface_height(&self, block_x: i32, block_z: i32) -> Option<usize> {
        let grid = self.grid(ChunkCoord::from_block_pos(block_x, block_z))?;
        grid.column_top(block_x.rem_euclid(WIDTH), block_z.rem_euclid(WIDTH))
    }
}

impl fmt::Debug for ChunkRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chunks = self.chunks.lock();
        f.debug_struct("ChunkRegistry")
            .field("chunks", &chunks.len())
            .field(
                "populated",
                &chunks.values().filter(|r| r.is_populated()).count(),
            )
            .finish()
    }
}
