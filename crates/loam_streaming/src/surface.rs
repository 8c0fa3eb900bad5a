//! # Chunk Surfaces
//!
//! The boundary between the pipeline and whatever draws the world.
//!
//! The pipeline calls into [`ChunkSurfaces`] only from the main loop, and
//! for any one chunk always in the order `spawn`, then `apply_grid` before
//! each `apply_mesh`, then `despawn`. An engine binding uploads the mesh;
//! [`HeadlessSurfaces`] only keeps the books, which is all tests and the
//! headless binary need.

use std::collections::HashMap;
use std::sync::Arc;

use loam_meshing::ChunkMesh;
use loam_procedural::VolumeGrid;

use crate::registry::ChunkId;

/// Receiver of chunk lifecycle events on the main loop.
pub trait ChunkSurfaces {
    /// A chunk was created, invisible and without geometry.
    fn spawn(&mut self, id: ChunkId);

    /// The grid behind the next mesh. Useful for collision.
    fn apply_grid(&mut self, id: ChunkId, grid: &Arc<VolumeGrid>) {
        let _ = (id, grid);
    }

    /// New geometry for a chunk, replacing any previous mesh.
    fn apply_mesh(&mut self, id: ChunkId, mesh: &ChunkMesh);

    /// Shows or hides a chunk.
    fn set_visible(&mut self, id: ChunkId, visible: bool);

    /// The chunk is gone; release everything held for it.
    fn despawn(&mut self, id: ChunkId);
}

/// What [`HeadlessSurfaces`] remembers about one chunk.
#[derive(Clone, Debug, Default)]
pub struct SurfaceState {
    /// Current visibility.
    pub visible: bool,
    /// Quads in the latest mesh.
    pub quads: usize,
    /// Number of meshes applied so far.
    pub mesh_updates: u32,
    /// Grid behind the latest mesh.
    pub grid: Option<Arc<VolumeGrid>>,
}

/// Bookkeeping-only [`ChunkSurfaces`].
#[derive(Debug, Default)]
pub struct HeadlessSurfaces {
    chunks: HashMap<ChunkId, SurfaceState>,
    spawned: u64,
    despawned: u64,
}

impl HeadlessSurfaces {
    /// Creates an empty surface set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State of a live chunk.
    #[must_use]
    pub fn get(&self, id: ChunkId) -> Option<&SurfaceState> {
        self.chunks.get(&id)
    }

    /// Number of live chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns true if no chunk is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Number of visible chunks.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.chunks.values().filter(|state| state.visible).count()
    }

    /// Quads across every live chunk.
    #[must_use]
    pub fn total_quads(&self) -> usize {
        self.chunks.values().map(|state| state.quads).sum()
    }

    /// Chunks ever spawned.
    #[must_use]
    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    /// Chunks ever despawned.
    #[must_use]
    pub fn despawned(&self) -> u64 {
        self.despawned
    }
}

impl ChunkSurfaces for HeadlessSurfaces {
    fn spawn(&mut self, id: ChunkId) {
        self.spawned += 1;
        if self.chunks.insert(id, SurfaceState::default()).is_some() {
            tracing::warn!(%id, "chunk spawned twice");
        }
    }

    fn apply_grid(&mut self, id: ChunkId, grid: &Arc<VolumeGrid>) {
        if let Some(state) = self.chunks.get_mut(&id) {
            state.grid = Some(Arc::clone(grid));
        }
    }

    fn apply_mesh(&mut self, id: ChunkId, mesh: &ChunkMesh) {
        if let Some(state) = self.chunks.get_mut(&id) {
            state.quads = mesh.quad_count();
            state.mesh_updates += 1;
        }
    }

    fn set_visible(&mut self, id: ChunkId, visible: bool) {
        if let Some(state) = self.chunks.get_mut(&id) {
            state.visible = visible;
        }
    }

    fn despawn(&mut self, id: ChunkId) {
        if self.chunks.remove(&id).is_some() {
            self.despawned += 1;
        }
    }
}
