//! # Chunk Jobs
//!
//! Units of background work and their results.
//!
//! A job never touches surfaces and never writes to the registry. It reads
//! neighbour grids as `Arc` snapshots, builds its result privately and
//! hands it back as a [`Completion`] for the main loop to apply.

use std::sync::Arc;

use loam_meshing::{ChunkMesh, FaceMesher, NeighborGrids, TextureIndexProvider};
use loam_procedural::{NoiseSettings, Side, TerrainGenerator, VolumeGrid};

use crate::registry::{ChunkId, ChunkRegistry};

/// What a job was asked to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobKind {
    /// Generate a grid from the density field, then mesh it.
    Generate,
    /// Mesh an existing grid again.
    Remesh,
}

/// Background work for one chunk.
#[derive(Clone, Debug)]
pub enum Job {
    /// Build the chunk's grid and first mesh.
    Generate {
        /// Target chunk.
        id: ChunkId,
        /// Terrain parameters.
        settings: Arc<NoiseSettings>,
        /// Dispatch epoch.
        epoch: u64,
    },
    /// Rebuild the mesh of an already published grid.
    Remesh {
        /// Target chunk.
        id: ChunkId,
        /// Grid snapshot to mesh.
        grid: Arc<VolumeGrid>,
        /// Dispatch epoch.
        epoch: u64,
    },
}

impl Job {
    /// Target chunk.
    #[must_use]
    pub fn id(&self) -> ChunkId {
        match self {
            Self::Generate { id, .. } | Self::Remesh { id, .. } => *id,
        }
    }

    /// Dispatch epoch.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        match self {
            Self::Generate { epoch, .. } | Self::Remesh { epoch, .. } => *epoch,
        }
    }

    /// Job kind.
    #[must_use]
    pub fn kind(&self) -> JobKind {
        match self {
            Self::Generate { .. } => JobKind::Generate,
            Self::Remesh { .. } => JobKind::Remesh,
        }
    }
}

/// Result of a job, applied on the main loop.
#[derive(Clone, Debug)]
pub struct Completion {
    /// Target chunk.
    pub id: ChunkId,
    /// Epoch of the job that produced this.
    pub epoch: u64,
    /// Kind of the job that produced this.
    pub kind: JobKind,
    /// Grid the mesh was built from. `None` when the chunk was already gone
    /// and the work was skipped.
    pub grid: Option<Arc<VolumeGrid>>,
    /// Mesh, with the neighbours it saw.
    pub mesh: ChunkMesh,
}

impl Completion {
    /// Returns true if the job found its chunk destroyed and did nothing.
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        self.grid.is_none()
    }
}

/// Everything a job needs besides the job itself.
///
/// Each worker owns one context and keeps the last terrain generator around
/// so that consecutive jobs with the same settings skip rebuilding it.
#[derive(Clone)]
pub struct JobContext {
    registry: Arc<ChunkRegistry>,
    textures: Arc<dyn TextureIndexProvider>,
    generator: Option<(Arc<NoiseSettings>, Arc<TerrainGenerator>)>,
}

impl JobContext {
    /// Creates a context over a shared registry and texture lookup.
    #[must_use]
    pub fn new(registry: Arc<ChunkRegistry>, textures: Arc<dyn TextureIndexProvider>) -> Self {
        Self {
            registry,
            textures,
            generator: None,
        }
    }

    /// Runs one job to completion.
    pub fn run(&mut self, job: Job) -> Completion {
        let id = job.id();
        let epoch = job.epoch();
        let kind = job.kind();

        if !self.registry.is_current(id) {
            tracing::trace!(%id, ?kind, "chunk gone before its job ran");
            return Completion {
                id,
                epoch,
                kind,
                grid: None,
                mesh: ChunkMesh::default(),
            };
        }

        let grid = match job {
            Job::Generate { settings, .. } => Arc::new(self.generator(&settings).generate(id.coord)),
            Job::Remesh { grid, .. } => grid,
        };
        let mesh = self.mesh(id, &grid);

        Completion {
            id,
            epoch,
            kind,
            grid: Some(grid),
            mesh,
        }
    }

    /// Meshes `grid` against the neighbours currently in the registry.
    fn mesh(&self, id: ChunkId, grid: &VolumeGrid) -> ChunkMesh {
        let snapshots = self.registry.neighbor_grids(id.coord);
        let mut neighbors = NeighborGrids::NONE;
        for (side, snapshot) in Side::ALL.into_iter().zip(&snapshots) {
            neighbors.set(side, snapshot.as_deref());
        }
        FaceMesher::new(self.textures.as_ref()).mesh(grid, &neighbors)
    }

    fn generator(&mut self, settings: &Arc<NoiseSettings>) -> Arc<TerrainGenerator> {
        match &self.generator {
            Some((cached, generator)) if Arc::ptr_eq(cached, settings) => Arc::clone(generator),
            _ => {
                let generator = Arc::new(TerrainGenerator::new(settings));
                self.generator = Some((Arc::clone(settings), Arc::clone(&generator)));
                generator
            }
        }
    }
}

impl std::fmt::Debug for JobContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobContext")
            .field("registry", &self.registry)
            .field("cached_generator", &self.generator.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loam_meshing::{AtlasConfig, TextureAtlas};
    use loam_procedural::{CellKind, ChunkCoord};

    fn context() -> (Arc<ChunkRegistry>, JobContext) {
        let registry = Arc::new(ChunkRegistry::new());
        let atlas = TextureAtlas::from_config(&AtlasConfig::default()).unwrap();
        let context = JobContext::new(Arc::clone(&registry), Arc::new(atlas));
        (registry, context)
    }

    #[test]
    fn test_generate_job() {
        let (registry, mut context) = context();
        let id = registry.next_id(ChunkCoord::new(1, 1));
        registry.insert(id);

        let completion = context.run(Job::Generate {
            id,
            settings: Arc::new(NoiseSettings::flat(10)),
            epoch: 4,
        });
        assert_eq!(completion.id, id);
        assert_eq!(completion.epoch, 4);
        assert_eq!(completion.kind, JobKind::Generate);
        let grid = completion.grid.unwrap();
        assert_eq!(grid.get(3, 10, 3), Some(CellKind::Grass));
        assert!(completion.mesh.neighbors.is_empty());
        assert!(!completion.mesh.is_empty());
    }

    #[test]
    fn test_remesh_sees_published_neighbors() {
        let (registry, mut context) = context();
        let id = registry.next_id(ChunkCoord::new(0, 0));
        registry.insert(id);
        let left = registry.next_id(ChunkCoord::new(-1, 0));
        registry.insert(left);
        registry.publish_grid(left, Arc::new(VolumeGrid::new()));

        let completion = context.run(Job::Remesh {
            id,
            grid: Arc::new(VolumeGrid::new()),
            epoch: 1,
        });
        assert_eq!(completion.kind, JobKind::Remesh);
        assert!(completion.mesh.neighbors.contains(Side::Left));
        assert_eq!(completion.mesh.neighbors.len(), 1);
    }

    #[test]
    fn test_job_for_destroyed_chunk_is_skipped() {
        let (registry, mut context) = context();
        let id = registry.next_id(ChunkCoord::new(0, 0));

        let completion = context.run(Job::Generate {
            id,
            settings: Arc::new(NoiseSettings::default()),
            epoch: 1,
        });
        assert!(completion.is_skipped());
        assert!(completion.mesh.is_empty());
    }

    #[test]
    fn test_generator_cached_per_settings() {
        let (_registry, mut context) = context();
        let settings = Arc::new(NoiseSettings::default());
        let first = context.generator(&settings);
        let second = context.generator(&settings);
        assert!(Arc::ptr_eq(&first, &second));

        let other = Arc::new(NoiseSettings::default());
        let third = context.generator(&other);
        assert!(!Arc::ptr_eq(&first, &third));
    }
}
