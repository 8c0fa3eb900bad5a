//! # LOAM
//!
//! Infinite, procedurally generated voxel terrain, streamed around a moving
//! observer.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────┐   ┌────────────────────┐   ┌────────────────────┐
//! │  loam_procedural   │──▶│   loam_meshing     │──▶│   loam_streaming   │
//! │                    │   │                    │   │                    │
//! │  • Chunk coords    │   │  • Face mesher     │   │  • Registry        │
//! │  • Density field   │   │  • Texture atlas   │   │  • Worker pool     │
//! │  • Volume grid     │   │  • Mesh buffers    │   │  • Window + World  │
//! └────────────────────┘   └────────────────────┘   └────────────────────┘
//! ```
//!
//! Engines plug in by implementing [`ChunkSurfaces`](streaming::ChunkSurfaces)
//! and calling [`World::tick`](streaming::World::tick) once per frame.

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub use loam_meshing as meshing;
pub use loam_procedural as procedural;
pub use loam_streaming as streaming;

/// Types most callers need.
pub mod prelude {
    pub use loam_meshing::{
        AtlasConfig, ChunkMesh, FaceMesher, NeighborGrids, TextureAtlas, TextureIndexProvider,
    };
    pub use loam_procedural::{
        Cell, CellKind, ChunkCoord, NoiseSettings, RidgedNoiseSettings, TerrainGenerator,
        VolumeGrid, CHUNK_HEIGHT, CHUNK_WIDTH,
    };
    pub use loam_streaming::{
        ChunkId, ChunkSurfaces, GenerationPipeline, HeadlessSurfaces, Placement,
        PlacementHandler, StreamingConfig, StreamingError, StreamingResult, StreamingWindow,
        World, WorldConfig,
    };
}
