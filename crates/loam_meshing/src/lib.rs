//! # LOAM Meshing
//!
//! Turns a chunk's [`VolumeGrid`](loam_procedural::VolumeGrid) into quads.
//!
//! ## Core Components
//!
//! - `FaceMesher`: one quad per exposed face, consulting lateral neighbours
//!   at chunk edges
//! - `TextureIndexProvider`: injected tile lookup; `TextureAtlas` is the
//!   config-driven implementation
//! - `ChunkMesh`: positions, UVs and indices, with byte views for upload
//!
//! ## Example
//!
//! ```rust,ignore
//! use loam_meshing::{AtlasConfig, FaceMesher, NeighborGrids, TextureAtlas};
//! use loam_procedural::{CellKind, VolumeGrid};
//!
//! let atlas = TextureAtlas::from_config(&AtlasConfig::default())?;
//! let mut grid = VolumeGrid::new();
//! grid.set(8, 8, 8, CellKind::Stone);
//!
//! let mesh = FaceMesher::new(&atlas).mesh(&grid, &NeighborGrids::NONE);
//! assert_eq!(mesh.quad_count(), 6);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod mesh;
pub mod mesher;
pub mod texture;

pub use error::{AtlasError, AtlasResult};
pub use mesh::{ChunkMesh, INDICES_PER_QUAD, VERTICES_PER_QUAD};
pub use mesher::{is_exposed, FaceMesher, NeighborGrids};
pub use texture::{AtlasConfig, CellTextures, TextureAtlas, TextureIndexProvider, UvRect};
