//! # LOAM Procedural Generation
//!
//! Deterministic density-field terrain for an infinite voxel world.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same settings always produce the same terrain
//! 2. **Seamless**: All sampling uses world-absolute coordinates, so chunk
//!    borders never show
//! 3. **Total**: Out-of-range queries answer `None`, degenerate settings
//!    are clamped; nothing here panics on bad input
//!
//! ## Core Components
//!
//! - `ChunkCoord`: Spatial index over the horizontal chunk grid
//! - `DensityField`: Ground threshold + two ridged cave fields
//! - `VolumeGrid`: Dense 16x256x16 cell storage
//! - `TerrainGenerator`: Density field -> grid -> surface typing
//!
//! ## Example
//!
//! ```rust,ignore
//! use loam_procedural::{CellKind, ChunkCoord, NoiseSettings, TerrainGenerator};
//!
//! let generator = TerrainGenerator::new(&NoiseSettings::flat(20));
//! let grid = generator.generate(ChunkCoord::new(0, 0));
//!
//! assert_eq!(grid.get(0, 20, 0), Some(CellKind::Grass));
//! assert_eq!(grid.get(0, 21, 0), Some(CellKind::Empty));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod cell;
pub mod coord;
pub mod density;
pub mod face;
pub mod grid;
pub mod noise;
pub mod settings;
pub mod terrain;

pub use cell::{Cell, CellKind};
pub use coord::{ChunkCoord, Side, SideMask, CELLS_PER_CHUNK, CHUNK_HEIGHT, CHUNK_WIDTH};
pub use density::{combine, flip, CaveField, DensityField, DensitySample};
pub use face::{Face, FaceDirection};
pub use grid::VolumeGrid;
pub use noise::{GradientNoise, NoiseQuality, SimplexNoise, WorldSeed};
pub use settings::{NoiseSettings, RidgedNoiseSettings, MAX_OCTAVES};
pub use terrain::{apply_surface_layers, TerrainGenerator, BEDROCK_DEPTH, DIRT_DEPTH};
