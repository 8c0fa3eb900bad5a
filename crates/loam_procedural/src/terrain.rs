//! # Terrain Generator
//!
//! Fills a [`VolumeGrid`] for one chunk.
//!
//! Generation runs in passes, each over the complete grid:
//!
//! 1. **Solidity**: bottom to top per column from the density field. Solid
//!    cells start as grass; the bedrock floor is always stone.
//! 2. **Surface typing**: top down per column. Needs the full column, so it
//!    cannot be fused into pass 1.
//! 3. **Trees**: optional decoration on grass, clipped to the chunk.

use crate::cell::CellKind;
use crate::coord::{ChunkCoord, CHUNK_HEIGHT, CHUNK_WIDTH};
use crate::density::DensityField;
use crate::grid::VolumeGrid;
use crate::noise::WorldSeed;
use crate::settings::NoiseSettings;

/// Cells below this height are always stone.
pub const BEDROCK_DEPTH: usize = 3;

/// Number of dirt cells under the surface cell.
pub const DIRT_DEPTH: usize = 3;

/// Sub-seed purpose for tree placement.
const TREE_STREAM: u64 = 0x7472_6565;

/// Produces chunk grids from one settings snapshot.
pub struct TerrainGenerator {
    field: DensityField,
}

impl TerrainGenerator {
    /// Minimum trunk height.
    const TREE_MIN_HEIGHT: usize = 4;
    /// Maximum trunk height.
    const TREE_MAX_HEIGHT: usize = 6;
    /// Canopy radius; trunks keep this far from chunk edges.
    const TREE_MARGIN: usize = 2;
    /// Distance between tree candidate columns.
    const TREE_SPACING: usize = 4;

    /// Creates a generator for the given settings.
    #[must_use]
    pub fn new(settings: &NoiseSettings) -> Self {
        Self {
            field: DensityField::new(settings),
        }
    }

    /// The density field behind this generator.
    #[must_use]
    pub fn field(&self) -> &DensityField {
        &self.field
    }

    /// Generates the grid of a chunk.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn generate(&self, coord: ChunkCoord) -> VolumeGrid {
        let mut grid = VolumeGrid::new();

        // Pass 1: solidity
        for z in 0..CHUNK_WIDTH as i32 {
            for x in 0..CHUNK_WIDTH as i32 {
                let elevation = self.field.ground_elevation(coord, x, z);
                for y in 0..CHUNK_HEIGHT {
                    let kind = if y < BEDROCK_DEPTH {
                        CellKind::Stone
                    } else if self.field.sample_with_elevation(coord, elevation, x, y, z).solid {
                        CellKind::Grass
                    } else {
                        continue;
                    };
                    grid.set(x, y as i32, z, kind);
                }
            }
        }

        // Pass 2: surface typing
        apply_surface_layers(&mut grid);

        // Pass 3: vegetation
        if self.field.settings().tree_frequency > 0 {
            self.plant_trees(coord, &mut grid);
        }

        grid
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn plant_trees(&self, coord: ChunkCoord, grid: &mut VolumeGrid) {
        let settings = self.field.settings();
        let frequency = u64::from(settings.tree_frequency);
        let seed = WorldSeed::from_signed(settings.seed).derive(TREE_STREAM);

        let candidates = (Self::TREE_MARGIN..CHUNK_WIDTH - Self::TREE_MARGIN).step_by(Self::TREE_SPACING);
        for z in candidates.clone() {
            for x in candidates.clone() {
                let (xi, zi) = (x as i32, z as i32);
                let Some(top) = grid.column_top(xi, zi) else {
                    continue;
                };
                if grid.get(xi, top as i32, zi) != Some(CellKind::Grass) {
                    continue;
                }

                let roll = column_hash(seed, coord.world_x() + i64::from(xi), coord.world_z() + i64::from(zi));
                if roll % 100 >= frequency {
                    continue;
                }
                let span = (Self::TREE_MAX_HEIGHT - Self::TREE_MIN_HEIGHT + 1) as u64;
                let height = Self::TREE_MIN_HEIGHT + ((roll >> 16) % span) as usize;
                Self::place_tree(grid, xi, top + 1, zi, height);
            }
        }
    }

    /// Places a trunk of `height` logs starting at `base`, topped with leaves.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn place_tree(grid: &mut VolumeGrid, x: i32, base: usize, z: i32, height: usize) {
        if base + height + 1 >= CHUNK_HEIGHT {
            return;
        }
        let (base, height) = (base as i32, height as i32);

        // Blocked trunks are skipped
        if (base..base + height).any(|y| grid.get(x, y, z) != Some(CellKind::Empty)) {
            return;
        }

        grid.set(x, base - 1, z, CellKind::Dirt);
        for y in base..base + height {
            grid.set(x, y, z, CellKind::Log);
        }

        let crown = base + height;
        for y in crown - 2..=crown {
            let radius: i32 = if y == crown { 1 } else { 2 };
            for dz in -radius..=radius {
                for dx in -radius..=radius {
                    if radius == 2 && dx.abs() == 2 && dz.abs() == 2 {
                        continue;
                    }
                    if grid.get(x + dx, y, z + dz) == Some(CellKind::Empty) {
                        grid.set(x + dx, y, z + dz, CellKind::Leaf);
                    }
                }
            }
        }
    }
}

/// Relabels solid cells by depth below their column's surface.
///
/// Scanning each column from the top: the first solid cell becomes grass,
/// the `DIRT_DEPTH` cells below it become dirt where solid, and every solid
/// cell further down becomes stone. Cells below [`BEDROCK_DEPTH`] are stone
/// no matter what. Non-solid cells are left alone.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn apply_surface_layers(grid: &mut VolumeGrid) {
    for z in 0..CHUNK_WIDTH as i32 {
        for x in 0..CHUNK_WIDTH as i32 {
            let Some(top) = grid.column_top(x, z) else {
                continue;
            };

            for y in (0..=top).rev() {
                let yi = y as i32;
                if !grid.get(x, yi, z).is_some_and(CellKind::is_solid) {
                    continue;
                }
                let kind = if y < BEDROCK_DEPTH {
                    CellKind::Stone
                } else if y == top {
                    CellKind::Grass
                } else if top - y <= DIRT_DEPTH {
                    CellKind::Dirt
                } else {
                    CellKind::Stone
                };
                grid.set(x, yi, z, kind);
            }
        }
    }
}

/// Deterministic per-column hash. Only the low 32 bits of each axis count.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
fn column_hash(seed: WorldSeed, x: i64, z: i64) -> u64 {
    seed.derive(u64::from(x as u32))
        .derive((u64::from(z as u32) << 32) | 0x5bd1)
        .value()
}
