//! # Texture Lookup
//!
//! The mesher does not know about images. It asks a [`TextureIndexProvider`]
//! for a tile index per `(cell kind, face direction)` and turns that index
//! into a UV rectangle using the atlas geometry.
//!
//! Tiles are numbered row-major starting at the top-left corner of the
//! atlas image:
//!
//! ```text
//! +----+----+----+----+  v = 1
//! |  0 |  1 |  2 |  3 |
//! +----+----+----+----+
//! |  4 |  5 |  6 |  7 |
//! +----+----+----+----+  v = 1 - 2 * interval
//! ```

use serde::Deserialize;

use loam_procedural::{CellKind, FaceDirection};

use crate::error::{AtlasError, AtlasResult};

/// Source of texture tile indices for the mesher.
pub trait TextureIndexProvider: Send + Sync {
    /// Tile index for one face of a cell kind.
    fn texture_index(&self, kind: CellKind, direction: FaceDirection) -> u32;

    /// Number of tiles along each axis of the atlas.
    fn atlas_size(&self) -> [u32; 2];

    /// UV extent of one tile.
    #[allow(clippy::cast_precision_loss)]
    fn uv_interval(&self) -> [f32; 2] {
        let [w, h] = self.atlas_size();
        [1.0 / w.max(1) as f32, 1.0 / h.max(1) as f32]
    }

    /// UV rectangle of a tile index.
    #[allow(clippy::cast_precision_loss)]
    fn uv_rect(&self, index: u32) -> UvRect {
        let [columns, _] = self.atlas_size();
        let [iu, iv] = self.uv_interval();
        let columns = columns.max(1);
        let column = (index % columns) as f32;
        let row = (index / columns) as f32;

        let u0 = column * iu;
        let v1 = 1.0 - row * iv;
        UvRect {
            u0,
            v0: v1 - iv,
            u1: u0 + iu,
            v1,
        }
    }
}

/// Axis-aligned rectangle in texture space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UvRect {
    /// Left edge.
    pub u0: f32,
    /// Bottom edge.
    pub v0: f32,
    /// Right edge.
    pub u1: f32,
    /// Top edge.
    pub v1: f32,
}

impl UvRect {
    /// Corner UVs in the order quads list their vertices.
    #[inline]
    #[must_use]
    pub const fn corners(self) -> [[f32; 2]; 4] {
        [
            [self.u1, self.v0],
            [self.u1, self.v1],
            [self.u0, self.v1],
            [self.u0, self.v0],
        ]
    }
}

/// Tile indices of one cell kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct CellTextures {
    /// Cell kind the entry applies to.
    pub kind: CellKind,
    /// Tile for the upward face.
    pub top: u32,
    /// Tile for the four lateral faces.
    pub side: u32,
    /// Tile for the downward face.
    pub bottom: u32,
}

impl CellTextures {
    /// Same tile on every face.
    #[must_use]
    pub const fn uniform(kind: CellKind, index: u32) -> Self {
        Self {
            kind,
            top: index,
            side: index,
            bottom: index,
        }
    }

    /// Tile for a face direction.
    #[inline]
    #[must_use]
    pub const fn index(&self, direction: FaceDirection) -> u32 {
        match direction {
            FaceDirection::Top => self.top,
            FaceDirection::Side => self.side,
            FaceDirection::Bottom => self.bottom,
        }
    }
}

/// Atlas table as written in a world config.
///
/// ```toml
/// texture_size = [256, 256]
/// tile_size = [16, 16]
///
/// [[cells]]
/// kind = "grass"
/// top = 0
/// side = 3
/// bottom = 2
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    /// Atlas image size in pixels.
    pub texture_size: [u32; 2],
    /// Tile size in pixels.
    pub tile_size: [u32; 2],
    /// Per-kind tiles.
    pub cells: Vec<CellTextures>,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            texture_size: [256, 256],
            tile_size: [16, 16],
            cells: vec![
                CellTextures {
                    kind: CellKind::Grass,
                    top: 0,
                    side: 3,
                    bottom: 2,
                },
                CellTextures::uniform(CellKind::Stone, 1),
                CellTextures::uniform(CellKind::Dirt, 2),
                CellTextures {
                    kind: CellKind::Log,
                    top: 21,
                    side: 20,
                    bottom: 21,
                },
                CellTextures::uniform(CellKind::Leaf, 52),
                CellTextures::uniform(CellKind::BillboardGrass, 39),
                CellTextures::uniform(CellKind::BillboardFlower, 13),
            ],
        }
    }
}

impl AtlasConfig {
    /// Parses an atlas table from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`AtlasError::Parse`] on malformed input.
    pub fn from_toml_str(text: &str) -> AtlasResult<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Config-driven atlas lookup table.
#[derive(Clone, Debug)]
pub struct TextureAtlas {
    atlas_size: [u32; 2],
    entries: [Option<CellTextures>; CellKind::COUNT],
}

impl TextureAtlas {
    /// Validates a config and builds the lookup table.
    ///
    /// Kinds without an entry sample tile 0.
    ///
    /// # Errors
    ///
    /// Fails when the geometry does not divide into whole tiles, when an
    /// index points outside the atlas, or when a kind appears twice.
    pub fn from_config(config: &AtlasConfig) -> AtlasResult<Self> {
        let [tw, th] = config.texture_size;
        let [sw, sh] = config.tile_size;
        if sw == 0 || sh == 0 || tw < sw || th < sh || tw % sw != 0 || th % sh != 0 {
            return Err(AtlasError::InvalidGeometry {
                texture: config.texture_size,
                tile: config.tile_size,
            });
        }
        let atlas_size = [tw / sw, th / sh];
        let capacity = atlas_size[0].saturating_mul(atlas_size[1]);

        let mut entries = [None; CellKind::COUNT];
        for entry in &config.cells {
            let slot = &mut entries[entry.kind as usize];
            if slot.is_some() {
                return Err(AtlasError::DuplicateKind(entry.kind));
            }
            for index in [entry.top, entry.side, entry.bottom] {
                if index >= capacity {
                    return Err(AtlasError::IndexOutOfRange {
                        kind: entry.kind,
                        index,
                        capacity,
                    });
                }
            }
            *slot = Some(*entry);
        }

        for kind in CellKind::ALL {
            if !kind.is_empty() && entries[kind as usize].is_none() {
                tracing::warn!(?kind, "no atlas entry, faces will sample tile 0");
            }
        }

        Ok(Self {
            atlas_size,
            entries,
        })
    }

    /// Parses and validates an atlas table from TOML.
    ///
    /// # Errors
    ///
    /// See [`AtlasConfig::from_toml_str`] and [`TextureAtlas::from_config`].
    pub fn from_toml_str(text: &str) -> AtlasResult<Self> {
        Self::from_config(&AtlasConfig::from_toml_str(text)?)
    }
}

impl TextureIndexProvider for TextureAtlas {
    fn texture_index(&self, kind: CellKind, direction: FaceDirection) -> u32 {
        self.entries[kind as usize].map_or(0, |entry| entry.index(direction))
    }

    fn atlas_size(&self) -> [u32; 2] {
        self.atlas_size
    }
}
