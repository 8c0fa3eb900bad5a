//! # Meshing Error Types
//!
//! Errors raised while building a texture atlas table. Meshing itself
//! cannot fail.

use loam_procedural::CellKind;
use thiserror::Error;

/// Errors that can occur while loading an atlas table.
#[derive(Error, Debug)]
pub enum AtlasError {
    /// The atlas TOML could not be parsed.
    #[error("invalid atlas config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Tile and texture sizes do not describe a grid of whole tiles.
    #[error("texture of {texture:?} px cannot be split into tiles of {tile:?} px")]
    InvalidGeometry {
        /// Texture size in pixels.
        texture: [u32; 2],
        /// Tile size in pixels.
        tile: [u32; 2],
    },

    /// A texture index points past the last tile.
    #[error("texture index {index} for {kind:?} exceeds the {capacity} tiles of the atlas")]
    IndexOutOfRange {
        /// Offending cell kind.
        kind: CellKind,
        /// Index given.
        index: u32,
        /// Number of tiles in the atlas.
        capacity: u32,
    },

    /// A cell kind has two entries.
    #[error("duplicate atlas entry for {0:?}")]
    DuplicateKind(CellKind),
}

/// Result type for atlas operations.
pub type AtlasResult<T> = Result<T, AtlasError>;
