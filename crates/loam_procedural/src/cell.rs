//! Cell types and their derived predicates.

use serde::{Deserialize, Serialize};

/// Type tag of one voxel.
///
/// The enumeration is closed: generation, meshing and texture lookup all
/// match on it exhaustively.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum CellKind {
    /// Nothing here.
    #[default]
    Empty = 0,
    /// Decorative grass tuft.
    BillboardGrass = 1,
    /// Decorative flower.
    BillboardFlower = 2,
    /// Dirt, found just below the surface.
    Dirt = 3,
    /// Grass, the topmost solid cell of a column.
    Grass = 4,
    /// Stone, the bulk of the terrain and the bedrock floor.
    Stone = 5,
    /// Tree trunk.
    Log = 6,
    /// Tree canopy.
    Leaf = 7,
}

impl CellKind {
    /// Number of kinds.
    pub const COUNT: usize = 8;

    /// Every kind, in discriminant order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Empty,
        Self::BillboardGrass,
        Self::BillboardFlower,
        Self::Dirt,
        Self::Grass,
        Self::Stone,
        Self::Log,
        Self::Leaf,
    ];

    /// Returns true for kinds that take up their whole cell.
    ///
    /// Empty space and the billboard decorations are not solid.
    #[inline]
    #[must_use]
    pub const fn is_solid(self) -> bool {
        !matches!(
            self,
            Self::Empty | Self::BillboardGrass | Self::BillboardFlower
        )
    }

    /// Returns true for kinds that let light and sight through.
    #[inline]
    #[must_use]
    pub const fn is_transparent(self) -> bool {
        matches!(
            self,
            Self::Empty | Self::Leaf | Self::BillboardGrass | Self::BillboardFlower
        )
    }

    /// Returns true if a neighbouring face against this kind is hidden.
    ///
    /// Every solid kind occludes, leaves included; transparency only
    /// matters to lighting.
    #[inline]
    #[must_use]
    pub const fn occludes(self) -> bool {
        self.is_solid()
    }

    /// Returns true for the empty kind.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// A voxel as seen through a grid query: its kind and where it sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Type tag.
    pub kind: CellKind,
    /// Local `[x, y, z]` position within the owning chunk.
    pub position: [u8; 3],
}

impl Cell {
    /// Creates a cell view.
    #[inline]
    #[must_use]
    pub const fn new(kind: CellKind, position: [u8; 3]) -> Self {
        Self { kind, position }
    }

    /// Local position widened to `usize` indices.
    #[inline]
    #[must_use]
    pub const fn local(self) -> [usize; 3] {
        [
            self.position[0] as usize,
            self.position[1] as usize,
            self.position[2] as usize,
        ]
    }
}
