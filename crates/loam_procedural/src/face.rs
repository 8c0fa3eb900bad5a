//! Cube face directions.

use crate::coord::Side;

/// One of the six faces of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Face {
    /// +Y.
    Top,
    /// -Y.
    Bottom,
    /// -X.
    Left,
    /// +X.
    Right,
    /// +Z.
    Forward,
    /// -Z.
    Back,
}

/// Which atlas tile a face samples from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaceDirection {
    /// Upward facing.
    Top,
    /// Any of the four lateral faces.
    Side,
    /// Downward facing.
    Bottom,
}

impl Face {
    /// All faces in emission order.
    pub const ALL: [Self; 6] = [
        Self::Top,
        Self::Bottom,
        Self::Left,
        Self::Right,
        Self::Forward,
        Self::Back,
    ];

    /// Unit step `[dx, dy, dz]` to the neighbouring cell behind this face.
    #[inline]
    #[must_use]
    pub const fn offset(self) -> [i32; 3] {
        match self {
            Self::Top => [0, 1, 0],
            Self::Bottom => [0, -1, 0],
            Self::Left => [-1, 0, 0],
            Self::Right => [1, 0, 0],
            Self::Forward => [0, 0, 1],
            Self::Back => [0, 0, -1],
        }
    }

    /// The chunk side this face points at, `None` for vertical faces.
    #[inline]
    #[must_use]
    pub const fn side(self) -> Option<Side> {
        match self {
            Self::Top | Self::Bottom => None,
            Self::Left => Some(Side::Left),
            Self::Right => Some(Side::Right),
            Self::Forward => Some(Side::Forward),
            Self::Back => Some(Side::Back),
        }
    }

    /// Texture direction used for atlas lookup.
    #[inline]
    #[must_use]
    pub const fn direction(self) -> FaceDirection {
        match self {
            Self::Top => FaceDirection::Top,
            Self::Bottom => FaceDirection::Bottom,
            Self::Left | Self::Right | Self::Forward | Self::Back => FaceDirection::Side,
        }
    }
}
