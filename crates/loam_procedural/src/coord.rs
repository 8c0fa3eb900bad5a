//! # Spatial Index
//!
//! Maps world positions onto the chunk grid and back.
//!
//! A chunk covers `CHUNK_WIDTH` blocks on the X and Z axes and the full
//! `CHUNK_HEIGHT` on Y, so only the horizontal axes take part in indexing.
//! Negative positions floor towards negative infinity: block `-1` lives in
//! chunk `-1`, not chunk `0`.

use std::fmt;

/// Chunk width/depth in blocks.
pub const CHUNK_WIDTH: usize = 16;

/// Chunk height in blocks.
pub const CHUNK_HEIGHT: usize = 256;

/// Total cells per chunk.
pub const CELLS_PER_CHUNK: usize = CHUNK_WIDTH * CHUNK_WIDTH * CHUNK_HEIGHT;

/// Chunk coordinate (identifies a chunk in the world grid).
///
/// Equality, ordering and hashing are structural over `(x, z)`, which makes
/// the coordinate a well-behaved registry key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkCoord {
    /// X coordinate (in chunks, not blocks).
    pub x: i32,
    /// Z coordinate (in chunks, not blocks).
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Converts world block coordinates to chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn from_block_pos(block_x: i32, block_z: i32) -> Self {
        Self {
            x: block_x.div_euclid(CHUNK_WIDTH as i32),
            z: block_z.div_euclid(CHUNK_WIDTH as i32),
        }
    }

    /// Converts a continuous world position to the chunk containing it.
    ///
    /// Floor-divides each horizontal axis by the chunk width.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_world_pos(world_x: f32, world_z: f32) -> Self {
        Self::from_block_pos(world_x.floor() as i32, world_z.floor() as i32)
    }

    /// Block X of the chunk's origin corner.
    ///
    /// Widened to `i64` so every chunk coordinate has an origin.
    #[inline]
    #[must_use]
    pub const fn world_x(self) -> i64 {
        self.x as i64 * CHUNK_WIDTH as i64
    }

    /// Block Z of the chunk's origin corner.
    #[inline]
    #[must_use]
    pub const fn world_z(self) -> i64 {
        self.z as i64 * CHUNK_WIDTH as i64
    }

    /// World-space origin of the chunk, `(x * W, 0, z * W)`.
    #[inline]
    #[must_use]
    pub const fn world_origin(self) -> [i64; 3] {
        [self.world_x(), 0, self.world_z()]
    }

    /// Chunk containing a wide block position.
    ///
    /// Inverse of [`world_origin`](Self::world_origin) for every chunk.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_wide_block_pos(block_x: i64, block_z: i64) -> Self {
        Self {
            x: block_x.div_euclid(CHUNK_WIDTH as i64) as i32,
            z: block_z.div_euclid(CHUNK_WIDTH as i64) as i32,
        }
    }

    /// Returns the coordinate shifted by `(dx, dz)` chunks.
    ///
    /// Wraps at the edge of the `i32` chunk grid.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x.wrapping_add(dx),
            z: self.z.wrapping_add(dz),
        }
    }

    /// Returns the lateral neighbour on the given side.
    #[inline]
    #[must_use]
    pub const fn neighbor(self, side: Side) -> Self {
        let [dx, dz] = side.delta();
        self.offset(dx, dz)
    }

    /// Chunk delta from `self` to `other`.
    #[inline]
    #[must_use]
    pub const fn delta_to(self, other: Self) -> (i32, i32) {
        (other.x.wrapping_sub(self.x), other.z.wrapping_sub(self.z))
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// One of the four horizontal neighbours of a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Towards -X.
    Left,
    /// Towards +X.
    Right,
    /// Towards -Z.
    Back,
    /// Towards +Z.
    Forward,
}

impl Side {
    /// All four sides, in mask-bit order.
    pub const ALL: [Self; 4] = [Self::Left, Self::Right, Self::Back, Self::Forward];

    /// Chunk-grid step `[dx, dz]` towards this side.
    #[inline]
    #[must_use]
    pub const fn delta(self) -> [i32; 2] {
        match self {
            Self::Left => [-1, 0],
            Self::Right => [1, 0],
            Self::Back => [0, -1],
            Self::Forward => [0, 1],
        }
    }

    /// The side facing back at this one.
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Back => Self::Forward,
            Self::Forward => Self::Back,
        }
    }

    /// Bit used for this side in a [`SideMask`].
    #[inline]
    #[must_use]
    pub const fn bit(self) -> u8 {
        match self {
            Self::Left => 0b0001,
            Self::Right => 0b0010,
            Self::Back => 0b0100,
            Self::Forward => 0b1000,
        }
    }
}

/// Set of lateral sides, packed in four bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SideMask(u8);

impl SideMask {
    /// No sides.
    pub const EMPTY: Self = Self(0);

    /// Returns the mask with `side` added.
    #[inline]
    #[must_use]
    pub const fn with(self, side: Side) -> Self {
        Self(self.0 | side.bit())
    }

    /// Returns true if `side` is in the mask.
    #[inline]
    #[must_use]
    pub const fn contains(self, side: Side) -> bool {
        self.0 & side.bit() != 0
    }

    /// Number of sides in the mask.
    #[inline]
    #[must_use]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Returns true if no side is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}
