//! # Volume Grid
//!
//! Dense `CHUNK_WIDTH x CHUNK_HEIGHT x CHUNK_WIDTH` storage of cell kinds.
//!
//! Bounds are fixed at compile time. Every query takes signed local
//! coordinates so callers can look one step past an edge without
//! special-casing; anything outside the grid answers `None`.

use std::fmt;

use crate::cell::{Cell, CellKind};
use crate::coord::{CELLS_PER_CHUNK, CHUNK_HEIGHT, CHUNK_WIDTH};

/// A chunk's cells.
#[derive(Clone, PartialEq, Eq)]
pub struct VolumeGrid {
    /// Cell kinds, indexed as `[y][z][x]`.
    cells: Box<[CellKind]>,
}

impl VolumeGrid {
    /// Creates a grid with every cell empty.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cells: vec![CellKind::Empty; CELLS_PER_CHUNK].into_boxed_slice(),
        }
    }

    /// Flat index of a local position, `None` when out of range.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn index(x: i32, y: i32, z: i32) -> Option<usize> {
        if x < 0
            || z < 0
            || y < 0
            || x >= CHUNK_WIDTH as i32
            || z >= CHUNK_WIDTH as i32
            || y >= CHUNK_HEIGHT as i32
        {
            return None;
        }
        Some((y as usize * CHUNK_WIDTH + z as usize) * CHUNK_WIDTH + x as usize)
    }

    /// Kind at a local position.
    #[inline]
    #[must_use]
    pub fn get(&self, x: i32, y: i32, z: i32) -> Option<CellKind> {
        Self::index(x, y, z).map(|i| self.cells[i])
    }

    /// Cell view at a local position.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn cell(&self, x: i32, y: i32, z: i32) -> Option<Cell> {
        self.get(x, y, z)
            .map(|kind| Cell::new(kind, [x as u8, y as u8, z as u8]))
    }

    /// Sets the kind at a local position.
    ///
    /// Returns the previous kind, or `None` (and changes nothing) when the
    /// position is out of range.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, z: i32, kind: CellKind) -> Option<CellKind> {
        let index = Self::index(x, y, z)?;
        Some(std::mem::replace(&mut self.cells[index], kind))
    }

    /// Returns true if a cell exists at the position and hides faces behind it.
    #[inline]
    #[must_use]
    pub fn occludes(&self, x: i32, y: i32, z: i32) -> bool {
        self.get(x, y, z).is_some_and(CellKind::occludes)
    }

    /// Height of the topmost solid cell in a column.
    #[must_use]
    pub fn column_top(&self, x: i32, z: i32) -> Option<usize> {
        Self::index(x, 0, z)?;
        (0..CHUNK_HEIGHT).rev().find(|&y| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let kind = self.get(x, y as i32, z);
            kind.is_some_and(CellKind::is_solid)
        })
    }

    /// Number of solid cells.
    #[must_use]
    pub fn solid_count(&self) -> usize {
        self.cells.iter().filter(|k| k.is_solid()).count()
    }

    /// Returns true if no cell holds anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|k| k.is_empty())
    }

    /// Raw cell kinds in `[y][z][x]` order.
    #[must_use]
    pub fn as_slice(&self) -> &[CellKind] {
        &self.cells
    }
}

impl Default for VolumeGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for VolumeGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VolumeGrid")
            .field("solid", &self.solid_count())
            .finish()
    }
}
