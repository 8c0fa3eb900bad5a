//! # Face Mesher
//!
//! Emits one quad per visible cell face.
//!
//! A face is visible unless the cell behind it exists and is solid. Vertical
//! neighbours always live in the same grid. Lateral neighbours one step past
//! the chunk edge are looked up in the adjacent chunk's grid at the wrapped
//! local coordinate; when that grid is missing the face counts as exposed,
//! and the caller learns which sides were consulted through
//! [`ChunkMesh::neighbors`] so it can remesh once they arrive.

use loam_procedural::{Face, Side, SideMask, VolumeGrid, CHUNK_HEIGHT, CHUNK_WIDTH};

use crate::mesh::ChunkMesh;
use crate::texture::TextureIndexProvider;

// =============================================================================
// NEIGHBOUR VIEW
// =============================================================================

/// Borrowed grids of the four lateral neighbours, any of which may be absent.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeighborGrids<'a> {
    /// Chunk at `x - 1`.
    pub left: Option<&'a VolumeGrid>,
    /// Chunk at `x + 1`.
    pub right: Option<&'a VolumeGrid>,
    /// Chunk at `z - 1`.
    pub back: Option<&'a VolumeGrid>,
    /// Chunk at `z + 1`.
    pub forward: Option<&'a VolumeGrid>,
}

impl<'a> NeighborGrids<'a> {
    /// No neighbours loaded.
    pub const NONE: Self = Self {
        left: None,
        right: None,
        back: None,
        forward: None,
    };

    /// Grid on one side.
    #[inline]
    #[must_use]
    pub const fn get(&self, side: Side) -> Option<&'a VolumeGrid> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
            Side::Back => self.back,
            Side::Forward => self.forward,
        }
    }

    /// Stores the grid for one side.
    pub fn set(&mut self, side: Side, grid: Option<&'a VolumeGrid>) {
        match side {
            Side::Left => self.left = grid,
            Side::Right => self.right = grid,
            Side::Back => self.back = grid,
            Side::Forward => self.forward = grid,
        }
    }

    /// Sides with a grid present.
    #[must_use]
    pub fn mask(&self) -> SideMask {
        Side::ALL
            .into_iter()
            .filter(|&side| self.get(side).is_some())
            .fold(SideMask::EMPTY, SideMask::with)
    }
}

/// Returns true if the given face of the cell at `(x, y, z)` should be drawn.
///
/// The cell itself is not inspected; callers skip empty cells.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn is_exposed(
    grid: &VolumeGrid,
    neighbors: &NeighborGrids<'_>,
    x: i32,
    y: i32,
    z: i32,
    face: Face,
) -> bool {
    let [dx, dy, dz] = face.offset();
    let (nx, ny, nz) = (x + dx, y + dy, z + dz);

    if ny < 0 {
        return false;
    }
    if ny >= CHUNK_HEIGHT as i32 {
        return true;
    }

    let width = CHUNK_WIDTH as i32;
    let inside = (0..width).contains(&nx) && (0..width).contains(&nz);
    if inside {
        return !grid.occludes(nx, ny, nz);
    }

    match face.side().and_then(|side| neighbors.get(side)) {
        Some(other) => !other.occludes(nx.rem_euclid(width), ny, nz.rem_euclid(width)),
        None => true,
    }
}

// =============================================================================
// FACE GEOMETRY
// =============================================================================

/// Quad corners of one face of the unit cell at the origin.
///
/// Winding is counter-clockwise seen from outside the cell.
const fn face_corners(face: Face) -> [[f32; 3]; 4] {
    match face {
        Face::Top => [
            [0.0, 1.0, 0.0],
            [0.0, 1.0, 1.0],
            [1.0, 1.0, 1.0],
            [1.0, 1.0, 0.0],
        ],
        Face::Bottom => [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 1.0],
            [0.0, 0.0, 1.0],
        ],
        Face::Left => [
            [0.0, 0.0, 1.0],
            [0.0, 1.0, 1.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0],
        ],
        Face::Right => [
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [1.0, 1.0, 1.0],
            [1.0, 0.0, 1.0],
        ],
        Face::Forward => [
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
            [0.0, 0.0, 1.0],
        ],
        Face::Back => [
            [0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 1.0, 0.0],
            [1.0, 0.0, 0.0],
        ],
    }
}

// =============================================================================
// MESHER
// =============================================================================

/// Builds [`ChunkMesh`]es from grids.
#[derive(Clone, Copy)]
pub struct FaceMesher<'t> {
    textures: &'t dyn TextureIndexProvider,
}

impl<'t> FaceMesher<'t> {
    /// Creates a mesher sampling tiles from `textures`.
    #[must_use]
    pub fn new(textures: &'t dyn TextureIndexProvider) -> Self {
        Self { textures }
    }

    /// Meshes a grid against whatever neighbours are available.
    #[must_use]
    #[allow(clippy::cast_possible_wrap, clippy::cast_precision_loss)]
    pub fn mesh(&self, grid: &VolumeGrid, neighbors: &NeighborGrids<'_>) -> ChunkMesh {
        let mut mesh = ChunkMesh::default();
        mesh.neighbors = neighbors.mask();

        for y in 0..CHUNK_HEIGHT as i32 {
            for z in 0..CHUNK_WIDTH as i32 {
                for x in 0..CHUNK_WIDTH as i32 {
                    let Some(kind) = grid.get(x, y, z) else {
                        continue;
                    };
                    if kind.is_empty() {
                        continue;
                    }

                    let origin = [x as f32, y as f32, z as f32];
                    for face in Face::ALL {
                        if !is_exposed(grid, neighbors, x, y, z, face) {
                            continue;
                        }
                        let index = self.textures.texture_index(kind, face.direction());
                        let uvs = self.textures.uv_rect(index).corners();
                        let corners = face_corners(face).map(|[cx, cy, cz]| {
                            [origin[0] + cx, origin[1] + cy, origin[2] + cz]
                        });
                        mesh.push_quad(corners, uvs);
                    }
                }
            }
        }

        tracing::trace!(
            quads = mesh.quad_count(),
            neighbors = mesh.neighbors.len(),
            "chunk meshed"
        );
        mesh
    }
}

impl std::fmt::Debug for FaceMesher<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaceMesher")
            .field("atlas_size", &self.textures.atlas_size())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loam_procedural::CellKind;

    fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    #[test]
    fn test_face_winding_points_outward() {
        for face in Face::ALL {
            let c = face_corners(face);
            let normal = cross(sub(c[1], c[0]), sub(c[2], c[0]));
            #[allow(clippy::cast_precision_loss)]
            let expected = face.offset().map(|v| v as f32);
            assert_eq!(normal, expected, "bad winding for {face:?}");
        }
    }

    #[test]
    fn test_bottom_of_world_never_exposed() {
        let mut grid = VolumeGrid::new();
        grid.set(4, 0, 4, CellKind::Stone);
        assert!(!is_exposed(&grid, &NeighborGrids::NONE, 4, 0, 4, Face::Bottom));
        assert!(is_exposed(&grid, &NeighborGrids::NONE, 4, 0, 4, Face::Top));
    }

    #[test]
    fn test_top_of_world_exposed() {
        let grid = VolumeGrid::new();
        let top = CHUNK_HEIGHT as i32 - 1;
        assert!(is_exposed(&grid, &NeighborGrids::NONE, 0, top, 0, Face::Top));
    }

    #[test]
    fn test_edge_lookup_wraps_into_neighbor() {
        let grid = VolumeGrid::new();
        let mut left = VolumeGrid::new();
        left.set(15, 10, 3, CellKind::Dirt);
        let mut forward = VolumeGrid::new();
        forward.set(7, 10, 0, CellKind::Leaf);

        let neighbors = NeighborGrids {
            left: Some(&left),
            forward: Some(&forward),
            ..NeighborGrids::NONE
        };
        assert!(!is_exposed(&grid, &neighbors, 0, 10, 3, Face::Left));
        assert!(is_exposed(&grid, &neighbors, 0, 10, 4, Face::Left));
        // Leaves are solid
        assert!(!is_exposed(&grid, &neighbors, 7, 10, 15, Face::Forward));
        assert!(is_exposed(&grid, &neighbors, 6, 10, 15, Face::Forward));
        // Missing neighbour
        assert!(is_exposed(&grid, &neighbors, 15, 10, 3, Face::Right));
    }

    #[test]
    fn test_neighbor_mask() {
        let grid = VolumeGrid::new();
        let mut neighbors = NeighborGrids::NONE;
        assert!(neighbors.mask().is_empty());
        neighbors.set(Side::Back, Some(&grid));
        neighbors.set(Side::Right, Some(&grid));
        let mask = neighbors.mask();
        assert_eq!(mask.len(), 2);
        assert!(mask.contains(Side::Back));
        assert!(!mask.contains(Side::Left));
    }
}
