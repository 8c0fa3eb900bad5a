//! Mesh buffers produced by the face mesher.

use loam_procedural::SideMask;

/// Vertices per emitted quad.
pub const VERTICES_PER_QUAD: usize = 4;

/// Indices per emitted quad (two triangles).
pub const INDICES_PER_QUAD: usize = 6;

/// Complete mesh data for a chunk.
///
/// Positions are chunk-local; the chunk surface places them in the world.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkMesh {
    /// Vertex positions.
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates, one per vertex.
    pub uvs: Vec<[f32; 2]>,
    /// Triangle list indices.
    pub indices: Vec<u32>,
    /// Lateral neighbours whose grids were consulted while building.
    pub neighbors: SideMask,
}

impl ChunkMesh {
    /// Creates an empty mesh with room for `quads` quads.
    #[must_use]
    pub fn with_quad_capacity(quads: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(quads * VERTICES_PER_QUAD),
            uvs: Vec::with_capacity(quads * VERTICES_PER_QUAD),
            indices: Vec::with_capacity(quads * INDICES_PER_QUAD),
            neighbors: SideMask::EMPTY,
        }
    }

    /// Appends one quad.
    ///
    /// Indices follow `v, v+1, v+2, v+2, v+3, v`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn push_quad(&mut self, corners: [[f32; 3]; 4], uvs: [[f32; 2]; 4]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&corners);
        self.uvs.extend_from_slice(&uvs);
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    /// Returns true if the mesh has no quads.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Number of quads.
    #[must_use]
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_QUAD
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Vertex positions as raw bytes for buffer upload.
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// UVs as raw bytes for buffer upload.
    #[must_use]
    pub fn uv_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.uvs)
    }

    /// Indices as raw bytes for buffer upload.
    #[must_use]
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_quad_indices() {
        let mut mesh = ChunkMesh::with_quad_capacity(2);
        let corners = [[0.0; 3]; 4];
        let uvs = [[0.0; 2]; 4];
        mesh.push_quad(corners, uvs);
        mesh.push_quad(corners, uvs);

        assert_eq!(mesh.quad_count(), 2);
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 4);
        assert_eq!(mesh.indices[6..], [4, 5, 6, 6, 7, 4]);
    }

    #[test]
    fn test_byte_views() {
        let mut mesh = ChunkMesh::default();
        assert!(mesh.is_empty());
        mesh.push_quad([[1.0, 2.0, 3.0]; 4], [[0.5, 0.5]; 4]);
        assert_eq!(mesh.vertex_bytes().len(), 4 * 3 * 4);
        assert_eq!(mesh.uv_bytes().len(), 4 * 2 * 4);
        assert_eq!(mesh.index_bytes().len(), 6 * 4);
    }
}
