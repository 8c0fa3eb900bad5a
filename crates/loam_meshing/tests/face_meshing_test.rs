//! # Face Meshing Tests
//!
//! Builds meshes from hand-made grids and checks quad counts, geometry,
//! texture coordinates and the cross-chunk edge rules.

use loam_meshing::{
    AtlasConfig, ChunkMesh, FaceMesher, NeighborGrids, TextureAtlas, TextureIndexProvider,
};
use loam_procedural::{
    CellKind, ChunkCoord, Face, FaceDirection, NoiseSettings, Side, TerrainGenerator, VolumeGrid,
};

fn atlas() -> TextureAtlas {
    TextureAtlas::from_config(&AtlasConfig::default()).unwrap()
}

fn mesh(grid: &VolumeGrid, neighbors: &NeighborGrids<'_>) -> ChunkMesh {
    let atlas = atlas();
    FaceMesher::new(&atlas).mesh(grid, neighbors)
}

fn quad_normal(mesh: &ChunkMesh, quad: usize) -> [f32; 3] {
    let v = &mesh.vertices[quad * 4..quad * 4 + 3];
    let a = [v[1][0] - v[0][0], v[1][1] - v[0][1], v[1][2] - v[0][2]];
    let b = [v[2][0] - v[0][0], v[2][1] - v[0][1], v[2][2] - v[0][2]];
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Test: A lone cell in mid-air shows all six faces.
#[test]
fn test_isolated_cell_has_six_faces() {
    let mut grid = VolumeGrid::new();
    grid.set(5, 40, 5, CellKind::Stone);

    let mesh = mesh(&grid, &NeighborGrids::NONE);
    assert_eq!(mesh.quad_count(), 6);
    assert_eq!(mesh.vertex_count(), 24);
    assert_eq!(mesh.uvs.len(), 24);
    assert_eq!(mesh.indices.len(), 36);
    assert_eq!(mesh.triangle_count(), 12);
    assert!(mesh.indices.iter().all(|&i| i < 24));
    assert!(mesh.neighbors.is_empty());
}

/// Test: A cell buried on all sides contributes nothing.
#[test]
fn test_enclosed_cell_has_no_faces() {
    let mut grid = VolumeGrid::new();
    for (x, y, z) in [
        (5, 40, 5),
        (4, 40, 5),
        (6, 40, 5),
        (5, 39, 5),
        (5, 41, 5),
        (5, 40, 4),
        (5, 40, 6),
    ] {
        grid.set(x, y, z, CellKind::Stone);
    }

    let lone = mesh(&grid, &NeighborGrids::NONE);
    // Six outer cells, five faces each
    assert_eq!(lone.quad_count(), 30);
}

/// Test: Two touching cells hide the shared face pair.
#[test]
fn test_shared_face_is_hidden() {
    let mut grid = VolumeGrid::new();
    grid.set(3, 20, 3, CellKind::Dirt);
    grid.set(4, 20, 3, CellKind::Dirt);
    assert_eq!(mesh(&grid, &NeighborGrids::NONE).quad_count(), 10);
}

/// Test: Leaves are solid, so they hide faces like any other solid cell.
#[test]
fn test_leaf_neighbor_hides_faces() {
    let mut grid = VolumeGrid::new();
    grid.set(3, 20, 3, CellKind::Stone);
    grid.set(4, 20, 3, CellKind::Leaf);
    assert_eq!(mesh(&grid, &NeighborGrids::NONE).quad_count(), 10);
}

/// Test: A stone cell wrapped in leaves shows none of its own faces.
#[test]
fn test_cell_enclosed_by_leaves_emits_nothing_of_its_own() {
    let center = (5, 40, 5);
    let mut grid = VolumeGrid::new();
    grid.set(center.0, center.1, center.2, CellKind::Stone);
    for face in Face::ALL {
        let [dx, dy, dz] = face.offset();
        grid.set(center.0 + dx, center.1 + dy, center.2 + dz, CellKind::Leaf);
    }

    let mesh = mesh(&grid, &NeighborGrids::NONE);
    // Only the six leaves' outer faces remain
    assert_eq!(mesh.quad_count(), 30);
    let stone = [center.0 as f32 + 0.5, center.1 as f32 + 0.5, center.2 as f32 + 0.5];
    for quad in 0..mesh.quad_count() {
        let corners = &mesh.vertices[quad * 4..quad * 4 + 4];
        let mid: Vec<f32> = (0..3)
            .map(|axis| corners.iter().map(|v| v[axis]).sum::<f32>() / 4.0)
            .collect();
        let on_stone = (0..3).all(|axis| (mid[axis] - stone[axis]).abs() <= 0.5);
        assert!(!on_stone, "quad {quad} belongs to the enclosed stone");
    }
}

/// Test: The floor of the world is never drawn.
#[test]
fn test_no_bottom_face_at_floor() {
    let mut grid = VolumeGrid::new();
    grid.set(8, 0, 8, CellKind::Stone);

    let mesh = mesh(&grid, &NeighborGrids::NONE);
    assert_eq!(mesh.quad_count(), 5);
    for quad in 0..mesh.quad_count() {
        assert!(quad_normal(&mesh, quad)[1] >= 0.0);
    }
}

/// Test: Every quad faces away from its cell.
#[test]
fn test_normals_point_outward() {
    let mut grid = VolumeGrid::new();
    grid.set(7, 30, 9, CellKind::Log);

    let mesh = mesh(&grid, &NeighborGrids::NONE);
    let center = [7.5f32, 30.5, 9.5];
    for quad in 0..mesh.quad_count() {
        let normal = quad_normal(&mesh, quad);
        let v = mesh.vertices[quad * 4];
        let outward = [v[0] - center[0], v[1] - center[1], v[2] - center[2]];
        let dot: f32 = normal.iter().zip(outward).map(|(n, o)| n * o).sum();
        assert!(dot > 0.0, "quad {quad} faces inward");
    }
}

/// Test: Edge faces depend on the neighbour grid at the wrapped coordinate.
#[test]
fn test_edge_face_with_and_without_neighbor() {
    let mut grid = VolumeGrid::new();
    grid.set(15, 50, 2, CellKind::Stone);
    grid.set(0, 50, 2, CellKind::Stone);

    let mut right = VolumeGrid::new();
    right.set(0, 50, 2, CellKind::Stone);
    let mut left = VolumeGrid::new();
    left.set(15, 50, 2, CellKind::Stone);

    let alone = mesh(&grid, &NeighborGrids::NONE);
    assert_eq!(alone.quad_count(), 12);

    let mut neighbors = NeighborGrids::NONE;
    neighbors.set(Side::Right, Some(&right));
    let with_right = mesh(&grid, &neighbors);
    assert_eq!(with_right.quad_count(), 11);
    assert!(with_right.neighbors.contains(Side::Right));

    neighbors.set(Side::Left, Some(&left));
    let with_both = mesh(&grid, &neighbors);
    assert_eq!(with_both.quad_count(), 10);
    assert_eq!(with_both.neighbors.len(), 2);
}

/// Test: UVs follow the atlas entry for each face direction.
#[test]
fn test_uvs_follow_face_direction() {
    let atlas = atlas();
    let mut grid = VolumeGrid::new();
    grid.set(1, 10, 1, CellKind::Grass);

    let mesh = FaceMesher::new(&atlas).mesh(&grid, &NeighborGrids::NONE);
    // Emission order: top, bottom, then the four sides
    let top = atlas
        .uv_rect(atlas.texture_index(CellKind::Grass, FaceDirection::Top))
        .corners();
    let bottom = atlas
        .uv_rect(atlas.texture_index(CellKind::Grass, FaceDirection::Bottom))
        .corners();
    let side = atlas
        .uv_rect(atlas.texture_index(CellKind::Grass, FaceDirection::Side))
        .corners();

    assert_eq!(mesh.uvs[0..4], top);
    assert_eq!(mesh.uvs[4..8], bottom);
    for quad in 2..6 {
        assert_eq!(mesh.uvs[quad * 4..quad * 4 + 4], side);
    }
    for uv in &mesh.uvs {
        assert!((0.0..=1.0).contains(&uv[0]) && (0.0..=1.0).contains(&uv[1]));
    }
}

/// Test: Generated terrain meshes to a sane, bounded surface.
#[test]
fn test_generated_chunk_mesh() {
    let generator = TerrainGenerator::new(&NoiseSettings::flat(20));
    let grid = generator.generate(ChunkCoord::new(0, 0));

    let alone = mesh(&grid, &NeighborGrids::NONE);
    // Flat top plus 4 exposed walls 21 cells tall
    assert_eq!(alone.quad_count(), 16 * 16 + 4 * 16 * 21);

    let neighbors = NeighborGrids {
        left: Some(&grid),
        right: Some(&grid),
        back: Some(&grid),
        forward: Some(&grid),
    };
    let surrounded = mesh(&grid, &neighbors);
    assert_eq!(surrounded.quad_count(), 16 * 16);
    for v in &surrounded.vertices {
        assert!((v[1] - 21.0).abs() < f32::EPSILON);
    }
}
