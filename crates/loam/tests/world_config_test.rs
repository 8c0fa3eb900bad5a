//! # Shipped Config Tests
//!
//! The bundled `config/world.toml` must parse and drive a world.

use loam::prelude::*;

const WORLD_TOML: &str = include_str!("../config/world.toml");

/// Test: The shipped config parses with every table filled in.
#[test]
fn test_shipped_config_parses() {
    let config = WorldConfig::from_toml_str(WORLD_TOML).unwrap();
    assert_eq!(config.streaming.window_size, 9);
    assert_eq!(config.terrain.seed, 1337);
    assert_eq!(config.terrain.tree_frequency, 12);
    assert_eq!(config.atlas.cells.len(), 7);
    assert!(TextureAtlas::from_config(&config.atlas).is_ok());
}

/// Test: The shipped terrain loads a small inline world with trees allowed.
#[test]
fn test_shipped_terrain_loads() {
    let mut config = WorldConfig::from_toml_str(WORLD_TOML).unwrap();
    config.streaming = StreamingConfig::testing();

    let mut world = World::inline(&config, HeadlessSurfaces::new()).unwrap();
    world.start(0.0, 0.0);
    for _ in 0..200 {
        world.run_pending_jobs(usize::MAX);
        world.tick(0.0, 0.0);
        if !world.is_loading() {
            break;
        }
    }
    assert!(!world.is_loading());
    assert_eq!(world.registry().populated_count(), 9);

    let [x, y, z] = world.spawn_point(4.5, 4.5).unwrap();
    assert!((x - 4.5).abs() < f32::EPSILON && (z - 4.5).abs() < f32::EPSILON);
    assert!(y >= 4.0 && y <= CHUNK_HEIGHT as f32);

    // Dig out the cell the observer would stand on
    #[allow(clippy::cast_possible_truncation)]
    let top = y as i32 - 1;
    assert!(world.set_cell(4, top, 4, CellKind::Empty).is_some());
    assert_eq!(
        world.find_cell(4, top, 4).map(|cell| cell.kind),
        Some(CellKind::Empty)
    );

    let surfaces = world.shutdown();
    assert!(surfaces.is_empty());
}
