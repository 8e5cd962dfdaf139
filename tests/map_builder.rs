use chomp::constants::{MapTile, BOARD_CELL_SIZE, BOARD_PIXEL_SIZE, CELL_SIZE, RAW_BOARD};
use chomp::error::{GameError, MapError, ParseError};
use chomp::map::builder::{Map, MAX_GHOSTS};
use chomp::systems::{GhostKind, Rect};
use glam::IVec2;
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

mod common;

fn reference_map() -> Map {
    Map::new(&RAW_BOARD[..], CELL_SIZE, 4).expect("reference board should be valid")
}

fn count(target: char) -> usize {
    RAW_BOARD.iter().map(|row| row.chars().filter(|&c| c == target).count()).sum()
}

#[test]
fn test_reference_map_dimensions() {
    let map = reference_map();
    assert_eq!(map.board_size(), BOARD_PIXEL_SIZE);
    assert_eq!(map.tile_size(), CELL_SIZE);
    assert_eq!(map.tile_at(IVec2::ZERO), Some(MapTile::Wall));
    assert_eq!(map.tile_at(BOARD_CELL_SIZE.as_ivec2()), None);
}

#[test]
fn test_reference_layout() {
    let layout = reference_map().layout();

    assert_that(&layout.walls.len()).is_equal_to(count('X'));
    assert_that(&layout.collectibles.len()).is_equal_to(count(' '));
    assert_that(&layout.ghosts.len()).is_equal_to(4);
    assert_eq!(layout.player, IVec2::new(9, 15) * CELL_SIZE);

    for kind in [GhostKind::Blue, GhostKind::Orange, GhostKind::Pink, GhostKind::Red] {
        assert_that(&layout.ghosts.iter().filter(|g| g.kind == kind).count()).is_equal_to(1);
    }
}

#[test]
fn test_cells_map_to_pixels() {
    let layout = reference_map().layout();

    // Top-left corner wall
    assert!(layout.walls.contains(&Rect::new(IVec2::ZERO, IVec2::splat(CELL_SIZE))));
    // First collectible, at cell (1, 1), centered with a 14px margin
    assert!(layout.collectibles.contains(&Rect::new(IVec2::new(46, 46), IVec2::splat(4))));
    // Red ghost at cell (9, 8)
    let red = layout.ghosts.iter().find(|g| g.kind == GhostKind::Red).unwrap();
    assert_eq!(red.position, IVec2::new(288, 256));
}

#[test]
fn test_layout_is_idempotent() {
    let map = reference_map();
    assert_eq!(map.layout(), map.layout());

    let other = reference_map();
    assert_eq!(map.layout(), other.layout());
}

#[test]
fn test_unrecognized_characters_are_empty() {
    let map = Map::new(&["XXXXX", "XO?PX", "XXXXX"], CELL_SIZE, 4).unwrap();
    let layout = map.layout();

    assert_that(&layout.collectibles.len()).is_equal_to(0);
    assert_that(&layout.walls.len()).is_equal_to(12);
    assert_eq!(map.tile_at(IVec2::new(2, 1)), Some(MapTile::Empty));
}

#[test]
fn test_board_dimensions_are_configurable() {
    let map = Map::new(&common::TUNNEL_BOARD, 16, 4).unwrap();
    assert_eq!(map.board_size(), IVec2::new(7 * 16, 4 * 16));

    // Collectibles stay centered at other scales
    assert_eq!(map.layout().collectibles, vec![Rect::new(IVec2::new(16 + 6, 16 + 6), IVec2::splat(4))]);
}

#[test]
fn test_missing_player_spawn() {
    let result = Map::new(&["XXX", "X X", "XXX"], CELL_SIZE, 4);
    assert!(matches!(result, Err(GameError::Map(MapError::MissingPlayerSpawn))));
}

#[test]
fn test_ragged_rows() {
    let result = Map::new(&["XXXX", "XP X", "XXX"], CELL_SIZE, 4);
    assert!(matches!(
        result,
        Err(GameError::MapParse(ParseError::RaggedRow {
            row: 2,
            expected: 4,
            found: 3
        }))
    ));
}

#[test]
fn test_duplicate_player_spawn() {
    let result = Map::new(&["XXXX", "XPPX", "XXXX"], CELL_SIZE, 4);
    assert!(matches!(
        result,
        Err(GameError::MapParse(ParseError::DuplicatePlayerSpawn { .. }))
    ));
}

#[test]
fn test_invalid_tile_size() {
    assert!(matches!(
        Map::new(&RAW_BOARD[..], 0, 4),
        Err(GameError::Map(MapError::InvalidConfig(_)))
    ));
    assert!(matches!(
        Map::new(&RAW_BOARD[..], 4, 4),
        Err(GameError::Map(MapError::InvalidConfig(_)))
    ));
}

#[test]
fn test_too_many_ghost_spawns() {
    let crowded = format!("P{}", "r".repeat(MAX_GHOSTS + 1));
    assert!(matches!(
        Map::new(&[crowded][..], CELL_SIZE, 4),
        Err(GameError::Map(MapError::InvalidConfig(_)))
    ));

    let full = format!("P{}", "r".repeat(MAX_GHOSTS));
    assert_that(&Map::new(&[full][..], CELL_SIZE, 4).unwrap().layout().ghosts.len()).is_equal_to(MAX_GHOSTS);
}
