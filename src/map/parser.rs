//! Map parsing functionality for converting raw board layouts into structured data.

use glam::{IVec2, UVec2};
use smallvec::SmallVec;

use crate::constants::MapTile;
use crate::error::ParseError;
use crate::systems::GhostKind;

/// Structured representation of a parsed ASCII board, with spawn points extracted.
///
/// Tiles are stored row-major. Spawn cells keep their spawn tile so the builder can
/// tell them apart from plain empty space, but they never become walls or collectibles.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMap {
    /// Board size in cells (columns, rows).
    pub size: UVec2,
    /// Row-major tiles converted from the board characters.
    pub tiles: Vec<MapTile>,
    /// Starting cell for the player (`P`), if the board has one.
    pub player_start: Option<IVec2>,
    /// Starting cells for each ghost, in board reading order.
    pub ghost_starts: SmallVec<[(GhostKind, IVec2); 4]>,
}

impl ParsedMap {
    /// Returns the tile at the given cell, or `None` outside the board.
    pub fn tile(&self, cell: IVec2) -> Option<MapTile> {
        if cell.x < 0 || cell.y < 0 || cell.x >= self.size.x as i32 || cell.y >= self.size.y as i32 {
            return None;
        }
        self.tiles.get((cell.y as u32 * self.size.x + cell.x as u32) as usize).copied()
    }

    /// Iterates every cell along with its tile, in reading order.
    pub fn cells(&self) -> impl Iterator<Item = (IVec2, MapTile)> + '_ {
        let width = self.size.x as usize;
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, tile)| (IVec2::new((i % width) as i32, (i / width) as i32), *tile))
    }
}

/// Parser for converting raw board layouts into structured map data.
pub struct MapTileParser;

impl MapTileParser {
    /// Converts a board character into its tile.
    ///
    /// `X` is a wall, a space is a collectible, `b`/`o`/`p`/`r` are ghost spawns and
    /// `P` is the player spawn. Every other character is unused space.
    pub fn parse_character(c: char) -> MapTile {
        match c {
            'X' => MapTile::Wall,
            ' ' => MapTile::Collectible,
            'P' => MapTile::PlayerSpawn,
            'b' => MapTile::GhostSpawn(GhostKind::Blue),
            'o' => MapTile::GhostSpawn(GhostKind::Orange),
            'p' => MapTile::GhostSpawn(GhostKind::Pink),
            'r' => MapTile::GhostSpawn(GhostKind::Red),
            _ => MapTile::Empty,
        }
    }

    /// Parses a raw board layout into structured map data.
    ///
    /// A board without a player spawn still parses (the spawn is left unset); the
    /// map builder rejects it.
    ///
    /// # Errors
    ///
    /// Returns an error if the board has no rows, if its rows differ in length,
    /// or if more than one player spawn is present.
    pub fn parse_board<S: AsRef<str>>(raw_board: &[S]) -> Result<ParsedMap, ParseError> {
        let width = match raw_board.first() {
            Some(row) => row.as_ref().chars().count(),
            None => return Err(ParseError::EmptyBoard),
        };
        if width == 0 {
            return Err(ParseError::EmptyBoard);
        }

        for (row, line) in raw_board.iter().enumerate() {
            let found = line.as_ref().chars().count();
            if found != width {
                return Err(ParseError::RaggedRow {
                    row,
                    expected: width,
                    found,
                });
            }
        }

        let mut tiles = Vec::with_capacity(width * raw_board.len());
        let mut player_start: Option<IVec2> = None;
        let mut ghost_starts = SmallVec::new();

        for (y, line) in raw_board.iter().enumerate() {
            for (x, character) in line.as_ref().chars().enumerate() {
                let cell = IVec2::new(x as i32, y as i32);
                let tile = Self::parse_character(character);

                match tile {
                    MapTile::PlayerSpawn => {
                        if let Some(first) = player_start {
                            return Err(ParseError::DuplicatePlayerSpawn { first, second: cell });
                        }
                        player_start = Some(cell);
                    }
                    MapTile::GhostSpawn(kind) => ghost_starts.push((kind, cell)),
                    _ => {}
                }

                tiles.push(tile);
            }
        }

        Ok(ParsedMap {
            size: UVec2::new(width as u32, raw_board.len() as u32),
            tiles,
            player_start,
            ghost_starts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{BOARD_CELL_SIZE, RAW_BOARD};

    #[test]
    fn test_parse_character() {
        assert_eq!(MapTileParser::parse_character('X'), MapTile::Wall);
        assert_eq!(MapTileParser::parse_character(' '), MapTile::Collectible);
        assert_eq!(MapTileParser::parse_character('P'), MapTile::PlayerSpawn);
        assert_eq!(MapTileParser::parse_character('r'), MapTile::GhostSpawn(GhostKind::Red));
        assert_eq!(MapTileParser::parse_character('O'), MapTile::Empty);
        assert_eq!(MapTileParser::parse_character('#'), MapTile::Empty);
    }

    #[test]
    fn test_parse_board() {
        let parsed = MapTileParser::parse_board(&RAW_BOARD).unwrap();

        assert_eq!(parsed.size, BOARD_CELL_SIZE);
        assert_eq!(parsed.tiles.len(), (BOARD_CELL_SIZE.x * BOARD_CELL_SIZE.y) as usize);
        assert_eq!(parsed.player_start, Some(IVec2::new(9, 15)));
        assert_eq!(parsed.ghost_starts.len(), 4);
        assert_eq!(parsed.tile(IVec2::new(0, 0)), Some(MapTile::Wall));
        assert_eq!(parsed.tile(IVec2::new(1, 1)), Some(MapTile::Collectible));
        assert_eq!(parsed.tile(IVec2::new(-1, 0)), None);
    }

    #[test]
    fn test_parse_board_ragged_row() {
        let result = MapTileParser::parse_board(&["XXX", "X X", "XX"]);
        assert_eq!(
            result.unwrap_err(),
            ParseError::RaggedRow {
                row: 2,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_parse_board_empty() {
        let empty: [&str; 0] = [];
        assert_eq!(MapTileParser::parse_board(&empty).unwrap_err(), ParseError::EmptyBoard);
        assert_eq!(MapTileParser::parse_board(&[""]).unwrap_err(), ParseError::EmptyBoard);
    }

    #[test]
    fn test_parse_board_without_player_leaves_spawn_unset() {
        let parsed = MapTileParser::parse_board(&["XXX", "X X", "XXX"]).unwrap();
        assert_eq!(parsed.player_start, None);
    }

    #[test]
    fn test_parse_board_duplicate_player() {
        let result = MapTileParser::parse_board(&["PXP"]);
        assert!(matches!(result, Err(ParseError::DuplicatePlayerSpawn { .. })));
    }
}
