//! Board Geometry
//!
//! A width×height grid of tiles plus spawn metadata. A board parsed once can
//! back many concurrent games; each game works on its own clone.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::game::tile::{Tile, TileType};

/// Grid coordinate of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

/// Per-board metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardMetadata {
    /// Players needed to fill every spawn (highest spawn index + 1).
    pub player_amount: u32,
    /// Spawn index to cell.
    pub map_data: BTreeMap<u32, GridPos>,
}

/// Errors from the plain-text board builder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// No rows, or an empty first row.
    #[error("Board is empty")]
    Empty,

    /// Rows of different lengths.
    #[error("Row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        /// Offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of this row.
        found: usize,
    },

    /// Unrecognised glyph.
    #[error("Unknown glyph {glyph:?} at ({x}, {y})")]
    UnknownGlyph {
        /// The character.
        glyph: char,
        /// Column.
        x: usize,
        /// Row.
        y: usize,
    },

    /// Same spawn index used twice.
    #[error("Spawn {0} appears more than once")]
    DuplicateSpawn(u32),
}

/// The playing field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    /// Columns.
    pub width: usize,
    /// Rows.
    pub height: usize,
    /// Tiles, indexed `[y][x]`.
    pub tiles: Vec<Vec<Tile>>,
    /// Spawn metadata.
    #[serde(skip)]
    pub metadata: BoardMetadata,
}

impl Board {
    /// An all-floor board.
    pub fn new(width: usize, height: usize) -> Self {
        let tiles = (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| Tile::new(x as u32, y as u32, TileType::None))
                    .collect()
            })
            .collect();

        Self {
            width,
            height,
            tiles,
            metadata: BoardMetadata::default(),
        }
    }

    /// Build a board from text rows.
    ///
    /// `.` floor, `#` wall, `x` stop, `0`-`9` a spawn point on floor.
    pub fn from_rows(rows: &[&str]) -> Result<Self, BoardError> {
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        if width == 0 {
            return Err(BoardError::Empty);
        }

        let mut board = Board::new(width, rows.len());

        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(BoardError::RaggedRow { row: y, expected: width, found });
            }

            for (x, glyph) in row.chars().enumerate() {
                let tile_type = match glyph {
                    '.' => TileType::None,
                    '#' => TileType::Wall,
                    'x' => TileType::Stop,
                    '0'..='9' => {
                        let index = glyph as u32 - '0' as u32;
                        let pos = GridPos { x: x as u32, y: y as u32 };
                        if board.metadata.map_data.insert(index, pos).is_some() {
                            return Err(BoardError::DuplicateSpawn(index));
                        }
                        TileType::None
                    }
                    _ => return Err(BoardError::UnknownGlyph { glyph, x, y }),
                };
                board.tiles[y][x].tile_type = tile_type;
            }
        }

        board.metadata.player_amount = board
            .metadata
            .map_data
            .keys()
            .next_back()
            .map(|highest| highest + 1)
            .unwrap_or(0);

        Ok(board)
    }

    /// Tile at pre-validated grid coordinates.
    ///
    /// # Panics
    /// Panics if the coordinates are outside the board; use [`Board::get`]
    /// for unchecked input.
    #[inline]
    pub fn tile_at(&self, x: usize, y: usize) -> &Tile {
        &self.tiles[y][x]
    }

    /// Tile at signed grid coordinates, `None` when out of bounds.
    #[inline]
    pub fn get(&self, x: i64, y: i64) -> Option<&Tile> {
        if self.index_in_bounds(x, y) {
            Some(&self.tiles[y as usize][x as usize])
        } else {
            None
        }
    }

    /// Change a tile's contents. Out-of-bounds is ignored.
    pub fn set_tile_type(&mut self, x: usize, y: usize, tile_type: TileType) -> Option<Tile> {
        let tile = self.tiles.get_mut(y)?.get_mut(x)?;
        tile.tile_type = tile_type;
        Some(*tile)
    }

    /// Grid-space bounds check.
    #[inline]
    pub fn index_in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as u64) < self.width as u64 && (y as u64) < self.height as u64
    }

    /// Pixel-space bounds check.
    #[inline]
    pub fn in_bounds(&self, px: f64, py: f64, cell_size: f64) -> bool {
        px >= 0.0
            && py >= 0.0
            && px < self.width as f64 * cell_size
            && py < self.height as f64 * cell_size
    }

    /// Pixel anchor of a spawn point.
    pub fn spawn_anchor(&self, spawn_index: u32, cell_size: f64) -> Option<(f64, f64)> {
        self.metadata
            .map_data
            .get(&spawn_index)
            .map(|pos| (pos.x as f64 * cell_size, pos.y as f64 * cell_size))
    }

    /// Iterate every tile row by row.
    pub fn iter_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows() {
        let board = Board::from_rows(&["0.#.", ".x..", "...1"]).unwrap();

        assert_eq!(board.width, 4);
        assert_eq!(board.height, 3);
        assert_eq!(board.tile_at(2, 0).tile_type, TileType::Wall);
        assert_eq!(board.tile_at(1, 1).tile_type, TileType::Stop);
        assert_eq!(board.tile_at(0, 0).tile_type, TileType::None);
        assert_eq!(board.metadata.player_amount, 2);
        assert_eq!(board.metadata.map_data[&1], GridPos { x: 3, y: 2 });
        assert_eq!(board.spawn_anchor(1, 100.0), Some((300.0, 200.0)));
    }

    #[test]
    fn test_player_amount_uses_highest_index() {
        let board = Board::from_rows(&["0..", "..3"]).unwrap();
        assert_eq!(board.metadata.player_amount, 4);
    }

    #[test]
    fn test_from_rows_errors() {
        assert_eq!(Board::from_rows(&[]), Err(BoardError::Empty));
        assert_eq!(
            Board::from_rows(&["...", ".."]),
            Err(BoardError::RaggedRow { row: 1, expected: 3, found: 2 })
        );
        assert_eq!(
            Board::from_rows(&["..?"]),
            Err(BoardError::UnknownGlyph { glyph: '?', x: 2, y: 0 })
        );
        assert_eq!(Board::from_rows(&["1.1"]), Err(BoardError::DuplicateSpawn(1)));
    }

    #[test]
    fn test_bounds() {
        let board = Board::new(4, 3);

        assert!(board.index_in_bounds(3, 2));
        assert!(!board.index_in_bounds(4, 0));
        assert!(!board.index_in_bounds(-1, 0));
        assert!(board.get(0, 3).is_none());

        assert!(board.in_bounds(399.0, 299.0, 100.0));
        assert!(!board.in_bounds(400.0, 0.0, 100.0));
        assert!(!board.in_bounds(-0.5, 0.0, 100.0));
    }

    #[test]
    fn test_clone_is_independent() {
        let template = Board::from_rows(&["0..", "..1"]).unwrap();
        let mut copy = template.clone();

        copy.set_tile_type(1, 1, TileType::Wall);
        copy.metadata.map_data.clear();

        assert_eq!(template.tile_at(1, 1).tile_type, TileType::None);
        assert_eq!(template.metadata.map_data.len(), 2);
    }

    #[test]
    fn test_serialized_form() {
        let board = Board::from_rows(&["#."]).unwrap();
        let json = serde_json::to_value(&board).unwrap();

        assert_eq!(json["width"], 2);
        assert_eq!(json["height"], 1);
        assert_eq!(json["tiles"][0][0]["tile_type"], "WALL");
        assert_eq!(json["tiles"][0][1]["x"], 1);
        assert!(json.get("metadata").is_none());
    }
}
