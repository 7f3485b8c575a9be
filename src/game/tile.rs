//! Board Tiles
//!
//! Per-cell static state.

use serde::{Serialize, Deserialize};

/// What occupies a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TileType {
    /// Open floor.
    #[default]
    None,
    /// Lethal, impassable.
    Wall,
    /// Halts an entity that reaches it.
    Stop,
}

impl TileType {
    /// Canonical string form.
    pub const fn as_str(self) -> &'static str {
        match self {
            TileType::None => "NONE",
            TileType::Wall => "WALL",
            TileType::Stop => "STOP",
        }
    }
}

/// One cell of the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
    /// Current contents. Only the wall filler changes it after construction.
    pub tile_type: TileType,
}

impl Tile {
    /// Create a tile.
    pub const fn new(x: u32, y: u32, tile_type: TileType) -> Self {
        Self { x, y, tile_type }
    }

    /// Pixel-space top-left corner.
    #[inline]
    pub fn anchor(&self, cell_size: f64) -> (f64, f64) {
        (self.x as f64 * cell_size, self.y as f64 * cell_size)
    }

    /// Is this a wall?
    #[inline]
    pub fn is_wall(&self) -> bool {
        self.tile_type == TileType::Wall
    }

    /// Is this a stop tile?
    #[inline]
    pub fn is_stop(&self) -> bool {
        self.tile_type == TileType::Stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor() {
        let tile = Tile::new(3, 2, TileType::None);
        assert_eq!(tile.anchor(100.0), (300.0, 200.0));
    }

    #[test]
    fn test_serialized_form() {
        let tile = Tile::new(1, 4, TileType::Stop);
        let json = serde_json::to_value(tile).unwrap();
        assert_eq!(json, serde_json::json!({ "x": 1, "y": 4, "tile_type": "STOP" }));
        assert_eq!(TileType::Wall.as_str(), "WALL");
    }
}
