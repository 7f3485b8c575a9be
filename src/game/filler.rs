//! Closing Walls
//!
//! Turns board cells into walls one at a time, spiralling inward from the
//! outer edge, throttled to one cell per `cadence` ticks.

use tracing::trace;

use crate::game::board::{Board, GridPos};
use crate::game::tile::{Tile, TileType};

/// Every cell of a `width` x `height` grid in inward spiral order, starting at
/// the top-left corner and running clockwise.
pub fn spiral_order(width: usize, height: usize) -> Vec<GridPos> {
    let mut order = Vec::with_capacity(width * height);
    let (mut top, mut bottom) = (0i64, height as i64 - 1);
    let (mut left, mut right) = (0i64, width as i64 - 1);

    let mut push = |x: i64, y: i64| order.push(GridPos { x: x as u32, y: y as u32 });

    while top <= bottom && left <= right {
        for x in left..=right {
            push(x, top);
        }
        top += 1;

        for y in top..=bottom {
            push(right, y);
        }
        right -= 1;

        if top <= bottom {
            for x in (left..=right).rev() {
                push(x, bottom);
            }
            bottom -= 1;
        }

        if left <= right {
            for y in (top..=bottom).rev() {
                push(left, y);
            }
            left += 1;
        }
    }

    order
}

/// Incremental wall filler for one board.
#[derive(Debug, Clone)]
pub struct WallFiller {
    order: Vec<GridPos>,
    cursor: usize,
    counter: u32,
    cadence: u32,
    updates: Vec<Tile>,
}

impl WallFiller {
    /// Plan the fill for `board`. A zero cadence is treated as one.
    pub fn new(board: &Board, cadence: u32) -> Self {
        Self {
            order: spiral_order(board.width, board.height),
            cursor: 0,
            counter: 0,
            cadence: cadence.max(1),
            updates: Vec::new(),
        }
    }

    /// Advance one tick; every `cadence`-th call converts the next cell.
    pub fn do_fill(&mut self, board: &mut Board) -> Option<Tile> {
        self.counter = (self.counter + 1) % self.cadence;
        if self.counter != 0 {
            return None;
        }

        let pos = *self.order.get(self.cursor)?;
        self.cursor += 1;

        let tile = board.set_tile_type(pos.x as usize, pos.y as usize, TileType::Wall)?;
        trace!("Filled ({}, {}), {} cells left", pos.x, pos.y, self.remaining());
        self.updates.push(tile);
        Some(tile)
    }

    /// Tiles converted since the last [`take_updates`](Self::take_updates).
    pub fn updates(&self) -> &[Tile] {
        &self.updates
    }

    /// Drain the update log.
    pub fn take_updates(&mut self) -> Vec<Tile> {
        std::mem::take(&mut self.updates)
    }

    /// Cells still to convert.
    pub fn remaining(&self) -> usize {
        self.order.len() - self.cursor
    }

    /// Whole board converted.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.order.len()
    }
}
