//! Movement Directions
//!
//! The closed set of movement vectors. Screen coordinates: NORTH is -y.

use serde::{Serialize, Deserialize};

use crate::core::rng::DeterministicRng;

/// A movement direction, or none.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Not moving.
    #[default]
    None,
    /// Towards decreasing y.
    North,
    /// Towards increasing y.
    South,
    /// Towards increasing x.
    East,
    /// Towards decreasing x.
    West,
}

impl Direction {
    /// The four movement directions, in a fixed order.
    pub const CARDINALS: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Parse a wire tag. Anything unrecognised is `None`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "NORTH" => Direction::North,
            "SOUTH" => Direction::South,
            "EAST" => Direction::East,
            "WEST" => Direction::West,
            _ => Direction::None,
        }
    }

    /// Canonical wire tag.
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::None => "NONE",
            Direction::North => "NORTH",
            Direction::South => "SOUTH",
            Direction::East => "EAST",
            Direction::West => "WEST",
        }
    }

    /// Unit vector `(dx, dy)`.
    #[inline]
    pub const fn vector(self) -> (i32, i32) {
        match self {
            Direction::None => (0, 0),
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    /// X component of the unit vector.
    #[inline]
    pub fn dx(self) -> f64 {
        self.vector().0 as f64
    }

    /// Y component of the unit vector.
    #[inline]
    pub fn dy(self) -> f64 {
        self.vector().1 as f64
    }

    /// The reverse direction. `None` is its own opposite.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Direction::None => Direction::None,
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// True when both are moving and point exactly against each other.
    #[inline]
    pub fn is_opposite(self, other: Direction) -> bool {
        self != Direction::None && other == self.opposite()
    }

    /// Moving along the x axis.
    #[inline]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::East | Direction::West)
    }

    /// Moving along the y axis.
    #[inline]
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::North | Direction::South)
    }

    /// Uniform choice among the four movement directions.
    pub fn random(rng: &mut DeterministicRng) -> Self {
        Self::CARDINALS[rng.next_int(4) as usize]
    }
}

impl From<&str> for Direction {
    fn from(tag: &str) -> Self {
        Direction::from_tag(tag)
    }
}
