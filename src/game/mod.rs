//! Game Logic Module
//!
//! All match simulation code. Deterministic for a given seed and move order.
//!
//! ## Module Structure
//!
//! - `direction`, `tile`, `board`: static geometry
//! - `entity`, `bot`: movable actors and bot decisions
//! - `collision`: entity, wall and stop-tile resolution plus movement
//! - `mode`: win conditions and collision outcomes
//! - `filler`: closing walls
//! - `state`: match state
//! - `tick`: the [`Game`] orchestrator
//! - `events`: game events for logging and replay checks

pub mod config;
pub mod direction;
pub mod tile;
pub mod board;
pub mod entity;
pub mod bot;
pub mod collision;
pub mod mode;
pub mod filler;
pub mod state;
pub mod tick;
pub mod events;

// Re-export key types
pub use config::{ConfigError, GameConfig};
pub use direction::Direction;
pub use tile::{Tile, TileType};
pub use board::{Board, BoardError, GridPos};
pub use entity::{Entity, EntityId, EntityKind, EntitySnapshot, Team};
pub use collision::CollisionManager;
pub use mode::{GameMode, LastStanding, TeamElimination};
pub use state::{MatchPhase, MatchState};
pub use tick::{EntitiesUpdate, Game, GameSnapshot, TickResult};
pub use events::GameEvent;
