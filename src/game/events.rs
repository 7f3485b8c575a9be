//! Game Events
//!
//! Events generated during simulation, drained once per tick into the
//! [`TickResult`](crate::game::tick::TickResult).

use serde::{Serialize, Deserialize};

use crate::game::entity::{EntityId, Team};

/// Why an entity was eliminated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EliminationCause {
    /// Lost a collision with an enemy.
    Enemy {
        /// The entity it collided with.
        by: EntityId,
    },
    /// A closing wall landed on it.
    Wall,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Match moved to in-progress.
    MatchStarted,

    /// Entity was eliminated.
    EntityEliminated {
        /// Eliminated entity.
        id: EntityId,
        /// Its team.
        team: Team,
        /// What did it.
        cause: EliminationCause,
    },

    /// Match ended.
    MatchEnded {
        /// Winning entities, empty when nobody survived.
        winners: Vec<EntityId>,
    },
}

/// A game event with timing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u32,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u32, data: GameEventData) -> Self {
        Self { tick, data }
    }

    /// Create match started event.
    pub fn match_started(tick: u32) -> Self {
        Self::new(tick, GameEventData::MatchStarted)
    }

    /// Create entity eliminated event.
    pub fn entity_eliminated(tick: u32, id: EntityId, team: Team, cause: EliminationCause) -> Self {
        Self::new(tick, GameEventData::EntityEliminated { id, team, cause })
    }

    /// Create match ended event.
    pub fn match_ended(tick: u32, winners: Vec<EntityId>) -> Self {
        Self::new(tick, GameEventData::MatchEnded { winners })
    }

    /// Id of the eliminated entity, if this is an elimination.
    pub fn eliminated(&self) -> Option<EntityId> {
        match self.data {
            GameEventData::EntityEliminated { id, .. } => Some(id),
            _ => None,
        }
    }
}
