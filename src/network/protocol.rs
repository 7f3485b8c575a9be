//! Protocol Messages
//!
//! Wire format between a match driver and its clients. Messages are JSON with
//! a `type` tag; full snapshots also have a compact bincode form
//! ([`GameSnapshot::to_bytes`]).

use serde::{Serialize, Deserialize};

use crate::game::direction::Direction;
use crate::game::entity::{EntityId, EntitySnapshot};
use crate::game::tick::{EntitiesUpdate, GameSnapshot};

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Ask for an entity to start moving.
    Move {
        /// Entity to move.
        id: EntityId,
        /// Direction tag (`NORTH`, `SOUTH`, `EAST`, `WEST`).
        direction: String,
    },

    /// Ping for latency measurement.
    Ping {
        /// Client timestamp, echoed back.
        timestamp: u64,
    },
}

impl ClientMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Parsed direction of a move. Unknown tags read as [`Direction::None`].
    pub fn direction(&self) -> Option<Direction> {
        match self {
            ClientMessage::Move { direction, .. } => Some(Direction::from_tag(direction)),
            ClientMessage::Ping { .. } => None,
        }
    }
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full state, sent once when a client joins.
    Snapshot(GameSnapshot),

    /// Per-tick entity positions and newly filled cells.
    Update(EntitiesUpdate),

    /// The match is over.
    MatchEnded {
        /// Tick the match ended on.
        tick: u32,
        /// Winning entities, empty when nobody survived.
        winners: Vec<EntitySnapshot>,
    },

    /// Pong response.
    Pong {
        /// Timestamp from the ping.
        timestamp: u64,
    },

    /// A request was rejected.
    Error {
        /// Human-readable reason.
        message: String,
    },
}

impl ServerMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entity::{EntityType, Team};

    #[test]
    fn test_parse_move() {
        let msg = ClientMessage::from_json(r#"{"type":"move","id":3,"direction":"WEST"}"#).unwrap();

        assert_eq!(msg, ClientMessage::Move { id: 3, direction: "WEST".into() });
        assert_eq!(msg.direction(), Some(Direction::West));
    }

    #[test]
    fn test_unknown_direction_reads_as_none() {
        let msg = ClientMessage::Move { id: 1, direction: "UP".into() };
        assert_eq!(msg.direction(), Some(Direction::None));
        assert_eq!(ClientMessage::Ping { timestamp: 1 }.direction(), None);
    }

    #[test]
    fn test_match_ended_json() {
        let winner = EntitySnapshot {
            entity_type: EntityType::Player,
            id: 2,
            team: Team(1),
            size: 99.0,
            x: 100.0,
            y: 0.0,
            direction: Direction::None,
            name: Some("blue".into()),
        };
        let msg = ServerMessage::MatchEnded { tick: 40, winners: vec![winner] };

        let json: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "match_ended");
        assert_eq!(json["winners"][0]["id"], 2);

        assert_eq!(ServerMessage::from_json(&msg.to_json().unwrap()).unwrap(), msg);
    }

    #[test]
    fn test_error_json() {
        let msg = ServerMessage::Error { message: "Entity 9 not found".into() };
        assert_eq!(
            msg.to_json().unwrap(),
            r#"{"type":"error","message":"Entity 9 not found"}"#
        );
    }
}
