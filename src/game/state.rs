//! Game State Definitions
//!
//! The mutable world of one match: board clone, entities, phase, winners.
//! Uses BTreeMap for deterministic iteration order.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::hash::{StateHash, compute_state_hash};
use crate::core::rng::DeterministicRng;
use crate::game::board::Board;
use crate::game::entity::{Entity, EntityId, EntityKind, EntitySnapshot, Team};
use crate::game::events::{EliminationCause, GameEvent};

// =============================================================================
// MATCH PHASE
// =============================================================================

/// Current phase of the match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Created, no tick has run yet.
    #[default]
    NotStarted,
    /// Ticking.
    InProgress,
    /// A game mode ended the match.
    Finished,
}

// =============================================================================
// MATCH STATE
// =============================================================================

/// Complete state of a match.
#[derive(Clone, Debug)]
pub struct MatchState {
    /// Ticks run so far.
    pub tick: u32,

    /// Current match phase.
    pub phase: MatchPhase,

    /// This match's own copy of the board.
    pub board: Board,

    /// Live entities (BTreeMap for deterministic iteration).
    /// Dead ones stay until the next sweep.
    pub entities: BTreeMap<EntityId, Entity>,

    /// Serialized winners, once finished.
    pub winners: Option<Vec<EntitySnapshot>>,

    /// RNG seed (for verification)
    pub rng_seed: u64,

    /// Deterministic RNG state
    pub rng: DeterministicRng,

    /// Next entity id (monotonic counter)
    next_entity_id: EntityId,

    /// Events generated this tick (cleared each tick)
    pending_events: Vec<GameEvent>,
}

impl MatchState {
    /// Create a new match state on a board.
    pub fn new(board: Board, rng_seed: u64) -> Self {
        Self {
            tick: 0,
            phase: MatchPhase::NotStarted,
            board,
            entities: BTreeMap::new(),
            winners: None,
            rng_seed,
            rng: DeterministicRng::new(rng_seed),
            next_entity_id: 0,
            pending_events: Vec::new(),
        }
    }

    /// Add an entity and return its id.
    pub fn add_entity(&mut self, kind: EntityKind, x: f64, y: f64, size: f64, team: Team) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        self.entities.insert(id, Entity::new(id, x, y, size, team, kind));
        id
    }

    /// Get an entity by ID.
    pub fn get_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Get an entity mutably by ID.
    pub fn get_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Mark an entity dead. Returns false if it was unknown or already dead.
    pub fn eliminate(&mut self, id: EntityId, cause: EliminationCause) -> bool {
        let Some(entity) = self.entities.get_mut(&id) else {
            return false;
        };
        if entity.dead {
            return false;
        }

        entity.kill();
        let team = entity.team;
        debug!("Entity {} (team {}) eliminated at tick {}: {:?}", id, team.0, self.tick, cause);
        self.push_event(GameEvent::entity_eliminated(self.tick, id, team, cause));
        true
    }

    /// Entities not marked dead, in id order.
    pub fn survivors(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values().filter(|e| !e.dead)
    }

    /// Remove dead entities, returning their ids.
    pub fn sweep_dead(&mut self) -> Vec<EntityId> {
        let dead: Vec<EntityId> = self
            .entities
            .values()
            .filter(|e| e.dead)
            .map(|e| e.id)
            .collect();

        for id in &dead {
            self.entities.remove(id);
        }
        dead
    }

    /// Finish the match with the given winners. A later call in the same tick
    /// replaces the earlier result.
    pub fn end(&mut self, winners: &[EntityId]) {
        let snapshots = winners
            .iter()
            .filter_map(|id| self.entities.get(id))
            .map(Entity::snapshot)
            .collect();

        self.phase = MatchPhase::Finished;
        self.winners = Some(snapshots);
    }

    /// Check if match has ended.
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, MatchPhase::Finished)
    }

    /// Compute hash of current state for verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, self.rng_seed, |hasher| {
            for tile in self.board.iter_tiles() {
                hasher.update_u8(tile.tile_type as u8);
            }

            for entity in self.entities.values() {
                hasher.update_u32(entity.id);
                hasher.update_f64(entity.x);
                hasher.update_f64(entity.y);
                hasher.update_u8(entity.direction.curr as u8);
                hasher.update_u8(entity.direction.next as u8);
                hasher.update_u8(entity.team.0);
                hasher.update_bool(entity.dead);
            }

            hasher.update_u8(self.phase as u8);
        })
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Push a game event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }
}

// =============================================================================
// TESTS
// =============================================================================
