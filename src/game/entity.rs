//! Entities
//!
//! Movable actors. Players and bots share one record; the differences live in
//! [`EntityKind`] and are dispatched by [`tick_entity`].

use serde::{Serialize, Deserialize};

use crate::core::rng::DeterministicRng;
use crate::game::board::Board;
use crate::game::bot;
use crate::game::collision::CollisionManager;
use crate::game::config::GameConfig;
use crate::game::direction::Direction;

/// Entity identifier, unique within a match.
pub type EntityId = u32;

/// Team tag. Index into the configured team names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Team(pub u8);

/// Current and requested direction.
///
/// A request sits in `next` until [`Entity::update_dir`] commits it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirectionState {
    /// Direction applied this tick.
    pub curr: Direction,
    /// Direction committed on the next `update_dir`.
    pub next: Direction,
}

/// What sort of actor an entity is.
#[derive(Clone, Debug, PartialEq)]
pub enum EntityKind {
    /// Bare movable actor.
    Entity,
    /// Human-controlled player.
    Player {
        /// Display name.
        name: String,
    },
    /// Maze-walking bot.
    SimpleBot {
        /// Display name.
        name: String,
        /// Direction it arrived from; not chosen again unless cornered.
        dir_from: Direction,
        /// Idle ticks since its last decision.
        decision_ticks: u32,
    },
}

/// Serialized type discriminant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityType {
    /// A bare entity.
    Entity,
    /// A player or bot.
    Player,
}

/// Wire form of an entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Type discriminant.
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    /// Entity id.
    pub id: EntityId,
    /// Team tag.
    pub team: Team,
    /// Footprint.
    pub size: f64,
    /// Pixel x.
    pub x: f64,
    /// Pixel y.
    pub y: f64,
    /// Current direction.
    pub direction: Direction,
    /// Display name (players and bots).
    pub name: Option<String>,
}

/// A movable actor.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    /// Unique id.
    pub id: EntityId,
    /// Pixel x of the top-left corner.
    pub x: f64,
    /// Pixel y of the top-left corner.
    pub y: f64,
    /// Square footprint, slightly under one cell.
    pub size: f64,
    /// Direction pair.
    pub direction: DirectionState,
    /// Marked for removal at the next sweep.
    pub dead: bool,
    /// Team tag.
    pub team: Team,
    /// Consecutive ticks spent standing still.
    pub idle_ticks: u32,
    /// Player/bot specifics.
    pub kind: EntityKind,
}

impl Entity {
    /// Create an idle entity.
    pub fn new(id: EntityId, x: f64, y: f64, size: f64, team: Team, kind: EntityKind) -> Self {
        Self {
            id,
            x,
            y,
            size,
            direction: DirectionState::default(),
            dead: false,
            team,
            idle_ticks: 0,
            kind,
        }
    }

    /// Display name, if the entity has one.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            EntityKind::Entity => None,
            EntityKind::Player { name } | EntityKind::SimpleBot { name, .. } => Some(name),
        }
    }

    /// Serialized type discriminant.
    pub fn entity_type(&self) -> EntityType {
        match self.kind {
            EntityKind::Entity => EntityType::Entity,
            EntityKind::Player { .. } | EntityKind::SimpleBot { .. } => EntityType::Player,
        }
    }

    /// Neither moving nor waiting to move.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.direction.curr == Direction::None && self.direction.next == Direction::None
    }

    /// Request a move. Dropped unless the entity is idle.
    pub fn request_move(&mut self, direction: Direction) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.direction.next = direction;
        true
    }

    /// Move immediately, nudging one pixel so the stop that released the
    /// entity does not fire again on the same tick.
    pub fn force_move(&mut self, direction: Direction) {
        self.direction.curr = direction;
        self.direction.next = direction;
        self.idle_ticks = 0;
        self.x += direction.dx();
        self.y += direction.dy();
    }

    /// Cancel the pending direction and snap to the nearest grid point.
    pub fn stop(&mut self, immediate: bool, cell_size: f64) {
        self.direction.next = Direction::None;
        if immediate {
            self.direction.curr = Direction::None;
        }
        self.x = (self.x / cell_size).round() * cell_size;
        self.y = (self.y / cell_size).round() * cell_size;
    }

    /// Commit the requested direction.
    #[inline]
    pub fn update_dir(&mut self) {
        self.direction.curr = self.direction.next;
    }

    /// Count a standing-still tick and force a random move once the timeout
    /// is exceeded.
    pub fn idle_tick(&mut self, idle_timeout: u32, rng: &mut DeterministicRng) {
        if self.direction.curr != Direction::None {
            self.idle_ticks = 0;
            return;
        }

        self.idle_ticks += 1;
        if self.idle_ticks > idle_timeout {
            let direction = Direction::random(rng);
            tracing::debug!("Entity {} idle for {} ticks, forcing {:?}", self.id, self.idle_ticks, direction);
            self.force_move(direction);
        }
    }

    /// Position one step ahead along the current direction.
    #[inline]
    pub fn projected(&self, step: f64) -> (f64, f64) {
        (
            self.x + self.direction.curr.dx() * step,
            self.y + self.direction.curr.dy() * step,
        )
    }

    /// Would this entity, one step ahead, overlap `other` placed at `(at_x, at_y)`?
    pub fn collides(&self, other: &Entity, at_x: f64, at_y: f64, step: f64) -> bool {
        let (x, y) = self.projected(step);
        boxes_overlap(x, y, self.size, at_x, at_y, other.size)
    }

    /// Does this entity, where it is now, overlap `other` placed at `(at_x, at_y)`?
    pub fn collides_now(&self, other: &Entity, at_x: f64, at_y: f64) -> bool {
        boxes_overlap(self.x, self.y, self.size, at_x, at_y, other.size)
    }

    /// Mark for removal.
    #[inline]
    pub fn kill(&mut self) {
        self.dead = true;
    }

    /// Grid cell the entity is snapped to.
    #[inline]
    pub fn grid_cell(&self, cell_size: f64) -> (i64, i64) {
        (
            (self.x / cell_size).round() as i64,
            (self.y / cell_size).round() as i64,
        )
    }

    /// Wire form.
    pub fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            entity_type: self.entity_type(),
            id: self.id,
            team: self.team,
            size: self.size,
            x: self.x,
            y: self.y,
            direction: self.direction.curr,
            name: self.name().map(str::to_string),
        }
    }
}

/// Strict axis-aligned overlap; touching edges do not count.
#[inline]
pub fn boxes_overlap(ax: f64, ay: f64, a_size: f64, bx: f64, by: f64, b_size: f64) -> bool {
    ax < bx + b_size && ax + a_size > bx && ay < by + b_size && ay + a_size > by
}

/// Per-tick autonomous behaviour for one entity.
pub fn tick_entity(
    entity: &mut Entity,
    board: &Board,
    collisions: &CollisionManager,
    config: &GameConfig,
    rng: &mut DeterministicRng,
) {
    if matches!(entity.kind, EntityKind::SimpleBot { .. }) {
        bot::decide(entity, board, collisions, config.bot_decision_delay, rng);
    }
    entity.idle_tick(config.idle_timeout_ticks, rng);
}
