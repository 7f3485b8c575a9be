//! Collision Detection
//!
//! Per-tick entity, wall and stop-tile resolution plus movement application.
//!
//! A tick runs three phases in a fixed order:
//!
//! 1. [`CollisionManager::collisions`]: pairwise entity tests. Teammates
//!    bounce, enemies are resolved by the [`GameMode`].
//! 2. [`CollisionManager::movement`]: commit requested directions, then move
//!    or stop each entity against walls, stop tiles and the board edge.
//! 3. [`CollisionManager::wall_collisions`]: stationary entities caught by a
//!    freshly filled wall are eliminated.
//!
//! Movement distance is `speed * dt / interval`, so a late tick moves
//! proportionally further.

use std::time::Duration;

use crate::game::board::Board;
use crate::game::config::GameConfig;
use crate::game::direction::Direction;
use crate::game::entity::{Entity, EntityId};
use crate::game::mode::GameMode;
use crate::game::state::MatchState;
use crate::game::tile::Tile;

/// Ratio of elapsed time to the target tick interval. A zero interval
/// counts as one full tick.
#[inline]
pub fn step_ratio(dt: Duration, interval: Duration) -> f64 {
    if interval.is_zero() {
        return 1.0;
    }
    dt.as_secs_f64() / interval.as_secs_f64()
}

/// Collision and movement rules for one match.
#[derive(Debug, Clone)]
pub struct CollisionManager {
    cell_size: f64,
    speed: f64,
    epsilon: f64,
}

impl CollisionManager {
    /// Create a manager from the match configuration.
    pub fn new(config: &GameConfig) -> Self {
        Self {
            cell_size: config.cell_size,
            speed: config.speed,
            epsilon: config.collision_epsilon,
        }
    }

    /// Pixel size of one grid cell.
    #[inline]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Pixels moved this tick.
    #[inline]
    pub fn step(&self, dt: Duration, interval: Duration) -> f64 {
        self.speed * step_ratio(dt, interval)
    }

    // =========================================================================
    // PHASE A: ENTITY VS ENTITY
    // =========================================================================

    /// Test every moving entity against every other one, on a predicted or
    /// current overlap.
    ///
    /// Entities killed earlier in the phase still take part; removal waits
    /// for the sweep.
    pub fn collisions(&self, state: &mut MatchState, mode: &dyn GameMode, dt: Duration, interval: Duration) {
        let step = self.step(dt, interval);
        let ids: Vec<EntityId> = state.entities.keys().copied().collect();

        for &id in &ids {
            for &other_id in &ids {
                if other_id == id {
                    continue;
                }
                let (Some(mover), Some(other)) = (state.get_entity(id), state.get_entity(other_id)) else {
                    continue;
                };
                if mover.direction.curr == Direction::None {
                    break;
                }

                let (ox, oy) = other.projected(step);
                let overlap = mover.collides(other, ox, oy, step)
                    || mover.collides_now(other, other.x, other.y);
                if !overlap {
                    continue;
                }

                if mover.team == other.team {
                    self.bounce(state, mode, id, other_id);
                } else {
                    self.enemy_collision(state, mode, id, other_id);
                }
            }
        }
    }

    /// Resolve a teammate collision initiated by `mover`.
    ///
    /// Head-on teammates both reverse. Otherwise the mover stops and the
    /// other entity is lined up with it and pushed along the mover's
    /// direction.
    pub fn bounce(&self, state: &mut MatchState, mode: &dyn GameMode, mover: EntityId, other: EntityId) {
        if !mode.on_team_collision(state, mover, other) {
            return;
        }
        let Some(other_dir) = state.get_entity(other).map(|e| e.direction.curr) else {
            return;
        };
        let Some(m) = state.get_entity_mut(mover) else {
            return;
        };

        let mover_dir = m.direction.curr;
        if mover_dir.is_opposite(other_dir) {
            m.direction.next = mover_dir.opposite();
            return;
        }

        m.stop(false, self.cell_size);
        let (mx, my) = (m.x, m.y);

        if let Some(o) = state.get_entity_mut(other) {
            let dx = (o.x - mx).abs();
            let dy = (o.y - my).abs();
            if dx >= dy {
                o.y = my;
            } else {
                o.x = mx;
            }
            o.force_move(mover_dir);
        }
    }

    /// Decide which of two enemies dies.
    ///
    /// `attacker` is the moving entity whose test fired. Perpendicular
    /// approaches that do not favour the attacker are left to the other
    /// entity's test or the next tick.
    pub fn enemy_collision(&self, state: &mut MatchState, mode: &dyn GameMode, attacker: EntityId, victim: EntityId) {
        let (Some(a), Some(v)) = (state.get_entity(attacker), state.get_entity(victim)) else {
            return;
        };
        let a_dir = a.direction.curr;
        let v_dir = v.direction.curr;

        if v_dir == Direction::None {
            mode.on_enemy_collision(state, attacker, victim);
            return;
        }

        if a_dir.is_opposite(v_dir) {
            mode.on_enemy_collision(state, attacker, victim);
            mode.on_enemy_collision(state, victim, attacker);
            return;
        }

        if a_dir == v_dir {
            let progress = |e: &Entity| e.x * a_dir.dx() + e.y * a_dir.dy();
            let (pa, pv) = (progress(a), progress(v));
            if pa > pv {
                mode.on_enemy_collision(state, victim, attacker);
            } else if pv > pa {
                mode.on_enemy_collision(state, attacker, victim);
            }
            return;
        }

        let dx = (a.x - v.x).abs();
        let dy = (a.y - v.y).abs();

        if (dx - dy).abs() < self.epsilon {
            mode.on_enemy_collision(state, attacker, victim);
            mode.on_enemy_collision(state, victim, attacker);
        } else if (dx > dy && a_dir.is_horizontal()) || (dy > dx && a_dir.is_vertical()) {
            mode.on_enemy_collision(state, attacker, victim);
        }
    }

    // =========================================================================
    // PHASE B: FILLED WALLS
    // =========================================================================

    /// Eliminate stationary entities sitting on a wall cell.
    pub fn wall_collisions(&self, state: &mut MatchState, mode: &dyn GameMode) {
        let crushed: Vec<EntityId> = state
            .entities
            .values()
            .filter(|e| !e.dead && e.direction.curr == Direction::None)
            .filter(|e| {
                let (gx, gy) = e.grid_cell(self.cell_size);
                state.board.get(gx, gy).is_some_and(Tile::is_wall)
            })
            .map(|e| e.id)
            .collect();

        for id in crushed {
            mode.on_new_wall_collision(state, id);
        }
    }

    // =========================================================================
    // PHASE C: MOVEMENT
    // =========================================================================

    /// Commit directions and advance or stop every live entity.
    pub fn movement(&self, state: &mut MatchState, dt: Duration, interval: Duration) {
        let step = self.step(dt, interval);
        let MatchState { board, entities, .. } = state;

        for entity in entities.values_mut() {
            if entity.dead {
                continue;
            }

            entity.update_dir();
            let direction = entity.direction.curr;
            if direction == Direction::None {
                continue;
            }

            if self.is_free(board, entity, step) && !self.is_stop(board, entity, step) {
                entity.x += direction.dx() * step;
                entity.y += direction.dy() * step;
            } else {
                entity.stop(false, self.cell_size);
            }
        }
    }

    /// Can the entity take one step without its leading edge leaving the
    /// board or entering a wall?
    pub fn is_free(&self, board: &Board, entity: &Entity, step: f64) -> bool {
        let (nx, ny) = entity.projected(step);
        let far = entity.size;

        let corners = match entity.direction.curr {
            Direction::None => return true,
            Direction::East => [(nx + far, ny), (nx + far, ny + far)],
            Direction::West => [(nx, ny), (nx, ny + far)],
            Direction::South => [(nx, ny + far), (nx + far, ny + far)],
            Direction::North => [(nx, ny), (nx + far, ny)],
        };

        corners.iter().all(|&(px, py)| {
            board.in_bounds(px, py, self.cell_size)
                && self.is_tile_open(board, self.to_cell(px), self.to_cell(py))
        })
    }

    /// Does a stop tile ahead catch the entity on this step?
    ///
    /// Fires once per approach: the position test only passes on the step
    /// that reaches the stop tile's anchor.
    pub fn is_stop(&self, board: &Board, entity: &Entity, step: f64) -> bool {
        let cell = self.cell_size;
        let half = entity.size / 2.0;
        let (x, y) = (entity.x, entity.y);

        let (tx, ty, reached) = match entity.direction.curr {
            Direction::None => return false,
            Direction::East => {
                let k = (x / cell).floor() + 1.0;
                (k, ((y + half) / cell).floor(), x + step >= k * cell)
            }
            Direction::West => {
                let k = (x / cell).ceil() - 1.0;
                (k, ((y + half) / cell).floor(), x - step <= k * cell)
            }
            Direction::South => {
                let k = (y / cell).floor() + 1.0;
                (((x + half) / cell).floor(), k, y + step >= k * cell)
            }
            Direction::North => {
                let k = (y / cell).ceil() - 1.0;
                (((x + half) / cell).floor(), k, y - step <= k * cell)
            }
        };

        reached && board.get(tx as i64, ty as i64).is_some_and(Tile::is_stop)
    }

    /// Is the grid cell on the board and not a wall?
    #[inline]
    pub fn is_tile_open(&self, board: &Board, x: i64, y: i64) -> bool {
        board.get(x, y).is_some_and(|t| !t.is_wall())
    }

    #[inline]
    fn to_cell(&self, p: f64) -> i64 {
        (p / self.cell_size).floor() as i64
    }
}

// =============================================================================
// TESTS
// =============================================================================
