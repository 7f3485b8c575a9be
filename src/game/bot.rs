//! Simple Bot
//!
//! Maze walking without pathfinding: when idle for a few ticks, pick a random
//! open neighbour, never the one it just came from unless cornered.

use crate::core::rng::DeterministicRng;
use crate::game::board::Board;
use crate::game::collision::CollisionManager;
use crate::game::direction::Direction;
use crate::game::entity::{Entity, EntityKind};

/// Run one decision step for a bot. No-op for other kinds.
pub fn decide(
    entity: &mut Entity,
    board: &Board,
    collisions: &CollisionManager,
    decision_delay: u32,
    rng: &mut DeterministicRng,
) {
    let idle = entity.is_idle();
    let (gx, gy) = entity.grid_cell(collisions.cell_size());

    let EntityKind::SimpleBot { dir_from, decision_ticks, .. } = &mut entity.kind else {
        return;
    };

    if !idle {
        *decision_ticks = 0;
        return;
    }

    *decision_ticks += 1;
    if *decision_ticks < decision_delay {
        return;
    }
    *decision_ticks = 0;

    let options: Vec<Direction> = Direction::CARDINALS
        .iter()
        .copied()
        .filter(|d| *d != *dir_from)
        .filter(|d| {
            let (dx, dy) = d.vector();
            collisions.is_tile_open(board, gx + dx as i64, gy + dy as i64)
        })
        .collect();

    let choice = match rng.choose(&options) {
        Some(d) => *d,
        // Cornered: go back the way it came
        None => *dir_from,
    };

    if choice == Direction::None {
        return;
    }

    *dir_from = choice.opposite();
    entity.request_move(choice);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::GameConfig;
    use crate::game::entity::Team;

    fn bot_at(x: f64, y: f64, dir_from: Direction) -> Entity {
        Entity::new(
            1,
            x,
            y,
            99.0,
            Team(0),
            EntityKind::SimpleBot { name: "bot".into(), dir_from, decision_ticks: 0 },
        )
    }

    fn dir_from(entity: &Entity) -> Direction {
        match entity.kind {
            EntityKind::SimpleBot { dir_from, .. } => dir_from,
            _ => Direction::None,
        }
    }

    #[test]
    fn test_waits_for_delay() {
        let board = Board::from_rows(&["...", "...", "..."]).unwrap();
        let collisions = CollisionManager::new(&GameConfig::default());
        let mut rng = DeterministicRng::new(1);
        let mut bot = bot_at(100.0, 100.0, Direction::None);

        decide(&mut bot, &board, &collisions, 3, &mut rng);
        decide(&mut bot, &board, &collisions, 3, &mut rng);
        assert_eq!(bot.direction.next, Direction::None);

        decide(&mut bot, &board, &collisions, 3, &mut rng);
        assert_ne!(bot.direction.next, Direction::None);
    }

    #[test]
    fn test_corridor_continues_forward() {
        // Walls above and below; came from the west, so east is the only option.
        let board = Board::from_rows(&["###", "...", "###"]).unwrap();
        let collisions = CollisionManager::new(&GameConfig::default());
        let mut rng = DeterministicRng::new(2);
        let mut bot = bot_at(100.0, 100.0, Direction::West);

        decide(&mut bot, &board, &collisions, 1, &mut rng);

        assert_eq!(bot.direction.next, Direction::East);
        assert_eq!(dir_from(&bot), Direction::West);
    }

    #[test]
    fn test_dead_end_reverses() {
        let board = Board::from_rows(&["###", "..#", "###"]).unwrap();
        let collisions = CollisionManager::new(&GameConfig::default());
        let mut rng = DeterministicRng::new(3);
        let mut bot = bot_at(100.0, 100.0, Direction::West);

        decide(&mut bot, &board, &collisions, 1, &mut rng);

        assert_eq!(bot.direction.next, Direction::West);
        assert_eq!(dir_from(&bot), Direction::East);
    }

    #[test]
    fn test_never_picks_walls_or_edges() {
        let board = Board::from_rows(&[".#", ".."]).unwrap();
        let collisions = CollisionManager::new(&GameConfig::default());

        for seed in 0..50 {
            let mut rng = DeterministicRng::new(seed);
            let mut bot = bot_at(0.0, 0.0, Direction::None);
            decide(&mut bot, &board, &collisions, 1, &mut rng);
            assert_eq!(bot.direction.next, Direction::South);
        }
    }

    #[test]
    fn test_ignores_players() {
        let board = Board::new(3, 3);
        let collisions = CollisionManager::new(&GameConfig::default());
        let mut rng = DeterministicRng::new(4);
        let mut player = Entity::new(1, 100.0, 100.0, 99.0, Team(0), EntityKind::Player { name: "p".into() });

        decide(&mut player, &board, &collisions, 1, &mut rng);
        assert!(player.is_idle());
    }
}
