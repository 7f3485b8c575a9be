//! Authoritative Simulation Tick
//!
//! [`Game`] owns one match and advances it with [`Game::game_tick`]. Every
//! tick runs the same ordered phases:
//!
//! ```text
//! collisions -> fill -> sweep -> entity ticks -> movement -> new walls -> sweep
//! ```
//!
//! Removal happens only at the two sweeps, so every phase in between sees a
//! consistent world. Given the same board, configuration, seed and move
//! requests, two games produce identical hashes.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Serialize, Deserialize};
use tracing::{debug, info};

use crate::core::hash::StateHash;
use crate::game::board::Board;
use crate::game::collision::CollisionManager;
use crate::game::config::GameConfig;
use crate::game::direction::Direction;
use crate::game::entity::{tick_entity, Entity, EntityId, EntityKind, EntitySnapshot, Team};
use crate::game::events::GameEvent;
use crate::game::filler::WallFiller;
use crate::game::mode::{GameMode, TeamElimination};
use crate::game::state::{MatchPhase, MatchState};
use crate::game::tile::Tile;

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this tick
    pub events: Vec<GameEvent>,
    /// Entities removed by this tick's sweeps
    pub removed: Vec<EntityId>,
    /// Whether the match is over
    pub match_ended: bool,
}

/// Full state for a joining client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Ticks run so far.
    pub tick: u32,
    /// Match phase.
    pub state: MatchPhase,
    /// The match's board.
    pub board: Board,
    /// Live entities keyed by id.
    pub entities: BTreeMap<EntityId, EntitySnapshot>,
    /// Cells filled since the last entities update.
    pub filling_updates: Vec<Tile>,
    /// Winners, once finished.
    pub winners: Option<Vec<EntitySnapshot>>,
}

impl GameSnapshot {
    /// Serialize to binary (bincode).
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Deserialize from binary (bincode).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}

/// Incremental per-tick update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitiesUpdate {
    /// Tick this update follows.
    pub tick: u32,
    /// Live entities keyed by id.
    pub entities: BTreeMap<EntityId, EntitySnapshot>,
    /// Cells filled since the previous update.
    pub filling_updates: Vec<Tile>,
}

/// One match.
pub struct Game {
    config: GameConfig,
    state: MatchState,
    collisions: CollisionManager,
    mode: Box<dyn GameMode>,
    filler: Option<WallFiller>,
}

impl Game {
    /// Create a game on its own copy of `board`, using team elimination.
    pub fn new(board: &Board, config: GameConfig) -> Self {
        Self {
            state: MatchState::new(board.clone(), config.rng_seed),
            collisions: CollisionManager::new(&config),
            mode: Box::new(TeamElimination),
            filler: None,
            config,
        }
    }

    /// Replace the game mode.
    pub fn with_mode(mut self, mode: impl GameMode + 'static) -> Self {
        self.mode = Box::new(mode);
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Read-only match state.
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Name of the active game mode.
    pub fn mode_name(&self) -> &'static str {
        self.mode.name()
    }

    // =========================================================================
    // ENTITIES
    // =========================================================================

    /// Place an entity at pixel coordinates.
    pub fn add_entity(&mut self, kind: EntityKind, x: f64, y: f64, team: Team) -> EntityId {
        self.state.add_entity(kind, x, y, self.config.entity_size, team)
    }

    /// Place a player on a spawn point. `None` if the board has no such spawn.
    pub fn spawn_player(&mut self, name: impl Into<String>, spawn_index: u32) -> Option<EntityId> {
        self.spawn(EntityKind::Player { name: name.into() }, spawn_index)
    }

    /// Place a bot on a spawn point. `None` if the board has no such spawn.
    pub fn spawn_bot(&mut self, name: impl Into<String>, spawn_index: u32) -> Option<EntityId> {
        let kind = EntityKind::SimpleBot {
            name: name.into(),
            dir_from: Direction::None,
            decision_ticks: 0,
        };
        self.spawn(kind, spawn_index)
    }

    fn spawn(&mut self, kind: EntityKind, spawn_index: u32) -> Option<EntityId> {
        let (x, y) = self.state.board.spawn_anchor(spawn_index, self.config.cell_size)?;
        let team = self.config.team_for_spawn(spawn_index);
        Some(self.add_entity(kind, x, y, team))
    }

    /// Request a move. Unknown ids and non-idle entities are ignored.
    pub fn move_entity(&mut self, id: EntityId, direction: Direction) -> bool {
        let Some(entity) = self.state.get_entity_mut(id) else {
            debug!("Move for unknown entity {} ignored", id);
            return false;
        };

        let accepted = entity.request_move(direction);
        if !accepted {
            debug!("Entity {} busy, move {:?} dropped", id, direction);
        }
        accepted
    }

    /// Entity by id.
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.state.get_entity(id)
    }

    /// Is the entity still on the board?
    pub fn contains(&self, id: EntityId) -> bool {
        self.state.entities.contains_key(&id)
    }

    /// Entities on the board.
    pub fn entity_count(&self) -> usize {
        self.state.entities.len()
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Move to in-progress. Called by the first tick if not done earlier.
    pub fn start(&mut self) {
        if self.state.phase != MatchPhase::NotStarted {
            return;
        }
        self.state.phase = MatchPhase::InProgress;
        info!(
            "Match started: {} entities, mode {}, board {}x{}",
            self.state.entities.len(),
            self.mode.name(),
            self.state.board.width,
            self.state.board.height
        );
        self.state.push_event(GameEvent::match_started(self.state.tick));
    }

    /// Start the closing walls. Idempotent.
    pub fn init_fill(&mut self) {
        if self.filler.is_none() {
            debug!("Closing walls from tick {}", self.state.tick);
            self.filler = Some(WallFiller::new(&self.state.board, self.config.fill_cadence));
        }
    }

    /// Finish the match with the given winners.
    pub fn end(&mut self, winners: &[EntityId]) {
        self.state.end(winners);
    }

    /// Has a game mode ended the match?
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Serialized winners, once finished.
    pub fn winners(&self) -> Option<&[EntitySnapshot]> {
        self.state.winners.as_deref()
    }

    /// Current tick number.
    pub fn current_tick(&self) -> u32 {
        self.state.tick
    }

    /// Hash of the current state.
    pub fn compute_hash(&self) -> StateHash {
        self.state.compute_hash()
    }

    // =========================================================================
    // TICK
    // =========================================================================

    /// Advance one tick at exactly the configured interval.
    pub fn tick(&mut self) -> TickResult {
        let interval = self.config.tick_interval();
        self.game_tick(interval, interval)
    }

    /// Advance one tick. `dt / interval` scales the distance moved.
    pub fn game_tick(&mut self, dt: Duration, interval: Duration) -> TickResult {
        let mut result = TickResult::default();

        match self.state.phase {
            MatchPhase::Finished => {
                result.match_ended = true;
                return result;
            }
            MatchPhase::NotStarted => self.start(),
            MatchPhase::InProgress => {}
        }

        self.state.tick += 1;
        if self.config.fill_start_tick.is_some_and(|t| self.state.tick >= t) {
            self.init_fill();
        }

        // 1. Entity vs entity
        self.collisions.collisions(&mut self.state, self.mode.as_ref(), dt, interval);

        // 2. Closing walls
        if let Some(filler) = self.filler.as_mut() {
            filler.do_fill(&mut self.state.board);
        }

        // 3. Remove the dead, then per-entity behaviour
        result.removed.extend(self.state.sweep_dead());
        self.tick_entities();

        // 4. Movement and freshly filled walls
        self.collisions.movement(&mut self.state, dt, interval);
        self.collisions.wall_collisions(&mut self.state, self.mode.as_ref());
        result.removed.extend(self.state.sweep_dead());

        if self.state.is_finished() {
            let winners: Vec<EntityId> = self
                .winners()
                .map(|w| w.iter().map(|e| e.id).collect())
                .unwrap_or_default();
            info!("Match ended at tick {}: winners {:?}", self.state.tick, winners);
            self.state.push_event(GameEvent::match_ended(self.state.tick, winners));
            result.match_ended = true;
        }

        result.events = self.state.take_events();
        result
    }

    fn tick_entities(&mut self) {
        let MatchState { board, entities, rng, .. } = &mut self.state;
        for entity in entities.values_mut() {
            tick_entity(entity, board, &self.collisions, &self.config, rng);
        }
    }

    // =========================================================================
    // SNAPSHOTS
    // =========================================================================

    fn entity_snapshots(&self) -> BTreeMap<EntityId, EntitySnapshot> {
        self.state
            .entities
            .iter()
            .map(|(id, e)| (*id, e.snapshot()))
            .collect()
    }

    /// Full state. Does not consume the fill log.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            tick: self.state.tick,
            state: self.state.phase,
            board: self.state.board.clone(),
            entities: self.entity_snapshots(),
            filling_updates: self
                .filler
                .as_ref()
                .map(|f| f.updates().to_vec())
                .unwrap_or_default(),
            winners: self.state.winners.clone(),
        }
    }

    /// Entities plus the cells filled since the previous call.
    pub fn entities_snapshot(&mut self) -> EntitiesUpdate {
        EntitiesUpdate {
            tick: self.state.tick,
            entities: self.entity_snapshots(),
            filling_updates: self
                .filler
                .as_mut()
                .map(WallFiller::take_updates)
                .unwrap_or_default(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::events::GameEventData;
    use crate::game::mode::LastStanding;

    fn game(rows: &[&str]) -> Game {
        let board = Board::from_rows(rows).unwrap();
        Game::new(&board, GameConfig::default())
    }

    fn run(game: &mut Game, ticks: u32) {
        for _ in 0..ticks {
            game.tick();
        }
    }

    #[test]
    fn test_diagonal_approach_eliminates_both() {
        let mut game = game(&["0...", "....", "....", "...1"]);
        let p0 = game.spawn_player("p0", 0).unwrap();
        let p1 = game.spawn_player("p1", 1).unwrap();
        assert_eq!(game.entity(p1).map(|e| (e.x, e.y)), Some((300.0, 300.0)));

        game.move_entity(p0, Direction::South);
        game.move_entity(p1, Direction::West);

        run(&mut game, 8);
        assert!(game.contains(p0) && game.contains(p1));

        let result = game.tick();
        assert_eq!(result.removed, vec![p0, p1]);
        assert!(game.is_finished());
        assert!(game.winners().unwrap().is_empty());
    }

    #[test]
    fn test_first_mover_is_eliminated() {
        let mut game = game(&["0...", ".1..", "....", "...."]);
        let p0 = game.spawn_player("p0", 0).unwrap();
        let p1 = game.spawn_player("p1", 1).unwrap();

        game.move_entity(p0, Direction::South);
        game.tick();
        game.move_entity(p1, Direction::West);
        run(&mut game, 2);

        assert!(!game.contains(p0));
        assert!(game.contains(p1));
        assert!(game.is_finished());
        assert_eq!(game.winners().unwrap()[0].id, p1);
    }

    #[test]
    fn test_head_on_teammates_come_to_rest() {
        let mut game = game(&["0.....2"]);
        let a = game.spawn_player("a", 0).unwrap();
        let b = game.spawn_player("b", 2).unwrap();
        assert_eq!(game.entity(a).unwrap().team, game.entity(b).unwrap().team);

        game.move_entity(a, Direction::East);
        game.move_entity(b, Direction::West);
        run(&mut game, 40);

        let (a, b) = (game.entity(a).unwrap(), game.entity(b).unwrap());
        assert!(a.is_idle() && b.is_idle());
        assert_eq!((a.x, a.y), (0.0, 0.0));
        assert_eq!((b.x, b.y), (600.0, 0.0));
        assert!(!game.is_finished());
    }

    #[test]
    fn test_last_team_standing_wins() {
        let mut game = game(&["0.1.", "....", "2...", "...."]);
        let a = game.spawn_player("a", 0).unwrap();
        let enemy = game.spawn_player("enemy", 1).unwrap();
        let c = game.spawn_player("c", 2).unwrap();

        game.move_entity(a, Direction::East);
        let mut ended = false;
        for _ in 0..10 {
            if game.tick().match_ended {
                ended = true;
                break;
            }
        }

        assert!(ended);
        assert!(!game.contains(enemy));
        let winners: Vec<EntityId> = game.winners().unwrap().iter().map(|w| w.id).collect();
        assert_eq!(winners, vec![a, c]);
    }

    #[test]
    fn test_finished_game_does_not_tick() {
        let mut game = game(&["0.1."]);
        game.spawn_player("a", 0).unwrap();
        game.end(&[]);

        let tick = game.current_tick();
        let result = game.tick();
        assert!(result.match_ended);
        assert_eq!(game.current_tick(), tick);
    }

    #[test]
    fn test_events_cover_the_match() {
        let mut game = game(&["0.1."]);
        let a = game.spawn_player("a", 0).unwrap();
        let b = game.spawn_player("b", 1).unwrap();
        game.move_entity(a, Direction::East);

        let mut events = Vec::new();
        while !game.is_finished() && game.current_tick() < 20 {
            events.extend(game.tick().events);
        }

        assert_eq!(events.first().map(|e| &e.data), Some(&GameEventData::MatchStarted));
        assert!(events.iter().any(|e| e.eliminated() == Some(b)));
        assert_eq!(
            events.last().map(|e| &e.data),
            Some(&GameEventData::MatchEnded { winners: vec![a] })
        );
    }

    #[test]
    fn test_move_unknown_entity_is_ignored() {
        let mut game = game(&["0..."]);
        assert!(!game.move_entity(42, Direction::East));

        let id = game.spawn_player("a", 0).unwrap();
        assert!(game.move_entity(id, Direction::East));
        assert!(!game.move_entity(id, Direction::West));
        assert!(game.spawn_player("ghost", 5).is_none());
    }

    #[test]
    fn test_fill_follows_spiral() {
        let board = Board::new(5, 3);
        let config = GameConfig { fill_cadence: 1, ..Default::default() };
        let mut game = Game::new(&board, config);
        game.init_fill();
        game.init_fill();

        run(&mut game, 14);

        let filled: Vec<(u32, u32)> = game
            .snapshot()
            .filling_updates
            .iter()
            .map(|t| (t.x, t.y))
            .collect();
        assert_eq!(
            filled,
            vec![
                (0, 0), (1, 0), (2, 0), (3, 0), (4, 0), (4, 1), (4, 2),
                (3, 2), (2, 2), (1, 2), (0, 2), (0, 1), (1, 1), (2, 1),
            ]
        );

        assert_eq!(game.entities_snapshot().filling_updates.len(), 14);
        assert!(game.entities_snapshot().filling_updates.is_empty());
    }

    #[test]
    fn test_closing_wall_crushes_parked_entity() {
        let board = Board::from_rows(&["0..", "...", "..1"]).unwrap();
        let config = GameConfig { fill_cadence: 1, fill_start_tick: Some(1), ..Default::default() };
        let mut game = Game::new(&board, config);
        let a = game.spawn_player("a", 0).unwrap();
        let b = game.spawn_player("b", 1).unwrap();

        let result = game.tick();

        assert_eq!(result.removed, vec![a]);
        assert!(game.contains(b));
        assert!(game.is_finished());
        assert_eq!(game.winners().unwrap()[0].id, b);
    }

    #[test]
    fn test_last_standing_mode() {
        let board = Board::from_rows(&["0.....2"]).unwrap();
        let mut game = Game::new(&board, GameConfig::default()).with_mode(LastStanding);
        assert_eq!(game.mode_name(), "last_standing");

        let a = game.spawn_player("a", 0).unwrap();
        let b = game.spawn_player("b", 2).unwrap();
        game.move_entity(a, Direction::East);
        game.move_entity(b, Direction::West);
        run(&mut game, 40);

        // No bounce between teammates: they pass through each other
        assert!(game.contains(a) && game.contains(b));
        assert_eq!(game.entity(a).unwrap().x, 600.0);
        assert_eq!(game.entity(b).unwrap().x, 0.0);
    }

    #[test]
    fn test_bots_are_deterministic() {
        let rows = ["0.#..", ".....", "#.x.#", ".....", "..#.1"];
        let board = Board::from_rows(&rows).unwrap();
        let config = GameConfig { rng_seed: 77, fill_start_tick: Some(150), ..Default::default() };

        let mut games: Vec<Game> = (0..2)
            .map(|_| {
                let mut game = Game::new(&board, config.clone());
                game.spawn_bot("b0", 0).unwrap();
                game.spawn_bot("b1", 1).unwrap();
                game
            })
            .collect();

        for _ in 0..300 {
            for game in games.iter_mut() {
                game.tick();
            }
            assert_eq!(games[0].compute_hash(), games[1].compute_hash());
        }
    }

    #[test]
    fn test_snapshot_binary_form() {
        let mut game = game(&["0.1."]);
        game.spawn_player("a", 0).unwrap();
        game.spawn_bot("b", 1).unwrap();
        game.tick();

        let snapshot = game.snapshot();
        let decoded = GameSnapshot::from_bytes(&snapshot.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded.entities, snapshot.entities);
        assert_eq!(decoded.board.tiles, snapshot.board.tiles);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("fillingUpdates").is_some());
        assert_eq!(json["entities"]["0"]["type"], "Player");
    }
}
