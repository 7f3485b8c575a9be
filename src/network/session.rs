//! Match Session Management
//!
//! Couples one [`Game`] to the outside world. Move requests are queued and
//! applied strictly between ticks; [`run_session`] drives the ticks from a
//! tokio interval and fans the resulting messages out over a broadcast
//! channel.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::game::config::GameConfig;
use crate::game::direction::Direction;
use crate::game::entity::EntityId;
use crate::game::tick::{Game, GameSnapshot};
use crate::network::protocol::{ClientMessage, ServerMessage};

/// Configuration for a match session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Target tick interval.
    pub tick_interval: Duration,
    /// Capacity of the command channel.
    pub command_capacity: usize,
    /// Capacity of the broadcast channel.
    pub broadcast_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(50), // 20Hz
            command_capacity: 256,
            broadcast_capacity: 64,
        }
    }
}

impl SessionConfig {
    /// Session settings matching a game's tick interval.
    pub fn for_game(config: &GameConfig) -> Self {
        Self {
            tick_interval: config.tick_interval(),
            ..Default::default()
        }
    }
}

/// Commands accepted by [`run_session`].
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// Queue a move for the next tick.
    Move {
        /// Entity to move.
        id: EntityId,
        /// Requested direction.
        direction: Direction,
    },
    /// Start the closing walls now.
    StartClosingWalls,
    /// Stop ticking and hand the session back.
    Shutdown,
}

/// Session errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No such entity in the match.
    #[error("Entity {0} not found")]
    EntityNotFound(EntityId),

    /// Match already over.
    #[error("Match finished")]
    MatchFinished,

    /// Command channel closed.
    #[error("Session closed")]
    Closed,
}

/// A match session.
pub struct MatchSession {
    game: Game,
    pending_moves: Vec<(EntityId, Direction)>,
}

impl MatchSession {
    /// Wrap a game.
    pub fn new(game: Game) -> Self {
        Self {
            game,
            pending_moves: Vec::new(),
        }
    }

    /// The game being driven.
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Mutable access to the game, for setup between ticks.
    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    /// Queue a move for the next tick.
    pub fn queue_move(&mut self, id: EntityId, direction: Direction) -> Result<(), SessionError> {
        if self.game.is_finished() {
            return Err(SessionError::MatchFinished);
        }
        if !self.game.contains(id) {
            return Err(SessionError::EntityNotFound(id));
        }
        if direction != Direction::None {
            self.pending_moves.push((id, direction));
        }
        Ok(())
    }

    /// Moves waiting for the next tick.
    pub fn pending_moves(&self) -> usize {
        self.pending_moves.len()
    }

    /// Handle a client message; returns the direct reply, if any.
    pub fn handle_client_message(&mut self, message: ClientMessage) -> Option<ServerMessage> {
        match message {
            ClientMessage::Move { id, direction } => {
                let direction = Direction::from_tag(&direction);
                self.queue_move(id, direction)
                    .err()
                    .map(|e| ServerMessage::Error { message: e.to_string() })
            }
            ClientMessage::Ping { timestamp } => Some(ServerMessage::Pong { timestamp }),
        }
    }

    /// Apply queued moves, run one tick and return the messages to broadcast.
    pub fn run_tick(&mut self, dt: Duration) -> Vec<ServerMessage> {
        if self.game.is_finished() {
            return Vec::new();
        }

        for (id, direction) in self.pending_moves.drain(..) {
            self.game.move_entity(id, direction);
        }

        let interval = self.game.config().tick_interval();
        let result = self.game.game_tick(dt, interval);

        let mut messages = vec![ServerMessage::Update(self.game.entities_snapshot())];
        if result.match_ended {
            messages.push(ServerMessage::MatchEnded {
                tick: self.game.current_tick(),
                winners: self.game.winners().map(<[_]>::to_vec).unwrap_or_default(),
            });
        }
        messages
    }

    /// Full state for a joining client.
    pub fn initial_snapshot(&self) -> GameSnapshot {
        self.game.snapshot()
    }

    /// Is the match over?
    pub fn is_finished(&self) -> bool {
        self.game.is_finished()
    }
}

/// Drive a session until the match ends or it is told to stop.
///
/// Moves arriving on `commands` are queued and only applied at the start of
/// the next tick. Elapsed time between ticks scales movement, so a late tick
/// catches up instead of being replayed.
pub async fn run_session(
    mut session: MatchSession,
    config: SessionConfig,
    mut commands: mpsc::Receiver<SessionCommand>,
    updates: broadcast::Sender<ServerMessage>,
) -> MatchSession {
    let period = config.tick_interval;
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_tick = Instant::now();

    // No subscribers is fine; clients may join later via a snapshot.
    let _ = updates.send(ServerMessage::Snapshot(session.initial_snapshot()));

    loop {
        tokio::select! {
            now = ticker.tick() => {
                let dt = now.duration_since(last_tick);
                last_tick = now;

                for message in session.run_tick(dt) {
                    let _ = updates.send(message);
                }

                if session.is_finished() {
                    info!("Session finished at tick {}", session.game().current_tick());
                    break;
                }
            }
            command = commands.recv() => {
                match command {
                    Some(SessionCommand::Move { id, direction }) => {
                        if let Err(e) = session.queue_move(id, direction) {
                            debug!("Rejected move for {}: {}", id, e);
                        }
                    }
                    Some(SessionCommand::StartClosingWalls) => {
                        session.game_mut().init_fill();
                    }
                    Some(SessionCommand::Shutdown) => {
                        info!("Session shut down at tick {}", session.game().current_tick());
                        break;
                    }
                    None => {
                        warn!("{}, stopping", SessionError::Closed);
                        break;
                    }
                }
            }
        }
    }

    session
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::Board;

    fn create_test_session(rows: &[&str], spawns: u32) -> (MatchSession, Vec<EntityId>) {
        let board = Board::from_rows(rows).unwrap();
        let mut game = Game::new(&board, GameConfig::default());
        let ids = (0..spawns)
            .map(|i| game.spawn_player(format!("p{}", i), i).unwrap())
            .collect();
        (MatchSession::new(game), ids)
    }

    #[test]
    fn test_moves_wait_for_tick() {
        let (mut session, ids) = create_test_session(&["0...."], 1);
        let tick = session.game().config().tick_interval();

        session.queue_move(ids[0], Direction::East).unwrap();
        assert_eq!(session.pending_moves(), 1);
        assert!(session.game().entity(ids[0]).unwrap().is_idle());

        let messages = session.run_tick(tick);
        assert_eq!(session.pending_moves(), 0);
        assert_eq!(messages.len(), 1);

        match &messages[0] {
            ServerMessage::Update(update) => {
                assert_eq!(update.tick, 1);
                assert_eq!(update.entities[&ids[0]].x, 25.0);
            }
            other => panic!("Unexpected message {:?}", other),
        }
    }

    #[test]
    fn test_queue_move_errors() {
        let (mut session, ids) = create_test_session(&["0.1."], 2);

        assert_eq!(session.queue_move(9, Direction::East), Err(SessionError::EntityNotFound(9)));

        session.game_mut().end(&[ids[0]]);
        assert_eq!(session.queue_move(ids[0], Direction::East), Err(SessionError::MatchFinished));
        assert!(session.run_tick(Duration::from_millis(50)).is_empty());
    }

    #[test]
    fn test_client_messages() {
        let (mut session, ids) = create_test_session(&["0..."], 1);

        let reply = session.handle_client_message(ClientMessage::Ping { timestamp: 7 });
        assert_eq!(reply, Some(ServerMessage::Pong { timestamp: 7 }));

        let reply = session.handle_client_message(ClientMessage::Move {
            id: ids[0],
            direction: "EAST".into(),
        });
        assert_eq!(reply, None);
        assert_eq!(session.pending_moves(), 1);

        let reply = session.handle_client_message(ClientMessage::Move { id: 4, direction: "EAST".into() });
        assert_eq!(reply, Some(ServerMessage::Error { message: "Entity 4 not found".into() }));
    }

    #[test]
    fn test_match_end_is_announced() {
        let (mut session, ids) = create_test_session(&["0.1."], 2);
        let tick = Duration::from_millis(50);
        session.queue_move(ids[0], Direction::East).unwrap();

        let mut ended = None;
        for _ in 0..10 {
            if let Some(msg) = session
                .run_tick(tick)
                .into_iter()
                .find(|m| matches!(m, ServerMessage::MatchEnded { .. }))
            {
                ended = Some(msg);
                break;
            }
        }

        match ended {
            Some(ServerMessage::MatchEnded { winners, .. }) => {
                assert_eq!(winners.len(), 1);
                assert_eq!(winners[0].id, ids[0]);
            }
            other => panic!("Match did not end: {:?}", other),
        }
        assert!(session.is_finished());
    }

    #[tokio::test]
    async fn test_run_session() {
        let (session, ids) = create_test_session(&["0...."], 1);
        let config = SessionConfig {
            tick_interval: Duration::from_millis(5),
            ..Default::default()
        };
        let (cmd_tx, cmd_rx) = mpsc::channel(config.command_capacity);
        let (update_tx, mut update_rx) = broadcast::channel(config.broadcast_capacity);

        let handle = tokio::spawn(run_session(session, config, cmd_rx, update_tx));
        cmd_tx
            .send(SessionCommand::Move { id: ids[0], direction: Direction::East })
            .await
            .unwrap();

        let moved = tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                match update_rx.recv().await {
                    Ok(ServerMessage::Update(update))
                        if update.entities.get(&ids[0]).is_some_and(|e| e.x > 0.0) =>
                    {
                        return true;
                    }
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => return false,
                }
            }
        })
        .await;
        assert!(matches!(moved, Ok(true)));

        cmd_tx.send(SessionCommand::Shutdown).await.unwrap();
        let session = handle.await.unwrap();
        assert!(session.game().current_tick() > 0);
        assert!(!session.is_finished());
    }
}
