//! Grid Arena Server
//!
//! Runs a demo match with two scripted players and two bots, then replays it
//! with the same seed to check the final state hash.
//!
//! Usage: `grid-arena-server [config.json]`

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use grid_arena::{
    VERSION,
    game::{
        events::{EliminationCause, GameEventData},
        Board, Direction, Game, GameConfig,
    },
};

/// Upper bound on demo length.
const MAX_TICKS: u32 = 6000;

/// Ticks between scripted player moves.
const SCRIPT_PERIOD: u32 = 12;

const DEMO_BOARD: [&str; 9] = [
    "0.......2",
    ".#.#.#.#.",
    "...x.....",
    ".#.#.#.#.",
    "....x....",
    ".#.#.#.#.",
    ".....x...",
    ".#.#.#.#.",
    "3.......1",
];

#[cfg(feature = "debug-tracing")]
const DEFAULT_FILTER: &str = "debug";
#[cfg(not(feature = "debug-tracing"))]
const DEFAULT_FILTER: &str = "info";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .init();

    info!("Grid Arena Server v{}", VERSION);

    let config = load_config()?;
    let board = Board::from_rows(&DEMO_BOARD).context("Invalid demo board")?;

    info!("Tick interval: {:?}", config.tick_interval());
    info!("RNG Seed: {}", config.rng_seed);

    let game = demo_match(&board, &config, true);
    let hash = game.compute_hash();

    info!("=== Match Results ===");
    info!("Ended at tick {} (finished: {})", game.current_tick(), game.is_finished());
    for winner in game.winners().unwrap_or_default() {
        info!(
            "Winner: {} (team {})",
            winner.name.as_deref().unwrap_or("?"),
            config.team_name(winner.team)
        );
    }
    info!("Final State Hash: {}", hex::encode(hash));

    info!("=== Verifying Determinism ===");
    let replay_hash = demo_match(&board, &config, false).compute_hash();
    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if hash == replay_hash {
        info!("DETERMINISM VERIFIED: Hashes match!");
    } else {
        anyhow::bail!("DETERMINISM FAILURE: Hashes differ!");
    }

    Ok(())
}

/// Configuration from the JSON file named on the command line, or the demo
/// defaults.
fn load_config() -> Result<GameConfig> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(GameConfig {
            rng_seed: 12345,
            fill_cadence: 4,
            fill_start_tick: Some(400),
            ..Default::default()
        });
    };

    let text = std::fs::read_to_string(&path).with_context(|| format!("Reading {}", path))?;
    let config = GameConfig::from_json(&text).with_context(|| format!("Parsing {}", path))?;
    info!("Loaded configuration from {}", path);
    Ok(config)
}

/// Play the demo match to completion (or `MAX_TICKS`).
fn demo_match(board: &Board, config: &GameConfig, log_events: bool) -> Game {
    let mut game = Game::new(board, config.clone());

    let players: Vec<_> = ["alice", "bob"]
        .iter()
        .zip(0..)
        .filter_map(|(name, spawn)| game.spawn_player(*name, spawn))
        .collect();
    for (name, spawn) in [("bot-1", 2), ("bot-2", 3)] {
        game.spawn_bot(name, spawn);
    }

    for t in 0..MAX_TICKS {
        if t % SCRIPT_PERIOD == 0 {
            for (i, id) in players.iter().enumerate() {
                let step = (t / SCRIPT_PERIOD) as usize + i;
                game.move_entity(*id, Direction::CARDINALS[step % Direction::CARDINALS.len()]);
            }
        }

        let result = game.tick();

        if log_events {
            for event in &result.events {
                if let GameEventData::EntityEliminated { id, cause, .. } = &event.data {
                    match cause {
                        EliminationCause::Enemy { by } => {
                            info!("Tick {}: entity {} eliminated by {}", event.tick, id, by)
                        }
                        EliminationCause::Wall => {
                            info!("Tick {}: entity {} crushed by a wall", event.tick, id)
                        }
                    }
                }
            }
        }

        if result.match_ended {
            break;
        }
    }

    game
}
