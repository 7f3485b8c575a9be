//! # Grid Arena Server
//!
//! Tick-driven simulation for a grid-based multiplayer arena: entities move
//! continuously over a tiled board, stop on stop tiles, bounce off teammates
//! and eliminate enemies until one team remains.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    GRID ARENA SERVER                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── hash.rs     - State hashing for verification            │
//! │                                                              │
//! │  game/           - Game logic (deterministic)                │
//! │  ├── board.rs    - Tile grid and spawn points                │
//! │  ├── entity.rs   - Players, bots, direction state machine    │
//! │  ├── collision.rs- Entity/wall/stop resolution, movement     │
//! │  ├── mode.rs     - Win conditions                            │
//! │  ├── filler.rs   - Closing walls                             │
//! │  └── tick.rs     - Authoritative simulation loop             │
//! │                                                              │
//! │  network/        - Match driver (non-deterministic)          │
//! │  ├── protocol.rs - Message types                             │
//! │  └── session.rs  - Move queue and tick scheduling            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! The `core/` and `game/` modules never read the clock:
//! - BTreeMap for entity iteration order
//! - All randomness from a seeded Xorshift128+
//! - Elapsed time enters only as the `dt` argument of a tick
//!
//! Given the same board, configuration, seed, move requests and `dt`
//! sequence, two games reach the same state hash.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod network;

// Re-export commonly used types
pub use core::rng::DeterministicRng;
pub use game::{Board, Direction, Game, GameConfig, GameMode, TickResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
