//! Network Layer
//!
//! Message types and the per-match driver that connects a transport to a
//! [`Game`](crate::game::Game). This layer is **non-deterministic**: wall
//! clock timing lives here, all game logic runs through `game/`.

pub mod protocol;
pub mod session;

pub use protocol::{ClientMessage, ServerMessage};
pub use session::{run_session, MatchSession, SessionCommand, SessionConfig, SessionError};
