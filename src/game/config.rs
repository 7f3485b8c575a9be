//! Match Configuration
//!
//! Immutable tuning values handed to a [`Game`](crate::game::tick::Game) at
//! construction and read by the collision manager and entities.

use std::time::Duration;

use serde::{Serialize, Deserialize};

use crate::game::entity::Team;

/// Every team id must fit in [`Team`].
pub const MAX_TEAMS: usize = u8::MAX as usize + 1;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration text could not be parsed.
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// Cell size must be positive.
    #[error("Cell size must be positive, got {0}")]
    InvalidCellSize(f64),

    /// Entity footprint must fit inside one cell.
    #[error("Entity size {size} must be in (0, {cell_size})")]
    InvalidEntitySize {
        /// Configured footprint.
        size: f64,
        /// Configured cell size.
        cell_size: f64,
    },

    /// Speed must be positive and below one cell per tick.
    #[error("Speed {speed} must be in (0, {cell_size})")]
    InvalidSpeed {
        /// Configured speed.
        speed: f64,
        /// Configured cell size.
        cell_size: f64,
    },

    /// At least one team is required.
    #[error("At least one team is required")]
    NoTeams,

    /// Team ids are a single byte.
    #[error("At most {max} teams are supported, got {found}")]
    TooManyTeams {
        /// Configured team count.
        found: usize,
        /// Largest supported team count.
        max: usize,
    },

    /// Zero values that are used as divisors or periods.
    #[error("{0} must be non-zero")]
    Zero(&'static str),
}

/// Configuration for one match.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Pixel width/height of one grid cell.
    pub cell_size: f64,
    /// Entity footprint, slightly less than a cell.
    pub entity_size: f64,
    /// Pixels moved per target tick interval.
    pub speed: f64,
    /// Tolerance for "equal" approach deltas in perpendicular enemy collisions.
    pub collision_epsilon: f64,
    /// Ticks an entity may stand still before a random move is forced.
    pub idle_timeout_ticks: u32,
    /// Target tick interval in milliseconds.
    pub tick_interval_ms: u64,
    /// Filler calls per converted wall cell.
    pub fill_cadence: u32,
    /// Tick at which the closing walls start, if ever.
    pub fill_start_tick: Option<u32>,
    /// Idle ticks a bot waits before choosing a new direction.
    pub bot_decision_delay: u32,
    /// Team names; spawn indices are assigned to teams round-robin.
    pub teams: Vec<String>,
    /// Seed for idle moves and bot decisions.
    pub rng_seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cell_size: 100.0,
            entity_size: 99.0,
            speed: 25.0,
            collision_epsilon: 5.0,
            idle_timeout_ticks: 100, // 5 seconds @ 20Hz
            tick_interval_ms: 50,
            fill_cadence: 10,
            fill_start_tick: None,
            bot_decision_delay: 3,
            teams: vec!["red".to_string(), "blue".to_string()],
            rng_seed: 0,
        }
    }
}

impl GameConfig {
    /// Parse a JSON configuration; missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.cell_size > 0.0) {
            return Err(ConfigError::InvalidCellSize(self.cell_size));
        }
        if !(self.entity_size > 0.0 && self.entity_size < self.cell_size) {
            return Err(ConfigError::InvalidEntitySize {
                size: self.entity_size,
                cell_size: self.cell_size,
            });
        }
        if !(self.speed > 0.0 && self.speed < self.cell_size) {
            return Err(ConfigError::InvalidSpeed {
                speed: self.speed,
                cell_size: self.cell_size,
            });
        }
        if self.teams.is_empty() {
            return Err(ConfigError::NoTeams);
        }
        if self.teams.len() > MAX_TEAMS {
            return Err(ConfigError::TooManyTeams {
                found: self.teams.len(),
                max: MAX_TEAMS,
            });
        }
        if self.fill_cadence == 0 {
            return Err(ConfigError::Zero("fill_cadence"));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Zero("tick_interval_ms"));
        }
        Ok(())
    }

    /// Target tick interval.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Team assigned to a spawn index. Assumes a validated team count.
    pub fn team_for_spawn(&self, spawn_index: u32) -> Team {
        let count = self.teams.len().max(1) as u32;
        Team((spawn_index % count) as u8)
    }

    /// Display name of a team.
    pub fn team_name(&self, team: Team) -> &str {
        self.teams
            .get(team.0 as usize)
            .map(String::as_str)
            .unwrap_or("unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = GameConfig::from_json(r#"{ "speed": 20.0, "fill_start_tick": 600 }"#).unwrap();
        assert_eq!(config.speed, 20.0);
        assert_eq!(config.fill_start_tick, Some(600));
        assert_eq!(config.cell_size, 100.0);
    }

    #[test]
    fn test_rejects_oversized_entity() {
        let result = GameConfig::from_json(r#"{ "entity_size": 100.0 }"#);
        assert!(matches!(result, Err(ConfigError::InvalidEntitySize { .. })));
    }

    #[test]
    fn test_rejects_bad_json() {
        assert!(matches!(GameConfig::from_json("{ speed"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_team_count_fits_team_ids() {
        let mut config = GameConfig {
            teams: (0..MAX_TEAMS).map(|i| format!("t{}", i)).collect(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.team_for_spawn(255), Team(255));

        config.teams.push("one too many".into());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooManyTeams { found: 257, max: 256 })
        ));
    }

    #[test]
    fn test_team_rotation() {
        let config = GameConfig::default();
        assert_eq!(config.team_for_spawn(0), Team(0));
        assert_eq!(config.team_for_spawn(1), Team(1));
        assert_eq!(config.team_for_spawn(2), Team(0));
        assert_eq!(config.team_name(Team(1)), "blue");
        assert_eq!(config.team_name(Team(9)), "unknown");
    }
}
