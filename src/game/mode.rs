//! Game Modes
//!
//! Win-condition and collision-outcome policy. The collision manager only talks
//! to a mode through [`GameMode`], so alternative rules drop in without
//! touching the simulation.

use tracing::debug;

use crate::game::entity::EntityId;
use crate::game::events::EliminationCause;
use crate::game::state::MatchState;

/// Collision-outcome and win-condition policy.
pub trait GameMode: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// May two teammates bounce off each other? `false` vetoes the bounce.
    fn on_team_collision(&self, state: &MatchState, a: EntityId, b: EntityId) -> bool;

    /// `attacker` beat `victim` in an enemy collision.
    fn on_enemy_collision(&self, state: &mut MatchState, attacker: EntityId, victim: EntityId);

    /// A closing wall landed on `entity`.
    fn on_new_wall_collision(&self, state: &mut MatchState, entity: EntityId);
}

/// Last team standing wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct TeamElimination;

impl GameMode for TeamElimination {
    fn name(&self) -> &'static str {
        "team_elimination"
    }

    fn on_team_collision(&self, _state: &MatchState, _a: EntityId, _b: EntityId) -> bool {
        true
    }

    fn on_enemy_collision(&self, state: &mut MatchState, attacker: EntityId, victim: EntityId) {
        state.eliminate(victim, EliminationCause::Enemy { by: attacker });
        check_team_end(state);
    }

    fn on_new_wall_collision(&self, state: &mut MatchState, entity: EntityId) {
        state.eliminate(entity, EliminationCause::Wall);
        check_team_end(state);
    }
}

/// Free-for-all: teammates never bounce and the match ends when at most one
/// entity is left, whatever the teams.
#[derive(Debug, Clone, Copy, Default)]
pub struct LastStanding;

impl GameMode for LastStanding {
    fn name(&self) -> &'static str {
        "last_standing"
    }

    fn on_team_collision(&self, _state: &MatchState, _a: EntityId, _b: EntityId) -> bool {
        false
    }

    fn on_enemy_collision(&self, state: &mut MatchState, attacker: EntityId, victim: EntityId) {
        state.eliminate(victim, EliminationCause::Enemy { by: attacker });
        check_last_standing(state);
    }

    fn on_new_wall_collision(&self, state: &mut MatchState, entity: EntityId) {
        state.eliminate(entity, EliminationCause::Wall);
        check_last_standing(state);
    }
}

/// End with no winners if nobody is left, or with the survivors if they all
/// share a team.
pub fn check_team_end(state: &mut MatchState) {
    let survivors: Vec<_> = state.survivors().map(|e| (e.id, e.team)).collect();

    let Some(&(_, team)) = survivors.first() else {
        debug!("No survivors left");
        state.end(&[]);
        return;
    };

    if survivors.iter().all(|(_, t)| *t == team) {
        let ids: Vec<EntityId> = survivors.iter().map(|(id, _)| *id).collect();
        debug!("Team {} is the last one standing", team.0);
        state.end(&ids);
    }
}

/// End once at most one entity is left.
pub fn check_last_standing(state: &mut MatchState) {
    let survivors: Vec<EntityId> = state.survivors().map(|e| e.id).collect();
    if survivors.len() <= 1 {
        state.end(&survivors);
    }
}
