//! Named SSE events published after successful persists.

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dto::{
        bout::BoutView,
        sse::{RosterDeletedEvent, ServerEvent, StandingsUpdateEvent, SystemStatus},
    },
    engine::{Athlete, Team, bracket::Bracket, mat::Mat, standings::Pool},
    state::SharedState,
};

const EVENT_SYSTEM_STATUS: &str = "system.status";
const EVENT_BOUT_UPDATE: &str = "bout_update";
const EVENT_BOUT_FINISHED: &str = "bout_finished";
const EVENT_BOUT_DELETED: &str = "bout_deleted";
const EVENT_STANDINGS_UPDATE: &str = "standings_update";
const EVENT_MAT_UPDATE: &str = "mat_update";
const EVENT_BRACKET_UPDATE: &str = "bracket_update";
const EVENT_TEAM_UPDATE: &str = "team.updated";
const EVENT_TEAM_DELETED: &str = "team.deleted";
const EVENT_ATHLETE_UPDATE: &str = "athlete.updated";
const EVENT_ATHLETE_DELETED: &str = "athlete.deleted";

fn emit<T: Serialize>(state: &SharedState, event: &str, payload: &T) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize SSE payload"),
    }
}

/// Broadcast the degraded flag whenever it flips.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    emit(state, EVENT_SYSTEM_STATUS, &SystemStatus { degraded });
}

/// Broadcast an updated bout projection.
pub fn broadcast_bout_update(state: &SharedState, bout: &BoutView) {
    emit(state, EVENT_BOUT_UPDATE, bout);
}

/// Broadcast a bout that just reached a terminal position.
pub fn broadcast_bout_finished(state: &SharedState, bout: &BoutView) {
    emit(state, EVENT_BOUT_FINISHED, bout);
}

/// Broadcast the removal of a bout.
pub fn broadcast_bout_deleted(state: &SharedState, bout_id: Uuid) {
    emit(
        state,
        EVENT_BOUT_DELETED,
        &RosterDeletedEvent {
            id: bout_id.to_string(),
        },
    );
}

/// Broadcast a recomputed pool classement.
pub fn broadcast_standings_update(state: &SharedState, pool: &Pool) {
    emit(
        state,
        EVENT_STANDINGS_UPDATE,
        &StandingsUpdateEvent { pool_id: pool.id },
    );
}

/// Broadcast an updated mat.
pub fn broadcast_mat_update(state: &SharedState, mat: &Mat) {
    emit(state, EVENT_MAT_UPDATE, mat);
}

/// Broadcast the whole bracket after a mutation.
pub fn broadcast_bracket_update(state: &SharedState, bracket: &Bracket) {
    emit(state, EVENT_BRACKET_UPDATE, bracket);
}

/// Broadcast a created or updated team.
pub fn broadcast_team_update(state: &SharedState, team: &Team) {
    emit(state, EVENT_TEAM_UPDATE, team);
}

/// Broadcast the removal of a team.
pub fn broadcast_team_deleted(state: &SharedState, team_id: &str) {
    emit(
        state,
        EVENT_TEAM_DELETED,
        &RosterDeletedEvent {
            id: team_id.to_string(),
        },
    );
}

/// Broadcast a created or updated athlete.
pub fn broadcast_athlete_update(state: &SharedState, athlete: &Athlete) {
    emit(state, EVENT_ATHLETE_UPDATE, athlete);
}

/// Broadcast the removal of an athlete.
pub fn broadcast_athlete_deleted(state: &SharedState, athlete_id: Uuid) {
    emit(
        state,
        EVENT_ATHLETE_DELETED,
        &RosterDeletedEvent {
            id: athlete_id.to_string(),
        },
    );
}
