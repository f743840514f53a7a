//! Dual elimination bracket: creation, match assignment, scoring, advancement.

use rand::seq::SliceRandom;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::{
    dto::bracket::{AdvanceResponse, CreateBracketRequest, MatchScoreResponse},
    engine::{
        bout::Bout,
        bracket::{self, Bracket, BracketError, BracketKind, Phase},
    },
    error::ServiceError,
    services::{bout_service, sse_events},
    state::SharedState,
};

/// Fetch the current bracket.
pub async fn get_bracket(state: &SharedState) -> Result<Bracket, ServiceError> {
    let store = state.require_store().await?;
    store
        .load_bracket()
        .await?
        .ok_or_else(|| ServiceError::NotFound("no bracket has been created".into()))
}

/// Build the dual bracket from the two entry lists. The lists are shuffled
/// before seeding; any previous bracket is replaced.
pub async fn create_bracket(
    state: &SharedState,
    request: CreateBracketRequest,
) -> Result<Bracket, ServiceError> {
    let store = state.require_store().await?;

    let known: Vec<String> = store
        .list_teams()
        .await?
        .into_iter()
        .map(|team| team.id)
        .collect();
    for team_id in request.principal.iter().chain(request.consolante.iter()) {
        if !known.contains(team_id) {
            return Err(ServiceError::NotFound(format!(
                "team `{team_id}` not found"
            )));
        }
    }

    let mut principal = request.principal;
    let mut consolante = request.consolante;
    // The thread-local rng must not outlive this block: holding it across an
    // await point would make the handler future !Send.
    {
        let mut rng = rand::rng();
        principal.shuffle(&mut rng);
        consolante.shuffle(&mut rng);
    }

    let bracket = Bracket::build(&principal, &consolante);
    store.save_bracket(bracket.clone()).await?;

    info!(
        principal = principal.len(),
        consolante = consolante.len(),
        "bracket created"
    );
    sse_events::broadcast_bracket_update(state, &bracket);
    Ok(bracket)
}

/// Drop the bracket.
pub async fn delete_bracket(state: &SharedState) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    store.clear_bracket().await?;
    info!("bracket deleted");
    Ok(())
}

/// Generate the bouts of one bracket match and queue them on a mat.
pub async fn assign_match(
    state: &SharedState,
    kind: BracketKind,
    phase: Phase,
    id: u32,
    mat_id: Uuid,
) -> Result<Bracket, ServiceError> {
    let store = state.require_store().await?;
    let mut bracket = store
        .load_bracket()
        .await?
        .ok_or_else(|| ServiceError::NotFound("no bracket has been created".into()))?;
    let mut mat = store
        .find_mat(mat_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("mat `{mat_id}` not found")))?;

    let (team_a, team_b) = {
        let bracket_match = bracket
            .find_match(kind, phase, id)
            .ok_or(BracketError::MatchNotFound)?;
        if bracket_match.has_bye {
            return Err(BracketError::ByeMatch.into());
        }
        if bracket_match.assigned {
            return Err(ServiceError::InvalidState(format!(
                "match {id} is already assigned"
            )));
        }
        match (&bracket_match.team_a, &bracket_match.team_b) {
            (Some(team_a), Some(team_b)) => (team_a.clone(), team_b.clone()),
            _ => return Err(BracketError::IncompleteMatch.into()),
        }
    };

    let bouts = bout_service::generate_team_bouts(state, &store, &team_a, &team_b).await?;
    if bouts.is_empty() {
        return Err(ServiceError::InvalidState(format!(
            "teams `{team_a}` and `{team_b}` share no weight category"
        )));
    }
    let bout_ids: Vec<Uuid> = bouts.iter().map(|bout| bout.id).collect();

    mat.assign(&bout_ids, OffsetDateTime::now_utc());
    store.save_mat(mat.clone()).await?;

    if let Some(bracket_match) = bracket.find_match_mut(kind, phase, id) {
        bracket_match.bout_ids = bout_ids;
        bracket_match.assigned = true;
        bracket_match.mat_id = Some(mat_id);
    }
    store.save_bracket(bracket.clone()).await?;

    info!(?kind, ?phase, id, %mat_id, "bracket match assigned to mat");
    sse_events::broadcast_bracket_update(state, &bracket);
    sse_events::broadcast_mat_update(state, &mat);
    Ok(bracket)
}

/// Recompute one match's score from its backing bouts, completing it when
/// every bout is finished.
pub async fn score_match(
    state: &SharedState,
    kind: BracketKind,
    phase: Phase,
    id: u32,
) -> Result<MatchScoreResponse, ServiceError> {
    let store = state.require_store().await?;
    let mut bracket = store
        .load_bracket()
        .await?
        .ok_or_else(|| ServiceError::NotFound("no bracket has been created".into()))?;
    let bouts: Vec<Bout> = store
        .list_bouts()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let score = {
        let bracket_match = bracket
            .find_match_mut(kind, phase, id)
            .ok_or(BracketError::MatchNotFound)?;
        let score = bracket::score_match(
            bracket_match,
            &bouts,
            &state.config().scoring,
            OffsetDateTime::now_utc(),
        );
        MatchScoreResponse {
            score_a: score.score_a,
            score_b: score.score_b,
            all_finished: score.all_finished,
            winner: bracket_match.winner,
        }
    };
    store.save_bracket(bracket.clone()).await?;

    sse_events::broadcast_bracket_update(state, &bracket);
    Ok(score)
}

/// Move a decided match's winner into the next round (or a medal).
pub async fn advance_match(
    state: &SharedState,
    kind: BracketKind,
    phase: Phase,
    id: u32,
) -> Result<AdvanceResponse, ServiceError> {
    let store = state.require_store().await?;
    let mut bracket = store
        .load_bracket()
        .await?
        .ok_or_else(|| ServiceError::NotFound("no bracket has been created".into()))?;

    let advancement = bracket::advance(&mut bracket, kind, phase, id)?;
    store.save_bracket(bracket.clone()).await?;

    info!(?kind, ?phase, id, outcome = ?advancement, "bracket match advanced");
    sse_events::broadcast_bracket_update(state, &bracket);
    Ok(advancement.into())
}
