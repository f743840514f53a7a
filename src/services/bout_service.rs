//! Bout lifecycle: scoring actions, osaekomi conversion, corrections and the
//! table-driven state/clock updates.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{models::BoutEntity, store::TournamentStore},
    dto::bout::{
        BoutView, CorrectionRequest, MarkPointRequest, OsaekomiResult, PatchBoutRequest,
        StartOsaekomiRequest, StopOsaekomiRequest,
    },
    engine::{
        bout::{self, Bout, BoutState, Corner},
        mat,
    },
    error::ServiceError,
    services::{enrichment, sse_events, standings_service},
    state::SharedState,
};

/// Load a bout or fail with `NotFound`.
pub async fn load_bout(store: &dyn TournamentStore, id: Uuid) -> Result<Bout, ServiceError> {
    store
        .find_bout(id)
        .await?
        .map(Bout::from)
        .ok_or_else(|| ServiceError::NotFound(format!("bout `{id}` not found")))
}

async fn persist(store: &dyn TournamentStore, bout: &Bout) -> Result<(), ServiceError> {
    store.save_bout(BoutEntity::from(bout.clone())).await?;
    Ok(())
}

async fn view(store: &dyn TournamentStore, bout: Bout) -> Result<BoutView, ServiceError> {
    let context = enrichment::Context::load(store).await?;
    Ok(context.enrich(bout))
}

/// List every bout, enriched for the read side.
pub async fn list_bouts(state: &SharedState) -> Result<Vec<BoutView>, ServiceError> {
    let store = state.require_store().await?;
    let context = enrichment::Context::load(store.as_ref()).await?;
    let bouts = store.list_bouts().await?;
    Ok(bouts
        .into_iter()
        .map(Bout::from)
        .map(|bout| context.enrich(bout))
        .collect())
}

/// Fetch one enriched bout.
pub async fn get_bout(state: &SharedState, id: Uuid) -> Result<BoutView, ServiceError> {
    let store = state.require_store().await?;
    let bout = load_bout(store.as_ref(), id).await?;
    view(store.as_ref(), bout).await
}

/// Remove a bout, detaching its id from every rencontre, bracket match and
/// mat that references it.
pub async fn delete_bout(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    load_bout(store.as_ref(), id).await?;

    for mut pool in store.list_pools().await? {
        if !pool.references_bout(id) {
            continue;
        }
        for rencontre in &mut pool.rencontres {
            rencontre.bout_ids.retain(|bout_id| *bout_id != id);
        }
        store.save_pool(pool).await?;
    }

    if let Some(mut bracket) = store.load_bracket().await? {
        let mut touched = false;
        for side in [&mut bracket.principal, &mut bracket.consolante] {
            for matches in side.rounds_mut() {
                for bracket_match in matches {
                    if bracket_match.bout_ids.contains(&id) {
                        bracket_match.bout_ids.retain(|bout_id| *bout_id != id);
                        touched = true;
                    }
                }
            }
        }
        for bracket_match in &mut bracket.bronze {
            if bracket_match.bout_ids.contains(&id) {
                bracket_match.bout_ids.retain(|bout_id| *bout_id != id);
                touched = true;
            }
        }
        if touched {
            store.save_bracket(bracket).await?;
        }
    }

    for mut mat in store.list_mats().await? {
        if !mat.bout_ids.contains(&id) {
            continue;
        }
        mat.bout_ids.retain(|bout_id| *bout_id != id);
        if mat.current_index >= mat.bout_ids.len() && mat.current_index > 0 {
            mat.current_index = mat.bout_ids.len() - 1;
        }
        store.save_mat(mat).await?;
    }

    store.delete_bout(id).await?;
    info!(%id, "bout deleted");
    sse_events::broadcast_bout_deleted(state, id);
    Ok(())
}

/// Recompute and persist the running confrontation score of every mat the
/// bout is queued on.
async fn refresh_mat_scores(
    state: &SharedState,
    store: &dyn TournamentStore,
    bout_id: Uuid,
) -> Result<(), ServiceError> {
    let bouts: Vec<Bout> = store
        .list_bouts()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    for mut mat in store.list_mats().await? {
        if !mat.bout_ids.contains(&bout_id) {
            continue;
        }
        mat.score = mat::confrontation_score(&mat, &bouts, &state.config().scoring);
        store.save_mat(mat.clone()).await?;
        sse_events::broadcast_mat_update(state, &mat);
    }
    Ok(())
}

async fn commit_and_publish(
    state: &SharedState,
    store: &dyn TournamentStore,
    bout: Bout,
) -> Result<BoutView, ServiceError> {
    let finished = bout.etat == BoutState::Termine;
    persist(store, &bout).await?;

    let projected = view(store, bout).await?;
    sse_events::broadcast_bout_update(state, &projected);
    if finished {
        sse_events::broadcast_bout_finished(state, &projected);
        standings_service::on_bout_finished(state, store, projected.bout.id).await?;
        refresh_mat_scores(state, store, projected.bout.id).await?;
    }
    Ok(projected)
}

/// Record a scoring action on one side and auto-finish when terminal.
pub async fn mark_point(
    state: &SharedState,
    id: Uuid,
    request: MarkPointRequest,
) -> Result<BoutView, ServiceError> {
    let store = state.require_store().await?;
    let bout = load_bout(store.as_ref(), id).await?;
    let rules = &state.config().scoring;

    let updated = bout::mark_point(
        &bout,
        request.side,
        request.kind,
        rules,
        OffsetDateTime::now_utc(),
    )?;
    commit_and_publish(state, store.as_ref(), updated).await
}

/// Open an osaekomi hold for one side.
pub async fn start_osaekomi(
    state: &SharedState,
    id: Uuid,
    request: StartOsaekomiRequest,
) -> Result<BoutView, ServiceError> {
    let store = state.require_store().await?;
    let bout = load_bout(store.as_ref(), id).await?;

    let updated = bout::start_osaekomi(&bout, request.side, OffsetDateTime::now_utc())?;
    persist(store.as_ref(), &updated).await?;

    let projected = view(store.as_ref(), updated).await?;
    sse_events::broadcast_bout_update(state, &projected);
    Ok(projected)
}

/// Release the active hold and convert its duration into points.
pub async fn stop_osaekomi(
    state: &SharedState,
    id: Uuid,
    request: StopOsaekomiRequest,
) -> Result<OsaekomiResult, ServiceError> {
    let store = state.require_store().await?;
    let bout = load_bout(store.as_ref(), id).await?;
    let rules = &state.config().scoring;

    let outcome = bout::stop_osaekomi(
        &bout,
        request.duration_secs,
        rules,
        OffsetDateTime::now_utc(),
    )?;
    let projected = commit_and_publish(state, store.as_ref(), outcome.bout).await?;

    Ok(OsaekomiResult {
        bout: projected,
        points_awarded: outcome.points_awarded,
        finished: outcome.finished,
    })
}

/// Apply a table-official correction. A corrected finished bout reopens in
/// pause, but re-terminates immediately when the corrected position is still
/// terminal.
pub async fn apply_correction(
    state: &SharedState,
    id: Uuid,
    request: CorrectionRequest,
) -> Result<BoutView, ServiceError> {
    let store = state.require_store().await?;
    let bout = load_bout(store.as_ref(), id).await?;
    let rules = &state.config().scoring;
    let now = OffsetDateTime::now_utc();

    let mut updated = bout::apply_correction(&bout, request.side, request.correction)?;
    if let Some(reason) = bout::check_auto_finish(&updated, rules) {
        bout::finish(&mut updated, reason, rules, now);
    }
    let projected = commit_and_publish(state, store.as_ref(), updated).await?;
    // A correction that reopens a finished bout removes it from the
    // confrontation total.
    if projected.bout.etat != BoutState::Termine {
        refresh_mat_scores(state, store.as_ref(), id).await?;
    }
    Ok(projected)
}

/// Return the bout to its pristine scheduled state.
pub async fn reset_bout(state: &SharedState, id: Uuid) -> Result<BoutView, ServiceError> {
    let store = state.require_store().await?;
    let bout = load_bout(store.as_ref(), id).await?;

    let updated = bout::reset(&bout, &state.config().scoring);
    persist(store.as_ref(), &updated).await?;
    refresh_mat_scores(state, store.as_ref(), id).await?;

    let projected = view(store.as_ref(), updated).await?;
    sse_events::broadcast_bout_update(state, &projected);
    Ok(projected)
}

/// Table-driven state transition or clock sync, with an auto-finish check.
pub async fn patch_bout(
    state: &SharedState,
    id: Uuid,
    request: PatchBoutRequest,
) -> Result<BoutView, ServiceError> {
    let store = state.require_store().await?;
    let bout = load_bout(store.as_ref(), id).await?;
    let rules = &state.config().scoring;

    if bout.etat == BoutState::Termine {
        return Err(ServiceError::InvalidState(format!(
            "bout `{id}` is already finished"
        )));
    }
    if request.etat == Some(BoutState::Termine) {
        return Err(ServiceError::InvalidInput(
            "a bout finishes through scoring actions, not a state patch".into(),
        ));
    }

    let mut updated = bout.clone();
    if let Some(etat) = request.etat {
        updated.etat = etat;
    }
    if let Some(timer) = request.timer {
        updated.timer = timer;
    }

    if let Some(reason) = bout::check_auto_finish(&updated, rules) {
        bout::finish(&mut updated, reason, rules, OffsetDateTime::now_utc());
    }
    commit_and_publish(state, store.as_ref(), updated).await
}

/// Generate one bout per weight/sex category shared between two team rosters
/// and persist them. Returns the created bouts in roster order.
pub async fn generate_team_bouts(
    state: &SharedState,
    store: &Arc<dyn TournamentStore>,
    team_a_id: &str,
    team_b_id: &str,
) -> Result<Vec<Bout>, ServiceError> {
    let teams = store.list_teams().await?;
    let name_of = |team_id: &str| -> Result<String, ServiceError> {
        teams
            .iter()
            .find(|team| team.id == team_id)
            .map(|team| team.name.clone())
            .ok_or_else(|| ServiceError::NotFound(format!("team `{team_id}` not found")))
    };
    let team_a_name = name_of(team_a_id)?;
    let team_b_name = name_of(team_b_id)?;

    let athletes: Vec<crate::engine::Athlete> = store
        .list_athletes()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let roster_a: Vec<_> = athletes
        .iter()
        .filter(|athlete| athlete.team_id == team_a_id)
        .cloned()
        .collect();
    let roster_b: Vec<_> = athletes
        .iter()
        .filter(|athlete| athlete.team_id == team_b_id)
        .cloned()
        .collect();

    let rules = &state.config().scoring;
    let now = OffsetDateTime::now_utc();
    let mut bouts = Vec::new();
    for (red, blue) in bout::shared_category_pairs(&roster_a, &roster_b) {
        let bout = Bout::new(
            Corner::from_athlete(red, &team_a_name),
            Corner::from_athlete(blue, &team_b_name),
            rules,
            now,
        );
        persist(store.as_ref(), &bout).await?;
        bouts.push(bout);
    }

    info!(
        team_a = team_a_id,
        team_b = team_b_id,
        count = bouts.len(),
        "generated confrontation bouts"
    );
    Ok(bouts)
}
