//! Mat (tatami) lifecycle and the bounded bout sequencer.

use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::{
    dao::store::TournamentStore,
    dto::mat::{AssignBoutsRequest, CreateMatRequest, MatView, PatchMatRequest},
    engine::{
        bout::Bout,
        mat::{self, ConfrontationScore, Mat},
        standings::RencontreState,
    },
    error::ServiceError,
    services::{bout_service, enrichment, sse_events},
    state::SharedState,
};

async fn load_mat(store: &dyn TournamentStore, id: Uuid) -> Result<Mat, ServiceError> {
    store
        .find_mat(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("mat `{id}` not found")))
}

async fn view(store: &dyn TournamentStore, mat: Mat) -> Result<MatView, ServiceError> {
    let current_bout = match mat.current_bout_id() {
        Some(bout_id) => {
            let context = enrichment::Context::load(store).await?;
            store
                .find_bout(bout_id)
                .await?
                .map(Bout::from)
                .map(|bout| context.enrich(bout))
        }
        None => None,
    };
    Ok(MatView { mat, current_bout })
}

/// List every mat.
pub async fn list_mats(state: &SharedState) -> Result<Vec<Mat>, ServiceError> {
    let store = state.require_store().await?;
    Ok(store.list_mats().await?)
}

/// Register a new mat.
pub async fn create_mat(
    state: &SharedState,
    request: CreateMatRequest,
) -> Result<Mat, ServiceError> {
    let store = state.require_store().await?;
    let mat = Mat::new(&request.name, OffsetDateTime::now_utc());
    store.save_mat(mat.clone()).await?;
    info!(id = %mat.id, name = %mat.name, "mat created");
    Ok(mat)
}

/// Fetch one mat with its current bout resolved.
pub async fn get_mat(state: &SharedState, id: Uuid) -> Result<MatView, ServiceError> {
    let store = state.require_store().await?;
    let mat = load_mat(store.as_ref(), id).await?;
    view(store.as_ref(), mat).await
}

/// Rename a mat or change its state.
pub async fn patch_mat(
    state: &SharedState,
    id: Uuid,
    request: PatchMatRequest,
) -> Result<Mat, ServiceError> {
    let store = state.require_store().await?;
    let mut mat = load_mat(store.as_ref(), id).await?;

    if let Some(name) = request.name {
        mat.name = name;
    }
    if let Some(etat) = request.etat {
        mat.etat = etat;
    }
    store.save_mat(mat.clone()).await?;

    sse_events::broadcast_mat_update(state, &mat);
    Ok(mat)
}

/// Remove a mat. Its queued bouts are left untouched.
pub async fn delete_mat(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    load_mat(store.as_ref(), id).await?;
    store.delete_mat(id).await?;
    info!(%id, "mat deleted");
    Ok(())
}

/// Move the mat pointer to the next bout.
pub async fn advance(state: &SharedState, id: Uuid) -> Result<MatView, ServiceError> {
    let store = state.require_store().await?;
    let mut mat = load_mat(store.as_ref(), id).await?;

    mat.advance(OffsetDateTime::now_utc())?;
    store.save_mat(mat.clone()).await?;

    sse_events::broadcast_mat_update(state, &mat);
    view(store.as_ref(), mat).await
}

/// Move the mat pointer back to the previous bout.
pub async fn retreat(state: &SharedState, id: Uuid) -> Result<MatView, ServiceError> {
    let store = state.require_store().await?;
    let mut mat = load_mat(store.as_ref(), id).await?;

    mat.retreat(OffsetDateTime::now_utc())?;
    store.save_mat(mat.clone()).await?;

    sse_events::broadcast_mat_update(state, &mat);
    view(store.as_ref(), mat).await
}

/// Queue existing bouts on a mat and attach them to their pool rencontre.
pub async fn assign_bouts(
    state: &SharedState,
    id: Uuid,
    request: AssignBoutsRequest,
) -> Result<MatView, ServiceError> {
    let store = state.require_store().await?;
    let mut mat = load_mat(store.as_ref(), id).await?;

    let mut bouts = Vec::with_capacity(request.bout_ids.len());
    for bout_id in &request.bout_ids {
        bouts.push(bout_service::load_bout(store.as_ref(), *bout_id).await?);
    }

    mat.assign(&request.bout_ids, OffsetDateTime::now_utc());
    store.save_mat(mat.clone()).await?;

    // Attach each bout to the rencontre pairing its two teams, if the pool
    // round includes one.
    let mut pools = store.list_pools().await?;
    for bout in &bouts {
        for pool in &mut pools {
            if let Some(rencontre) =
                pool.rencontre_for_teams_mut(&bout.rouge.team_id, &bout.bleu.team_id)
            {
                if !rencontre.bout_ids.contains(&bout.id) {
                    rencontre.bout_ids.push(bout.id);
                }
                rencontre.etat = RencontreState::Assignee;
            }
        }
    }
    for pool in pools {
        store.save_pool(pool).await?;
    }

    info!(%id, bouts = request.bout_ids.len(), "bouts queued on mat");
    sse_events::broadcast_mat_update(state, &mat);
    view(store.as_ref(), mat).await
}

/// Clear the mat back to its free state.
pub async fn release(state: &SharedState, id: Uuid) -> Result<Mat, ServiceError> {
    let store = state.require_store().await?;
    let mut mat = load_mat(store.as_ref(), id).await?;

    mat.release(OffsetDateTime::now_utc());
    store.save_mat(mat.clone()).await?;

    info!(%id, "mat released");
    sse_events::broadcast_mat_update(state, &mat);
    Ok(mat)
}

/// Current confrontation score of the mat's finished bouts.
pub async fn score(state: &SharedState, id: Uuid) -> Result<ConfrontationScore, ServiceError> {
    let store = state.require_store().await?;
    let mat = load_mat(store.as_ref(), id).await?;
    let bouts: Vec<Bout> = store
        .list_bouts()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(mat::confrontation_score(&mat, &bouts, &state.config().scoring))
}
