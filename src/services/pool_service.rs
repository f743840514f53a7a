//! Pool round management: bulk creation, rencontre assignment.

use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::{
    dto::pool::CreatePoolsRequest,
    engine::standings::{self, Pool, RencontreState},
    error::ServiceError,
    services::{bout_service, sse_events},
    state::SharedState,
};

/// List every pool.
pub async fn list_pools(state: &SharedState) -> Result<Vec<Pool>, ServiceError> {
    let store = state.require_store().await?;
    Ok(store.list_pools().await?)
}

/// Fetch one pool.
pub async fn get_pool(state: &SharedState, id: Uuid) -> Result<Pool, ServiceError> {
    let store = state.require_store().await?;
    store
        .find_pool(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("pool `{id}` not found")))
}

/// Deal the registered teams into `count` pools and generate every pool's
/// round-robin rencontre list. Replaces any previous pool round.
pub async fn create_pools(
    state: &SharedState,
    request: CreatePoolsRequest,
) -> Result<Vec<Pool>, ServiceError> {
    let rules = &state.config().pools;
    if request.count < rules.min_pools || request.count > rules.max_pools {
        return Err(ServiceError::InvalidInput(format!(
            "pool count must be between {} and {}",
            rules.min_pools, rules.max_pools
        )));
    }

    let store = state.require_store().await?;
    let team_ids: Vec<String> = store
        .list_teams()
        .await?
        .into_iter()
        .map(|team| team.id)
        .collect();
    if team_ids.len() < 2 {
        return Err(ServiceError::InvalidState(
            "at least two teams are required to build pools".into(),
        ));
    }
    if request.count > team_ids.len() {
        return Err(ServiceError::InvalidInput(format!(
            "cannot deal {} teams into {} pools",
            team_ids.len(),
            request.count
        )));
    }

    let pools = standings::build_pools(request.count, &team_ids);
    store.clear_pools().await?;
    for pool in &pools {
        store.save_pool(pool.clone()).await?;
    }

    info!(count = pools.len(), teams = team_ids.len(), "pools created");
    Ok(pools)
}

/// Drop the whole pool round.
pub async fn delete_pools(state: &SharedState) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    store.clear_pools().await?;
    info!("pool round deleted");
    Ok(())
}

/// Generate the bouts of one rencontre and queue them on a mat.
///
/// One bout per weight/sex category shared by the two rosters; the bout ids
/// are attached to the rencontre, which flips to `assignee`.
pub async fn assign_rencontre(
    state: &SharedState,
    rencontre_id: Uuid,
    mat_id: Uuid,
) -> Result<Pool, ServiceError> {
    let store = state.require_store().await?;

    let mut pool = {
        let pools = store.list_pools().await?;
        pools
            .into_iter()
            .find(|pool| {
                pool.rencontres
                    .iter()
                    .any(|rencontre| rencontre.id == rencontre_id)
            })
            .ok_or_else(|| {
                ServiceError::NotFound(format!("rencontre `{rencontre_id}` not found"))
            })?
    };

    let mut mat = store
        .find_mat(mat_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("mat `{mat_id}` not found")))?;

    let (team_a, team_b, already_assigned) = {
        let rencontre = pool
            .rencontres
            .iter()
            .find(|rencontre| rencontre.id == rencontre_id)
            .ok_or_else(|| {
                ServiceError::NotFound(format!("rencontre `{rencontre_id}` not found"))
            })?;
        (
            rencontre.team_a.clone(),
            rencontre.team_b.clone(),
            rencontre.etat == RencontreState::Assignee,
        )
    };
    if already_assigned {
        return Err(ServiceError::InvalidState(format!(
            "rencontre `{rencontre_id}` is already assigned"
        )));
    }

    let bouts = bout_service::generate_team_bouts(state, &store, &team_a, &team_b).await?;
    if bouts.is_empty() {
        return Err(ServiceError::InvalidState(format!(
            "teams `{team_a}` and `{team_b}` share no weight category"
        )));
    }
    let bout_ids: Vec<Uuid> = bouts.iter().map(|bout| bout.id).collect();

    mat.assign(&bout_ids, OffsetDateTime::now_utc());
    store.save_mat(mat.clone()).await?;

    if let Some(rencontre) = pool
        .rencontres
        .iter_mut()
        .find(|rencontre| rencontre.id == rencontre_id)
    {
        rencontre.bout_ids.extend(bout_ids.iter().copied());
        rencontre.etat = RencontreState::Assignee;
    }
    store.save_pool(pool.clone()).await?;

    info!(
        %rencontre_id, %mat_id,
        bouts = bout_ids.len(),
        "rencontre assigned to mat"
    );
    sse_events::broadcast_mat_update(state, &mat);
    Ok(pool)
}
