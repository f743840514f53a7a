//! Pool classement recomputation and the general ranking.

use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::{
    dao::store::TournamentStore,
    engine::{
        Team,
        bout::Bout,
        standings::{self, Pool, TeamRecord},
    },
    error::ServiceError,
    services::sse_events,
    state::SharedState,
};

async fn recompute(
    state: &SharedState,
    store: &dyn TournamentStore,
    mut pool: Pool,
) -> Result<Pool, ServiceError> {
    let bouts: Vec<Bout> = store
        .list_bouts()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let teams: Vec<Team> = store
        .list_teams()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    pool.classement = standings::compute_pool_standings(
        &pool,
        &bouts,
        &teams,
        &state.config().scoring,
        &state.config().pools,
    );
    pool.updated_at = Some(OffsetDateTime::now_utc());
    store.save_pool(pool.clone()).await?;

    sse_events::broadcast_standings_update(state, &pool);
    Ok(pool)
}

/// Recompute and persist the classement of one pool.
pub async fn pool_standings(state: &SharedState, pool_id: Uuid) -> Result<Pool, ServiceError> {
    let store = state.require_store().await?;
    let pool = store
        .find_pool(pool_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("pool `{pool_id}` not found")))?;
    recompute(state, store.as_ref(), pool).await
}

/// Aggregate every pool's persisted classement into the general ranking.
pub async fn general_standings(state: &SharedState) -> Result<Vec<TeamRecord>, ServiceError> {
    let store = state.require_store().await?;
    let pools = store.list_pools().await?;
    Ok(standings::compute_general_standings(&pools))
}

/// Recompute exactly the pools whose rencontres reference a bout that just
/// finished. Sole integration point between the bout lifecycle and the
/// standings engine.
pub async fn on_bout_finished(
    state: &SharedState,
    store: &dyn TournamentStore,
    bout_id: Uuid,
) -> Result<(), ServiceError> {
    for pool in store.list_pools().await? {
        if !pool.references_bout(bout_id) {
            continue;
        }
        let pool_id = pool.id;
        recompute(state, store, pool).await?;
        info!(%bout_id, %pool_id, "pool classement recomputed after bout finish");
    }
    Ok(())
}
