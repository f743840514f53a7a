use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::pool::{AssignRencontreRequest, CreatePoolsRequest},
    engine::standings::{Pool, TeamRecord},
    error::AppError,
    services::{pool_service, standings_service},
    state::SharedState,
};

/// Routes handling the pool round and its standings.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/pools", get(list_pools).post(create_pools).delete(delete_pools))
        .route("/pools/{id}", get(get_pool))
        .route("/pools/rencontres/{id}/assign", post(assign_rencontre))
        .route("/standings/pools/{id}", get(pool_standings))
        .route("/standings/general", get(general_standings))
}

#[utoipa::path(
    get,
    path = "/api/pools",
    tag = "pools",
    responses((status = 200, description = "All pools", body = [Pool]))
)]
/// List every pool.
pub async fn list_pools(State(state): State<SharedState>) -> Result<Json<Vec<Pool>>, AppError> {
    Ok(Json(pool_service::list_pools(&state).await?))
}

#[utoipa::path(
    post,
    path = "/api/pools",
    tag = "pools",
    request_body = CreatePoolsRequest,
    responses((status = 200, description = "Pool round created", body = [Pool]))
)]
/// Deal the registered teams into pools.
pub async fn create_pools(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreatePoolsRequest>>,
) -> Result<Json<Vec<Pool>>, AppError> {
    Ok(Json(pool_service::create_pools(&state, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/pools",
    tag = "pools",
    responses((status = 204, description = "Pool round deleted"))
)]
/// Drop the whole pool round.
pub async fn delete_pools(State(state): State<SharedState>) -> Result<(), AppError> {
    pool_service::delete_pools(&state).await?;
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/pools/{id}",
    tag = "pools",
    params(("id" = Uuid, Path, description = "Pool identifier")),
    responses((status = 200, description = "The pool", body = Pool))
)]
/// Fetch one pool.
pub async fn get_pool(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Pool>, AppError> {
    Ok(Json(pool_service::get_pool(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/pools/rencontres/{id}/assign",
    tag = "pools",
    params(("id" = Uuid, Path, description = "Rencontre identifier")),
    request_body = AssignRencontreRequest,
    responses((status = 200, description = "Bouts generated and queued", body = Pool))
)]
/// Generate a rencontre's bouts and queue them on a mat.
pub async fn assign_rencontre(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignRencontreRequest>,
) -> Result<Json<Pool>, AppError> {
    Ok(Json(
        pool_service::assign_rencontre(&state, id, payload.mat_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/standings/pools/{id}",
    tag = "standings",
    params(("id" = Uuid, Path, description = "Pool identifier")),
    responses((status = 200, description = "Recomputed pool classement", body = Pool))
)]
/// Recompute and persist one pool's classement.
pub async fn pool_standings(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Pool>, AppError> {
    Ok(Json(standings_service::pool_standings(&state, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/standings/general",
    tag = "standings",
    responses((status = 200, description = "General ranking across pools", body = [TeamRecord]))
)]
/// Aggregate every pool's classement into the general ranking.
pub async fn general_standings(
    State(state): State<SharedState>,
) -> Result<Json<Vec<TeamRecord>>, AppError> {
    Ok(Json(standings_service::general_standings(&state).await?))
}
