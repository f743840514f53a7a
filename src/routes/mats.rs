use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::mat::{AssignBoutsRequest, CreateMatRequest, MatView, PatchMatRequest},
    engine::mat::{ConfrontationScore, Mat},
    error::AppError,
    services::mat_service,
    state::SharedState,
};

/// Routes handling mats and their bout sequencer.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/mats", get(list_mats).post(create_mat))
        .route(
            "/mats/{id}",
            get(get_mat).patch(patch_mat).delete(delete_mat),
        )
        .route("/mats/{id}/advance", post(advance))
        .route("/mats/{id}/retreat", post(retreat))
        .route("/mats/{id}/bouts", post(assign_bouts))
        .route("/mats/{id}/release", post(release))
        .route("/mats/{id}/score", get(score))
}

#[utoipa::path(
    get,
    path = "/api/mats",
    tag = "mats",
    responses((status = 200, description = "All mats", body = [Mat]))
)]
/// List every mat.
pub async fn list_mats(State(state): State<SharedState>) -> Result<Json<Vec<Mat>>, AppError> {
    Ok(Json(mat_service::list_mats(&state).await?))
}

#[utoipa::path(
    post,
    path = "/api/mats",
    tag = "mats",
    request_body = CreateMatRequest,
    responses((status = 200, description = "Mat created", body = Mat))
)]
/// Register a new mat.
pub async fn create_mat(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateMatRequest>>,
) -> Result<Json<Mat>, AppError> {
    Ok(Json(mat_service::create_mat(&state, payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/mats/{id}",
    tag = "mats",
    params(("id" = Uuid, Path, description = "Mat identifier")),
    responses((status = 200, description = "The mat with its current bout", body = MatView))
)]
/// Fetch one mat with its current bout resolved.
pub async fn get_mat(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatView>, AppError> {
    Ok(Json(mat_service::get_mat(&state, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/mats/{id}",
    tag = "mats",
    params(("id" = Uuid, Path, description = "Mat identifier")),
    request_body = PatchMatRequest,
    responses((status = 200, description = "Mat updated", body = Mat))
)]
/// Rename a mat or change its state.
pub async fn patch_mat(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<PatchMatRequest>>,
) -> Result<Json<Mat>, AppError> {
    Ok(Json(mat_service::patch_mat(&state, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/mats/{id}",
    tag = "mats",
    params(("id" = Uuid, Path, description = "Mat identifier")),
    responses((status = 204, description = "Mat deleted"))
)]
/// Remove a mat.
pub async fn delete_mat(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<(), AppError> {
    mat_service::delete_mat(&state, id).await?;
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/mats/{id}/advance",
    tag = "mats",
    params(("id" = Uuid, Path, description = "Mat identifier")),
    responses((status = 200, description = "Pointer moved to the next bout", body = MatView))
)]
/// Move the mat pointer to the next bout.
pub async fn advance(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatView>, AppError> {
    Ok(Json(mat_service::advance(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/mats/{id}/retreat",
    tag = "mats",
    params(("id" = Uuid, Path, description = "Mat identifier")),
    responses((status = 200, description = "Pointer moved to the previous bout", body = MatView))
)]
/// Move the mat pointer back to the previous bout.
pub async fn retreat(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatView>, AppError> {
    Ok(Json(mat_service::retreat(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/mats/{id}/bouts",
    tag = "mats",
    params(("id" = Uuid, Path, description = "Mat identifier")),
    request_body = AssignBoutsRequest,
    responses((status = 200, description = "Bouts queued on the mat", body = MatView))
)]
/// Queue existing bouts on a mat.
pub async fn assign_bouts(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<AssignBoutsRequest>>,
) -> Result<Json<MatView>, AppError> {
    Ok(Json(mat_service::assign_bouts(&state, id, payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/mats/{id}/release",
    tag = "mats",
    params(("id" = Uuid, Path, description = "Mat identifier")),
    responses((status = 200, description = "Mat cleared back to its free state", body = Mat))
)]
/// Clear the mat back to its free state.
pub async fn release(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Mat>, AppError> {
    Ok(Json(mat_service::release(&state, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/mats/{id}/score",
    tag = "mats",
    params(("id" = Uuid, Path, description = "Mat identifier")),
    responses((status = 200, description = "Running confrontation score", body = ConfrontationScore))
)]
/// Current confrontation score of the mat's finished bouts.
pub async fn score(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConfrontationScore>, AppError> {
    Ok(Json(mat_service::score(&state, id).await?))
}
