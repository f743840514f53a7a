use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::bout::{
        BoutView, CorrectionRequest, MarkPointRequest, OsaekomiResult, PatchBoutRequest,
        StartOsaekomiRequest, StopOsaekomiRequest,
    },
    error::AppError,
    services::bout_service,
    state::SharedState,
};

/// Routes handling the bout lifecycle and scoring actions.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/bouts", get(list_bouts))
        .route(
            "/bouts/{id}",
            get(get_bout).patch(patch_bout).delete(delete_bout),
        )
        .route("/bouts/{id}/points", post(mark_point))
        .route(
            "/bouts/{id}/osaekomi",
            post(start_osaekomi).delete(stop_osaekomi),
        )
        .route("/bouts/{id}/corrections", post(apply_correction))
        .route("/bouts/{id}/reset", post(reset_bout))
}

#[utoipa::path(
    get,
    path = "/api/bouts",
    tag = "bouts",
    responses((status = 200, description = "All bouts, enriched", body = [BoutView]))
)]
/// List every bout with roster context resolved.
pub async fn list_bouts(
    State(state): State<SharedState>,
) -> Result<Json<Vec<BoutView>>, AppError> {
    Ok(Json(bout_service::list_bouts(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/bouts/{id}",
    tag = "bouts",
    params(("id" = Uuid, Path, description = "Bout identifier")),
    responses((status = 200, description = "The bout, enriched", body = BoutView))
)]
/// Fetch one enriched bout.
pub async fn get_bout(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BoutView>, AppError> {
    Ok(Json(bout_service::get_bout(&state, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/bouts/{id}",
    tag = "bouts",
    params(("id" = Uuid, Path, description = "Bout identifier")),
    request_body = PatchBoutRequest,
    responses((status = 200, description = "Bout updated", body = BoutView))
)]
/// Table-driven state transition or clock sync.
pub async fn patch_bout(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PatchBoutRequest>,
) -> Result<Json<BoutView>, AppError> {
    Ok(Json(bout_service::patch_bout(&state, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/bouts/{id}",
    tag = "bouts",
    params(("id" = Uuid, Path, description = "Bout identifier")),
    responses((status = 204, description = "Bout deleted and detached"))
)]
/// Remove a bout, detaching it everywhere it is referenced.
pub async fn delete_bout(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<(), AppError> {
    bout_service::delete_bout(&state, id).await?;
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/bouts/{id}/points",
    tag = "bouts",
    params(("id" = Uuid, Path, description = "Bout identifier")),
    request_body = MarkPointRequest,
    responses((status = 200, description = "Score recorded", body = BoutView))
)]
/// Record a scoring action on one side.
pub async fn mark_point(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MarkPointRequest>,
) -> Result<Json<BoutView>, AppError> {
    Ok(Json(bout_service::mark_point(&state, id, payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/bouts/{id}/osaekomi",
    tag = "bouts",
    params(("id" = Uuid, Path, description = "Bout identifier")),
    request_body = StartOsaekomiRequest,
    responses((status = 200, description = "Hold opened", body = BoutView))
)]
/// Open an osaekomi hold.
pub async fn start_osaekomi(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StartOsaekomiRequest>,
) -> Result<Json<BoutView>, AppError> {
    Ok(Json(bout_service::start_osaekomi(&state, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/bouts/{id}/osaekomi",
    tag = "bouts",
    params(("id" = Uuid, Path, description = "Bout identifier")),
    request_body = StopOsaekomiRequest,
    responses((status = 200, description = "Hold released and converted", body = OsaekomiResult))
)]
/// Release the active hold, converting its duration into points.
pub async fn stop_osaekomi(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<StopOsaekomiRequest>>,
) -> Result<Json<OsaekomiResult>, AppError> {
    Ok(Json(bout_service::stop_osaekomi(&state, id, payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/bouts/{id}/corrections",
    tag = "bouts",
    params(("id" = Uuid, Path, description = "Bout identifier")),
    request_body = CorrectionRequest,
    responses((status = 200, description = "Correction applied", body = BoutView))
)]
/// Apply a table-official correction to one side.
pub async fn apply_correction(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CorrectionRequest>,
) -> Result<Json<BoutView>, AppError> {
    Ok(Json(bout_service::apply_correction(&state, id, payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/bouts/{id}/reset",
    tag = "bouts",
    params(("id" = Uuid, Path, description = "Bout identifier")),
    responses((status = 200, description = "Bout reset to scheduled state", body = BoutView))
)]
/// Return a bout to its pristine scheduled state.
pub async fn reset_bout(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BoutView>, AppError> {
    Ok(Json(bout_service::reset_bout(&state, id).await?))
}
