use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::roster::{
        CreateAthleteRequest, CreateTeamRequest, PatchAthleteRequest, PatchTeamRequest,
    },
    engine::{Athlete, Team},
    error::AppError,
    services::roster_service,
    state::SharedState,
};

/// Routes handling team and athlete registration.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/teams", get(list_teams).post(create_team))
        .route(
            "/teams/{id}",
            get(get_team).patch(patch_team).delete(delete_team),
        )
        .route("/athletes", get(list_athletes).post(create_athlete))
        .route(
            "/athletes/{id}",
            get(get_athlete)
                .patch(patch_athlete)
                .delete(delete_athlete),
        )
}

#[utoipa::path(
    get,
    path = "/api/teams",
    tag = "roster",
    responses((status = 200, description = "All registered teams", body = [Team]))
)]
/// List every team.
pub async fn list_teams(State(state): State<SharedState>) -> Result<Json<Vec<Team>>, AppError> {
    Ok(Json(roster_service::list_teams(&state).await?))
}

#[utoipa::path(
    post,
    path = "/api/teams",
    tag = "roster",
    request_body = CreateTeamRequest,
    responses((status = 200, description = "Team created", body = Team))
)]
/// Register a new team.
pub async fn create_team(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateTeamRequest>>,
) -> Result<Json<Team>, AppError> {
    Ok(Json(roster_service::create_team(&state, payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/teams/{id}",
    tag = "roster",
    params(("id" = String, Path, description = "Team identifier")),
    responses((status = 200, description = "The team", body = Team))
)]
/// Fetch one team.
pub async fn get_team(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Team>, AppError> {
    Ok(Json(roster_service::get_team(&state, &id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/teams/{id}",
    tag = "roster",
    params(("id" = String, Path, description = "Team identifier")),
    request_body = PatchTeamRequest,
    responses((status = 200, description = "Team updated", body = Team))
)]
/// Rename a team or change its color tag.
pub async fn patch_team(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Valid(Json(payload)): Valid<Json<PatchTeamRequest>>,
) -> Result<Json<Team>, AppError> {
    Ok(Json(roster_service::patch_team(&state, &id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/teams/{id}",
    tag = "roster",
    params(("id" = String, Path, description = "Team identifier")),
    responses((status = 204, description = "Team deleted"))
)]
/// Remove a team that owns no athletes.
pub async fn delete_team(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<(), AppError> {
    roster_service::delete_team(&state, &id).await?;
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/athletes",
    tag = "roster",
    responses((status = 200, description = "All registered athletes", body = [Athlete]))
)]
/// List every athlete.
pub async fn list_athletes(
    State(state): State<SharedState>,
) -> Result<Json<Vec<Athlete>>, AppError> {
    Ok(Json(roster_service::list_athletes(&state).await?))
}

#[utoipa::path(
    post,
    path = "/api/athletes",
    tag = "roster",
    request_body = CreateAthleteRequest,
    responses((status = 200, description = "Athlete registered", body = Athlete))
)]
/// Register an athlete on a team roster.
pub async fn create_athlete(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateAthleteRequest>>,
) -> Result<Json<Athlete>, AppError> {
    Ok(Json(roster_service::create_athlete(&state, payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/athletes/{id}",
    tag = "roster",
    params(("id" = Uuid, Path, description = "Athlete identifier")),
    responses((status = 200, description = "The athlete", body = Athlete))
)]
/// Fetch one athlete.
pub async fn get_athlete(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Athlete>, AppError> {
    Ok(Json(roster_service::get_athlete(&state, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/athletes/{id}",
    tag = "roster",
    params(("id" = Uuid, Path, description = "Athlete identifier")),
    request_body = PatchAthleteRequest,
    responses((status = 200, description = "Athlete updated", body = Athlete))
)]
/// Update an athlete's registration.
pub async fn patch_athlete(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<PatchAthleteRequest>>,
) -> Result<Json<Athlete>, AppError> {
    Ok(Json(roster_service::patch_athlete(&state, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/athletes/{id}",
    tag = "roster",
    params(("id" = Uuid, Path, description = "Athlete identifier")),
    responses((status = 204, description = "Athlete deleted"))
)]
/// Remove an athlete not engaged in any bout.
pub async fn delete_athlete(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<(), AppError> {
    roster_service::delete_athlete(&state, id).await?;
    Ok(())
}
