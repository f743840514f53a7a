use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::bracket::{
        AdvanceResponse, AssignMatchRequest, CreateBracketRequest, MatchScoreResponse,
    },
    engine::bracket::{Bracket, BracketKind, Phase},
    error::AppError,
    services::bracket_service,
    state::SharedState,
};

/// Routes handling the dual elimination bracket.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/bracket",
            get(get_bracket).post(create_bracket).delete(delete_bracket),
        )
        .route("/bracket/{kind}/{phase}/{id}/assign", post(assign_match))
        .route("/bracket/{kind}/{phase}/{id}/score", get(score_match))
        .route("/bracket/{kind}/{phase}/{id}/advance", post(advance_match))
}

#[utoipa::path(
    get,
    path = "/api/bracket",
    tag = "bracket",
    responses((status = 200, description = "The current bracket", body = Bracket))
)]
/// Fetch the current bracket.
pub async fn get_bracket(State(state): State<SharedState>) -> Result<Json<Bracket>, AppError> {
    Ok(Json(bracket_service::get_bracket(&state).await?))
}

#[utoipa::path(
    post,
    path = "/api/bracket",
    tag = "bracket",
    request_body = CreateBracketRequest,
    responses((status = 200, description = "Bracket created", body = Bracket))
)]
/// Build the dual bracket from shuffled entry lists.
pub async fn create_bracket(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateBracketRequest>>,
) -> Result<Json<Bracket>, AppError> {
    Ok(Json(bracket_service::create_bracket(&state, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/bracket",
    tag = "bracket",
    responses((status = 204, description = "Bracket deleted"))
)]
/// Drop the bracket.
pub async fn delete_bracket(State(state): State<SharedState>) -> Result<(), AppError> {
    bracket_service::delete_bracket(&state).await?;
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/bracket/{kind}/{phase}/{id}/assign",
    tag = "bracket",
    params(
        ("kind" = BracketKind, Path, description = "Draw the match belongs to"),
        ("phase" = Phase, Path, description = "Round of the match"),
        ("id" = u32, Path, description = "1-based match id within the round"),
    ),
    request_body = AssignMatchRequest,
    responses((status = 200, description = "Match bouts generated and queued", body = Bracket))
)]
/// Generate a match's bouts and queue them on a mat.
pub async fn assign_match(
    State(state): State<SharedState>,
    Path((kind, phase, id)): Path<(BracketKind, Phase, u32)>,
    Json(payload): Json<AssignMatchRequest>,
) -> Result<Json<Bracket>, AppError> {
    Ok(Json(
        bracket_service::assign_match(&state, kind, phase, id, payload.mat_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/bracket/{kind}/{phase}/{id}/score",
    tag = "bracket",
    params(
        ("kind" = BracketKind, Path, description = "Draw the match belongs to"),
        ("phase" = Phase, Path, description = "Round of the match"),
        ("id" = u32, Path, description = "1-based match id within the round"),
    ),
    responses((status = 200, description = "Recomputed match score", body = MatchScoreResponse))
)]
/// Recompute a match's score from its backing bouts.
pub async fn score_match(
    State(state): State<SharedState>,
    Path((kind, phase, id)): Path<(BracketKind, Phase, u32)>,
) -> Result<Json<MatchScoreResponse>, AppError> {
    Ok(Json(
        bracket_service::score_match(&state, kind, phase, id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/bracket/{kind}/{phase}/{id}/advance",
    tag = "bracket",
    params(
        ("kind" = BracketKind, Path, description = "Draw the match belongs to"),
        ("phase" = Phase, Path, description = "Round of the match"),
        ("id" = u32, Path, description = "1-based match id within the round"),
    ),
    responses((status = 200, description = "Winner moved forward", body = AdvanceResponse))
)]
/// Move a decided match's winner into the next round.
pub async fn advance_match(
    State(state): State<SharedState>,
    Path((kind, phase, id)): Path<(BracketKind, Phase, u32)>,
) -> Result<Json<AdvanceResponse>, AppError> {
    Ok(Json(
        bracket_service::advance_match(&state, kind, phase, id).await?,
    ))
}
