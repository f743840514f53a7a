//! Team and athlete registration.

use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{
        models::{AthleteEntity, TeamEntity},
        store::TournamentStore,
    },
    dto::roster::{
        CreateAthleteRequest, CreateTeamRequest, PatchAthleteRequest, PatchTeamRequest,
    },
    engine::{Athlete, Team},
    error::ServiceError,
    services::sse_events,
    state::SharedState,
};

const DEFAULT_COLOR: &str = "primary";

async fn load_team(store: &dyn TournamentStore, id: &str) -> Result<Team, ServiceError> {
    store
        .find_team(id.to_owned())
        .await?
        .map(Team::from)
        .ok_or_else(|| ServiceError::NotFound(format!("team `{id}` not found")))
}

async fn load_athlete(store: &dyn TournamentStore, id: Uuid) -> Result<Athlete, ServiceError> {
    store
        .find_athlete(id)
        .await?
        .map(Athlete::from)
        .ok_or_else(|| ServiceError::NotFound(format!("athlete `{id}` not found")))
}

fn check_category(state: &SharedState, sex: &str, weight: &str) -> Result<(), ServiceError> {
    if state.config().categories.is_valid_category(sex, weight) {
        Ok(())
    } else {
        Err(ServiceError::InvalidInput(format!(
            "`{weight}` is not a registered weight category for sex `{sex}`"
        )))
    }
}

/// List every team.
pub async fn list_teams(state: &SharedState) -> Result<Vec<Team>, ServiceError> {
    let store = state.require_store().await?;
    Ok(store
        .list_teams()
        .await?
        .into_iter()
        .map(Team::from)
        .collect())
}

/// Register a new team; duplicate ids are rejected.
pub async fn create_team(
    state: &SharedState,
    request: CreateTeamRequest,
) -> Result<Team, ServiceError> {
    let store = state.require_store().await?;
    if store.find_team(request.id.clone()).await?.is_some() {
        return Err(ServiceError::InvalidState(format!(
            "team `{}` already exists",
            request.id
        )));
    }

    let team = Team {
        id: request.id,
        name: request.name,
        color: request.color.unwrap_or_else(|| DEFAULT_COLOR.to_owned()),
        created_at: OffsetDateTime::now_utc(),
    };
    store.save_team(TeamEntity::from(team.clone())).await?;

    info!(id = %team.id, "team created");
    sse_events::broadcast_team_update(state, &team);
    Ok(team)
}

/// Fetch one team.
pub async fn get_team(state: &SharedState, id: &str) -> Result<Team, ServiceError> {
    let store = state.require_store().await?;
    load_team(store.as_ref(), id).await
}

/// Rename a team or change its color tag.
pub async fn patch_team(
    state: &SharedState,
    id: &str,
    request: PatchTeamRequest,
) -> Result<Team, ServiceError> {
    let store = state.require_store().await?;
    let mut team = load_team(store.as_ref(), id).await?;

    if let Some(name) = request.name {
        team.name = name;
    }
    if let Some(color) = request.color {
        team.color = color;
    }
    store.save_team(TeamEntity::from(team.clone())).await?;

    sse_events::broadcast_team_update(state, &team);
    Ok(team)
}

/// Remove a team. Refused while athletes are registered under it.
pub async fn delete_team(state: &SharedState, id: &str) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    load_team(store.as_ref(), id).await?;

    let owned = store
        .list_athletes()
        .await?
        .into_iter()
        .filter(|athlete| athlete.team_id == id)
        .count();
    if owned > 0 {
        return Err(ServiceError::InvalidState(format!(
            "team `{id}` still has {owned} registered athlete(s)"
        )));
    }

    store.delete_team(id.to_owned()).await?;
    info!(id, "team deleted");
    sse_events::broadcast_team_deleted(state, id);
    Ok(())
}

/// List every athlete.
pub async fn list_athletes(state: &SharedState) -> Result<Vec<Athlete>, ServiceError> {
    let store = state.require_store().await?;
    Ok(store
        .list_athletes()
        .await?
        .into_iter()
        .map(Athlete::from)
        .collect())
}

/// Register an athlete on a team roster.
pub async fn create_athlete(
    state: &SharedState,
    request: CreateAthleteRequest,
) -> Result<Athlete, ServiceError> {
    let store = state.require_store().await?;
    load_team(store.as_ref(), &request.team_id).await?;
    check_category(state, &request.sex, &request.weight)?;

    let roster_size = store
        .list_athletes()
        .await?
        .into_iter()
        .filter(|athlete| athlete.team_id == request.team_id)
        .count();
    if roster_size >= state.config().categories.max_athletes_per_team {
        return Err(ServiceError::InvalidState(format!(
            "team `{}` roster is full",
            request.team_id
        )));
    }

    let athlete = Athlete {
        id: Uuid::new_v4(),
        name: request.name,
        sex: request.sex,
        weight: request.weight,
        team_id: request.team_id,
    };
    store
        .save_athlete(AthleteEntity::from(athlete.clone()))
        .await?;

    info!(id = %athlete.id, team = %athlete.team_id, "athlete registered");
    sse_events::broadcast_athlete_update(state, &athlete);
    Ok(athlete)
}

/// Fetch one athlete.
pub async fn get_athlete(state: &SharedState, id: Uuid) -> Result<Athlete, ServiceError> {
    let store = state.require_store().await?;
    load_athlete(store.as_ref(), id).await
}

/// Update an athlete's registration.
pub async fn patch_athlete(
    state: &SharedState,
    id: Uuid,
    request: PatchAthleteRequest,
) -> Result<Athlete, ServiceError> {
    let store = state.require_store().await?;
    let mut athlete = load_athlete(store.as_ref(), id).await?;

    if let Some(name) = request.name {
        athlete.name = name;
    }
    if let Some(sex) = request.sex {
        athlete.sex = sex;
    }
    if let Some(weight) = request.weight {
        athlete.weight = weight;
    }
    if let Some(team_id) = request.team_id {
        load_team(store.as_ref(), &team_id).await?;
        athlete.team_id = team_id;
    }
    check_category(state, &athlete.sex, &athlete.weight)?;

    store
        .save_athlete(AthleteEntity::from(athlete.clone()))
        .await?;

    sse_events::broadcast_athlete_update(state, &athlete);
    Ok(athlete)
}

/// Remove an athlete. Refused while a bout references them.
pub async fn delete_athlete(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    load_athlete(store.as_ref(), id).await?;

    let referenced = store.list_bouts().await?.into_iter().any(|bout| {
        bout.rouge.athlete_id == Some(id) || bout.bleu.athlete_id == Some(id)
    });
    if referenced {
        return Err(ServiceError::InvalidState(format!(
            "athlete `{id}` is engaged in at least one bout"
        )));
    }

    store.delete_athlete(id).await?;
    info!(%id, "athlete deleted");
    sse_events::broadcast_athlete_deleted(state, id);
    Ok(())
}
