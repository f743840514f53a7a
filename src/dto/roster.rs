use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::validation::{validate_sex, validate_team_id};

/// Payload used to register a new club team.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateTeamRequest {
    /// Externally assigned identifier, unique across teams.
    #[validate(custom(function = "validate_team_id"))]
    pub id: String,
    /// Display name.
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    /// Display color tag; `primary` when omitted.
    #[serde(default)]
    pub color: Option<String>,
}

/// Partial team update.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct PatchTeamRequest {
    /// New display name.
    #[serde(default)]
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    /// New color tag.
    #[serde(default)]
    pub color: Option<String>,
}

/// Payload used to register an athlete on a team roster.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateAthleteRequest {
    /// Display name.
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    /// Sex marker, `M` or `F`.
    #[validate(custom(function = "validate_sex"))]
    pub sex: String,
    /// Weight-category code, validated against the configured set for the sex.
    #[validate(length(min = 2, max = 8))]
    pub weight: String,
    /// Owning team id.
    #[validate(custom(function = "validate_team_id"))]
    pub team_id: String,
}

/// Partial athlete update.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct PatchAthleteRequest {
    /// New display name.
    #[serde(default)]
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    /// New sex marker.
    #[serde(default)]
    pub sex: Option<String>,
    /// New weight-category code.
    #[serde(default)]
    pub weight: Option<String>,
    /// New owning team id.
    #[serde(default)]
    pub team_id: Option<String>,
}
