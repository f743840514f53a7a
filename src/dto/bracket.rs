use serde::Serialize;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::engine::bracket::{Advancement, MatchWinner, Phase};

/// Payload building the dual elimination bracket.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateBracketRequest {
    /// Team ids entered in the principal bracket.
    #[validate(length(min = 2))]
    pub principal: Vec<String>,
    /// Team ids entered in the consolante bracket; may be empty.
    #[serde(default)]
    pub consolante: Vec<String>,
}

/// Payload sending a bracket match to a mat.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignMatchRequest {
    /// Target mat.
    pub mat_id: Uuid,
}

/// Recomputed score of a bracket match.
#[derive(Debug, Serialize, ToSchema)]
pub struct MatchScoreResponse {
    /// Bout wins credited to slot A.
    pub score_a: u32,
    /// Bout wins credited to slot B.
    pub score_b: u32,
    /// Whether every backing bout is finished.
    pub all_finished: bool,
    /// Winner slot, once decided.
    pub winner: Option<MatchWinner>,
}

/// Result of advancing a decided match.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdvanceResponse {
    /// What the advancement produced: `moved`, `champion`, `bronze_medal`
    /// or `consolante_to_bronze`.
    pub outcome: String,
    /// Round the winner moved into, for `moved` outcomes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_phase: Option<Phase>,
    /// Decided team id, for terminal outcomes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
}

impl From<Advancement> for AdvanceResponse {
    fn from(value: Advancement) -> Self {
        match value {
            Advancement::Moved { next_phase } => Self {
                outcome: "moved".into(),
                next_phase: Some(next_phase),
                team_id: None,
            },
            Advancement::Champion(team_id) => Self {
                outcome: "champion".into(),
                next_phase: None,
                team_id: Some(team_id),
            },
            Advancement::BronzeMedal(team_id) => Self {
                outcome: "bronze_medal".into(),
                next_phase: None,
                team_id: Some(team_id),
            },
            Advancement::ConsolanteToBronze(team_id) => Self {
                outcome: "consolante_to_bronze".into(),
                next_phase: None,
                team_id: Some(team_id),
            },
        }
    }
}
