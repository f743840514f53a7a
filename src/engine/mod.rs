//! Pure tournament domain core.
//!
//! Everything in this module tree is synchronous and side-effect free:
//! operations take references to domain values plus the relevant rules and
//! return updated copies or typed errors. Persistence, broadcasting and
//! logging live in the service layer.

pub mod bout;
pub mod bracket;
pub mod mat;
pub mod standings;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

/// A registered competitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Athlete {
    /// Unique athlete id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Sex marker, `M` or `F`.
    pub sex: String,
    /// Weight-category code, e.g. `-73`.
    pub weight: String,
    /// Id of the owning team.
    pub team_id: String,
}

impl Athlete {
    /// Category key combining sex and weight, e.g. `M--73`.
    pub fn category(&self) -> String {
        format!("{}-{}", self.sex, self.weight)
    }
}

/// A participating team. Ids are human-chosen strings assigned at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Team {
    /// Externally assigned unique id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Display color tag.
    pub color: String,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
