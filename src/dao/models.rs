//! Storage entities and their conversions to/from domain types.
//!
//! Bouts are persisted in the historical denormalized shape with one flat
//! key per score counter and side (`ippon_rouge`, `penalites_bleu`, ...);
//! the engine only ever sees the structured per-corner [`Scoreboard`] form,
//! so the translation happens here and nowhere else. Pools, mats and the
//! bracket are persisted in their domain shape directly.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::engine::{
    Athlete, Team,
    bout::{Bout, BoutState, Corner, FinishReason, Osaekomi, Scoreboard, Side},
};

/// Persisted team record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamEntity {
    /// Externally assigned team id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Display color tag.
    pub color: String,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Team> for TeamEntity {
    fn from(value: Team) -> Self {
        Self {
            id: value.id,
            name: value.name,
            color: value.color,
            created_at: value.created_at,
        }
    }
}

impl From<TeamEntity> for Team {
    fn from(value: TeamEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            color: value.color,
            created_at: value.created_at,
        }
    }
}

/// Persisted athlete record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AthleteEntity {
    /// Unique athlete id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Sex marker, `M` or `F`.
    pub sex: String,
    /// Weight-category code.
    pub weight: String,
    /// Owning team id.
    pub team_id: String,
}

impl From<Athlete> for AthleteEntity {
    fn from(value: Athlete) -> Self {
        Self {
            id: value.id,
            name: value.name,
            sex: value.sex,
            weight: value.weight,
            team_id: value.team_id,
        }
    }
}

impl From<AthleteEntity> for Athlete {
    fn from(value: AthleteEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            sex: value.sex,
            weight: value.weight,
            team_id: value.team_id,
        }
    }
}

/// Corner reference fields stored alongside a bout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CornerRefEntity {
    /// Athlete id, if the athlete still exists.
    pub athlete_id: Option<Uuid>,
    /// Athlete name at bout creation.
    pub name: String,
    /// Owning team id.
    pub team_id: String,
    /// Owning team name at bout creation.
    pub team_name: String,
    /// Weight-category code.
    pub weight: String,
    /// Sex marker.
    pub sex: String,
}

/// Persisted bout record with flat denormalized score keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoutEntity {
    /// Unique bout id.
    pub id: Uuid,
    /// Red corner reference.
    pub rouge: CornerRefEntity,
    /// Blue corner reference.
    pub bleu: CornerRefEntity,
    /// Lifecycle state.
    pub etat: BoutState,
    /// Remaining time in seconds.
    pub timer: i64,
    /// Red full point.
    pub ippon_rouge: bool,
    /// Blue full point.
    pub ippon_bleu: bool,
    /// Red waza-ri count.
    pub wazari_rouge: u8,
    /// Blue waza-ri count.
    pub wazari_bleu: u8,
    /// Red yuko count.
    pub yuko_rouge: u8,
    /// Blue yuko count.
    pub yuko_bleu: u8,
    /// Shido count against red.
    pub penalites_rouge: u8,
    /// Shido count against blue.
    pub penalites_bleu: u8,
    /// Whether a hold is active.
    pub osaekomi_actif: bool,
    /// Side performing the active hold.
    pub osaekomi_cote: Option<Side>,
    /// When the active hold started.
    #[serde(with = "time::serde::rfc3339::option")]
    pub osaekomi_debut: Option<OffsetDateTime>,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Termination timestamp.
    #[serde(with = "time::serde::rfc3339::option")]
    pub finished_at: Option<OffsetDateTime>,
    /// Why the bout terminated.
    pub finish_reason: Option<FinishReason>,
    /// Winning side.
    pub winner: Option<Side>,
}

impl From<Bout> for BoutEntity {
    fn from(value: Bout) -> Self {
        Self {
            id: value.id,
            etat: value.etat,
            timer: value.timer,
            ippon_rouge: value.rouge.score.ippon,
            ippon_bleu: value.bleu.score.ippon,
            wazari_rouge: value.rouge.score.wazari,
            wazari_bleu: value.bleu.score.wazari,
            yuko_rouge: value.rouge.score.yuko,
            yuko_bleu: value.bleu.score.yuko,
            penalites_rouge: value.rouge.score.shido,
            penalites_bleu: value.bleu.score.shido,
            osaekomi_actif: value.osaekomi.is_some(),
            osaekomi_cote: value.osaekomi.map(|hold| hold.side),
            osaekomi_debut: value.osaekomi.map(|hold| hold.started_at),
            created_at: value.created_at,
            finished_at: value.finished_at,
            finish_reason: value.finish_reason,
            winner: value.winner,
            rouge: corner_ref(value.rouge),
            bleu: corner_ref(value.bleu),
        }
    }
}

impl From<BoutEntity> for Bout {
    fn from(value: BoutEntity) -> Self {
        let osaekomi = match (value.osaekomi_actif, value.osaekomi_cote, value.osaekomi_debut) {
            (true, Some(side), Some(started_at)) => Some(Osaekomi { side, started_at }),
            _ => None,
        };
        Self {
            id: value.id,
            rouge: corner(
                value.rouge,
                Scoreboard {
                    ippon: value.ippon_rouge,
                    wazari: value.wazari_rouge,
                    yuko: value.yuko_rouge,
                    shido: value.penalites_rouge,
                },
            ),
            bleu: corner(
                value.bleu,
                Scoreboard {
                    ippon: value.ippon_bleu,
                    wazari: value.wazari_bleu,
                    yuko: value.yuko_bleu,
                    shido: value.penalites_bleu,
                },
            ),
            etat: value.etat,
            timer: value.timer,
            osaekomi,
            created_at: value.created_at,
            finished_at: value.finished_at,
            finish_reason: value.finish_reason,
            winner: value.winner,
        }
    }
}

fn corner_ref(value: Corner) -> CornerRefEntity {
    CornerRefEntity {
        athlete_id: value.athlete_id,
        name: value.name,
        team_id: value.team_id,
        team_name: value.team_name,
        weight: value.weight,
        sex: value.sex,
    }
}

fn corner(value: CornerRefEntity, score: Scoreboard) -> Corner {
    Corner {
        athlete_id: value.athlete_id,
        name: value.name,
        team_id: value.team_id,
        team_name: value.team_name,
        weight: value.weight,
        sex: value.sex,
        score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringRules;
    use crate::engine::bout;

    #[test]
    fn bout_round_trips_through_the_flat_entity_shape() {
        let rules = ScoringRules::default();
        let corner = |team: &str| Corner {
            athlete_id: Some(Uuid::new_v4()),
            name: format!("athlete-{team}"),
            team_id: team.to_owned(),
            team_name: format!("Team {team}"),
            weight: "-66".into(),
            sex: "M".into(),
            score: Scoreboard::default(),
        };
        let mut original = Bout::new(corner("a"), corner("b"), &rules, OffsetDateTime::UNIX_EPOCH);
        original.etat = BoutState::EnCours;
        original = bout::mark_point(
            &original,
            Side::Rouge,
            bout::PointKind::Wazari,
            &rules,
            OffsetDateTime::UNIX_EPOCH,
        )
        .unwrap();
        original = bout::start_osaekomi(&original, Side::Bleu, OffsetDateTime::UNIX_EPOCH).unwrap();

        let entity: BoutEntity = original.clone().into();
        assert_eq!(entity.wazari_rouge, 1);
        assert!(entity.osaekomi_actif);
        assert_eq!(entity.osaekomi_cote, Some(Side::Bleu));

        let restored: Bout = entity.into();
        assert_eq!(restored, original);
    }
}
