//! Mat (tatami) sequencer: an ordered list of assigned bouts with a bounded
//! current-bout pointer and an append-only history log.

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::ScoringRules;

use super::bout::{Bout, BoutState};

/// Mat availability states (wire values match the floor displays).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum MatState {
    /// No bouts assigned.
    #[serde(rename = "libre")]
    Libre,
    /// Running a confrontation.
    #[serde(rename = "occupé")]
    Occupe,
    /// Temporarily halted.
    #[serde(rename = "pause")]
    Pause,
}

/// Running technical-point totals of the current confrontation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConfrontationScore {
    /// Points for the red side.
    pub rouge: u32,
    /// Points for the blue side.
    pub bleu: u32,
}

/// One entry of a mat's history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HistoryEntry {
    /// When the action happened.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// What happened.
    pub action: String,
    /// Structured details of the action.
    pub detail: serde_json::Value,
}

/// Pointer moves that hit a list boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SequenceError {
    /// The pointer is already on the first bout.
    #[error("already at the first bout")]
    AtFirstBout,
    /// The pointer is already on the last bout.
    #[error("already at the last bout")]
    AtLastBout,
}

/// A competition mat with its assigned bout sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Mat {
    /// Unique mat id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Availability state.
    pub etat: MatState,
    /// Assigned bouts, in running order.
    pub bout_ids: Vec<Uuid>,
    /// Index of the current bout.
    pub current_index: usize,
    /// Running confrontation score.
    pub score: ConfrontationScore,
    /// Append-only action log.
    pub history: Vec<HistoryEntry>,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Mat {
    /// Create a free mat.
    pub fn new(name: &str, now: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            etat: MatState::Libre,
            bout_ids: Vec::new(),
            current_index: 0,
            score: ConfrontationScore::default(),
            history: Vec::new(),
            created_at: now,
        }
    }

    /// Id of the bout under the pointer, if any.
    pub fn current_bout_id(&self) -> Option<Uuid> {
        self.bout_ids.get(self.current_index).copied()
    }

    /// Move the pointer to the next bout.
    pub fn advance(&mut self, now: OffsetDateTime) -> Result<usize, SequenceError> {
        if self.current_index + 1 >= self.bout_ids.len() {
            return Err(SequenceError::AtLastBout);
        }
        let previous = self.current_index;
        self.current_index += 1;
        self.log(
            now,
            "combat_suivant",
            json!({ "from": previous, "to": self.current_index }),
        );
        Ok(self.current_index)
    }

    /// Move the pointer back to the previous bout.
    pub fn retreat(&mut self, now: OffsetDateTime) -> Result<usize, SequenceError> {
        if self.current_index == 0 {
            return Err(SequenceError::AtFirstBout);
        }
        let previous = self.current_index;
        self.current_index -= 1;
        self.log(
            now,
            "combat_precedent",
            json!({ "from": previous, "to": self.current_index }),
        );
        Ok(self.current_index)
    }

    /// Append bouts to the running order and reset the pointer to the start.
    /// Existence of the ids is the caller's check.
    pub fn assign(&mut self, bout_ids: &[Uuid], now: OffsetDateTime) {
        self.bout_ids.extend_from_slice(bout_ids);
        self.current_index = 0;
        self.etat = MatState::Occupe;
        self.log(
            now,
            "assigner_combats",
            json!({ "bout_ids": bout_ids, "count": bout_ids.len() }),
        );
    }

    /// Clear the mat back to its free state.
    pub fn release(&mut self, now: OffsetDateTime) {
        let previous = self.bout_ids.len();
        self.bout_ids.clear();
        self.current_index = 0;
        self.etat = MatState::Libre;
        self.score = ConfrontationScore::default();
        self.log(now, "liberer_tatami", json!({ "previous_bouts": previous }));
    }

    fn log(&mut self, timestamp: OffsetDateTime, action: &str, detail: serde_json::Value) {
        self.history.push(HistoryEntry {
            timestamp,
            action: action.to_owned(),
            detail,
        });
    }
}

/// Sum both corners' technical points over the mat's finished bouts.
pub fn confrontation_score(mat: &Mat, bouts: &[Bout], rules: &ScoringRules) -> ConfrontationScore {
    let mut score = ConfrontationScore::default();
    for bout_id in &mat.bout_ids {
        let Some(bout) = bouts
            .iter()
            .find(|bout| bout.id == *bout_id && bout.etat == BoutState::Termine)
        else {
            continue;
        };
        score.rouge += bout.rouge.score.technical_points(rules);
        score.bleu += bout.bleu.score.technical_points(rules);
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::bout::{Corner, Scoreboard};

    fn now() -> OffsetDateTime {
        OffsetDateTime::UNIX_EPOCH
    }

    fn mat_with(bouts: usize) -> Mat {
        let mut mat = Mat::new("Tatami 1", now());
        let ids: Vec<Uuid> = (0..bouts).map(|_| Uuid::new_v4()).collect();
        mat.assign(&ids, now());
        mat
    }

    #[test]
    fn advance_stops_at_the_last_bout() {
        let mut mat = mat_with(2);
        assert_eq!(mat.advance(now()), Ok(1));
        assert_eq!(mat.advance(now()), Err(SequenceError::AtLastBout));
        assert_eq!(mat.current_index, 1);
    }

    #[test]
    fn retreat_stops_at_the_first_bout() {
        let mut mat = mat_with(2);
        assert_eq!(mat.retreat(now()), Err(SequenceError::AtFirstBout));
        mat.advance(now()).unwrap();
        assert_eq!(mat.retreat(now()), Ok(0));
    }

    #[test]
    fn empty_mat_cannot_advance() {
        let mut mat = Mat::new("Tatami 2", now());
        assert_eq!(mat.advance(now()), Err(SequenceError::AtLastBout));
    }

    #[test]
    fn assign_appends_and_rewinds_the_pointer() {
        let mut mat = mat_with(2);
        mat.advance(now()).unwrap();
        let more: Vec<Uuid> = vec![Uuid::new_v4()];
        mat.assign(&more, now());
        assert_eq!(mat.bout_ids.len(), 3);
        assert_eq!(mat.current_index, 0);
        assert_eq!(mat.etat, MatState::Occupe);
    }

    #[test]
    fn moves_are_logged_in_history() {
        let mut mat = mat_with(2);
        mat.advance(now()).unwrap();
        mat.retreat(now()).unwrap();
        let actions: Vec<&str> = mat.history.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(
            actions,
            vec!["assigner_combats", "combat_suivant", "combat_precedent"]
        );
    }

    #[test]
    fn release_clears_everything() {
        let mut mat = mat_with(3);
        mat.score = ConfrontationScore { rouge: 10, bleu: 1 };
        mat.release(now());
        assert!(mat.bout_ids.is_empty());
        assert_eq!(mat.current_index, 0);
        assert_eq!(mat.etat, MatState::Libre);
        assert_eq!(mat.score, ConfrontationScore::default());
    }

    #[test]
    fn confrontation_score_sums_finished_bouts_only() {
        let rules = ScoringRules::default();
        let corner = |team: &str, score: Scoreboard| Corner {
            athlete_id: Some(Uuid::new_v4()),
            name: team.to_owned(),
            team_id: team.to_owned(),
            team_name: team.to_owned(),
            weight: "-73".into(),
            sex: "M".into(),
            score,
        };
        let wazari = Scoreboard {
            wazari: 1,
            ..Scoreboard::default()
        };
        let yuko = Scoreboard {
            yuko: 2,
            ..Scoreboard::default()
        };

        let mut finished = Bout::new(corner("a", wazari), corner("b", yuko), &rules, now());
        finished.etat = BoutState::Termine;
        let running = Bout::new(corner("a", wazari), corner("b", yuko), &rules, now());

        let mut mat = Mat::new("Tatami 1", now());
        mat.assign(&[finished.id, running.id], now());

        let score = confrontation_score(&mat, &[finished, running], &rules);
        assert_eq!(score, ConfrontationScore { rouge: 10, bleu: 2 });
    }
}
