//! Bout scoring engine.
//!
//! All operations here are pure: they take a bout by reference and return a
//! fresh copy with the change applied, or a typed error. Callers persist the
//! result and publish events; nothing in this module touches storage.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::ScoringRules;

use super::Athlete;

/// One of the two corners of a bout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Side {
    /// The red corner.
    #[serde(rename = "rouge")]
    Rouge,
    /// The blue corner.
    #[serde(rename = "bleu")]
    Bleu,
}

impl Side {
    /// The other corner.
    pub fn opponent(self) -> Side {
        match self {
            Side::Rouge => Side::Bleu,
            Side::Bleu => Side::Rouge,
        }
    }
}

/// Scoring actions a referee can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    /// Full point, ends the bout.
    Ippon,
    /// Half point.
    Wazari,
    /// Minor advantage.
    Yuko,
    /// Penalty, counted against the penalized side.
    Shido,
}

/// Bout lifecycle states (wire values match the scoreboard displays).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum BoutState {
    /// Scheduled, not yet started.
    #[serde(rename = "prévu")]
    Prevu,
    /// Live with the clock running.
    #[serde(rename = "en cours")]
    EnCours,
    /// Live with the clock stopped.
    #[serde(rename = "pause")]
    Pause,
    /// Sudden-death overtime.
    #[serde(rename = "golden_score")]
    GoldenScore,
    /// Finished.
    #[serde(rename = "terminé")]
    Termine,
}

/// Why a bout ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Full point scored.
    Ippon,
    /// Waza-ri count reached the ippon-equivalent threshold.
    DoubleWazari,
    /// Shido count reached the defeat threshold.
    Disqualification,
    /// Regular time expired.
    TempsEcoule,
    /// First advantage in golden score.
    AvantageGoldenScore,
    /// Hold maintained to the ippon threshold.
    OsaekomiIppon,
}

/// Per-side score counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Scoreboard {
    /// Whether a full point has been scored.
    pub ippon: bool,
    /// Waza-ri count.
    pub wazari: u8,
    /// Yuko count.
    pub yuko: u8,
    /// Shido count, against this side.
    pub shido: u8,
}

impl Scoreboard {
    /// Weighted technical point total used for confrontation scoring.
    pub fn technical_points(&self, rules: &ScoringRules) -> u32 {
        let mut points = 0;
        if self.ippon {
            points += rules.points.ippon;
        }
        points += u32::from(self.wazari) * rules.points.wazari;
        points += u32::from(self.yuko) * rules.points.yuko;
        points
    }
}

/// One corner of a bout: the athlete reference plus denormalized display
/// fields that keep the bout readable after roster edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Corner {
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
    /// Live score counters.
    pub score: Scoreboard,
}

impl Corner {
    /// Build a corner snapshot from a roster athlete.
    pub fn from_athlete(athlete: &Athlete, team_name: &str) -> Self {
        Self {
            athlete_id: Some(athlete.id),
            name: athlete.name.clone(),
            team_id: athlete.team_id.clone(),
            team_name: team_name.to_owned(),
            weight: athlete.weight.clone(),
            sex: athlete.sex.clone(),
            score: Scoreboard::default(),
        }
    }
}

/// An active ground hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Osaekomi {
    /// Side performing the hold.
    pub side: Side,
    /// When the hold started.
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
}

/// A single bout between two athletes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Bout {
    /// Unique bout id.
    pub id: Uuid,
    /// Red corner.
    pub rouge: Corner,
    /// Blue corner.
    pub bleu: Corner,
    /// Lifecycle state.
    pub etat: BoutState,
    /// Remaining time in seconds; the clock itself runs on the client.
    pub timer: i64,
    /// Active hold, if any.
    pub osaekomi: Option<Osaekomi>,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Set when the bout terminates.
    #[serde(with = "time::serde::rfc3339::option")]
    pub finished_at: Option<OffsetDateTime>,
    /// Why the bout terminated.
    pub finish_reason: Option<FinishReason>,
    /// Winning side, `None` for a draw.
    pub winner: Option<Side>,
}

impl Bout {
    /// Create a scheduled bout between two corners.
    pub fn new(rouge: Corner, bleu: Corner, rules: &ScoringRules, now: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            rouge,
            bleu,
            etat: BoutState::Prevu,
            timer: i64::from(rules.bout_duration_secs),
            osaekomi: None,
            created_at: now,
            finished_at: None,
            finish_reason: None,
            winner: None,
        }
    }

    /// The corner for `side`.
    pub fn corner(&self, side: Side) -> &Corner {
        match side {
            Side::Rouge => &self.rouge,
            Side::Bleu => &self.bleu,
        }
    }

    /// Mutable access to the corner for `side`.
    pub fn corner_mut(&mut self, side: Side) -> &mut Corner {
        match side {
            Side::Rouge => &mut self.rouge,
            Side::Bleu => &mut self.bleu,
        }
    }

    /// Which side a team occupies in this bout, if either.
    pub fn side_of_team(&self, team_id: &str) -> Option<Side> {
        if self.rouge.team_id == team_id {
            Some(Side::Rouge)
        } else if self.bleu.team_id == team_id {
            Some(Side::Bleu)
        } else {
            None
        }
    }
}

/// Typed failures of the scoring engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoringError {
    /// The bout is already finished.
    #[error("bout is already finished")]
    Finished,
    /// The operation needs a live bout.
    #[error("bout is not live")]
    NotLive,
    /// No hold is active on the bout.
    #[error("no active osaekomi")]
    NoActiveHold,
    /// The requested score conversion does not exist.
    #[error("cannot convert {from:?} into {to:?}")]
    InvalidConversion {
        /// Source counter.
        from: PointKind,
        /// Target counter.
        to: PointKind,
    },
    /// The conversion source counter is empty.
    #[error("no {from:?} available to convert")]
    EmptySource {
        /// Source counter.
        from: PointKind,
    },
}

/// Score corrections a table official can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "operation", rename_all = "lowercase")]
pub enum Correction {
    /// Remove one unit of a score, flooring at zero.
    Retirer {
        /// Counter to decrement.
        kind: PointKind,
    },
    /// Downgrade a score into a lesser one.
    Convertir {
        /// Source counter, must be nonzero.
        from: PointKind,
        /// Target counter.
        to: PointKind,
    },
    /// Zero every counter of one side.
    Raz,
}

/// Outcome of releasing an osaekomi hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsaekomiOutcome {
    /// The bout with the hold converted into points.
    pub bout: Bout,
    /// Scores the hold produced, in award order.
    pub points_awarded: Vec<PointKind>,
    /// Whether the hold terminated the bout.
    pub finished: bool,
}

/// Record a scoring action for `side` and auto-finish the bout when the
/// resulting position is terminal. A shido is booked against the side passed
/// in, so callers pass the penalized side.
pub fn mark_point(
    bout: &Bout,
    side: Side,
    kind: PointKind,
    rules: &ScoringRules,
    now: OffsetDateTime,
) -> Result<Bout, ScoringError> {
    if bout.etat == BoutState::Termine {
        return Err(ScoringError::Finished);
    }

    let mut updated = bout.clone();
    let score = &mut updated.corner_mut(side).score;
    match kind {
        PointKind::Ippon => score.ippon = true,
        PointKind::Wazari => score.wazari += 1,
        PointKind::Yuko => score.yuko += 1,
        PointKind::Shido => score.shido += 1,
    }

    if let Some(reason) = check_auto_finish(&updated, rules) {
        finish(&mut updated, reason, rules, now);
    }
    Ok(updated)
}

/// Whether the bout has reached a terminal position, and why.
///
/// Rules are checked in fixed priority order; the function is pure and
/// idempotent, so re-checking an already terminal position yields the same
/// reason.
pub fn check_auto_finish(bout: &Bout, rules: &ScoringRules) -> Option<FinishReason> {
    let rouge = &bout.rouge.score;
    let bleu = &bout.bleu.score;

    if rouge.ippon || bleu.ippon {
        return Some(FinishReason::Ippon);
    }
    if rouge.wazari >= rules.wazari_for_ippon || bleu.wazari >= rules.wazari_for_ippon {
        return Some(FinishReason::DoubleWazari);
    }
    if rouge.shido >= rules.shido_for_defeat || bleu.shido >= rules.shido_for_defeat {
        return Some(FinishReason::Disqualification);
    }
    if bout.timer <= 0 && bout.etat == BoutState::EnCours {
        return Some(FinishReason::TempsEcoule);
    }
    if bout.etat == BoutState::GoldenScore
        && (rouge.wazari > 0 || bleu.wazari > 0 || rouge.yuko > 0 || bleu.yuko > 0)
    {
        return Some(FinishReason::AvantageGoldenScore);
    }
    None
}

/// Decide the winner of a finished bout.
///
/// The ladder compares score classes in strict priority, never a weighted
/// total: ippon, waza-ri threshold, opponent disqualified on shido, strict
/// waza-ri advantage, strict yuko advantage. Returns `None` for a draw, and
/// always `None` while the bout is not finished.
pub fn determine_winner(bout: &Bout, rules: &ScoringRules) -> Option<Side> {
    if bout.etat != BoutState::Termine {
        return None;
    }

    let rouge = &bout.rouge.score;
    let bleu = &bout.bleu.score;

    if rouge.ippon {
        return Some(Side::Rouge);
    }
    if bleu.ippon {
        return Some(Side::Bleu);
    }

    if rouge.wazari >= rules.wazari_for_ippon {
        return Some(Side::Rouge);
    }
    if bleu.wazari >= rules.wazari_for_ippon {
        return Some(Side::Bleu);
    }

    // A disqualifying shido count gives the win to the opponent.
    if bleu.shido >= rules.shido_for_defeat {
        return Some(Side::Rouge);
    }
    if rouge.shido >= rules.shido_for_defeat {
        return Some(Side::Bleu);
    }

    if rouge.wazari != bleu.wazari {
        return Some(if rouge.wazari > bleu.wazari {
            Side::Rouge
        } else {
            Side::Bleu
        });
    }
    if rouge.yuko != bleu.yuko {
        return Some(if rouge.yuko > bleu.yuko {
            Side::Rouge
        } else {
            Side::Bleu
        });
    }

    None
}

/// Start a hold for `side`. The bout must be live with the clock running.
pub fn start_osaekomi(
    bout: &Bout,
    side: Side,
    now: OffsetDateTime,
) -> Result<Bout, ScoringError> {
    if bout.etat == BoutState::Termine {
        return Err(ScoringError::Finished);
    }
    if bout.etat != BoutState::EnCours {
        return Err(ScoringError::NotLive);
    }
    let mut updated = bout.clone();
    updated.osaekomi = Some(Osaekomi {
        side,
        started_at: now,
    });
    Ok(updated)
}

/// Release the active hold and convert its duration into points.
pub fn stop_osaekomi(
    bout: &Bout,
    duration_secs: u32,
    rules: &ScoringRules,
    now: OffsetDateTime,
) -> Result<OsaekomiOutcome, ScoringError> {
    let hold = bout.osaekomi.ok_or(ScoringError::NoActiveHold)?;
    let mut outcome = apply_osaekomi(duration_secs, bout, hold.side, rules, now);
    outcome.bout.osaekomi = None;
    Ok(outcome)
}

/// Convert a hold of `duration_secs` by `side` into points.
///
/// At the ippon threshold the bout terminates with `osaekomi_ippon` and prior
/// scores are left untouched. At the waza-ri threshold the hold's own yuko
/// (earned when it crossed the yuko threshold) is converted into the waza-ri,
/// so the yuko counter is unchanged net; the bout terminates if the waza-ri
/// count reaches the ippon-equivalent threshold. At the yuko threshold a
/// single yuko is awarded. Shorter holds score nothing.
pub fn apply_osaekomi(
    duration_secs: u32,
    bout: &Bout,
    side: Side,
    rules: &ScoringRules,
    now: OffsetDateTime,
) -> OsaekomiOutcome {
    let mut updated = bout.clone();
    let mut points_awarded = Vec::new();

    if duration_secs >= rules.osaekomi.ippon {
        updated.corner_mut(side).score.ippon = true;
        points_awarded.push(PointKind::Ippon);
        updated.etat = BoutState::Termine;
        updated.finished_at = Some(now);
        updated.finish_reason = Some(FinishReason::OsaekomiIppon);
        updated.winner = Some(side);
    } else if duration_secs >= rules.osaekomi.wazari {
        // The hold produced one yuko on its way to the waza-ri; that yuko is
        // the one consumed by the conversion, so the counter stays put.
        let score = &mut updated.corner_mut(side).score;
        score.wazari += 1;
        points_awarded.push(PointKind::Wazari);

        if score.wazari >= rules.wazari_for_ippon {
            updated.etat = BoutState::Termine;
            updated.finished_at = Some(now);
            updated.finish_reason = Some(FinishReason::DoubleWazari);
            updated.winner = Some(side);
        }
    } else if duration_secs >= rules.osaekomi.yuko {
        updated.corner_mut(side).score.yuko += 1;
        points_awarded.push(PointKind::Yuko);
    }

    let finished = updated.etat == BoutState::Termine;
    OsaekomiOutcome {
        bout: updated,
        points_awarded,
        finished,
    }
}

/// Apply a table-official correction to `side`.
///
/// Corrections are always permitted; applying one to a finished bout reopens
/// it in `pause` with the finish metadata cleared, so it can be re-finished
/// under the corrected score.
pub fn apply_correction(
    bout: &Bout,
    side: Side,
    correction: Correction,
) -> Result<Bout, ScoringError> {
    let mut updated = bout.clone();

    {
        let score = &mut updated.corner_mut(side).score;
        match correction {
            Correction::Retirer { kind } => match kind {
                PointKind::Ippon => score.ippon = false,
                PointKind::Wazari => score.wazari = score.wazari.saturating_sub(1),
                PointKind::Yuko => score.yuko = score.yuko.saturating_sub(1),
                PointKind::Shido => score.shido = score.shido.saturating_sub(1),
            },
            Correction::Convertir { from, to } => match (from, to) {
                (PointKind::Ippon, PointKind::Wazari) => {
                    if !score.ippon {
                        return Err(ScoringError::EmptySource { from });
                    }
                    score.ippon = false;
                    score.wazari += 1;
                }
                (PointKind::Ippon, PointKind::Yuko) => {
                    if !score.ippon {
                        return Err(ScoringError::EmptySource { from });
                    }
                    score.ippon = false;
                    score.yuko += 1;
                }
                (PointKind::Wazari, PointKind::Yuko) => {
                    if score.wazari == 0 {
                        return Err(ScoringError::EmptySource { from });
                    }
                    score.wazari -= 1;
                    score.yuko += 1;
                }
                (from, to) => return Err(ScoringError::InvalidConversion { from, to }),
            },
            Correction::Raz => *score = Scoreboard::default(),
        }
    }

    if bout.etat == BoutState::Termine {
        updated.etat = BoutState::Pause;
        updated.finished_at = None;
        updated.finish_reason = None;
        updated.winner = None;
    }

    Ok(updated)
}

/// Return the bout to its pristine scheduled state.
pub fn reset(bout: &Bout, rules: &ScoringRules) -> Bout {
    let mut updated = bout.clone();
    updated.rouge.score = Scoreboard::default();
    updated.bleu.score = Scoreboard::default();
    updated.etat = BoutState::Prevu;
    updated.timer = i64::from(rules.bout_duration_secs);
    updated.osaekomi = None;
    updated.finished_at = None;
    updated.finish_reason = None;
    updated.winner = None;
    updated
}

/// Mark the bout finished for `reason` and decide the winner.
pub fn finish(bout: &mut Bout, reason: FinishReason, rules: &ScoringRules, now: OffsetDateTime) {
    bout.etat = BoutState::Termine;
    bout.finished_at = Some(now);
    bout.finish_reason = Some(reason);
    bout.winner = determine_winner(bout, rules);
}

/// Pair two rosters for a team confrontation: one bout per weight/sex
/// category present on both sides, first registered athlete of each.
pub fn shared_category_pairs<'a>(
    team_a: &'a [Athlete],
    team_b: &'a [Athlete],
) -> Vec<(&'a Athlete, &'a Athlete)> {
    let mut pairs = Vec::new();
    let mut seen = Vec::new();

    for athlete_a in team_a {
        let category = athlete_a.category();
        if seen.contains(&category) {
            continue;
        }
        if let Some(athlete_b) = team_b.iter().find(|b| b.category() == category) {
            pairs.push((athlete_a, athlete_b));
            seen.push(category);
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> ScoringRules {
        ScoringRules::default()
    }

    fn now() -> OffsetDateTime {
        OffsetDateTime::UNIX_EPOCH
    }

    fn corner(team_id: &str) -> Corner {
        Corner {
            athlete_id: Some(Uuid::new_v4()),
            name: format!("athlete-{team_id}"),
            team_id: team_id.to_owned(),
            team_name: format!("Team {team_id}"),
            weight: "-73".into(),
            sex: "M".into(),
            score: Scoreboard::default(),
        }
    }

    fn live_bout() -> Bout {
        let mut bout = Bout::new(corner("a"), corner("b"), &rules(), now());
        bout.etat = BoutState::EnCours;
        bout
    }

    #[test]
    fn ippon_finishes_and_wins_immediately() {
        let bout = live_bout();
        let updated = mark_point(&bout, Side::Rouge, PointKind::Ippon, &rules(), now()).unwrap();
        assert_eq!(updated.etat, BoutState::Termine);
        assert_eq!(updated.finish_reason, Some(FinishReason::Ippon));
        assert_eq!(updated.winner, Some(Side::Rouge));
        assert!(updated.finished_at.is_some());
    }

    #[test]
    fn double_wazari_equals_ippon() {
        let bout = live_bout();
        let bout = mark_point(&bout, Side::Bleu, PointKind::Wazari, &rules(), now()).unwrap();
        assert_eq!(bout.etat, BoutState::EnCours);
        let bout = mark_point(&bout, Side::Bleu, PointKind::Wazari, &rules(), now()).unwrap();
        assert_eq!(bout.etat, BoutState::Termine);
        assert_eq!(bout.finish_reason, Some(FinishReason::DoubleWazari));
        assert_eq!(bout.winner, Some(Side::Bleu));
    }

    #[test]
    fn third_shido_disqualifies_and_opponent_wins() {
        let mut bout = live_bout();
        for _ in 0..2 {
            bout = mark_point(&bout, Side::Rouge, PointKind::Shido, &rules(), now()).unwrap();
        }
        // Rouge is otherwise ahead on the board.
        bout = mark_point(&bout, Side::Rouge, PointKind::Wazari, &rules(), now()).unwrap();
        bout = mark_point(&bout, Side::Rouge, PointKind::Shido, &rules(), now()).unwrap();
        assert_eq!(bout.finish_reason, Some(FinishReason::Disqualification));
        assert_eq!(bout.winner, Some(Side::Bleu));
    }

    #[test]
    fn mark_point_rejects_finished_bout() {
        let bout = live_bout();
        let finished = mark_point(&bout, Side::Rouge, PointKind::Ippon, &rules(), now()).unwrap();
        let err = mark_point(&finished, Side::Bleu, PointKind::Yuko, &rules(), now()).unwrap_err();
        assert_eq!(err, ScoringError::Finished);
    }

    #[test]
    fn timer_zero_only_finishes_running_bout() {
        let mut bout = live_bout();
        bout.timer = 0;
        assert_eq!(
            check_auto_finish(&bout, &rules()),
            Some(FinishReason::TempsEcoule)
        );
        bout.etat = BoutState::Pause;
        assert_eq!(check_auto_finish(&bout, &rules()), None);
    }

    #[test]
    fn golden_score_first_advantage_wins() {
        let mut bout = live_bout();
        bout.etat = BoutState::GoldenScore;
        let updated = mark_point(&bout, Side::Bleu, PointKind::Yuko, &rules(), now()).unwrap();
        assert_eq!(
            updated.finish_reason,
            Some(FinishReason::AvantageGoldenScore)
        );
        assert_eq!(updated.winner, Some(Side::Bleu));
    }

    #[test]
    fn golden_score_shido_alone_does_not_end_it() {
        let mut bout = live_bout();
        bout.etat = BoutState::GoldenScore;
        let updated = mark_point(&bout, Side::Rouge, PointKind::Shido, &rules(), now()).unwrap();
        assert_eq!(updated.etat, BoutState::GoldenScore);
    }

    #[test]
    fn auto_finish_is_idempotent() {
        let bout = live_bout();
        let finished = mark_point(&bout, Side::Rouge, PointKind::Ippon, &rules(), now()).unwrap();
        assert_eq!(
            check_auto_finish(&finished, &rules()),
            Some(FinishReason::Ippon)
        );
        assert_eq!(
            check_auto_finish(&finished, &rules()),
            Some(FinishReason::Ippon)
        );
    }

    #[test]
    fn winner_ladder_yuko_breaks_wazari_tie_only() {
        let mut bout = live_bout();
        bout.etat = BoutState::Termine;
        bout.rouge.score.wazari = 1;
        bout.bleu.score.wazari = 1;
        bout.bleu.score.yuko = 2;
        assert_eq!(determine_winner(&bout, &rules()), Some(Side::Bleu));

        // A wazari advantage beats any yuko count.
        bout.rouge.score.wazari = 1;
        bout.bleu.score.wazari = 0;
        bout.bleu.score.yuko = 5;
        assert_eq!(determine_winner(&bout, &rules()), Some(Side::Rouge));
    }

    #[test]
    fn equal_boards_is_a_draw() {
        let mut bout = live_bout();
        bout.etat = BoutState::Termine;
        bout.rouge.score.yuko = 1;
        bout.bleu.score.yuko = 1;
        assert_eq!(determine_winner(&bout, &rules()), None);
    }

    #[test]
    fn winner_is_none_before_termination() {
        let mut bout = live_bout();
        bout.rouge.score.wazari = 1;
        assert_eq!(determine_winner(&bout, &rules()), None);
    }

    #[test]
    fn osaekomi_below_yuko_threshold_scores_nothing() {
        let bout = live_bout();
        let outcome = apply_osaekomi(9, &bout, Side::Rouge, &rules(), now());
        assert!(outcome.points_awarded.is_empty());
        assert_eq!(outcome.bout, bout);
    }

    #[test]
    fn osaekomi_at_yuko_threshold_awards_one_yuko() {
        let bout = live_bout();
        let outcome = apply_osaekomi(10, &bout, Side::Rouge, &rules(), now());
        assert_eq!(outcome.points_awarded, vec![PointKind::Yuko]);
        assert_eq!(outcome.bout.rouge.score.yuko, 1);
        assert!(!outcome.finished);
    }

    #[test]
    fn osaekomi_wazari_keeps_yuko_counter_unchanged() {
        let mut bout = live_bout();
        bout.rouge.score.yuko = 2;
        let outcome = apply_osaekomi(15, &bout, Side::Rouge, &rules(), now());
        assert_eq!(outcome.points_awarded, vec![PointKind::Wazari]);
        assert_eq!(outcome.bout.rouge.score.wazari, 1);
        assert_eq!(outcome.bout.rouge.score.yuko, 2);
        assert!(!outcome.finished);
    }

    #[test]
    fn osaekomi_wazari_can_complete_double_wazari() {
        let mut bout = live_bout();
        bout.bleu.score.wazari = 1;
        let outcome = apply_osaekomi(15, &bout, Side::Bleu, &rules(), now());
        assert!(outcome.finished);
        assert_eq!(
            outcome.bout.finish_reason,
            Some(FinishReason::DoubleWazari)
        );
        assert_eq!(outcome.bout.winner, Some(Side::Bleu));
    }

    #[test]
    fn osaekomi_ippon_terminates_and_keeps_prior_scores() {
        let mut bout = live_bout();
        bout.rouge.score.wazari = 1;
        bout.rouge.score.yuko = 1;
        let outcome = apply_osaekomi(20, &bout, Side::Rouge, &rules(), now());
        assert!(outcome.finished);
        assert_eq!(
            outcome.bout.finish_reason,
            Some(FinishReason::OsaekomiIppon)
        );
        assert_eq!(outcome.bout.winner, Some(Side::Rouge));
        assert!(outcome.bout.rouge.score.ippon);
        assert_eq!(outcome.bout.rouge.score.wazari, 1);
        assert_eq!(outcome.bout.rouge.score.yuko, 1);
    }

    #[test]
    fn start_osaekomi_requires_running_bout() {
        let mut bout = live_bout();
        bout.etat = BoutState::Pause;
        assert_eq!(
            start_osaekomi(&bout, Side::Rouge, now()).unwrap_err(),
            ScoringError::NotLive
        );
        bout.etat = BoutState::EnCours;
        let held = start_osaekomi(&bout, Side::Rouge, now()).unwrap();
        assert_eq!(held.osaekomi.map(|o| o.side), Some(Side::Rouge));
    }

    #[test]
    fn stop_osaekomi_requires_active_hold() {
        let bout = live_bout();
        assert_eq!(
            stop_osaekomi(&bout, 12, &rules(), now()).unwrap_err(),
            ScoringError::NoActiveHold
        );
        let held = start_osaekomi(&bout, Side::Bleu, now()).unwrap();
        let outcome = stop_osaekomi(&held, 12, &rules(), now()).unwrap();
        assert!(outcome.bout.osaekomi.is_none());
        assert_eq!(outcome.bout.bleu.score.yuko, 1);
    }

    #[test]
    fn correction_reopens_finished_bout_in_pause() {
        let bout = live_bout();
        let finished = mark_point(&bout, Side::Rouge, PointKind::Ippon, &rules(), now()).unwrap();
        let reopened = apply_correction(
            &finished,
            Side::Rouge,
            Correction::Retirer {
                kind: PointKind::Ippon,
            },
        )
        .unwrap();
        assert_eq!(reopened.etat, BoutState::Pause);
        assert!(reopened.finished_at.is_none());
        assert!(reopened.finish_reason.is_none());
        assert!(reopened.winner.is_none());
        assert!(!reopened.rouge.score.ippon);
    }

    #[test]
    fn raz_clears_one_side_only() {
        let mut bout = live_bout();
        bout.rouge.score.wazari = 1;
        bout.rouge.score.shido = 2;
        bout.bleu.score.yuko = 1;
        let updated = apply_correction(&bout, Side::Rouge, Correction::Raz).unwrap();
        assert_eq!(updated.rouge.score, Scoreboard::default());
        assert_eq!(updated.bleu.score.yuko, 1);
    }

    #[test]
    fn retirer_floors_at_zero() {
        let bout = live_bout();
        let updated = apply_correction(
            &bout,
            Side::Bleu,
            Correction::Retirer {
                kind: PointKind::Wazari,
            },
        )
        .unwrap();
        assert_eq!(updated.bleu.score.wazari, 0);
    }

    #[test]
    fn conversions_are_downgrades_only() {
        let mut bout = live_bout();
        bout.rouge.score.wazari = 1;
        let updated = apply_correction(
            &bout,
            Side::Rouge,
            Correction::Convertir {
                from: PointKind::Wazari,
                to: PointKind::Yuko,
            },
        )
        .unwrap();
        assert_eq!(updated.rouge.score.wazari, 0);
        assert_eq!(updated.rouge.score.yuko, 1);

        let err = apply_correction(
            &bout,
            Side::Rouge,
            Correction::Convertir {
                from: PointKind::Yuko,
                to: PointKind::Wazari,
            },
        )
        .unwrap_err();
        assert!(matches!(err, ScoringError::InvalidConversion { .. }));

        let err = apply_correction(
            &bout,
            Side::Bleu,
            Correction::Convertir {
                from: PointKind::Ippon,
                to: PointKind::Wazari,
            },
        )
        .unwrap_err();
        assert!(matches!(err, ScoringError::EmptySource { .. }));
    }

    #[test]
    fn reset_restores_scheduled_state() {
        let bout = live_bout();
        let finished = mark_point(&bout, Side::Rouge, PointKind::Ippon, &rules(), now()).unwrap();
        let fresh = reset(&finished, &rules());
        assert_eq!(fresh.etat, BoutState::Prevu);
        assert_eq!(fresh.timer, i64::from(rules().bout_duration_secs));
        assert_eq!(fresh.rouge.score, Scoreboard::default());
        assert!(fresh.finish_reason.is_none());
        assert!(fresh.winner.is_none());
    }

    #[test]
    fn shared_category_pairs_matches_sex_and_weight() {
        let make = |team: &str, sex: &str, weight: &str| Athlete {
            id: Uuid::new_v4(),
            name: format!("{team}-{sex}{weight}"),
            sex: sex.into(),
            weight: weight.into(),
            team_id: team.into(),
        };
        let team_a = vec![
            make("a", "M", "-73"),
            make("a", "M", "-73"),
            make("a", "F", "-57"),
            make("a", "M", "-90"),
        ];
        let team_b = vec![make("b", "M", "-73"), make("b", "F", "-57")];

        let pairs = shared_category_pairs(&team_a, &team_b);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0.name, "a-M-73");
        assert_eq!(pairs[0].1.name, "b-M-73");
        assert_eq!(pairs[1].0.weight, "-57");
    }

    #[test]
    fn technical_points_use_configured_weights() {
        let score = Scoreboard {
            ippon: true,
            wazari: 2,
            yuko: 3,
            shido: 1,
        };
        assert_eq!(score.technical_points(&rules()), 100 + 20 + 3);
    }
}
