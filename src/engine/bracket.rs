//! Dual single-elimination bracket: a principal draw whose semifinal losers
//! drop into two bronze matches, and a consolante draw whose finalists fill
//! the other bronze slots.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::ScoringRules;

use super::bout::{self, Bout, BoutState, Side};

/// Elimination rounds, earliest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Round of 32.
    Seizieme,
    /// Round of 16.
    Huitieme,
    /// Quarterfinals.
    Quart,
    /// Semifinals.
    Demi,
    /// Final.
    Finale,
}

impl Phase {
    /// The next round, `None` after the final.
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Seizieme => Some(Phase::Huitieme),
            Phase::Huitieme => Some(Phase::Quart),
            Phase::Quart => Some(Phase::Demi),
            Phase::Demi => Some(Phase::Finale),
            Phase::Finale => None,
        }
    }

    /// Number of matches the round holds in a full bracket.
    fn capacity(self) -> usize {
        match self {
            Phase::Seizieme => 16,
            Phase::Huitieme => 8,
            Phase::Quart => 4,
            Phase::Demi => 2,
            Phase::Finale => 1,
        }
    }

    /// Starting round for an entry list of `team_count` teams.
    pub fn start_for(team_count: usize) -> Phase {
        if team_count <= 2 {
            Phase::Finale
        } else if team_count <= 4 {
            Phase::Demi
        } else if team_count <= 8 {
            Phase::Quart
        } else if team_count <= 16 {
            Phase::Huitieme
        } else {
            Phase::Seizieme
        }
    }
}

/// Which draw a match belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BracketKind {
    /// Main draw.
    Principal,
    /// Repechage draw.
    Consolante,
    /// The two bronze-medal matches.
    Bronze,
}

/// Which slot of a match won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum MatchWinner {
    /// Slot A.
    A,
    /// Slot B.
    B,
}

/// A single elimination match. Ids are 1-based within their round; the
/// advancement arithmetic depends on that numbering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BracketMatch {
    /// 1-based id within the round.
    pub id: u32,
    /// Team in slot A, filled by the draw or by advancement.
    pub team_a: Option<String>,
    /// Team in slot B.
    pub team_b: Option<String>,
    /// Bout wins credited to slot A.
    pub score_a: u32,
    /// Bout wins credited to slot B.
    pub score_b: u32,
    /// Decided winner slot.
    pub winner: Option<MatchWinner>,
    /// Whether the match is a bye (one empty slot, auto-resolved).
    pub has_bye: bool,
    /// Backing bouts, attached at mat assignment.
    pub bout_ids: Vec<Uuid>,
    /// Whether bouts have been generated and assigned.
    pub assigned: bool,
    /// Mat the match was assigned to.
    pub mat_id: Option<Uuid>,
    /// When the match score was completed.
    #[serde(with = "time::serde::rfc3339::option")]
    pub finished_at: Option<OffsetDateTime>,
}

impl BracketMatch {
    fn empty(id: u32) -> Self {
        Self {
            id,
            team_a: None,
            team_b: None,
            score_a: 0,
            score_b: 0,
            winner: None,
            has_bye: false,
            bout_ids: Vec::new(),
            assigned: false,
            mat_id: None,
            finished_at: None,
        }
    }

    /// The team occupying the winning slot.
    pub fn winning_team(&self) -> Option<&String> {
        match self.winner? {
            MatchWinner::A => self.team_a.as_ref(),
            MatchWinner::B => self.team_b.as_ref(),
        }
    }

    /// The team occupying the losing slot.
    pub fn losing_team(&self) -> Option<&String> {
        match self.winner? {
            MatchWinner::A => self.team_b.as_ref(),
            MatchWinner::B => self.team_a.as_ref(),
        }
    }
}

/// One draw: a match list per round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BracketSide {
    /// Round of 32 matches.
    pub seizieme: Vec<BracketMatch>,
    /// Round of 16 matches.
    pub huitieme: Vec<BracketMatch>,
    /// Quarterfinal matches.
    pub quart: Vec<BracketMatch>,
    /// Semifinal matches.
    pub demi: Vec<BracketMatch>,
    /// The final.
    pub finale: Vec<BracketMatch>,
}

impl BracketSide {
    /// The matches of one round.
    pub fn phase(&self, phase: Phase) -> &Vec<BracketMatch> {
        match phase {
            Phase::Seizieme => &self.seizieme,
            Phase::Huitieme => &self.huitieme,
            Phase::Quart => &self.quart,
            Phase::Demi => &self.demi,
            Phase::Finale => &self.finale,
        }
    }

    /// Mutable access to every round, earliest first.
    pub fn rounds_mut(&mut self) -> impl Iterator<Item = &mut Vec<BracketMatch>> {
        [
            &mut self.seizieme,
            &mut self.huitieme,
            &mut self.quart,
            &mut self.demi,
            &mut self.finale,
        ]
        .into_iter()
    }

    fn phase_mut(&mut self, phase: Phase) -> &mut Vec<BracketMatch> {
        match phase {
            Phase::Seizieme => &mut self.seizieme,
            Phase::Huitieme => &mut self.huitieme,
            Phase::Quart => &mut self.quart,
            Phase::Demi => &mut self.demi,
            Phase::Finale => &mut self.finale,
        }
    }

    /// Build a draw from an already-shuffled entry list. An odd entry count
    /// is padded with a bye that resolves immediately; later rounds are
    /// pre-created empty at full capacity.
    pub fn build(teams: &[String]) -> Self {
        let mut side = Self::default();
        if teams.is_empty() {
            return side;
        }
        let start = Phase::start_for(teams.len());

        let mut slots: Vec<Option<String>> = teams.iter().cloned().map(Some).collect();
        if slots.len() % 2 != 0 {
            slots.push(None);
        }

        let matches = side.phase_mut(start);
        for (index, pair) in slots.chunks(2).enumerate() {
            let team_a = pair[0].clone();
            let team_b = pair.get(1).cloned().flatten();
            let has_bye = team_a.is_none() || team_b.is_none();
            let winner = if team_a.is_none() {
                Some(MatchWinner::B)
            } else if team_b.is_none() {
                Some(MatchWinner::A)
            } else {
                None
            };
            matches.push(BracketMatch {
                id: index as u32 + 1,
                team_a,
                team_b,
                winner,
                has_bye,
                assigned: has_bye,
                ..BracketMatch::empty(index as u32 + 1)
            });
        }

        let mut current = start;
        while let Some(next) = current.next() {
            *side.phase_mut(next) = (1..=next.capacity() as u32)
                .map(BracketMatch::empty)
                .collect();
            current = next;
        }
        side
    }
}

/// The full competition bracket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Bracket {
    /// Main draw.
    pub principal: BracketSide,
    /// Repechage draw.
    pub consolante: BracketSide,
    /// The two bronze-medal matches.
    pub bronze: Vec<BracketMatch>,
}

impl Bracket {
    /// Build the dual bracket from already-shuffled entry lists. The
    /// consolante needs at least two entries to get a draw; the two bronze
    /// matches start empty and fill via advancement.
    pub fn build(principal: &[String], consolante: &[String]) -> Self {
        Self {
            principal: BracketSide::build(principal),
            consolante: if consolante.len() >= 2 {
                BracketSide::build(consolante)
            } else {
                BracketSide::default()
            },
            bronze: vec![BracketMatch::empty(1), BracketMatch::empty(2)],
        }
    }

    /// Look up a match. Bronze matches ignore the phase.
    pub fn find_match(&self, kind: BracketKind, phase: Phase, id: u32) -> Option<&BracketMatch> {
        match kind {
            BracketKind::Bronze => self.bronze.iter().find(|m| m.id == id),
            BracketKind::Principal => self.principal.phase(phase).iter().find(|m| m.id == id),
            BracketKind::Consolante => self.consolante.phase(phase).iter().find(|m| m.id == id),
        }
    }

    /// Mutable match lookup.
    pub fn find_match_mut(
        &mut self,
        kind: BracketKind,
        phase: Phase,
        id: u32,
    ) -> Option<&mut BracketMatch> {
        match kind {
            BracketKind::Bronze => self.bronze.iter_mut().find(|m| m.id == id),
            BracketKind::Principal => self
                .principal
                .phase_mut(phase)
                .iter_mut()
                .find(|m| m.id == id),
            BracketKind::Consolante => self
                .consolante
                .phase_mut(phase)
                .iter_mut()
                .find(|m| m.id == id),
        }
    }
}

/// Typed failures of bracket operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketError {
    /// No match with the requested coordinates.
    #[error("match not found")]
    MatchNotFound,
    /// The match has a bye and needs no bouts.
    #[error("match has a bye and resolves automatically")]
    ByeMatch,
    /// A slot of the match is still empty.
    #[error("match is missing a team")]
    IncompleteMatch,
    /// Advancement requires a decided winner.
    #[error("no winner decided yet")]
    NoWinner,
}

/// A recomputed match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct MatchScore {
    /// Bout wins for slot A.
    pub score_a: u32,
    /// Bout wins for slot B.
    pub score_b: u32,
    /// Whether every backing bout is finished.
    pub all_finished: bool,
}

/// Recompute a match score from its backing bouts: one point per bout win,
/// bouts oriented by comparing the rouge corner's team with slot A. When all
/// backing bouts are finished and no winner is set yet, the winner and the
/// completion stamp are written onto the match (`None` winner on a tie).
pub fn score_match(
    bracket_match: &mut BracketMatch,
    bouts: &[Bout],
    rules: &ScoringRules,
    now: OffsetDateTime,
) -> MatchScore {
    if bracket_match.has_bye {
        return MatchScore {
            score_a: 0,
            score_b: 0,
            all_finished: true,
        };
    }
    if bracket_match.bout_ids.is_empty() {
        return MatchScore {
            score_a: 0,
            score_b: 0,
            all_finished: false,
        };
    }

    let mut score_a = 0;
    let mut score_b = 0;
    let mut all_finished = true;

    for bout_id in &bracket_match.bout_ids {
        let Some(bout) = bouts
            .iter()
            .find(|bout| bout.id == *bout_id && bout.etat == BoutState::Termine)
        else {
            all_finished = false;
            continue;
        };

        let rouge_is_a = Some(&bout.rouge.team_id) == bracket_match.team_a.as_ref();
        match bout::determine_winner(bout, rules) {
            Some(Side::Rouge) if rouge_is_a => score_a += 1,
            Some(Side::Rouge) => score_b += 1,
            Some(Side::Bleu) if rouge_is_a => score_b += 1,
            Some(Side::Bleu) => score_a += 1,
            None => {}
        }
    }

    if all_finished && bracket_match.winner.is_none() {
        bracket_match.score_a = score_a;
        bracket_match.score_b = score_b;
        bracket_match.winner = if score_a > score_b {
            Some(MatchWinner::A)
        } else if score_b > score_a {
            Some(MatchWinner::B)
        } else {
            None
        };
        if bracket_match.winner.is_some() {
            bracket_match.finished_at = Some(now);
        }
    }

    MatchScore {
        score_a,
        score_b,
        all_finished,
    }
}

/// What an advancement produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advancement {
    /// Winner moved into the next round.
    Moved {
        /// Round the winner moved into.
        next_phase: Phase,
    },
    /// The principal final is decided.
    Champion(String),
    /// A bronze match is decided.
    BronzeMedal(String),
    /// A consolante finalist moved into a bronze slot.
    ConsolanteToBronze(String),
}

/// Move a decided match's winner forward.
///
/// Round arithmetic: winner of match `id` lands in next-round match index
/// `(id - 1) / 2`, slot A when `id` is odd. A principal semifinal loser
/// additionally drops into bronze match `id`'s slot A; a consolante final
/// winner fills the matching bronze slot B.
pub fn advance(
    bracket: &mut Bracket,
    kind: BracketKind,
    phase: Phase,
    id: u32,
) -> Result<Advancement, BracketError> {
    let bracket_match = bracket
        .find_match(kind, phase, id)
        .ok_or(BracketError::MatchNotFound)?;
    let winner = bracket_match
        .winning_team()
        .cloned()
        .ok_or(BracketError::NoWinner)?;
    let loser = bracket_match.losing_team().cloned();

    if kind == BracketKind::Bronze {
        return Ok(Advancement::BronzeMedal(winner));
    }

    if phase == Phase::Finale {
        return match kind {
            BracketKind::Principal => Ok(Advancement::Champion(winner)),
            BracketKind::Consolante => {
                let slot = (id as usize).saturating_sub(1).min(1);
                bracket.bronze[slot].team_b = Some(winner.clone());
                Ok(Advancement::ConsolanteToBronze(winner))
            }
            BracketKind::Bronze => unreachable!(),
        };
    }

    let next_phase = phase.next().ok_or(BracketError::NoWinner)?;
    {
        let side = match kind {
            BracketKind::Principal => &mut bracket.principal,
            BracketKind::Consolante => &mut bracket.consolante,
            BracketKind::Bronze => unreachable!(),
        };
        let next_index = ((id - 1) / 2) as usize;
        let next_match = side
            .phase_mut(next_phase)
            .get_mut(next_index)
            .ok_or(BracketError::MatchNotFound)?;
        if id % 2 == 1 {
            next_match.team_a = Some(winner);
        } else {
            next_match.team_b = Some(winner);
        }
    }

    if kind == BracketKind::Principal && phase == Phase::Demi {
        if let (Some(loser), Some(bronze_match)) =
            (loser, bracket.bronze.get_mut(id as usize - 1))
        {
            bronze_match.team_a = Some(loser);
        }
    }

    Ok(Advancement::Moved { next_phase })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::bout::{Corner, Scoreboard};

    fn teams(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| (*id).to_owned()).collect()
    }

    fn rules() -> ScoringRules {
        ScoringRules::default()
    }

    fn now() -> OffsetDateTime {
        OffsetDateTime::UNIX_EPOCH
    }

    fn finished_bout(rouge_team: &str, bleu_team: &str, rouge_wins: bool) -> Bout {
        let board = |wins: bool| Scoreboard {
            ippon: wins,
            ..Scoreboard::default()
        };
        let corner = |team: &str, wins: bool| Corner {
            athlete_id: Some(Uuid::new_v4()),
            name: team.to_owned(),
            team_id: team.to_owned(),
            team_name: team.to_owned(),
            weight: "-73".into(),
            sex: "M".into(),
            score: board(wins),
        };
        let mut bout = Bout::new(
            corner(rouge_team, rouge_wins),
            corner(bleu_team, !rouge_wins),
            &rules(),
            now(),
        );
        bout.etat = BoutState::Termine;
        bout
    }

    #[test]
    fn start_phase_depends_on_team_count() {
        assert_eq!(Phase::start_for(2), Phase::Finale);
        assert_eq!(Phase::start_for(3), Phase::Demi);
        assert_eq!(Phase::start_for(4), Phase::Demi);
        assert_eq!(Phase::start_for(8), Phase::Quart);
        assert_eq!(Phase::start_for(16), Phase::Huitieme);
        assert_eq!(Phase::start_for(17), Phase::Seizieme);
    }

    #[test]
    fn odd_entry_count_gets_an_auto_resolved_bye() {
        let side = BracketSide::build(&teams(&["a", "b", "c"]));
        assert_eq!(side.demi.len(), 2);
        let bye = &side.demi[1];
        assert!(bye.has_bye);
        assert_eq!(bye.winner, Some(MatchWinner::A));
        assert_eq!(bye.winning_team(), Some(&"c".to_owned()));
        assert!(bye.assigned);
        // Later rounds are pre-created empty.
        assert_eq!(side.finale.len(), 1);
        assert!(side.finale[0].team_a.is_none());
    }

    #[test]
    fn score_match_orients_bouts_and_decides_winner() {
        let bracket = &mut Bracket::build(&teams(&["a", "b"]), &[]);
        let bouts = vec![
            finished_bout("a", "b", true),
            finished_bout("b", "a", true),
            finished_bout("a", "b", true),
        ];
        let finale = bracket
            .find_match_mut(BracketKind::Principal, Phase::Finale, 1)
            .unwrap();
        finale.bout_ids = bouts.iter().map(|bout| bout.id).collect();

        let score = score_match(finale, &bouts, &rules(), now());
        assert!(score.all_finished);
        assert_eq!((score.score_a, score.score_b), (2, 1));
        assert_eq!(finale.winner, Some(MatchWinner::A));
        assert!(finale.finished_at.is_some());
    }

    #[test]
    fn score_match_with_unfinished_bout_sets_nothing() {
        let bracket = &mut Bracket::build(&teams(&["a", "b"]), &[]);
        let mut bout = finished_bout("a", "b", true);
        bout.etat = BoutState::EnCours;
        let finale = bracket
            .find_match_mut(BracketKind::Principal, Phase::Finale, 1)
            .unwrap();
        finale.bout_ids = vec![bout.id];

        let score = score_match(finale, &[bout], &rules(), now());
        assert!(!score.all_finished);
        assert_eq!(finale.winner, None);
        assert!(finale.finished_at.is_none());
    }

    #[test]
    fn winner_advances_to_the_expected_slot() {
        let mut bracket = Bracket::build(&teams(&["a", "b", "c", "d", "e", "f", "g", "h"]), &[]);
        // Quart matches 1..=4 feed demi 1 and 2.
        for id in 1..=4 {
            let quart = bracket
                .find_match_mut(BracketKind::Principal, Phase::Quart, id)
                .unwrap();
            quart.winner = Some(MatchWinner::A);
        }
        for id in 1..=4 {
            let result = advance(&mut bracket, BracketKind::Principal, Phase::Quart, id).unwrap();
            assert_eq!(
                result,
                Advancement::Moved {
                    next_phase: Phase::Demi
                }
            );
        }
        let demi_1 = bracket
            .find_match(BracketKind::Principal, Phase::Demi, 1)
            .unwrap();
        assert_eq!(demi_1.team_a, bracket.principal.quart[0].team_a);
        assert_eq!(demi_1.team_b, bracket.principal.quart[1].team_a);
    }

    #[test]
    fn principal_semifinal_loser_drops_into_bronze() {
        let mut bracket = Bracket::build(&teams(&["a", "b", "c", "d"]), &[]);
        let demi_2 = bracket
            .find_match_mut(BracketKind::Principal, Phase::Demi, 2)
            .unwrap();
        demi_2.winner = Some(MatchWinner::B);
        let loser = demi_2.team_a.clone();

        advance(&mut bracket, BracketKind::Principal, Phase::Demi, 2).unwrap();
        assert_eq!(bracket.bronze[1].team_a, loser);
        let finale = bracket
            .find_match(BracketKind::Principal, Phase::Finale, 1)
            .unwrap();
        assert_eq!(finale.team_b, bracket.principal.demi[1].team_b);
    }

    #[test]
    fn consolante_final_winner_fills_bronze_slot_b() {
        let mut bracket = Bracket::build(&teams(&["a", "b", "c", "d"]), &teams(&["x", "y"]));
        let finale = bracket
            .find_match_mut(BracketKind::Consolante, Phase::Finale, 1)
            .unwrap();
        finale.winner = Some(MatchWinner::A);
        let winner = finale.team_a.clone();

        let result = advance(&mut bracket, BracketKind::Consolante, Phase::Finale, 1).unwrap();
        assert_eq!(result, Advancement::ConsolanteToBronze(winner.clone().unwrap()));
        assert_eq!(bracket.bronze[0].team_b, winner);
    }

    #[test]
    fn principal_final_yields_the_champion() {
        let mut bracket = Bracket::build(&teams(&["a", "b"]), &[]);
        let finale = bracket
            .find_match_mut(BracketKind::Principal, Phase::Finale, 1)
            .unwrap();
        finale.winner = Some(MatchWinner::B);
        let result = advance(&mut bracket, BracketKind::Principal, Phase::Finale, 1).unwrap();
        assert_eq!(result, Advancement::Champion("b".to_owned()));
    }

    #[test]
    fn advance_requires_a_decided_winner() {
        let mut bracket = Bracket::build(&teams(&["a", "b"]), &[]);
        let err = advance(&mut bracket, BracketKind::Principal, Phase::Finale, 1).unwrap_err();
        assert_eq!(err, BracketError::NoWinner);
        let err = advance(&mut bracket, BracketKind::Principal, Phase::Demi, 9).unwrap_err();
        assert_eq!(err, BracketError::MatchNotFound);
    }
}
