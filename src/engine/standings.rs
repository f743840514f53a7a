//! Round-robin pool structure and standings computation.
//!
//! Standings are scored per confrontation (a rencontre between two teams),
//! not per individual bout: every bout of the rencontre must be finished
//! before the rencontre counts, and the rencontre winner is the team with
//! more bout wins, ties broken on technical points.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{PoolRules, ScoringRules};

use super::{
    Team,
    bout::{self, Bout, BoutState, Side},
};

/// Lifecycle of a rencontre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RencontreState {
    /// Scheduled, no bouts attached yet.
    Prevue,
    /// Bouts generated and assigned to a mat.
    Assignee,
}

/// A confrontation between two teams inside a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Rencontre {
    /// Unique rencontre id.
    pub id: Uuid,
    /// First team.
    pub team_a: String,
    /// Second team.
    pub team_b: String,
    /// Backing bouts, attached at mat assignment.
    pub bout_ids: Vec<Uuid>,
    /// Lifecycle state.
    pub etat: RencontreState,
}

/// One team's accumulated record in a pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TeamRecord {
    /// Team id.
    pub team_id: String,
    /// Team display name.
    pub name: String,
    /// Ranking points from confrontation outcomes.
    pub points: i32,
    /// Confrontations won.
    pub wins: u32,
    /// Confrontations lost.
    pub losses: u32,
    /// Confrontations tied.
    pub ties: u32,
    /// Confrontations fully played.
    pub played: u32,
    /// Technical points scored.
    pub scored: u32,
    /// Technical points conceded.
    pub conceded: u32,
    /// `scored - conceded`.
    pub differential: i64,
}

impl TeamRecord {
    fn new(team_id: &str, name: &str) -> Self {
        Self {
            team_id: team_id.to_owned(),
            name: name.to_owned(),
            ..Self::default()
        }
    }

    fn refresh_differential(&mut self) {
        self.differential = i64::from(self.scored) - i64::from(self.conceded);
    }
}

/// A round-robin pool of teams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Pool {
    /// Unique pool id.
    pub id: Uuid,
    /// Display name, `Poule A`, `Poule B`, ...
    pub name: String,
    /// Member team ids, in draw order.
    pub team_ids: Vec<String>,
    /// Full round-robin confrontation list.
    pub rencontres: Vec<Rencontre>,
    /// Last computed standings.
    pub classement: Vec<TeamRecord>,
    /// When the standings were last recomputed.
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl Pool {
    /// Whether any rencontre of this pool references the bout.
    pub fn references_bout(&self, bout_id: Uuid) -> bool {
        self.rencontres
            .iter()
            .any(|rencontre| rencontre.bout_ids.contains(&bout_id))
    }

    /// The rencontre pairing these two teams, in either orientation.
    pub fn rencontre_for_teams_mut(
        &mut self,
        team_x: &str,
        team_y: &str,
    ) -> Option<&mut Rencontre> {
        self.rencontres.iter_mut().find(|rencontre| {
            (rencontre.team_a == team_x && rencontre.team_b == team_y)
                || (rencontre.team_a == team_y && rencontre.team_b == team_x)
        })
    }
}

/// Build `count` pools from a drawn team order: teams are dealt round-robin
/// across the pools and each pool gets its full round-robin rencontre list.
pub fn build_pools(count: usize, team_ids: &[String]) -> Vec<Pool> {
    let mut pools: Vec<Pool> = (0..count)
        .map(|index| Pool {
            id: Uuid::new_v4(),
            name: format!("Poule {}", char::from(b'A' + index as u8)),
            team_ids: Vec::new(),
            rencontres: Vec::new(),
            classement: Vec::new(),
            updated_at: None,
        })
        .collect();

    for (index, team_id) in team_ids.iter().enumerate() {
        pools[index % count].team_ids.push(team_id.clone());
    }

    for pool in &mut pools {
        for i in 0..pool.team_ids.len() {
            for j in (i + 1)..pool.team_ids.len() {
                pool.rencontres.push(Rencontre {
                    id: Uuid::new_v4(),
                    team_a: pool.team_ids[i].clone(),
                    team_b: pool.team_ids[j].clone(),
                    bout_ids: Vec::new(),
                    etat: RencontreState::Prevue,
                });
            }
        }
    }
    pools
}

/// Outcome of a single rencontre, as seen from team A.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RencontreTally {
    wins_a: u32,
    wins_b: u32,
    points_a: u32,
    points_b: u32,
}

/// Tally a rencontre whose bouts are all finished. Returns `None` when any
/// backing bout is missing or not yet finished.
fn tally_rencontre(rencontre: &Rencontre, bouts: &[Bout], rules: &ScoringRules) -> Option<RencontreTally> {
    if rencontre.bout_ids.is_empty() {
        return None;
    }

    let backing: Vec<&Bout> = rencontre
        .bout_ids
        .iter()
        .filter_map(|id| bouts.iter().find(|bout| bout.id == *id))
        .filter(|bout| bout.etat == BoutState::Termine)
        .collect();
    if backing.len() != rencontre.bout_ids.len() {
        return None;
    }

    let mut tally = RencontreTally {
        wins_a: 0,
        wins_b: 0,
        points_a: 0,
        points_b: 0,
    };

    for bout in backing {
        // Orient the bout: which corner belongs to team A of the rencontre.
        let rouge_is_a = if bout.rouge.team_id == rencontre.team_a {
            true
        } else if bout.rouge.team_id == rencontre.team_b {
            false
        } else {
            continue;
        };

        match bout::determine_winner(bout, rules) {
            Some(Side::Rouge) if rouge_is_a => tally.wins_a += 1,
            Some(Side::Rouge) => tally.wins_b += 1,
            Some(Side::Bleu) if rouge_is_a => tally.wins_b += 1,
            Some(Side::Bleu) => tally.wins_a += 1,
            None => {}
        }

        let rouge_points = bout.rouge.score.technical_points(rules);
        let bleu_points = bout.bleu.score.technical_points(rules);
        if rouge_is_a {
            tally.points_a += rouge_points;
            tally.points_b += bleu_points;
        } else {
            tally.points_a += bleu_points;
            tally.points_b += rouge_points;
        }
    }
    Some(tally)
}

/// Compute the standings of one pool from the current bout set.
///
/// Only rencontres whose every backing bout is finished contribute. The
/// rencontre winner is the team with more bout wins; a bout-win tie is
/// broken on technical points and still counts as a win/loss. Only a double
/// tie is recorded as an égalité.
pub fn compute_pool_standings(
    pool: &Pool,
    bouts: &[Bout],
    teams: &[Team],
    rules: &ScoringRules,
    pool_rules: &PoolRules,
) -> Vec<TeamRecord> {
    let mut records: BTreeMap<String, TeamRecord> = pool
        .team_ids
        .iter()
        .map(|team_id| {
            let name = teams
                .iter()
                .find(|team| &team.id == team_id)
                .map(|team| team.name.as_str())
                .unwrap_or(team_id.as_str());
            (team_id.clone(), TeamRecord::new(team_id, name))
        })
        .collect();

    for rencontre in &pool.rencontres {
        let Some(tally) = tally_rencontre(rencontre, bouts, rules) else {
            continue;
        };
        if !records.contains_key(&rencontre.team_a) || !records.contains_key(&rencontre.team_b) {
            continue;
        }

        let apply = |record: &mut TeamRecord, scored: u32, conceded: u32| {
            record.played += 1;
            record.scored += scored;
            record.conceded += conceded;
        };
        {
            let record_a = records.get_mut(&rencontre.team_a).unwrap();
            apply(record_a, tally.points_a, tally.points_b);
        }
        {
            let record_b = records.get_mut(&rencontre.team_b).unwrap();
            apply(record_b, tally.points_b, tally.points_a);
        }

        let a_wins_confrontation = tally.wins_a > tally.wins_b
            || (tally.wins_a == tally.wins_b && tally.points_a > tally.points_b);
        let b_wins_confrontation = tally.wins_b > tally.wins_a
            || (tally.wins_a == tally.wins_b && tally.points_b > tally.points_a);

        if a_wins_confrontation {
            let record_a = records.get_mut(&rencontre.team_a).unwrap();
            record_a.wins += 1;
            record_a.points += pool_rules.points_victoire;
            let record_b = records.get_mut(&rencontre.team_b).unwrap();
            record_b.losses += 1;
            record_b.points += pool_rules.points_defaite;
        } else if b_wins_confrontation {
            let record_b = records.get_mut(&rencontre.team_b).unwrap();
            record_b.wins += 1;
            record_b.points += pool_rules.points_victoire;
            let record_a = records.get_mut(&rencontre.team_a).unwrap();
            record_a.losses += 1;
            record_a.points += pool_rules.points_defaite;
        } else {
            for team_id in [&rencontre.team_a, &rencontre.team_b] {
                let record = records.get_mut(team_id).unwrap();
                record.ties += 1;
                record.points += pool_rules.points_egalite;
            }
        }
    }

    let mut standings: Vec<TeamRecord> = records.into_values().collect();
    for record in &mut standings {
        record.refresh_differential();
    }
    sort_records(&mut standings);
    standings
}

/// Aggregate every pool's standings into a general ranking,
/// excluding teams that have not played a confrontation yet.
pub fn compute_general_standings(pools: &[Pool]) -> Vec<TeamRecord> {
    let mut totals: BTreeMap<String, TeamRecord> = BTreeMap::new();

    for pool in pools {
        for record in &pool.classement {
            let total = totals
                .entry(record.team_id.clone())
                .or_insert_with(|| TeamRecord::new(&record.team_id, &record.name));
            total.points += record.points;
            total.wins += record.wins;
            total.losses += record.losses;
            total.ties += record.ties;
            total.played += record.played;
            total.scored += record.scored;
            total.conceded += record.conceded;
        }
    }

    let mut standings: Vec<TeamRecord> = totals
        .into_values()
        .filter(|record| record.played > 0)
        .collect();
    for record in &mut standings {
        record.refresh_differential();
    }
    sort_records(&mut standings);
    standings
}

/// The standings comparator: points, wins, differential, scored descending,
/// then fewest conceded.
fn sort_records(records: &mut [TeamRecord]) {
    records.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.wins.cmp(&a.wins))
            .then(b.differential.cmp(&a.differential))
            .then(b.scored.cmp(&a.scored))
            .then(a.conceded.cmp(&b.conceded))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::bout::{Corner, Scoreboard};

    fn rules() -> ScoringRules {
        ScoringRules::default()
    }

    fn pool_rules() -> PoolRules {
        PoolRules::default()
    }

    fn team(id: &str) -> Team {
        Team {
            id: id.to_owned(),
            name: format!("Team {id}"),
            color: "primary".into(),
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn corner(team_id: &str, score: Scoreboard) -> Corner {
        Corner {
            athlete_id: Some(Uuid::new_v4()),
            name: format!("athlete-{team_id}"),
            team_id: team_id.to_owned(),
            team_name: format!("Team {team_id}"),
            weight: "-73".into(),
            sex: "M".into(),
            score,
        }
    }

    fn finished_bout(rouge_team: &str, bleu_team: &str, rouge: Scoreboard, bleu: Scoreboard) -> Bout {
        let mut bout = Bout::new(
            corner(rouge_team, rouge),
            corner(bleu_team, bleu),
            &rules(),
            OffsetDateTime::UNIX_EPOCH,
        );
        bout.etat = BoutState::Termine;
        bout
    }

    fn ippon_board() -> Scoreboard {
        Scoreboard {
            ippon: true,
            ..Scoreboard::default()
        }
    }

    fn two_team_pool(bouts: &[Bout]) -> Pool {
        let mut pool = build_pools(1, &["a".to_owned(), "b".to_owned()]).remove(0);
        pool.rencontres[0].bout_ids = bouts.iter().map(|bout| bout.id).collect();
        pool.rencontres[0].etat = RencontreState::Assignee;
        pool
    }

    #[test]
    fn build_pools_deals_teams_and_generates_round_robin() {
        let teams: Vec<String> = ["a", "b", "c", "d", "e"].map(String::from).to_vec();
        let pools = build_pools(2, &teams);
        assert_eq!(pools[0].name, "Poule A");
        assert_eq!(pools[1].name, "Poule B");
        assert_eq!(pools[0].team_ids, vec!["a", "c", "e"]);
        assert_eq!(pools[1].team_ids, vec!["b", "d"]);
        // 3 teams -> 3 rencontres, 2 teams -> 1.
        assert_eq!(pools[0].rencontres.len(), 3);
        assert_eq!(pools[1].rencontres.len(), 1);
        assert!(
            pools[0]
                .rencontres
                .iter()
                .all(|r| r.etat == RencontreState::Prevue)
        );
    }

    #[test]
    fn unfinished_rencontre_does_not_count() {
        let mut bout = finished_bout("a", "b", ippon_board(), Scoreboard::default());
        bout.etat = BoutState::EnCours;
        let pool = two_team_pool(std::slice::from_ref(&bout));
        let teams = [team("a"), team("b")];
        let standings = compute_pool_standings(&pool, &[bout], &teams, &rules(), &pool_rules());
        assert!(standings.iter().all(|record| record.played == 0));
    }

    #[test]
    fn confrontation_awards_points_once_not_per_bout() {
        // Team a wins both bouts of the rencontre but gets one ranking point.
        let bouts = vec![
            finished_bout("a", "b", ippon_board(), Scoreboard::default()),
            finished_bout("b", "a", Scoreboard::default(), ippon_board()),
        ];
        let pool = two_team_pool(&bouts);
        let teams = [team("a"), team("b")];
        let standings = compute_pool_standings(&pool, &bouts, &teams, &rules(), &pool_rules());

        let record_a = standings.iter().find(|r| r.team_id == "a").unwrap();
        let record_b = standings.iter().find(|r| r.team_id == "b").unwrap();
        assert_eq!(record_a.points, pool_rules().points_victoire);
        assert_eq!(record_a.wins, 1);
        assert_eq!(record_a.played, 1);
        assert_eq!(record_a.scored, 200);
        assert_eq!(record_b.losses, 1);
        assert_eq!(record_b.points, pool_rules().points_defaite);
        assert_eq!(standings[0].team_id, "a");
    }

    #[test]
    fn bout_win_tie_is_broken_on_technical_points() {
        let wazari_board = Scoreboard {
            wazari: 1,
            ..Scoreboard::default()
        };
        let bouts = vec![
            finished_bout("a", "b", ippon_board(), Scoreboard::default()),
            finished_bout("a", "b", wazari_board, ippon_board()),
        ];
        let pool = two_team_pool(&bouts);
        let teams = [team("a"), team("b")];
        let standings = compute_pool_standings(&pool, &bouts, &teams, &rules(), &pool_rules());

        // One bout win each; a has 110 technical points, b has 100.
        let record_a = standings.iter().find(|r| r.team_id == "a").unwrap();
        assert_eq!(record_a.wins, 1);
        assert_eq!(record_a.ties, 0);
        assert_eq!(record_a.points, pool_rules().points_victoire);
    }

    #[test]
    fn rencontre_with_dangling_bout_id_is_skipped() {
        let bout = finished_bout("a", "b", ippon_board(), Scoreboard::default());
        let mut pool = two_team_pool(std::slice::from_ref(&bout));
        // One real bout, one id that resolves to nothing.
        pool.rencontres[0].bout_ids.push(Uuid::new_v4());
        let teams = [team("a"), team("b")];
        let standings = compute_pool_standings(&pool, &[bout], &teams, &rules(), &pool_rules());
        assert!(standings.iter().all(|record| record.played == 0));
        assert!(standings.iter().all(|record| record.points == 0));
    }

    #[test]
    fn perfect_tie_records_egalite() {
        let bouts = vec![
            finished_bout("a", "b", ippon_board(), Scoreboard::default()),
            finished_bout("a", "b", Scoreboard::default(), ippon_board()),
        ];
        let pool = two_team_pool(&bouts);
        let teams = [team("a"), team("b")];
        let standings = compute_pool_standings(&pool, &bouts, &teams, &rules(), &pool_rules());
        assert!(standings.iter().all(|record| record.ties == 1));
        assert!(
            standings
                .iter()
                .all(|record| record.points == pool_rules().points_egalite)
        );
    }

    #[test]
    fn general_standings_exclude_idle_teams() {
        let bouts = vec![finished_bout("a", "b", ippon_board(), Scoreboard::default())];
        let mut pool = build_pools(1, &["a".into(), "b".into(), "c".into()]).remove(0);
        pool.rencontre_for_teams_mut("a", "b").unwrap().bout_ids = vec![bouts[0].id];
        let teams = [team("a"), team("b"), team("c")];
        pool.classement = compute_pool_standings(&pool, &bouts, &teams, &rules(), &pool_rules());

        let general = compute_general_standings(std::slice::from_ref(&pool));
        assert_eq!(general.len(), 2);
        assert_eq!(general[0].team_id, "a");
        assert!(general.iter().all(|record| record.team_id != "c"));
    }
}
