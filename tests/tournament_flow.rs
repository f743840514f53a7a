//! End-to-end pool round flow exercised against the flat-file backend:
//! roster registration, pool creation, mat assignment, scoring and standings.

use std::sync::Arc;

use tempfile::TempDir;

use shiai_back::config::AppConfig;
use shiai_back::dao::store::jsonfile::JsonFileStore;
use shiai_back::dto::bout::{MarkPointRequest, PatchBoutRequest, StartOsaekomiRequest, StopOsaekomiRequest};
use shiai_back::dto::bracket::CreateBracketRequest;
use shiai_back::dto::mat::CreateMatRequest;
use shiai_back::dto::pool::CreatePoolsRequest;
use shiai_back::dto::roster::{CreateAthleteRequest, CreateTeamRequest};
use shiai_back::engine::bout::{BoutState, FinishReason, PointKind, Side};
use shiai_back::engine::standings::RencontreState;
use shiai_back::error::ServiceError;
use shiai_back::services::{
    bout_service, bracket_service, health_service, mat_service, pool_service, roster_service,
    standings_service,
};
use shiai_back::state::{AppState, SharedState};

async fn setup() -> (SharedState, TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = JsonFileStore::open(dir.path())
        .await
        .expect("open flat-file store");
    let state = AppState::new(AppConfig::default());
    state.install_store(Arc::new(store)).await;
    (state, dir)
}

async fn register_team(state: &SharedState, id: &str, name: &str) {
    roster_service::create_team(
        state,
        CreateTeamRequest {
            id: id.into(),
            name: name.into(),
            color: None,
        },
    )
    .await
    .expect("create team");
}

async fn register_athlete(state: &SharedState, team_id: &str, name: &str) {
    roster_service::create_athlete(
        state,
        CreateAthleteRequest {
            name: name.into(),
            sex: "M".into(),
            weight: "-73".into(),
            team_id: team_id.into(),
        },
    )
    .await
    .expect("create athlete");
}

#[tokio::test]
async fn double_wazari_finishes_bout_and_moves_pool_standings() {
    let (state, _dir) = setup().await;

    register_team(&state, "kodokan", "Kodokan").await;
    register_team(&state, "mifune", "Mifune Club").await;
    register_athlete(&state, "kodokan", "Abe").await;
    register_athlete(&state, "mifune", "Ono").await;

    let mat = mat_service::create_mat(
        &state,
        CreateMatRequest {
            name: "Tatami 1".into(),
        },
    )
    .await
    .expect("create mat");

    let pools = pool_service::create_pools(&state, CreatePoolsRequest { count: 1 })
        .await
        .expect("create pools");
    assert_eq!(pools.len(), 1);
    assert_eq!(pools[0].rencontres.len(), 1);

    let rencontre_id = pools[0].rencontres[0].id;
    let pool = pool_service::assign_rencontre(&state, rencontre_id, mat.id)
        .await
        .expect("assign rencontre");
    assert_eq!(pool.rencontres[0].etat, RencontreState::Assignee);
    assert_eq!(
        pool.rencontres[0].bout_ids.len(),
        1,
        "one shared category, so one bout"
    );

    let bout_id = pool.rencontres[0].bout_ids[0];
    let view = bout_service::get_bout(&state, bout_id).await.expect("get bout");
    assert_eq!(view.bout.etat, BoutState::Prevu);
    assert_eq!(view.mat_id, Some(mat.id));
    let winner_team = view.bout.rouge.team_id.clone();
    let loser_team = view.bout.bleu.team_id.clone();

    let view = bout_service::mark_point(
        &state,
        bout_id,
        MarkPointRequest {
            side: Side::Rouge,
            kind: PointKind::Wazari,
        },
    )
    .await
    .expect("first wazari");
    assert_ne!(view.bout.etat, BoutState::Termine);

    let view = bout_service::mark_point(
        &state,
        bout_id,
        MarkPointRequest {
            side: Side::Rouge,
            kind: PointKind::Wazari,
        },
    )
    .await
    .expect("second wazari");
    assert_eq!(view.bout.etat, BoutState::Termine);
    assert_eq!(view.bout.finish_reason, Some(FinishReason::DoubleWazari));
    assert_eq!(view.bout.winner, Some(Side::Rouge));

    // The finish recomputed the owning pool's standings.
    let standings = standings_service::pool_standings(&state, pool.id)
        .await
        .expect("pool standings");
    let winner = standings
        .classement
        .iter()
        .find(|record| record.team_id == winner_team)
        .expect("winner record");
    assert_eq!(winner.wins, 1);
    assert_eq!(winner.played, 1);
    assert_eq!(winner.points, state.config().pools.points_victoire);
    assert_eq!(winner.scored, 2 * state.config().scoring.points.wazari);
    let loser = standings
        .classement
        .iter()
        .find(|record| record.team_id == loser_team)
        .expect("loser record");
    assert_eq!(loser.losses, 1);
    assert_eq!(standings.classement[0].team_id, winner_team);

    let score = mat_service::score(&state, mat.id).await.expect("mat score");
    assert_eq!(score.rouge, 2 * state.config().scoring.points.wazari);
    assert_eq!(score.bleu, 0);

    // The stored mat carries the same total, not a stale zeroed score.
    let stored = mat_service::get_mat(&state, mat.id).await.expect("get mat");
    assert_eq!(stored.mat.score.rouge, 2 * state.config().scoring.points.wazari);
    assert_eq!(stored.mat.score.bleu, 0);

    let general = standings_service::general_standings(&state)
        .await
        .expect("general standings");
    assert_eq!(general[0].team_id, winner_team);
}

#[tokio::test]
async fn osaekomi_hold_converts_into_wazari() {
    let (state, _dir) = setup().await;

    register_team(&state, "kodokan", "Kodokan").await;
    register_team(&state, "mifune", "Mifune Club").await;
    register_athlete(&state, "kodokan", "Abe").await;
    register_athlete(&state, "mifune", "Ono").await;

    let mat = mat_service::create_mat(
        &state,
        CreateMatRequest {
            name: "Tatami 1".into(),
        },
    )
    .await
    .expect("create mat");
    let pools = pool_service::create_pools(&state, CreatePoolsRequest { count: 1 })
        .await
        .expect("create pools");
    let pool = pool_service::assign_rencontre(&state, pools[0].rencontres[0].id, mat.id)
        .await
        .expect("assign rencontre");
    let bout_id = pool.rencontres[0].bout_ids[0];

    // Holds can only be opened on a running bout.
    bout_service::patch_bout(
        &state,
        bout_id,
        PatchBoutRequest {
            etat: Some(BoutState::EnCours),
            timer: None,
        },
    )
    .await
    .expect("start bout");

    bout_service::start_osaekomi(&state, bout_id, StartOsaekomiRequest { side: Side::Bleu })
        .await
        .expect("start hold");

    // 16 seconds sits between the waza-ri and ippon thresholds.
    let result = bout_service::stop_osaekomi(
        &state,
        bout_id,
        StopOsaekomiRequest { duration_secs: 16 },
    )
    .await
    .expect("stop hold");
    assert_eq!(result.points_awarded, vec![PointKind::Wazari]);
    assert!(!result.finished);
    assert_eq!(result.bout.bout.bleu.score.wazari, 1);
    assert!(result.bout.bout.osaekomi.is_none());
}

#[tokio::test]
async fn bracket_creation_runs_on_a_spawned_task() {
    let (state, _dir) = setup().await;

    register_team(&state, "kodokan", "Kodokan").await;
    register_team(&state, "mifune", "Mifune Club").await;
    register_athlete(&state, "kodokan", "Abe").await;
    register_athlete(&state, "mifune", "Ono").await;

    // Spawning requires the service future to be Send, like axum does.
    let bracket = tokio::spawn(async move {
        bracket_service::create_bracket(
            &state,
            CreateBracketRequest {
                principal: vec!["kodokan".into(), "mifune".into()],
                consolante: Vec::new(),
            },
        )
        .await
    })
    .await
    .expect("join bracket task")
    .expect("create bracket");
    assert_eq!(bracket.principal.finale.len(), 1);
}

#[tokio::test]
async fn degraded_mode_blocks_services_until_a_store_is_installed() {
    let state = AppState::new(AppConfig::default());

    let health = health_service::health_status(&state).await;
    assert_eq!(health.status, "degraded");

    let err = roster_service::list_teams(&state).await.unwrap_err();
    assert!(matches!(err, ServiceError::Degraded));

    let dir = tempfile::tempdir().expect("create temp dir");
    let store = JsonFileStore::open(dir.path())
        .await
        .expect("open flat-file store");
    state.install_store(Arc::new(store)).await;

    let health = health_service::health_status(&state).await;
    assert_eq!(health.status, "ok");
    assert!(roster_service::list_teams(&state).await.is_ok());
}
