use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the tournament backend.
#[openapi(
    paths(
        crate::routes::health::health,
        crate::routes::sse::events,
        crate::routes::roster::list_teams,
        crate::routes::roster::create_team,
        crate::routes::roster::get_team,
        crate::routes::roster::patch_team,
        crate::routes::roster::delete_team,
        crate::routes::roster::list_athletes,
        crate::routes::roster::create_athlete,
        crate::routes::roster::get_athlete,
        crate::routes::roster::patch_athlete,
        crate::routes::roster::delete_athlete,
        crate::routes::bouts::list_bouts,
        crate::routes::bouts::get_bout,
        crate::routes::bouts::patch_bout,
        crate::routes::bouts::delete_bout,
        crate::routes::bouts::mark_point,
        crate::routes::bouts::start_osaekomi,
        crate::routes::bouts::stop_osaekomi,
        crate::routes::bouts::apply_correction,
        crate::routes::bouts::reset_bout,
        crate::routes::pools::list_pools,
        crate::routes::pools::create_pools,
        crate::routes::pools::delete_pools,
        crate::routes::pools::get_pool,
        crate::routes::pools::assign_rencontre,
        crate::routes::pools::pool_standings,
        crate::routes::pools::general_standings,
        crate::routes::bracket::get_bracket,
        crate::routes::bracket::create_bracket,
        crate::routes::bracket::delete_bracket,
        crate::routes::bracket::assign_match,
        crate::routes::bracket::score_match,
        crate::routes::bracket::advance_match,
        crate::routes::mats::list_mats,
        crate::routes::mats::create_mat,
        crate::routes::mats::get_mat,
        crate::routes::mats::patch_mat,
        crate::routes::mats::delete_mat,
        crate::routes::mats::advance,
        crate::routes::mats::retreat,
        crate::routes::mats::assign_bouts,
        crate::routes::mats::release,
        crate::routes::mats::score,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::sse::Handshake,
            crate::dto::sse::SystemStatus,
            crate::dto::sse::RosterDeletedEvent,
            crate::dto::sse::StandingsUpdateEvent,
            crate::dto::roster::CreateTeamRequest,
            crate::dto::roster::PatchTeamRequest,
            crate::dto::roster::CreateAthleteRequest,
            crate::dto::roster::PatchAthleteRequest,
            crate::dto::bout::MarkPointRequest,
            crate::dto::bout::StartOsaekomiRequest,
            crate::dto::bout::StopOsaekomiRequest,
            crate::dto::bout::CorrectionRequest,
            crate::dto::bout::PatchBoutRequest,
            crate::dto::bout::BoutView,
            crate::dto::bout::OsaekomiResult,
            crate::dto::pool::CreatePoolsRequest,
            crate::dto::pool::AssignRencontreRequest,
            crate::dto::bracket::CreateBracketRequest,
            crate::dto::bracket::AssignMatchRequest,
            crate::dto::bracket::MatchScoreResponse,
            crate::dto::bracket::AdvanceResponse,
            crate::dto::mat::CreateMatRequest,
            crate::dto::mat::PatchMatRequest,
            crate::dto::mat::AssignBoutsRequest,
            crate::dto::mat::MatView,
            crate::engine::Team,
            crate::engine::Athlete,
            crate::engine::bout::Side,
            crate::engine::bout::PointKind,
            crate::engine::bout::BoutState,
            crate::engine::bout::FinishReason,
            crate::engine::bout::Scoreboard,
            crate::engine::bout::Corner,
            crate::engine::bout::Osaekomi,
            crate::engine::bout::Bout,
            crate::engine::bout::Correction,
            crate::engine::standings::RencontreState,
            crate::engine::standings::Rencontre,
            crate::engine::standings::TeamRecord,
            crate::engine::standings::Pool,
            crate::engine::bracket::Phase,
            crate::engine::bracket::BracketKind,
            crate::engine::bracket::MatchWinner,
            crate::engine::bracket::BracketMatch,
            crate::engine::bracket::BracketSide,
            crate::engine::bracket::Bracket,
            crate::engine::mat::MatState,
            crate::engine::mat::ConfrontationScore,
            crate::engine::mat::HistoryEntry,
            crate::engine::mat::Mat,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events stream"),
        (name = "roster", description = "Team and athlete registration"),
        (name = "bouts", description = "Bout lifecycle and scoring actions"),
        (name = "pools", description = "Pool round management"),
        (name = "standings", description = "Pool and general rankings"),
        (name = "bracket", description = "Dual elimination bracket"),
        (name = "mats", description = "Mats and their bout sequencer"),
    )
)]
pub struct ApiDoc;
