//! Single binary web server: REST API over the tournament controller, state kept in memory.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST (e.g. 127.0.0.1), PORT (e.g. 3000).

use actix_web::{
    get,
    http::StatusCode,
    post, put,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use serde::Deserialize;
use tournament_hub::{
    Format, LeaderboardEntry, MatchId, MemoryStore, ParticipantId, TournamentController,
    TournamentError, TournamentId, TournamentStatus,
};

type AppState = Data<TournamentController<MemoryStore>>;

/// Where to listen, from HOST / PORT.
struct ServerConfig {
    host: String,
    port: u16,
}

impl ServerConfig {
    fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or_else(default_port);
        Self { host, port }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    #[serde(default)]
    format: Format,
    #[serde(default)]
    created_by: Option<ParticipantId>,
}

#[derive(Deserialize)]
struct ListTournamentsQuery {
    status: Option<TournamentStatus>,
}

#[derive(Deserialize)]
struct JoinBody {
    participant_id: ParticipantId,
}

#[derive(Deserialize)]
struct StatusBody {
    status: TournamentStatus,
}

#[derive(Deserialize)]
struct ReportResultBody {
    winner: ParticipantId,
}

#[derive(Deserialize)]
struct CreateTeamBody {
    name: String,
    creator_id: ParticipantId,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and match id (e.g. /api/tournaments/{id}/matches/{match_id})
#[derive(Deserialize)]
struct MatchPath {
    id: TournamentId,
    match_id: MatchId,
}

/// Path segment: participant id (e.g. /api/participants/{id})
#[derive(Deserialize)]
struct ParticipantPath {
    id: ParticipantId,
}

/// HTTP status for a failed operation.
fn status_for(e: &TournamentError) -> StatusCode {
    match e {
        TournamentError::NotFound(_) => StatusCode::NOT_FOUND,
        TournamentError::Conflict
        | TournamentError::AlreadyReported(_)
        | TournamentError::AlreadyStarted => StatusCode::CONFLICT,
        TournamentError::StoreUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

/// Map a failed operation to its status code with `{"error": ...}`.
fn error_response(e: TournamentError) -> HttpResponse {
    log::warn!("Request failed: {}", e);
    HttpResponse::build(status_for(&e)).json(serde_json::json!({ "error": e.to_string() }))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tournament-hub",
    })
}

/// Create a new open tournament (returns it with id).
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> HttpResponse {
    match state.create_tournament(&body.name, body.format, body.created_by) {
        Ok(t) => {
            log::info!("Created tournament {} ({:?})", t.id, t.format);
            HttpResponse::Ok().json(t)
        }
        Err(e) => error_response(e),
    }
}

/// List tournaments; `?status=open` gives the upcoming ones.
#[get("/api/tournaments")]
async fn api_list_tournaments(state: AppState, query: Query<ListTournamentsQuery>) -> HttpResponse {
    match state.list_tournaments(query.status) {
        Ok(all) => HttpResponse::Ok().json(all),
        Err(e) => error_response(e),
    }
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.tournament(path.id) {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(e) => error_response(e),
    }
}

/// Join an open tournament before fixtures exist.
#[post("/api/tournaments/{id}/players")]
async fn api_join_tournament(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<JoinBody>,
) -> HttpResponse {
    match state.join_tournament(path.id, body.participant_id) {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(e) => error_response(e),
    }
}

#[put("/api/tournaments/{id}/status")]
async fn api_set_status(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<StatusBody>,
) -> HttpResponse {
    if let Err(e) = state.set_status(path.id, body.status) {
        return error_response(e);
    }
    match state.tournament(path.id) {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(e) => error_response(e),
    }
}

/// Generate fixtures; the tournament moves to in progress with them.
#[post("/api/tournaments/{id}/start")]
async fn api_start_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let matches = match state.start_tournament(path.id) {
        Ok(m) => m,
        Err(e) => return error_response(e),
    };
    log::info!("Generated {} fixture(s) for tournament {}", matches.len(), path.id);
    match state.tournament(path.id) {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(e) => error_response(e),
    }
}

#[get("/api/tournaments/{id}/standings")]
async fn api_tournament_standings(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.tournament_standings(path.id) {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => error_response(e),
    }
}

#[post("/api/tournaments/{id}/matches/{match_id}/begin")]
async fn api_begin_match(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    match state.begin_match(path.id, path.match_id) {
        Ok(m) => HttpResponse::Ok().json(m),
        Err(e) => error_response(e),
    }
}

/// Report the winner of a match. Completes the tournament once every match has a result.
#[post("/api/tournaments/{id}/matches/{match_id}/result")]
async fn api_report_result(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<ReportResultBody>,
) -> HttpResponse {
    let m = match state.report_result(path.id, path.match_id, body.winner) {
        Ok(m) => m,
        Err(e) => return error_response(e),
    };
    log::info!(
        "Match {} in tournament {} won by {}",
        m.id,
        path.id,
        body.winner
    );
    // The result is recorded at this point; a failed status update does not undo it.
    match state.complete_if_finished(path.id) {
        Ok(true) => log::info!("Tournament {} completed", path.id),
        Ok(false) => {}
        Err(e) => log::warn!("Could not update status of tournament {}: {}", path.id, e),
    }
    HttpResponse::Ok().json(m)
}

#[get("/api/participants/{id}/stats")]
async fn api_participant_stats(state: AppState, path: Path<ParticipantPath>) -> HttpResponse {
    match state.stats(path.id) {
        Ok(s) => HttpResponse::Ok().json(s),
        Err(e) => error_response(e),
    }
}

/// Past (reported) matches of a participant, newest first.
#[get("/api/participants/{id}/matches")]
async fn api_match_history(state: AppState, path: Path<ParticipantPath>) -> HttpResponse {
    match state.match_history(path.id) {
        Ok(history) => {
            let items: Vec<_> = history
                .into_iter()
                .map(|(tournament_id, m)| serde_json::json!({ "tournament_id": tournament_id, "match": m }))
                .collect();
            HttpResponse::Ok().json(items)
        }
        Err(e) => error_response(e),
    }
}

#[get("/api/leaderboard")]
async fn api_leaderboard(state: AppState) -> HttpResponse {
    match state.leaderboard() {
        Ok(board) => HttpResponse::Ok().json(board),
        Err(e) => error_response(e),
    }
}

fn leaderboard_csv(board: &[LeaderboardEntry]) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for entry in board {
        writer.serialize(entry)?;
    }
    writer.into_inner().map_err(|e| e.into_error().into())
}

#[get("/api/leaderboard.csv")]
async fn api_leaderboard_csv(state: AppState) -> HttpResponse {
    let board = match state.leaderboard() {
        Ok(b) => b,
        Err(e) => return error_response(e),
    };
    match leaderboard_csv(&board) {
        Ok(bytes) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .body(bytes),
        Err(e) => {
            log::error!("Failed to render leaderboard CSV: {}", e);
            HttpResponse::InternalServerError().body("csv error")
        }
    }
}

#[post("/api/teams")]
async fn api_create_team(state: AppState, body: Json<CreateTeamBody>) -> HttpResponse {
    match state.create_team(&body.name, body.creator_id) {
        Ok(team) => HttpResponse::Ok().json(team),
        Err(e) => error_response(e),
    }
}

#[get("/api/teams")]
async fn api_list_teams(state: AppState) -> HttpResponse {
    match state.teams() {
        Ok(teams) => HttpResponse::Ok().json(teams),
        Err(e) => error_response(e),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    log::info!("Starting server at http://{}:{}", config.host, config.port);

    let state = Data::new(TournamentController::new(MemoryStore::new()));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_list_tournaments)
            .service(api_get_tournament)
            .service(api_join_tournament)
            .service(api_set_status)
            .service(api_start_tournament)
            .service(api_tournament_standings)
            .service(api_begin_match)
            .service(api_report_result)
            .service(api_participant_stats)
            .service(api_match_history)
            .service(api_leaderboard)
            .service(api_leaderboard_csv)
            .service(api_create_team)
            .service(api_list_teams)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tournament_hub::Resource;
    use uuid::Uuid;

    #[test]
    fn error_status_codes() {
        let id = Uuid::new_v4();
        assert_eq!(
            status_for(&TournamentError::NotFound(Resource::Tournament(id))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&TournamentError::NotFound(Resource::Match(id, 3))),
            StatusCode::NOT_FOUND
        );
        for e in [
            TournamentError::Conflict,
            TournamentError::AlreadyReported(0),
            TournamentError::AlreadyStarted,
        ] {
            assert_eq!(status_for(&e), StatusCode::CONFLICT);
        }
        assert_eq!(
            status_for(&TournamentError::StoreUnavailable),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        for e in [
            TournamentError::InsufficientPlayers { found: 1 },
            TournamentError::DuplicateParticipant(id),
            TournamentError::InvalidWinner(id),
            TournamentError::InvalidState,
            TournamentError::EmptyName,
        ] {
            assert_eq!(status_for(&e), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn error_response_carries_status() {
        let resp = error_response(TournamentError::AlreadyStarted);
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn leaderboard_csv_has_header_and_rows() {
        let p = Uuid::new_v4();
        let board = vec![LeaderboardEntry {
            rank: 1,
            participant: p,
            wins: 2,
            losses: 1,
        }];
        let text = String::from_utf8(leaderboard_csv(&board).unwrap()).unwrap();
        assert_eq!(text, format!("rank,participant,wins,losses\n1,{p},2,1\n"));
    }
}
