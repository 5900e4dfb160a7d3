//! Single binary web server: bracket API via REST, backed by the in-memory store.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT, RUST_LOG.

use actix_web::{
    get, post,
    http::StatusCode,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use bracket_engine::{
    BracketError, BracketId, BracketService, EliminationType, MatchId, MemoryStore, Scores,
    ServerConfig, Sport, TeamId,
};
use serde::Deserialize;

type AppState = Data<BracketService<MemoryStore>>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateBracketBody {
    name: String,
    #[serde(default)]
    sport: Sport,
    #[serde(default)]
    elimination_type: EliminationType,
}

#[derive(Deserialize)]
struct RegisterTeamBody {
    name: String,
}

#[derive(Deserialize)]
struct CompleteMatchBody {
    winner_id: TeamId,
    score_team1: Option<u32>,
    score_team2: Option<u32>,
}

#[derive(Deserialize)]
struct MatchesQuery {
    #[serde(default)]
    ready: bool,
}

/// Path segment: bracket id (e.g. /api/brackets/{id})
#[derive(Deserialize)]
struct BracketPath {
    id: BracketId,
}

/// Path segment: match id (e.g. /api/matches/{id})
#[derive(Deserialize)]
struct MatchPath {
    id: MatchId,
}

fn status_of(e: &BracketError) -> StatusCode {
    match e {
        BracketError::BracketNotFound(_)
        | BracketError::MatchNotFound(_)
        | BracketError::TeamNotFound(_) => StatusCode::NOT_FOUND,
        BracketError::InsufficientTeams { .. }
        | BracketError::TooManyTeams { .. }
        | BracketError::MatchNotReady(_)
        | BracketError::InvalidWinner { .. }
        | BracketError::InvalidScores(_)
        | BracketError::EmptyTeamName => StatusCode::BAD_REQUEST,
        BracketError::MatchAlreadyCompleted(_)
        | BracketError::DuplicateTeamName
        | BracketError::TournamentInProgress(_) => StatusCode::CONFLICT,
        BracketError::AdvancementTargetMissing { .. }
        | BracketError::StructureMismatch(_)
        | BracketError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(e: BracketError) -> HttpResponse {
    HttpResponse::build(status_of(&e)).json(serde_json::json!({ "error": e.to_string() }))
}

fn respond<T: serde::Serialize>(result: Result<T, BracketError>) -> HttpResponse {
    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) => error_response(e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "bracket-engine",
    })
}

/// Create a new bracket (returns it with id).
#[post("/api/brackets")]
async fn api_create_bracket(state: AppState, body: Json<CreateBracketBody>) -> HttpResponse {
    let body = body.into_inner();
    respond(state.create_bracket(body.name.trim(), body.sport, body.elimination_type))
}

/// Bracket with its teams and matches (404 if not found).
#[get("/api/brackets/{id}")]
async fn api_get_bracket(state: AppState, path: Path<BracketPath>) -> HttpResponse {
    respond(state.bracket_view(path.id))
}

#[post("/api/brackets/{id}/teams")]
async fn api_register_team(
    state: AppState,
    path: Path<BracketPath>,
    body: Json<RegisterTeamBody>,
) -> HttpResponse {
    respond(state.register_team(path.id, &body.name))
}

/// Generate (or regenerate) all matches from the registered teams.
#[post("/api/brackets/{id}/generate")]
async fn api_generate_bracket(state: AppState, path: Path<BracketPath>) -> HttpResponse {
    respond(state.generate_bracket(path.id))
}

/// All matches, or with ?ready=true only those playable now.
#[get("/api/brackets/{id}/matches")]
async fn api_list_matches(
    state: AppState,
    path: Path<BracketPath>,
    query: Query<MatchesQuery>,
) -> HttpResponse {
    if query.ready {
        respond(state.ready_matches(path.id))
    } else {
        respond(state.matches(path.id))
    }
}

/// Record a match result and advance both teams.
#[post("/api/matches/{id}/complete")]
async fn api_complete_match(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<CompleteMatchBody>,
) -> HttpResponse {
    let scores = match (body.score_team1, body.score_team2) {
        (Some(team1), Some(team2)) => Some(Scores { team1, team2 }),
        (None, None) => None,
        _ => {
            return HttpResponse::BadRequest()
                .json(serde_json::json!({ "error": "Give both scores or neither" }))
        }
    };
    respond(state.complete_match(path.id, body.winner_id, scores))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = ServerConfig::from_env();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(config.log_filter.as_str()));
    for warning in &config.warnings {
        log::warn!("{}", warning);
    }

    let bind = config.bind_address();
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(BracketService::new(MemoryStore::new()));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_bracket)
            .service(api_get_bracket)
            .service(api_register_team)
            .service(api_generate_bracket)
            .service(api_list_matches)
            .service(api_complete_match)
    })
    .bind(bind)?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data($state.clone())
                    .service(api_health)
                    .service(api_create_bracket)
                    .service(api_get_bracket)
                    .service(api_register_team)
                    .service(api_generate_bracket)
                    .service(api_list_matches)
                    .service(api_complete_match),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn health_is_ok() {
        let state: AppState = Data::new(BracketService::new(MemoryStore::new()));
        let app = app!(state);
        let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn unknown_bracket_is_404() {
        let state: AppState = Data::new(BracketService::new(MemoryStore::new()));
        let app = app!(state);
        let uri = format!("/api/brackets/{}", BracketId::new_v4());
        let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn generate_then_complete_a_ready_match() {
        let state: AppState = Data::new(BracketService::new(MemoryStore::new()));
        let app = app!(state);

        let bracket = state
            .create_bracket("Spring Cup", Sport::Volleyball, EliminationType::Double)
            .unwrap();
        for name in ["Aces", "Blockers", "Diggers", "Spikers"] {
            let req = test::TestRequest::post()
                .uri(&format!("/api/brackets/{}/teams", bracket.id))
                .set_json(serde_json::json!({ "name": name }))
                .to_request();
            assert!(test::call_service(&app, req).await.status().is_success());
        }

        let req = test::TestRequest::post()
            .uri(&format!("/api/brackets/{}/generate", bracket.id))
            .to_request();
        let generated: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(generated["matches"].as_array().map(Vec::len), Some(7));

        let ready = state.ready_matches(bracket.id).unwrap();
        assert_eq!(ready.len(), 2);
        let m = &ready[0];
        let req = test::TestRequest::post()
            .uri(&format!("/api/matches/{}/complete", m.id))
            .set_json(serde_json::json!({
                "winner_id": m.team1_id,
                "score_team1": 25,
                "score_team2": 19,
            }))
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());

        let again = test::TestRequest::post()
            .uri(&format!("/api/matches/{}/complete", m.id))
            .set_json(serde_json::json!({ "winner_id": m.team1_id }))
            .to_request();
        assert_eq!(test::call_service(&app, again).await.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn duplicate_team_name_conflicts() {
        let state: AppState = Data::new(BracketService::new(MemoryStore::new()));
        let app = app!(state);
        let bracket = state
            .create_bracket("Cup", Sport::Basketball, EliminationType::Single)
            .unwrap();
        let uri = format!("/api/brackets/{}/teams", bracket.id);
        for (name, expected) in [("Hoops", StatusCode::OK), ("hoops", StatusCode::CONFLICT)] {
            let req = test::TestRequest::post()
                .uri(&uri)
                .set_json(serde_json::json!({ "name": name }))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), expected);
        }
    }
}
