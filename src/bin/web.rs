//! Single binary web server: JSON API for pool schedule generation and batch schedule editing.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! Scheduling settings come from SCHEDULE_* variables (see `ScheduleConfig::from_env`).

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tournament_schedule_web::{
    generate_schedule, parse_clock, EditorSession, FieldNumber, MatchId, MemoryStore, PoolFilter,
    PoolId, ScheduleConfig, ScheduleError, ScheduleStore, StoreError, TeamId, TimeSettings,
    TournamentId,
};
use uuid::Uuid;

/// Per-operator editor session + last activity time (for auto-cleanup).
struct SessionEntry {
    session: EditorSession,
    last_activity: Instant,
}

/// Store, settings and open editor sessions by id. Sessions are removed after 12h inactivity.
struct Schedules {
    store: MemoryStore,
    config: ScheduleConfig,
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
}

type AppState = Data<Schedules>;

/// Inactivity threshold: sessions not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTeamBody {
    team_name: String,
}

#[derive(Deserialize)]
struct CreatePoolBody {
    pool_name: String,
    team_ids: Vec<TeamId>,
}

#[derive(Deserialize)]
struct FilterBody {
    pool_id: Option<PoolId>,
}

#[derive(Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum SelectionAction {
    Select,
    Deselect,
    Toggle,
    SelectAll,
    DeselectAll,
    Clear,
}

#[derive(Deserialize)]
struct SelectionBody {
    action: SelectionAction,
    match_id: Option<MatchId>,
}

#[derive(Deserialize)]
struct DateBody {
    date: NaiveDate,
}

#[derive(Deserialize)]
struct FieldBody {
    field_number: FieldNumber,
}

/// Missing values fall back to the configured defaults.
#[derive(Default, Deserialize)]
struct TimePreviewBody {
    start_time: Option<String>,
    duration: Option<u32>,
    interval: Option<u32>,
}

#[derive(Deserialize)]
struct PreviewStartBody {
    start_time: String,
}

#[derive(Deserialize)]
struct ReorderBody {
    source: usize,
    destination: usize,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segment: editor session id (e.g. /api/sessions/{sid})
#[derive(Deserialize)]
struct SessionPath {
    sid: Uuid,
}

/// Path segments: session id and preview row (e.g. /api/sessions/{sid}/batch/time/preview/{row})
#[derive(Deserialize)]
struct PreviewRowPath {
    sid: Uuid,
    row: usize,
}

/// Map an error to a JSON `{ "error": ... }` response with a fitting status.
fn error_response(e: &ScheduleError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        ScheduleError::MatchNotFound(_) | ScheduleError::Store(StoreError::NotFound { .. }) => {
            HttpResponse::NotFound().json(body)
        }
        ScheduleError::Conflict { .. } => HttpResponse::Conflict().json(body),
        e if e.is_validation() => HttpResponse::BadRequest().json(body),
        _ => HttpResponse::BadGateway().json(body),
    }
}

/// Look up a session, refresh its activity time, run `action`, and answer with the session.
fn with_session<F>(state: &AppState, sid: Uuid, action: F) -> HttpResponse
where
    F: FnOnce(&mut EditorSession, &MemoryStore) -> Result<(), ScheduleError>,
{
    let mut g = match state.sessions.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&sid) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No session" })),
    };
    entry.last_activity = Instant::now();
    match action(&mut entry.session, &state.store) {
        Ok(()) => HttpResponse::Ok().json(&entry.session),
        Err(e) => error_response(&e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tournament-schedule-web",
    })
}

/// Register a team (ids are assigned by the store).
#[post("/api/teams")]
async fn api_create_team(state: AppState, body: Json<CreateTeamBody>) -> HttpResponse {
    let name = body.team_name.trim();
    if name.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({ "error": "Team name is empty" }));
    }
    match state.store.add_team(name) {
        Ok(team) => HttpResponse::Ok().json(team),
        Err(e) => error_response(&e.into()),
    }
}

/// Create a pool in a tournament from existing teams.
#[post("/api/tournaments/{id}/pools")]
async fn api_create_pool(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<CreatePoolBody>,
) -> HttpResponse {
    match state
        .store
        .add_pool(path.id, body.pool_name.trim(), &body.team_ids)
    {
        Ok(pool) => HttpResponse::Ok().json(pool),
        Err(e) => error_response(&e.into()),
    }
}

/// List a tournament's pools ordered by name.
#[get("/api/tournaments/{id}/pools")]
async fn api_list_pools(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.store.pools(path.id) {
        Ok(pools) => HttpResponse::Ok().json(pools),
        Err(e) => error_response(&e.into()),
    }
}

/// Replace the tournament's non-playoff matches with a new round-robin schedule.
/// Open editor sessions of the tournament are reloaded afterwards.
#[post("/api/tournaments/{id}/schedule/generate")]
async fn api_generate_schedule(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let matches = match generate_schedule(&state.store, path.id, &state.config) {
        Ok(m) => m,
        Err(e) => return error_response(&e),
    };
    match state.sessions.write() {
        Ok(mut g) => {
            for entry in g.values_mut().filter(|e| e.session.tournament_id() == path.id) {
                if let Err(e) = entry.session.refresh(&state.store) {
                    log::warn!("Reloading session after regeneration failed: {e}");
                }
            }
        }
        Err(_) => log::warn!(
            "Session lock poisoned, open sessions of tournament {} not reloaded",
            path.id
        ),
    }
    HttpResponse::Ok().json(matches)
}

/// Non-playoff matches in play order.
#[get("/api/tournaments/{id}/matches")]
async fn api_list_matches(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.store.matches(path.id) {
        Ok(matches) => HttpResponse::Ok().json(matches),
        Err(e) => error_response(&e.into()),
    }
}

/// Open an editor session on a tournament (client keeps the returned id).
#[post("/api/tournaments/{id}/sessions")]
async fn api_open_session(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let session = match EditorSession::load(&state.store, path.id, &state.config) {
        Ok(s) => s,
        Err(e) => return error_response(&e),
    };
    let sid = Uuid::new_v4();
    let mut g = match state.sessions.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let body = serde_json::json!({ "session_id": sid, "session": &session });
    g.insert(
        sid,
        SessionEntry {
            session,
            last_activity: Instant::now(),
        },
    );
    log::info!("Opened editor session {sid} on tournament {}", path.id);
    HttpResponse::Ok().json(body)
}

#[get("/api/sessions/{sid}")]
async fn api_get_session(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    with_session(&state, path.sid, |_, _| Ok(()))
}

#[post("/api/sessions/{sid}/refresh")]
async fn api_refresh_session(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    with_session(&state, path.sid, |s, store| s.refresh(store))
}

/// Show all pools (`pool_id: null`) or a single pool.
#[put("/api/sessions/{sid}/filter")]
async fn api_set_filter(
    state: AppState,
    path: Path<SessionPath>,
    body: Json<FilterBody>,
) -> HttpResponse {
    let filter = body.pool_id.map_or(PoolFilter::All, PoolFilter::Pool);
    with_session(&state, path.sid, |s, _| {
        s.set_pool_filter(filter);
        Ok(())
    })
}

#[post("/api/sessions/{sid}/selection")]
async fn api_change_selection(
    state: AppState,
    path: Path<SessionPath>,
    body: Json<SelectionBody>,
) -> HttpResponse {
    let action = body.action;
    let match_id = match (action, body.match_id) {
        (SelectionAction::Select | SelectionAction::Deselect | SelectionAction::Toggle, None) => {
            return HttpResponse::BadRequest()
                .json(serde_json::json!({ "error": "match_id is required" }));
        }
        (_, id) => id.unwrap_or_default(),
    };
    with_session(&state, path.sid, |s, _| match action {
        SelectionAction::Select => s.select(match_id),
        SelectionAction::Deselect => {
            s.deselect(match_id);
            Ok(())
        }
        SelectionAction::Toggle => s.toggle(match_id),
        SelectionAction::SelectAll => {
            s.select_all_visible();
            Ok(())
        }
        SelectionAction::DeselectAll => {
            s.deselect_all_visible();
            Ok(())
        }
        SelectionAction::Clear => {
            s.clear_selection();
            Ok(())
        }
    })
}

#[post("/api/sessions/{sid}/batch/date")]
async fn api_batch_date(
    state: AppState,
    path: Path<SessionPath>,
    body: Json<DateBody>,
) -> HttpResponse {
    with_session(&state, path.sid, |s, store| {
        s.batch_update_date(store, body.date).map(|_| ())
    })
}

#[post("/api/sessions/{sid}/batch/field")]
async fn api_batch_field(
    state: AppState,
    path: Path<SessionPath>,
    body: Json<FieldBody>,
) -> HttpResponse {
    with_session(&state, path.sid, |s, store| {
        s.batch_update_field(store, body.field_number).map(|_| ())
    })
}

/// Compute a time ladder over the selection; nothing is saved yet.
#[post("/api/sessions/{sid}/batch/time/preview")]
async fn api_time_preview(
    state: AppState,
    path: Path<SessionPath>,
    body: Option<Json<TimePreviewBody>>,
) -> HttpResponse {
    let body = body.map(Json::into_inner).unwrap_or_default();
    with_session(&state, path.sid, |s, _| {
        let defaults = s.default_time_settings();
        let start_time = match body.start_time.as_deref() {
            Some(raw) => parse_clock(raw)?,
            None => defaults.start_time,
        };
        let settings = TimeSettings {
            start_time,
            duration: body.duration.unwrap_or(defaults.duration),
            interval: body.interval.unwrap_or(defaults.interval),
        };
        s.preview_times(settings).map(|_| ())
    })
}

/// Hand-edit one preview row's start time.
#[put("/api/sessions/{sid}/batch/time/preview/{row}")]
async fn api_time_preview_override(
    state: AppState,
    path: Path<PreviewRowPath>,
    body: Json<PreviewStartBody>,
) -> HttpResponse {
    let row = path.row;
    with_session(&state, path.sid, |s, _| {
        let start = parse_clock(&body.start_time)?;
        s.override_preview_start(row, start).map(|_| ())
    })
}

/// Re-run the ladder from this row onwards.
#[post("/api/sessions/{sid}/batch/time/preview/{row}/recalculate")]
async fn api_time_preview_recalculate(
    state: AppState,
    path: Path<PreviewRowPath>,
) -> HttpResponse {
    let row = path.row;
    with_session(&state, path.sid, |s, _| {
        s.recalculate_following(row).map(|_| ())
    })
}

/// Cancel the pending preview.
#[delete("/api/sessions/{sid}/batch/time/preview")]
async fn api_time_preview_discard(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    with_session(&state, path.sid, |s, _| {
        s.discard_time_preview();
        Ok(())
    })
}

#[post("/api/sessions/{sid}/batch/time/commit")]
async fn api_time_commit(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    with_session(&state, path.sid, |s, store| {
        s.commit_time_preview(store).map(|_| ())
    })
}

/// Drag-and-drop within the filtered view.
#[post("/api/sessions/{sid}/reorder")]
async fn api_reorder(
    state: AppState,
    path: Path<SessionPath>,
    body: Json<ReorderBody>,
) -> HttpResponse {
    with_session(&state, path.sid, |s, store| {
        s.reorder(store, body.source, body.destination)
    })
}

#[post("/api/sessions/{sid}/undo")]
async fn api_undo(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    with_session(&state, path.sid, |s, store| s.undo(store).map(|_| ()))
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    let config = ScheduleConfig::from_env();
    log::info!(
        "Starting server at http://{}:{} (fields {:?}, undo depth {})",
        bind.0,
        bind.1,
        config.fields,
        config.undo_depth
    );

    let state = Data::new(Schedules {
        store: MemoryStore::new(),
        config,
        sessions: RwLock::new(HashMap::new()),
    });

    // Background task: every 30 minutes, drop sessions inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.sessions.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive editor session(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_team)
            .service(api_create_pool)
            .service(api_list_pools)
            .service(api_generate_schedule)
            .service(api_list_matches)
            .service(api_open_session)
            .service(api_get_session)
            .service(api_refresh_session)
            .service(api_set_filter)
            .service(api_change_selection)
            .service(api_batch_date)
            .service(api_batch_field)
            .service(api_time_preview)
            .service(api_time_preview_override)
            .service(api_time_preview_recalculate)
            .service(api_time_preview_discard)
            .service(api_time_commit)
            .service(api_reorder)
            .service(api_undo)
    })
    .bind(bind)?
    .run()
    .await
}
