pub mod remote;

use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::{get, post, put}, Json, Router};
use ordering_core::cache::settled;
use ordering_core::persist::{load_bootstrap, save_payload, Bootstrap, SavePayload};
use ordering_core::{CandidateView, Config, DragEvent, Lookups, Pointer, Post, PostId, Session, StoreError, View};
use parking_lot::Mutex;
use remote::{http_client, RemoteLookup};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub struct Settings {
    pub bootstrap: Option<PathBuf>,
    pub save_to: Option<PathBuf>,
    /// Root URL of the site serving the preview and search endpoints.
    pub remote: String,
    pub preview_path: String,
    pub search_path: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub config: Config,
}

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<Session>>,
    pub save_to: Option<PathBuf>,
}

#[derive(Deserialize)]
pub struct WaitParams {
    #[serde(default)]
    pub wait: bool,
}

#[derive(Deserialize)]
pub struct TitleBody {
    pub title: String,
}

#[derive(Deserialize)]
pub struct SearchBody {
    pub text: String,
}

#[derive(Deserialize)]
pub struct AddBody {
    pub post: Post,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub title: String,
    pub search_text: String,
    pub view: View,
    pub pointers: SavePayload,
}

#[derive(Serialize)]
pub struct DragResponse {
    pub applied: bool,
    pub pointers: SavePayload,
}

pub fn build_app(settings: Settings) -> Result<Router> {
    let bootstrap = match &settings.bootstrap {
        Some(path) => load_bootstrap(path)?,
        None => Bootstrap::default(),
    };
    let client = http_client(&settings.user_agent, settings.timeout)?;
    let defaults = RemoteLookup::new(client.clone(), &settings.remote, &settings.preview_path)?;
    let search = RemoteLookup::new(client, &settings.remote, &settings.search_path)?;
    tracing::info!(preview = %defaults.endpoint(), search = %search.endpoint(), "remote endpoints");

    let lookups = Lookups { defaults: Arc::new(defaults), search: Arc::new(search) };
    let session = Session::new(bootstrap, lookups, settings.config);
    Ok(router(session, settings.save_to))
}

pub fn router(session: Session, save_to: Option<PathBuf>) -> Router {
    let state = AppState { session: Arc::new(Mutex::new(session)), save_to };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/session", get(session_handler))
        .route("/title", put(title_handler))
        .route("/search", put(search_handler))
        .route("/candidates", get(candidates_handler))
        .route("/pointers", post(add_pointer))
        .route("/pointers/:id", axum::routing::delete(remove_pointer))
        .route("/drag", post(drag_handler))
        .route("/retry", post(retry_handler))
        .route("/save", get(payload_handler).post(save_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn snapshot(session: &Session) -> SessionResponse {
    SessionResponse {
        title: session.title().to_string(),
        search_text: session.search_text().to_string(),
        view: session.view(),
        pointers: session.save_payload(),
    }
}

pub async fn session_handler(State(state): State<AppState>, Query(params): Query<WaitParams>) -> Json<SessionResponse> {
    if params.wait {
        let slot = state.session.lock().flush_title();
        if let Some(rx) = slot {
            settled(rx).await;
        }
    }
    Json(snapshot(&state.session.lock()))
}

pub async fn title_handler(State(state): State<AppState>, Json(body): Json<TitleBody>) -> Json<SessionResponse> {
    let mut session = state.session.lock();
    session.set_title(body.title);
    Json(snapshot(&session))
}

pub async fn search_handler(State(state): State<AppState>, Json(body): Json<SearchBody>) -> Json<CandidateView> {
    let mut session = state.session.lock();
    session.set_search_text(body.text);
    Json(session.candidates())
}

pub async fn candidates_handler(State(state): State<AppState>, Query(params): Query<WaitParams>) -> Json<CandidateView> {
    if params.wait {
        let slot = state.session.lock().flush_search();
        if let Some(rx) = slot {
            settled(rx).await;
        }
    }
    Json(state.session.lock().candidates())
}

pub async fn add_pointer(
    State(state): State<AppState>,
    Json(body): Json<AddBody>,
) -> Result<(StatusCode, Json<Pointer>), (StatusCode, String)> {
    match state.session.lock().add(body.post) {
        Ok(pointer) => Ok((StatusCode::CREATED, Json(pointer))),
        Err(err @ StoreError::AlreadyPinned(_)) => Err((StatusCode::CONFLICT, err.to_string())),
    }
}

pub async fn remove_pointer(
    State(state): State<AppState>,
    Path(id): Path<PostId>,
) -> Result<Json<Pointer>, (StatusCode, String)> {
    state
        .session
        .lock()
        .remove(id)
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("post {id} is not pinned")))
}

pub async fn drag_handler(State(state): State<AppState>, Json(event): Json<DragEvent>) -> Json<DragResponse> {
    let mut session = state.session.lock();
    let applied = session.apply_drag(&event);
    Json(DragResponse { applied, pointers: session.save_payload() })
}

pub async fn retry_handler(State(state): State<AppState>) -> Json<SessionResponse> {
    let session = state.session.lock();
    session.retry_defaults();
    session.retry_search();
    Json(snapshot(&session))
}

pub async fn payload_handler(State(state): State<AppState>) -> Json<SavePayload> {
    Json(state.session.lock().save_payload())
}

pub async fn save_handler(State(state): State<AppState>) -> Result<Json<SavePayload>, (StatusCode, String)> {
    let Some(path) = &state.save_to else {
        return Err((StatusCode::NOT_FOUND, "no save path configured".into()));
    };
    let payload = state.session.lock().save_payload();
    save_payload(path, &payload).map_err(|e| {
        tracing::error!(error = %e, path = %path.display(), "saving pointers failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    tracing::info!(pointers = payload.0.len(), path = %path.display(), "pointers saved");
    Ok(Json(payload))
}
