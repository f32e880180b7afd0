//! REST API handlers for borderhub-server.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::{debug, warn};

use borderhub_core::error::HubError;
use borderhub_core::explorer::ExplorerPage;
use borderhub_core::{
    Aggregation, BorderSelection, DatasetKind, Decay, FilterSelection, ResultExplorer, View,
};

use crate::state::AppState;

// ─── Router ──────────────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/config", get(get_server_config))
        .route("/explorer", get(get_page))
        .route("/explorer/options", get(get_options))
        .route("/explorer/mpi/bars", get(get_mpi_bars))
        .route("/explorer/mpi/long", get(get_mpi_long))
        .route("/explorer/mpi/heatmap", get(get_mpi_heatmap))
        .route("/explorer/ci/trends", get(get_ci_trends))
        .route("/explorer/ci/heatmap", get(get_ci_heatmap))
        .route("/explorer/ci/year/{year}", get(get_ci_year))
        .route("/downloads", get(list_downloads))
        .route("/downloads/{name}", get(download))
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", axum::routing::delete(delete_session))
        .route("/sessions/{id}/slide", get(get_slide))
        .route("/sessions/{id}/slide/next", post(next_slide))
        .route("/sessions/{id}/slide/prev", post(prev_slide))
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Map an error to a status code and a JSON body a page can show.
fn error_response(err: HubError) -> Response {
    if err.is_data_problem() {
        warn!("exploration data unavailable: {}", err);
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(View::<()>::unavailable(&err)),
        )
            .into_response();
    }
    let status = match err {
        HubError::SessionNotFound(_)
        | HubError::UnknownDataset(_)
        | HubError::OptionalDataMissing(_) => StatusCode::NOT_FOUND,
        HubError::UnknownDecay(_)
        | HubError::UnknownAggregation(_)
        | HubError::EmptySelection
        | HubError::EmptyDeck => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(serde_json::json!({ "error": err.to_string() }))).into_response()
}

fn explorer(state: &AppState) -> Result<ResultExplorer, Response> {
    state
        .cache
        .get()
        .map(ResultExplorer::new)
        .map_err(error_response)
}

fn parse_decay(raw: Option<&str>) -> Result<Decay, Response> {
    raw.map_or(Ok(Decay::default()), |s| s.parse())
        .map_err(error_response)
}

/// Query params shared by the border-filtered views.
#[derive(Deserialize, Default)]
struct BorderQuery {
    /// Comma-separated border names. Omitted means every border; an empty
    /// value means none.
    borders: Option<String>,
}

impl BorderQuery {
    fn selection(&self) -> BorderSelection {
        BorderSelection::from_query(self.borders.as_deref())
    }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let data = state.cache.get();
    Json(serde_json::json!({
        "status": "ok",
        "data_dir": state.cache.dir().display().to_string(),
        "data_available": data.is_ok(),
        "message": data.err().map(|e| e.to_string()),
        "sessions": state.sessions.len(),
    }))
}

async fn get_server_config() -> impl IntoResponse {
    Json(serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "decays": Decay::ALL,
    }))
}

#[derive(Deserialize)]
struct PageQuery {
    borders: Option<String>,
    decay: Option<String>,
    year: Option<i32>,
}

async fn get_page(State(state): State<AppState>, Query(q): Query<PageQuery>) -> Response {
    let ex = match explorer(&state) {
        Ok(ex) => ex,
        Err(r) => return r,
    };
    let decay = match parse_decay(q.decay.as_deref()) {
        Ok(d) => d,
        Err(r) => return r,
    };
    let selection = FilterSelection {
        borders: BorderSelection::from_query(q.borders.as_deref()),
        decay,
        year: q.year,
    };
    let page: ExplorerPage = ex.render(&selection);
    Json(page).into_response()
}

async fn get_options(State(state): State<AppState>) -> Response {
    match explorer(&state) {
        Ok(ex) => Json(ex.options()).into_response(),
        Err(r) => r,
    }
}

async fn get_mpi_bars(State(state): State<AppState>, Query(q): Query<BorderQuery>) -> Response {
    match explorer(&state) {
        Ok(ex) => Json(ex.mpi_bars(&q.selection())).into_response(),
        Err(r) => r,
    }
}

async fn get_mpi_long(State(state): State<AppState>, Query(q): Query<BorderQuery>) -> Response {
    match explorer(&state) {
        Ok(ex) => Json(ex.mpi_long(&q.selection())).into_response(),
        Err(r) => r,
    }
}

#[derive(Deserialize)]
struct DecayQuery {
    decay: Option<String>,
}

async fn get_mpi_heatmap(State(state): State<AppState>, Query(q): Query<DecayQuery>) -> Response {
    let decay = match parse_decay(q.decay.as_deref()) {
        Ok(d) => d,
        Err(r) => return r,
    };
    match explorer(&state) {
        Ok(ex) => Json(ex.mpi_heatmap(decay)).into_response(),
        Err(r) => r,
    }
}

async fn get_ci_trends(State(state): State<AppState>, Query(q): Query<BorderQuery>) -> Response {
    match explorer(&state) {
        Ok(ex) => Json(ex.ci_trends(&q.selection())).into_response(),
        Err(r) => r,
    }
}

#[derive(Deserialize)]
struct HeatmapQuery {
    agg: Option<String>,
}

async fn get_ci_heatmap(State(state): State<AppState>, Query(q): Query<HeatmapQuery>) -> Response {
    let agg = match q.agg.as_deref().map_or(Ok(Aggregation::Sum), str::parse) {
        Ok(a) => a,
        Err(e) => return error_response(e),
    };
    let ex = match explorer(&state) {
        Ok(ex) => ex,
        Err(r) => return r,
    };
    match ex.ci_heatmap(agg) {
        Ok(view) => Json(view).into_response(),
        Err(e) => error_response(e),
    }
}

async fn get_ci_year(State(state): State<AppState>, Path(year): Path<i32>) -> Response {
    match explorer(&state) {
        Ok(ex) => Json(ex.year_snapshot(year)).into_response(),
        Err(r) => r,
    }
}

async fn list_downloads(State(state): State<AppState>) -> Response {
    match explorer(&state) {
        Ok(ex) => Json(ex.downloads()).into_response(),
        Err(r) => r,
    }
}

async fn download(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(q): Query<BorderQuery>,
) -> Response {
    let kind: DatasetKind = match name.parse() {
        Ok(k) => k,
        Err(e) => return error_response(e),
    };
    let ex = match explorer(&state) {
        Ok(ex) => ex,
        Err(r) => return r,
    };
    let bytes = match ex.export_selection(kind, &q.selection()) {
        Ok(b) => b,
        Err(e) => return error_response(e),
    };
    debug!(dataset = %kind, bytes = bytes.len(), "serving download");

    Response::builder()
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", kind.file_name()),
        )
        .body(Body::from(bytes))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

async fn create_session(State(state): State<AppState>) -> Response {
    match state.sessions.create(state.deck.clone()) {
        Ok(info) => (StatusCode::CREATED, Json(info)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn delete_session(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    if state.sessions.remove(&id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error_response(HubError::SessionNotFound(id))
    }
}

async fn get_slide(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.sessions.with_session(&id, |s| s.navigator.position()) {
        Ok(pos) => Json(pos).into_response(),
        Err(e) => error_response(e),
    }
}

async fn next_slide(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let moved = state.sessions.with_session(&id, |s| {
        s.navigator.advance();
        s.navigator.position()
    });
    match moved {
        Ok(pos) => Json(pos).into_response(),
        Err(e) => error_response(e),
    }
}

async fn prev_slide(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let moved = state.sessions.with_session(&id, |s| {
        s.navigator.retreat();
        s.navigator.position()
    });
    match moved {
        Ok(pos) => Json(pos).into_response(),
        Err(e) => error_response(e),
    }
}

// ─── Frontend (embedded) ─────────────────────────────────────────────────────

/// Serve the embedded dashboard HTML/JS/CSS.
pub async fn serve_frontend(uri: axum::http::Uri) -> impl IntoResponse {
    let path = uri.path().trim_start_matches('/');

    let (actual_path, content) = match Assets::get(path) {
        Some(content) => (path, content),
        None => match Assets::get("index.html") {
            Some(content) => ("index.html", content),
            None => return StatusCode::NOT_FOUND.into_response(),
        },
    };

    let mime = mime_guess::from_path(actual_path).first_or_octet_stream();

    Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .body(Body::from(content.data.into_owned()))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

#[derive(rust_embed::Embed)]
#[folder = "../../frontend/dist"]
#[include = "*.html"]
#[include = "*.js"]
#[include = "*.css"]
struct Assets;
