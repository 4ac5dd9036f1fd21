use axum::{
    extract::{Path, RawQuery, State},
    http::HeaderMap,
    response::Response,
    routing::get,
    Router,
};
use benchop_core::{Dispatcher, Parameters};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{invocation_response, ApiError, ResponseFormat};

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub strict_status: bool,
}

/// `/health` and `/runall` are matched before the `/{problem}` capture.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/runall", get(run_all))
        .route("/{problem}", get(run_problem))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// --- HANDLERS ---

async fn health_check() -> &'static str {
    "BENCHOP Gateway: Operational"
}

async fn run_all(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    let result = state.dispatcher.run_all().await?;
    Ok(invocation_response(
        result,
        ResponseFormat::from_headers(&headers),
        state.strict_status,
    ))
}

async fn run_problem(
    State(state): State<AppState>,
    Path(problem): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    info!("Request for problem '{}'", problem);
    let parameters = Parameters::from_query(query.as_deref().unwrap_or_default())?;
    let result = state.dispatcher.run_problem(&problem, parameters).await?;
    Ok(invocation_response(
        result,
        ResponseFormat::from_headers(&headers),
        state.strict_status,
    ))
}
