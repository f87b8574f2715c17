use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::translate::TargetLanguage;
use crate::utils::random_string;

/// Full application: routes, middleware and state
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub fn create_routes() -> Router<AppState> {
    Router::new()
        // Translator view
        .route("/client-ws", get(crate::websocket::websocket_handler))
        .route("/api/languages", get(get_languages))
        // Random string generator
        .route("/api/random", get(get_random))
        .route("/api/about", get(get_about))
        // Health check
        .route("/api/health", get(health_check))
        .fallback(not_found)
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "active_sessions": state.sessions.len(),
        "started_at": state.started_at.to_rfc3339(),
    }))
}

async fn get_languages() -> Json<Value> {
    let languages: Vec<Value> = TargetLanguage::ALL
        .iter()
        .map(|lang| {
            json!({
                "code": lang.code(),
                "name": lang.name(),
                "label": lang.to_string(),
            })
        })
        .collect();
    Json(json!({
        "source_language": crate::translate::SOURCE_LANGUAGE,
        "targets": languages,
    }))
}

#[derive(Debug, Deserialize)]
struct RandomParams {
    length: Option<String>,
    symbols: Option<String>,
}

/// Lenient length parsing: anything unparsable or below 1 becomes 1.
fn parse_length(raw: Option<&str>) -> usize {
    let Some(raw) = raw else {
        return random_string::DEFAULT_LENGTH;
    };
    match raw.trim().parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 1.0 => (n.floor() as usize).min(random_string::MAX_LENGTH),
        _ => 1,
    }
}

async fn get_random(Query(params): Query<RandomParams>) -> Json<Value> {
    let length = parse_length(params.length.as_deref());
    let include_symbols = params
        .symbols
        .as_deref()
        .and_then(|s| s.trim().parse::<bool>().ok())
        .unwrap_or(true);
    let result = random_string::generate(length, include_symbols);

    Json(json!({
        "length": result.chars().count(),
        "include_symbols": include_symbols,
        "result": result,
    }))
}

async fn get_about() -> Json<Value> {
    Json(json!({
        "name": "LinguaForge",
        "description": "Translate to connect everywhere",
        "features": [
            "Debounced live translation over WebSocket (/client-ws)",
            "Translator backed by the RapidAPI text-translator service",
            "Random string generator (/api/random)"
        ]
    }))
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": "Page not found", "home": "/client-ws"})),
    )
}
