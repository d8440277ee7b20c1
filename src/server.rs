// server.rs - local HTTP host for the functions
//
// Every function is mounted at /<function> and /<function>/*rest; the request
// is converted to an Event, handed to the function, and its FunctionResponse
// is written back verbatim.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    routing::{any, get},
    Router,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api::Event;
use crate::database::Store;
use crate::error::ApiError;
use crate::handlers::Function;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/:function", any(function))
        .route("/:function/*rest", any(function))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    let functions: Vec<&str> = Function::ALL.iter().map(Function::slug).collect();

    Json(json!({
        "success": true,
        "name": "Chess Tournament API",
        "version": env!("CARGO_PKG_VERSION"),
        "functions": functions,
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "status": "ok",
                "timestamp": now,
                "database": "ok",
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "status": "degraded",
                    "timestamp": now,
                })),
            )
        }
    }
}

async fn function(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    Query(query): Query<HashMap<String, String>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let slug = params.get("function").map(String::as_str).unwrap_or_default();
    let Some(function) = Function::from_slug(slug) else {
        let err = ApiError::not_found(format!("Unknown function: {}", slug));
        return (StatusCode::NOT_FOUND, Json(err.to_json())).into_response();
    };

    let event = Event {
        http_method: method.as_str().to_string(),
        path: uri.path().to_string(),
        headers: headers
            .iter()
            .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
            .collect(),
        query_string_parameters: (!query.is_empty()).then_some(query),
        body: (!body.is_empty()).then_some(body),
        request_context: None,
    };

    function.handle(state.store.as_ref(), event).await.into_response()
}
