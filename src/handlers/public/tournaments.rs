// handlers/public/tournaments.rs - `get-tournaments` function (public listing)

use serde_json::json;

use crate::api::{ApiResponse, ApiResult, Cors, Event, FunctionResponse};
use crate::config::config;
use crate::database::models::{PublicTournament, TournamentQuery};
use crate::database::Store;
use crate::error::ApiError;
use crate::handlers::{invoke, utils::limit_param};
use crate::types::TournamentStatus;

pub const CORS: Cors = Cors::new("GET, OPTIONS");

pub async fn handle(store: &dyn Store, event: Event) -> FunctionResponse {
    invoke("get-tournaments", CORS, &event, dispatch(store, &event)).await
}

async fn dispatch(store: &dyn Store, event: &Event) -> ApiResult {
    if event.method() != "GET" {
        return Err(ApiError::method_not_allowed());
    }
    list(store, event).await
}

/**
 * GET /get-tournaments?status=registration&limit=10
 *
 * Soonest start date first. `status` must name a real status; `limit`
 * defaults to TOURNAMENTS_DEFAULT_LIMIT and is clamped to
 * TOURNAMENTS_MAX_LIMIT.
 */
async fn list(store: &dyn Store, event: &Event) -> ApiResult {
    let status = match event.query("status").map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(raw.parse::<TournamentStatus>().map_err(|_| {
            ApiError::field_error(
                "status",
                format!("status must be one of {}", TournamentStatus::VALUES.join(", ")),
            )
        })?),
        None => None,
    };

    let api = &config().api;
    let limit = limit_param(event, api.tournaments_default_limit, api.tournaments_max_limit)?;

    let tournaments = store.list_public_tournaments(TournamentQuery { status, limit }).await?;
    let tournaments: Vec<PublicTournament> = tournaments.iter().map(PublicTournament::from).collect();

    Ok(ApiResponse::success(json!({
        "count": tournaments.len(),
        "tournaments": tournaments,
    })))
}
