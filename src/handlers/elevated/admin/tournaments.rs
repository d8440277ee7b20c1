// handlers/elevated/admin/tournaments.rs - `admin-tournaments` function
//
// GET → list, POST → create, PUT → patch, DELETE ?id= → cancel.
// Admins and moderators alike.

use serde_json::{json, Map, Value};
use sqlx::types::BigDecimal;

use crate::api::{ApiResponse, ApiResult, Cors, Event, FunctionResponse};
use crate::auth::{authorize, TOURNAMENT_MANAGERS};
use crate::database::models::{NewTournament, UserRecord};
use crate::database::schemas::TOURNAMENT;
use crate::database::{Patch, PatchValue, Store};
use crate::error::ApiError;
use crate::handlers::invoke;
use crate::handlers::utils::{id_param, int_field};
use crate::types::{TournamentStatus, TournamentType};

pub const CORS: Cors = Cors::new("GET, POST, PUT, DELETE, OPTIONS");

const REQUIRED_FIELDS: [&str; 3] = ["name", "start_date", "end_date"];

pub async fn handle(store: &dyn Store, event: Event) -> FunctionResponse {
    invoke("admin-tournaments", CORS, &event, dispatch(store, &event)).await
}

async fn dispatch(store: &dyn Store, event: &Event) -> ApiResult {
    let manager = authorize(store, event, TOURNAMENT_MANAGERS).await?;

    match event.method().as_str() {
        "GET" => list(store).await,
        "POST" => create(store, event, &manager).await,
        "PUT" => update(store, event, &manager).await,
        "DELETE" => cancel(store, event, &manager).await,
        _ => Err(ApiError::method_not_allowed()),
    }
}

/// Newest first, with creator name and registration count
async fn list(store: &dyn Store) -> ApiResult {
    let tournaments = store.list_tournaments().await?;
    Ok(ApiResponse::success(json!({
        "success": true,
        "total": tournaments.len(),
        "tournaments": tournaments,
    })))
}

/// Coerce one optional field through the tournament schema
fn field(body: &Map<String, Value>, name: &str) -> Result<Option<PatchValue>, ApiError> {
    Ok(TOURNAMENT.coerce_present(body, name)?.filter(|value| !value.is_null()))
}

fn text_or_empty(value: Option<PatchValue>) -> String {
    value.and_then(|v| v.as_text().map(str::to_string)).unwrap_or_default()
}

fn money_or_zero(value: Option<PatchValue>) -> BigDecimal {
    value.and_then(|v| v.as_money().cloned()).unwrap_or_else(|| BigDecimal::from(0))
}

/**
 * POST /admin-tournaments - create a tournament
 *
 * Expected Input:
 * ```json
 * {
 *   "name": "Spring Open",         // Required
 *   "start_date": "2025-04-01",    // Required
 *   "end_date": "2025-04-03",      // Required
 *   "description": "", "location": "", "max_participants": 100,
 *   "registration_deadline": null, "entry_fee": 0, "prize_fund": 0,
 *   "tournament_type": "swiss", "time_control": "", "rounds": 9,
 *   "status": "planned"
 * }
 * ```
 *
 * Omitted optional fields take the defaults shown. `created_by` is the caller.
 */
async fn create(store: &dyn Store, event: &Event, manager: &UserRecord) -> ApiResult {
    let body = event.json_body()?;

    for name in REQUIRED_FIELDS {
        let present = match body.get(name) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        };
        if !present {
            return Err(ApiError::bad_request(format!("Field \"{}\" is required", name)));
        }
    }

    let (Some(name), Some(start_date), Some(end_date)) = (
        field(&body, "name")?.and_then(|v| v.as_text().map(str::to_string)),
        field(&body, "start_date")?.and_then(|v| v.as_date()),
        field(&body, "end_date")?.and_then(|v| v.as_date()),
    ) else {
        return Err(ApiError::bad_request("name, start_date and end_date must be valid"));
    };

    let tournament_type = field(&body, "tournament_type")?
        .and_then(|v| v.as_text().and_then(|t| t.parse::<TournamentType>().ok()))
        .unwrap_or(TournamentType::Swiss);
    let status = field(&body, "status")?
        .and_then(|v| v.as_text().and_then(|s| s.parse::<TournamentStatus>().ok()))
        .unwrap_or(TournamentStatus::Planned);

    let tournament = store
        .create_tournament(NewTournament {
            name,
            description: text_or_empty(field(&body, "description")?),
            start_date,
            end_date,
            location: text_or_empty(field(&body, "location")?),
            max_participants: field(&body, "max_participants")?.and_then(|v| v.as_integer()).unwrap_or(100),
            registration_deadline: field(&body, "registration_deadline")?.and_then(|v| v.as_date()),
            entry_fee: money_or_zero(field(&body, "entry_fee")?),
            prize_fund: money_or_zero(field(&body, "prize_fund")?),
            tournament_type,
            time_control: text_or_empty(field(&body, "time_control")?),
            rounds: field(&body, "rounds")?.and_then(|v| v.as_integer()).unwrap_or(9),
            status,
            created_by: manager.id,
        })
        .await?;
    tracing::info!(tournament_id = tournament.id, created_by = manager.id, "Tournament created");

    Ok(ApiResponse::created(json!({
        "success": true,
        "tournament": tournament,
        "message": "Tournament created successfully",
    })))
}

/// PUT /admin-tournaments `{id, ...}` - patch whitelisted fields
async fn update(store: &dyn Store, event: &Event, manager: &UserRecord) -> ApiResult {
    let body = event.json_body()?;
    let tournament_id = int_field(&body, "id")?.ok_or_else(|| ApiError::bad_request("Tournament ID is required"))?;
    let patch = Patch::from_input(&TOURNAMENT, &Value::Object(body))?;

    let tournament = store
        .update_tournament(tournament_id, &patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Tournament not found"))?;
    tracing::info!(tournament_id, updated_by = manager.id, fields = patch.len(), "Tournament updated");

    Ok(ApiResponse::success(json!({
        "success": true,
        "tournament": tournament,
        "message": "Tournament updated successfully",
    })))
}

/// DELETE /admin-tournaments?id=N - mark cancelled; active tournaments are refused
async fn cancel(store: &dyn Store, event: &Event, manager: &UserRecord) -> ApiResult {
    let tournament_id = id_param(event, "id", "Tournament ID is required")?;

    let tournament = store
        .find_tournament(tournament_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tournament not found"))?;
    if tournament.status == TournamentStatus::Active {
        return Err(ApiError::forbidden("Active tournaments cannot be cancelled"));
    }

    store.cancel_tournament(tournament_id).await?;
    tracing::info!(tournament_id, cancelled_by = manager.id, "Tournament cancelled");

    Ok(ApiResponse::success(json!({
        "success": true,
        "message": format!("Tournament \"{}\" cancelled", tournament.name),
    })))
}
