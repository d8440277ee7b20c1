// handlers/utils.rs - body and query helpers shared by the functions

use serde_json::{Map, Value};

use crate::api::Event;
use crate::database::models::UserRecord;
use crate::database::Patch;
use crate::error::ApiError;
use crate::types::Role;

/// Non-blank string field, trimmed
pub fn required_str<'a>(body: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    body.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

pub fn optional_str(body: &Map<String, Value>, field: &str) -> Option<String> {
    required_str(body, field).map(str::to_string)
}

/// Integer field given as a JSON number or a numeric string.
///
/// Absent or null is `Ok(None)`; anything else that is not an `i32` is a 400.
pub fn int_field(body: &Map<String, Value>, field: &str) -> Result<Option<i32>, ApiError> {
    let parsed = match body.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => None,
    };

    parsed
        .and_then(|i| i32::try_from(i).ok())
        .map(Some)
        .ok_or_else(|| ApiError::field_error(field, format!("{} must be an integer", field)))
}

/// Numeric id from the query string; missing and malformed both answer `missing`
pub fn id_param(event: &Event, name: &str, missing: &str) -> Result<i32, ApiError> {
    event
        .query(name)
        .and_then(|raw| raw.trim().parse::<i32>().ok())
        .ok_or_else(|| ApiError::bad_request(missing))
}

/// `limit` query parameter: default when absent, clamped to `[1, max]`, 400 when not a number
pub fn limit_param(event: &Event, default: i64, max: i64) -> Result<i64, ApiError> {
    let Some(raw) = event.query("limit").map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(default.clamp(1, max));
    };

    raw.parse::<i64>()
        .map(|limit| limit.clamp(1, max))
        .map_err(|_| ApiError::field_error("limit", "limit must be a number"))
}

/// Whether the patch sets `is_active` to false
pub fn deactivates(patch: &Patch) -> bool {
    patch.get("is_active").and_then(|v| v.as_bool()) == Some(false)
}

/// Whether applying the patch would leave an administrator account inactive.
///
/// An admin target stays protected even when the same patch demotes it.
pub fn deactivates_admin(target: &UserRecord, patch: &Patch) -> bool {
    let promotes = patch.get("role").and_then(|v| v.as_text()) == Some(Role::Admin.as_str());
    (target.is_admin() || promotes) && deactivates(patch)
}
