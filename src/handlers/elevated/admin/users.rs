// handlers/elevated/admin/users.rs - `admin-users` function
//
// GET → list, PUT → patch, DELETE ?id= → deactivate. Admin only.

use serde_json::{json, Value};

use crate::api::{ApiResponse, ApiResult, Cors, Event, FunctionResponse};
use crate::auth::{authorize, USER_ADMINISTRATORS};
use crate::database::models::{AdminUserView, UserRecord};
use crate::database::schemas::ADMIN_USER;
use crate::database::{Patch, Store};
use crate::error::ApiError;
use crate::handlers::invoke;
use crate::handlers::utils::{deactivates_admin, id_param, int_field};

pub const CORS: Cors = Cors::new("GET, PUT, DELETE, OPTIONS");

pub async fn handle(store: &dyn Store, event: Event) -> FunctionResponse {
    invoke("admin-users", CORS, &event, dispatch(store, &event)).await
}

async fn dispatch(store: &dyn Store, event: &Event) -> ApiResult {
    let admin = authorize(store, event, USER_ADMINISTRATORS).await?;

    match event.method().as_str() {
        "GET" => list(store).await,
        "PUT" => update(store, event, &admin).await,
        "DELETE" => deactivate(store, event, &admin).await,
        _ => Err(ApiError::method_not_allowed()),
    }
}

/// Every account, active or not, newest first
async fn list(store: &dyn Store) -> ApiResult {
    let users = store.list_users(true).await?;
    let users: Vec<AdminUserView> = users.iter().map(AdminUserView::from).collect();

    Ok(ApiResponse::success(json!({
        "success": true,
        "total": users.len(),
        "users": users,
    })))
}

/**
 * PUT /admin-users - patch one account
 *
 * Expected Input:
 * ```json
 * {
 *   "id": 7,                       // Required
 *   "full_name": "...", "email": "...", "role": "moderator", "is_active": false,
 *   "birth_date": "...", "gender": "...", "fsr_id": "...", "coach": "...",
 *   "educational_institution": "...", "representative_email": "...",
 *   "representative_phone": "..."
 * }
 * ```
 *
 * Fields outside the whitelist are ignored. Deactivating an administrator is
 * refused with 403 whoever asks.
 */
async fn update(store: &dyn Store, event: &Event, admin: &UserRecord) -> ApiResult {
    let body = event.json_body()?;
    let user_id = int_field(&body, "id")?.ok_or_else(|| ApiError::bad_request("User ID is required"))?;
    let patch = Patch::from_input(&ADMIN_USER, &Value::Object(body))?;

    let target = store
        .find_user(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    if deactivates_admin(&target, &patch) {
        return Err(ApiError::forbidden("Administrator accounts cannot be deactivated"));
    }

    let updated = store
        .update_user(user_id, &patch)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    tracing::info!(admin_id = admin.id, user_id, fields = patch.len(), "User updated");

    Ok(ApiResponse::success(json!({
        "success": true,
        "user": AdminUserView::from(&updated),
        "message": "User updated successfully",
    })))
}

/// DELETE /admin-users?id=N - soft delete (`is_active = false`)
async fn deactivate(store: &dyn Store, event: &Event, admin: &UserRecord) -> ApiResult {
    let user_id = id_param(event, "id", "User ID is required")?;

    let target = store
        .find_user(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    if target.is_admin() {
        return Err(ApiError::forbidden("Administrator accounts cannot be deactivated"));
    }

    store.deactivate_user(user_id).await?;
    tracing::info!(admin_id = admin.id, user_id, "User deactivated");

    Ok(ApiResponse::success(json!({
        "success": true,
        "message": format!("User {} deactivated", target.username),
    })))
}
