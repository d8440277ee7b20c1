// handlers/public/auth/users.rs - admin lookups through the auth function
//
// Actions getAllUsers, getUserById and updateUserById; all require an admin session.

use serde_json::{json, Map, Value};

use crate::api::{ApiResponse, ApiResult, Event};
use crate::auth::{authorize, USER_ADMINISTRATORS};
use crate::database::models::UserProfile;
use crate::database::schemas::USER_ACCOUNT;
use crate::database::{Patch, Store};
use crate::error::ApiError;
use crate::handlers::utils::{deactivates_admin, int_field};

use super::as_object;

/// Active users, newest first
pub async fn get_all_users(store: &dyn Store, event: &Event) -> ApiResult {
    authorize(store, event, USER_ADMINISTRATORS).await?;

    let users = store.list_users(false).await?;
    let users: Vec<UserProfile> = users.iter().map(UserProfile::from).collect();
    Ok(ApiResponse::success(json!({ "success": true, "users": users })))
}

pub async fn get_user_by_id(store: &dyn Store, event: &Event, body: &Map<String, Value>) -> ApiResult {
    authorize(store, event, USER_ADMINISTRATORS).await?;

    let user_id = int_field(body, "userId")?.ok_or_else(|| ApiError::bad_request("userId is required"))?;
    let user = store
        .find_user(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::success(json!({ "success": true, "user": UserProfile::from(&user) })))
}

/**
 * Patch any user's profile, role or activation
 *
 * Expected Input:
 * ```json
 * { "action": "updateUserById", "userId": 7, "role": "moderator", "isActive": true, ... }
 * ```
 *
 * Administrator accounts cannot be deactivated (403).
 */
pub async fn update_user_by_id(store: &dyn Store, event: &Event, body: &Map<String, Value>) -> ApiResult {
    let admin = authorize(store, event, USER_ADMINISTRATORS).await?;

    let user_id = int_field(body, "userId")?.ok_or_else(|| ApiError::bad_request("userId is required"))?;
    let patch = Patch::from_input(&USER_ACCOUNT, &as_object(body))?;

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

    tracing::info!(admin_id = admin.id, user_id, "User updated by admin");
    Ok(ApiResponse::success(json!({ "success": true, "user": UserProfile::from(&updated) })))
}
