// handlers/public/auth/profile.rs - POST /auth {action: "updateProfile"}

use serde_json::{json, Map, Value};

use crate::api::{ApiResponse, ApiResult, Event};
use crate::auth::validate_session;
use crate::database::models::UserProfile;
use crate::database::schemas::USER_PROFILE;
use crate::database::{Patch, Store};
use crate::error::ApiError;

use super::as_object;

/**
 * Patch the caller's own profile
 *
 * Expected Input (any subset):
 * ```json
 * {
 *   "action": "updateProfile",
 *   "fullName": "Bob B", "email": "b@x.com", "birthDate": "2010-05-01",
 *   "fsrId": "...", "coach": "...", "educationalInstitution": "...",
 *   "gender": "...", "representativeEmail": "...", "representativePhone": "..."
 * }
 * ```
 */
pub async fn update_profile(store: &dyn Store, event: &Event, body: &Map<String, Value>) -> ApiResult {
    let user = validate_session(store, event.session_token())
        .await?
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let patch = Patch::from_input(&USER_PROFILE, &as_object(body))?;
    let updated = store
        .update_user(user.id, &patch)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    tracing::info!(user_id = user.id, fields = patch.len(), "Profile updated");
    Ok(ApiResponse::success(json!({ "success": true, "user": UserProfile::from(&updated) })))
}
