// handlers/public/auth/session.rs - GET /auth (introspection) and action "logout"

use serde_json::json;

use crate::api::{ApiResponse, ApiResult, Event};
use crate::auth::validate_session;
use crate::database::models::UserProfile;
use crate::database::Store;

/// `{authenticated: true, user}` for a live session, `{authenticated: false}` otherwise
pub async fn introspect(store: &dyn Store, event: &Event) -> ApiResult {
    let body = match validate_session(store, event.session_token()).await? {
        Some(user) => json!({ "authenticated": true, "user": UserProfile::from(&user) }),
        None => json!({ "authenticated": false }),
    };
    Ok(ApiResponse::success(body))
}

/// Drop the presented session, if any. Always succeeds.
pub async fn logout(store: &dyn Store, event: &Event) -> ApiResult {
    if let Some(token) = event.session_token() {
        let removed = store.delete_session(token).await?;
        tracing::debug!(removed, "Logged out");
    }
    Ok(ApiResponse::success(json!({ "success": true })))
}
