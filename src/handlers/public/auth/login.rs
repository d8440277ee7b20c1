// handlers/public/auth/login.rs - POST /auth {action: "login"}

use serde_json::{Map, Value};

use crate::api::{ApiResponse, ApiResult};
use crate::auth::password::{hash_password, verify_password, Verification};
use crate::auth::session::now;
use crate::auth::issue_session;
use crate::database::models::UserRecord;
use crate::database::Store;
use crate::error::ApiError;
use crate::handlers::utils::required_str;

use super::session_body;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/**
 * Authenticate by username (or email) and password, issue a fresh session
 *
 * Expected Input:
 * ```json
 * { "action": "login", "username": "bob", "password": "secret1" }
 * ```
 *
 * Unknown user, inactive account and wrong password all answer the same 401.
 * A match against a legacy SHA-256 digest is upgraded to Argon2 in place.
 */
pub async fn login(store: &dyn Store, body: &Map<String, Value>) -> ApiResult {
    let login = required_str(body, "username").or_else(|| required_str(body, "email"));
    let password = body.get("password").and_then(Value::as_str).filter(|p| !p.is_empty());
    let (Some(login), Some(password)) = (login, password) else {
        return Err(ApiError::bad_request("Username and password are required"));
    };

    let Some(user) = store.find_login_user(&login.to_lowercase()).await? else {
        tracing::warn!("Login failed: no active user for the given login");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    let verification = verify_password(password, &user.password_hash)?;
    if !verification.is_valid() {
        tracing::warn!(user_id = user.id, "Login failed: password mismatch");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    if verification == Verification::ValidLegacy {
        store.update_password_hash(user.id, &hash_password(password)?).await?;
        tracing::info!(user_id = user.id, "Upgraded legacy password hash");
    }

    let logged_in_at = now();
    store.record_login(user.id, logged_in_at).await?;
    let session = issue_session(store, user.id).await?;
    tracing::info!(user_id = user.id, "User logged in");

    let user = UserRecord {
        last_login: Some(logged_in_at),
        ..user
    };
    Ok(ApiResponse::success(session_body(&session, &user)))
}
