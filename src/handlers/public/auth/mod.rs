// handlers/public/auth/mod.rs - `auth` function
//
// GET → session introspection, POST/PUT → dispatch on the body's `action`.

use serde_json::{json, Map, Value};

use crate::api::{ApiResult, Cors, Event, FunctionResponse};
use crate::auth::IssuedSession;
use crate::database::models::{UserProfile, UserRecord};
use crate::database::Store;
use crate::error::ApiError;
use crate::handlers::invoke;

pub mod login;
pub mod profile;
pub mod register;
pub mod session;
pub mod users;

pub const CORS: Cors = Cors::new("GET, POST, PUT, OPTIONS");

pub async fn handle(store: &dyn Store, event: Event) -> FunctionResponse {
    invoke("auth", CORS, &event, dispatch(store, &event)).await
}

async fn dispatch(store: &dyn Store, event: &Event) -> ApiResult {
    match event.method().as_str() {
        "GET" => session::introspect(store, event).await,
        "POST" | "PUT" => {
            let body = event.json_body()?;
            let action = body.get("action").and_then(Value::as_str).unwrap_or_default();
            tracing::debug!(action, "auth action");

            match action {
                "register" => register::register(store, &body).await,
                "login" => login::login(store, &body).await,
                "logout" => session::logout(store, event).await,
                "updateProfile" => profile::update_profile(store, event, &body).await,
                "getAllUsers" => users::get_all_users(store, event).await,
                "getUserById" => users::get_user_by_id(store, event, &body).await,
                "updateUserById" => users::update_user_by_id(store, event, &body).await,
                _ => Err(ApiError::bad_request("Unknown action")),
            }
        }
        _ => Err(ApiError::method_not_allowed()),
    }
}

/// Body returned by `register` and `login`
pub(crate) fn session_body(session: &IssuedSession, user: &UserRecord) -> Value {
    json!({
        "success": true,
        "sessionToken": session.token,
        "expiresAt": session.expires_at,
        "user": UserProfile::from(user),
    })
}

/// Wrap the body map back into a JSON object for the patch builder
pub(crate) fn as_object(body: &Map<String, Value>) -> Value {
    Value::Object(body.clone())
}
