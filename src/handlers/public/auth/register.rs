// handlers/public/auth/register.rs - POST /auth {action: "register"}

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::api::{ApiResponse, ApiResult};
use crate::auth::password::hash_password;
use crate::auth::validation::{validate_email_format, validate_password_length, validate_username_format};
use crate::auth::issue_session;
use crate::config::config;
use crate::database::models::NewUser;
use crate::database::schemas::USER_PROFILE;
use crate::database::Store;
use crate::error::ApiError;
use crate::handlers::utils::{optional_str, required_str};

use super::session_body;

/**
 * Create a player account and sign it in
 *
 * Expected Input:
 * ```json
 * {
 *   "action": "register",
 *   "username": "bob",          // Required: 3-50 chars, letters/digits/_/-
 *   "email": "b@x.com",         // Required
 *   "password": "secret1",      // Required: PASSWORD_MIN_LENGTH or more
 *   "fullName": "Bob B",        // Required
 *   "birthDate": "2010-05-01",  // Optional, plus fsrId, coach, gender, ...
 * }
 * ```
 *
 * Username and email are stored lower-cased. The account always gets role
 * `player` and a linked players row named after `fullName`.
 */
pub async fn register(store: &dyn Store, body: &Map<String, Value>) -> ApiResult {
    let mut missing = HashMap::new();
    for field in ["username", "email", "password", "fullName"] {
        if required_str(body, field).is_none() {
            missing.insert(field.to_string(), "required".to_string());
        }
    }
    let (Some(username), Some(email), Some(password), Some(full_name)) = (
        required_str(body, "username"),
        required_str(body, "email"),
        body.get("password").and_then(Value::as_str).filter(|p| !p.is_empty()),
        required_str(body, "fullName"),
    ) else {
        return Err(ApiError::validation_error("All required fields must be filled", Some(missing)));
    };

    let username = username.to_lowercase();
    let email = email.to_lowercase();
    validate_username_format(&username).map_err(|problem| ApiError::field_error("username", problem))?;
    validate_email_format(&email).map_err(|problem| ApiError::field_error("email", problem))?;
    validate_password_length(password, config().security.min_password_length)
        .map_err(|problem| ApiError::field_error("password", problem))?;

    let birth_date = USER_PROFILE
        .coerce_present(body, "birthDate")?
        .and_then(|value| value.as_date());

    if store.username_or_email_taken(&username, &email).await? {
        return Err(ApiError::conflict("A user with this username or email already exists"));
    }

    let user = store
        .register_user(NewUser {
            username,
            email,
            password_hash: hash_password(password)?,
            full_name: full_name.to_string(),
            birth_date,
            fsr_id: optional_str(body, "fsrId"),
            coach: optional_str(body, "coach"),
            educational_institution: optional_str(body, "educationalInstitution"),
            gender: optional_str(body, "gender"),
            representative_email: optional_str(body, "representativeEmail").map(|e| e.to_lowercase()),
            representative_phone: optional_str(body, "representativePhone"),
        })
        .await?;

    let session = issue_session(store, user.id).await?;
    tracing::info!(user_id = user.id, username = %user.username, "Registered new user");

    Ok(ApiResponse::success(session_body(&session, &user)))
}
