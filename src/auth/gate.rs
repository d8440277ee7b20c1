use crate::api::Event;
use crate::database::{models::UserRecord, Store};
use crate::error::ApiError;
use crate::types::Role;

use super::session::validate_session;

/// Who may manage user accounts
pub const USER_ADMINISTRATORS: &[Role] = &[Role::Admin];

/// Who may create, edit and cancel tournaments
pub const TOURNAMENT_MANAGERS: &[Role] = &[Role::Admin, Role::Moderator];

/// 401 without a session, 403 when the role is not in `allowed`
pub fn require_role(user: Option<UserRecord>, allowed: &[Role]) -> Result<UserRecord, ApiError> {
    let user = user.ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !allowed.contains(&user.role) {
        tracing::warn!(user_id = user.id, role = %user.role, "Access denied for role");
        return Err(ApiError::forbidden("Access denied"));
    }

    Ok(user)
}

/// Validate the event's session token and apply the role requirement
pub async fn authorize(store: &dyn Store, event: &Event, allowed: &[Role]) -> Result<UserRecord, ApiError> {
    let user = validate_session(store, event.session_token()).await?;
    require_role(user, allowed)
}
