use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, NaiveDateTime, Utc};
use rand::{thread_rng, Rng};

use crate::config::config;
use crate::database::{models::UserRecord, DatabaseError, Store};

/// A freshly stored session
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: NaiveDateTime,
}

/// Current time as stored in the database (UTC, no zone)
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// 32 random bytes, URL-safe base64 without padding (43 characters)
pub fn generate_token() -> String {
    let mut token = [0u8; 32];
    thread_rng().fill(&mut token);
    general_purpose::URL_SAFE_NO_PAD.encode(token)
}

pub fn expiry_from(issued_at: NaiveDateTime) -> NaiveDateTime {
    issued_at + Duration::hours(config().security.session_ttl_hours)
}

pub async fn issue_session(store: &dyn Store, user_id: i32) -> Result<IssuedSession, DatabaseError> {
    let session = IssuedSession {
        token: generate_token(),
        expires_at: expiry_from(now()),
    };
    store.create_session(user_id, &session.token, session.expires_at).await?;
    Ok(session)
}

/// Resolve a presented token to its active user.
///
/// Missing, unknown, expired and deactivated all come back as `Ok(None)`;
/// only a store failure is an error.
pub async fn validate_session(store: &dyn Store, token: Option<&str>) -> Result<Option<UserRecord>, DatabaseError> {
    let Some(token) = token else {
        return Ok(None);
    };

    let user = store.find_session_user(token, now()).await?;
    if user.is_none() {
        tracing::warn!("Rejected session token (unknown, expired or inactive user)");
    }
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_url_safe_and_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 43);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn expiry_uses_configured_ttl() {
        let issued = now();
        let expires = expiry_from(issued);
        assert_eq!(expires - issued, Duration::hours(config().security.session_ttl_hours));
    }
}
