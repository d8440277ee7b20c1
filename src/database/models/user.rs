use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::FromRow;

use crate::types::Role;

/// A row of `users`, joined to the linked player (if any)
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub is_active: bool,
    pub birth_date: Option<NaiveDate>,
    pub fsr_id: Option<String>,
    pub coach: Option<String>,
    pub educational_institution: Option<String>,
    pub gender: Option<String>,
    pub representative_email: Option<String>,
    pub representative_phone: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    pub last_login: Option<NaiveDateTime>,
    pub player_id: Option<i32>,
}

impl UserRecord {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Fields collected at registration; username and email are already lower-cased
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub birth_date: Option<NaiveDate>,
    pub fsr_id: Option<String>,
    pub coach: Option<String>,
    pub educational_institution: Option<String>,
    pub gender: Option<String>,
    pub representative_email: Option<String>,
    pub representative_phone: Option<String>,
}

/// User as returned by the `auth` function (camelCase, never includes the hash)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub birth_date: Option<NaiveDate>,
    pub fsr_id: Option<String>,
    pub coach: Option<String>,
    pub educational_institution: Option<String>,
    pub gender: Option<String>,
    pub representative_email: Option<String>,
    pub representative_phone: Option<String>,
    pub player_id: Option<i32>,
    pub is_active: bool,
    pub last_login: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
}

impl From<&UserRecord> for UserProfile {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            birth_date: user.birth_date,
            fsr_id: user.fsr_id.clone(),
            coach: user.coach.clone(),
            educational_institution: user.educational_institution.clone(),
            gender: user.gender.clone(),
            representative_email: user.representative_email.clone(),
            representative_phone: user.representative_phone.clone(),
            player_id: user.player_id,
            is_active: user.is_active,
            last_login: user.last_login,
            created_at: user.created_at,
        }
    }
}

/// User as returned by `admin-users` (snake_case column names)
#[derive(Debug, Clone, Serialize)]
pub struct AdminUserView {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    pub last_login: Option<NaiveDateTime>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub fsr_id: Option<String>,
    pub coach: Option<String>,
    pub educational_institution: Option<String>,
    pub representative_email: Option<String>,
    pub representative_phone: Option<String>,
    pub player_id: Option<i32>,
}

impl From<&UserRecord> for AdminUserView {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
            last_login: user.last_login,
            birth_date: user.birth_date,
            gender: user.gender.clone(),
            fsr_id: user.fsr_id.clone(),
            coach: user.coach.clone(),
            educational_institution: user.educational_institution.clone(),
            representative_email: user.representative_email.clone(),
            representative_phone: user.representative_phone.clone(),
            player_id: user.player_id,
        }
    }
}
