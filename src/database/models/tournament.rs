use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::{types::BigDecimal, FromRow};

use crate::api::format;
use crate::types::{TournamentStatus, TournamentType};

/// A tournament row with its creator's name and the count of active registrations
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TournamentRecord {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub max_participants: Option<i32>,
    pub registration_deadline: Option<NaiveDate>,
    #[serde(serialize_with = "format::money")]
    pub entry_fee: Option<BigDecimal>,
    #[serde(serialize_with = "format::money")]
    pub prize_fund: Option<BigDecimal>,
    #[sqlx(try_from = "String")]
    pub tournament_type: TournamentType,
    pub time_control: Option<String>,
    pub rounds: Option<i32>,
    #[sqlx(try_from = "String")]
    pub status: TournamentStatus,
    pub created_by: Option<i32>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    pub created_by_name: Option<String>,
    pub registered_count: i64,
}

/// Tournament as shown on the public listing
#[derive(Debug, Clone, Serialize)]
pub struct PublicTournament {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub max_participants: Option<i32>,
    pub current_participants: i64,
    #[serde(serialize_with = "format::money")]
    pub entry_fee: Option<BigDecimal>,
    #[serde(serialize_with = "format::money")]
    pub prize_fund: Option<BigDecimal>,
    pub tournament_type: TournamentType,
    pub status: TournamentStatus,
    pub location: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

impl From<&TournamentRecord> for PublicTournament {
    fn from(t: &TournamentRecord) -> Self {
        Self {
            id: t.id,
            name: t.name.clone(),
            description: t.description.clone(),
            start_date: t.start_date,
            end_date: t.end_date,
            max_participants: t.max_participants,
            current_participants: t.registered_count,
            entry_fee: t.entry_fee.clone(),
            prize_fund: t.prize_fund.clone(),
            tournament_type: t.tournament_type,
            status: t.status,
            location: t.location.clone(),
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewTournament {
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub location: String,
    pub max_participants: i32,
    pub registration_deadline: Option<NaiveDate>,
    pub entry_fee: BigDecimal,
    pub prize_fund: BigDecimal,
    pub tournament_type: TournamentType,
    pub time_control: String,
    pub rounds: i32,
    pub status: TournamentStatus,
    pub created_by: i32,
}

/// Filter for the public listing
#[derive(Debug, Clone, Copy)]
pub struct TournamentQuery {
    pub status: Option<TournamentStatus>,
    pub limit: i64,
}
