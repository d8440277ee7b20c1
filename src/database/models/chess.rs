use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

use crate::types::{GameResult, PlayerColor};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlayerRecord {
    pub id: i32,
    #[serde(skip)]
    pub user_id: Option<i32>,
    pub name: String,
    #[serde(skip)]
    pub email: Option<String>,
    pub rating: i32,
    pub games_played: i32,
    pub games_won: i32,
    pub games_lost: i32,
    pub games_drawn: i32,
}

/// A game joined to both players' names
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GameSummary {
    pub id: i32,
    pub white_player_id: i32,
    pub black_player_id: i32,
    pub time_control: Option<String>,
    #[sqlx(try_from = "String")]
    pub result: GameResult,
    pub moves_count: i32,
    pub started_at: Option<NaiveDateTime>,
    pub finished_at: Option<NaiveDateTime>,
    pub white_player: Option<String>,
    pub black_player: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MoveRecord {
    pub move_number: i32,
    #[sqlx(try_from = "String")]
    pub player_color: PlayerColor,
    pub notation: String,
    pub board_state: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameDetails {
    #[serde(flatten)]
    pub game: GameSummary,
    pub moves: Vec<MoveRecord>,
}

#[derive(Debug, Clone)]
pub struct NewGame {
    pub white_player_id: i32,
    pub black_player_id: i32,
    pub time_control: String,
}

#[derive(Debug, Clone)]
pub struct NewMove {
    pub game_id: i32,
    pub move_number: i32,
    pub player_color: PlayerColor,
    pub notation: String,
    pub board_state: Option<String>,
}

/// What happened when a game was asked to finish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishOutcome {
    Finished,
    AlreadyFinished,
    NotFound,
}
