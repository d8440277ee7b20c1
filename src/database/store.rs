use async_trait::async_trait;
use chrono::NaiveDateTime;

use super::manager::DatabaseError;
use super::models::{
    FinishOutcome, GameDetails, GameSummary, NewGame, NewMove, NewTournament, NewUser, PlayerRecord, TournamentQuery,
    TournamentRecord, UserRecord,
};
use super::patch::Patch;
use crate::types::GameResult;

/// Every query the functions run, behind one seam.
///
/// `PgStore` is the production implementation; `testing::MemoryStore` keeps the
/// same semantics in memory. Methods that touch several tables are atomic.
#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> Result<(), DatabaseError>;

    // Sessions and credentials

    /// Active user owning an unexpired session with this token
    async fn find_session_user(&self, token: &str, now: NaiveDateTime) -> Result<Option<UserRecord>, DatabaseError>;

    async fn create_session(&self, user_id: i32, token: &str, expires_at: NaiveDateTime) -> Result<(), DatabaseError>;

    /// Returns the number of sessions removed (0 or 1)
    async fn delete_session(&self, token: &str) -> Result<u64, DatabaseError>;

    async fn purge_expired_sessions(&self, now: NaiveDateTime) -> Result<u64, DatabaseError>;

    /// Active user whose username or email equals `login` (already lower-cased)
    async fn find_login_user(&self, login: &str) -> Result<Option<UserRecord>, DatabaseError>;

    async fn username_or_email_taken(&self, username: &str, email: &str) -> Result<bool, DatabaseError>;

    /// Insert the user with role `player` plus the linked player row
    async fn register_user(&self, user: NewUser) -> Result<UserRecord, DatabaseError>;

    async fn record_login(&self, user_id: i32, at: NaiveDateTime) -> Result<(), DatabaseError>;

    async fn update_password_hash(&self, user_id: i32, password_hash: &str) -> Result<(), DatabaseError>;

    // Users

    /// Newest first; `include_inactive = false` hides deactivated accounts
    async fn list_users(&self, include_inactive: bool) -> Result<Vec<UserRecord>, DatabaseError>;

    async fn find_user(&self, id: i32) -> Result<Option<UserRecord>, DatabaseError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, DatabaseError>;

    /// Apply the patch and stamp `updated_at`; `None` when no such user
    async fn update_user(&self, id: i32, patch: &Patch) -> Result<Option<UserRecord>, DatabaseError>;

    async fn deactivate_user(&self, id: i32) -> Result<(), DatabaseError>;

    // Tournaments

    /// Newest first, with creator name and registered count
    async fn list_tournaments(&self) -> Result<Vec<TournamentRecord>, DatabaseError>;

    /// Soonest first, optionally filtered by status
    async fn list_public_tournaments(&self, query: TournamentQuery) -> Result<Vec<TournamentRecord>, DatabaseError>;

    async fn find_tournament(&self, id: i32) -> Result<Option<TournamentRecord>, DatabaseError>;

    async fn create_tournament(&self, tournament: NewTournament) -> Result<TournamentRecord, DatabaseError>;

    async fn update_tournament(&self, id: i32, patch: &Patch) -> Result<Option<TournamentRecord>, DatabaseError>;

    async fn cancel_tournament(&self, id: i32) -> Result<(), DatabaseError>;

    // Players, games and moves

    async fn create_player(&self, name: &str, email: Option<&str>) -> Result<PlayerRecord, DatabaseError>;

    /// Highest rating first
    async fn list_players(&self) -> Result<Vec<PlayerRecord>, DatabaseError>;

    async fn find_player(&self, id: i32) -> Result<Option<PlayerRecord>, DatabaseError>;

    async fn create_game(&self, game: NewGame) -> Result<i32, DatabaseError>;

    /// Newest first
    async fn list_games(&self, limit: i64) -> Result<Vec<GameSummary>, DatabaseError>;

    async fn find_game(&self, id: i32) -> Result<Option<GameDetails>, DatabaseError>;

    /// Insert the move and set the game's `moves_count`; `false` when the game does not exist
    async fn save_move(&self, chess_move: NewMove) -> Result<bool, DatabaseError>;

    /// Mark the game finished and update both players' counters in one step
    async fn finish_game(&self, game_id: i32, result: GameResult, at: NaiveDateTime) -> Result<FinishOutcome, DatabaseError>;
}
