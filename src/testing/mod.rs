// testing/mod.rs - in-memory Store for tests and local demos
//
// Mirrors PgStore's semantics (ordering, filters, atomic multi-table writes)
// without a database, plus seeding and inspection helpers for tests.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use sqlx::types::BigDecimal;
use std::sync::{Mutex, MutexGuard};

use crate::auth::password::hash_password;
use crate::auth::session::{generate_token, now};
use crate::database::models::{
    FinishOutcome, GameDetails, GameSummary, MoveRecord, NewGame, NewMove, NewTournament, NewUser, PlayerRecord,
    TournamentQuery, TournamentRecord, UserRecord,
};
use crate::database::{DatabaseError, Patch, PatchValue, Store};
use crate::types::{GameResult, PlayerColor, Role, TournamentStatus, TournamentType};

#[derive(Debug, Clone)]
struct SessionRow {
    user_id: i32,
    token: String,
    expires_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
struct GameRow {
    id: i32,
    white_player_id: i32,
    black_player_id: i32,
    time_control: String,
    result: GameResult,
    moves_count: i32,
    started_at: NaiveDateTime,
    finished_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
struct MoveRow {
    game_id: i32,
    record: MoveRecord,
}

#[derive(Debug, Default)]
struct State {
    users: Vec<UserRecord>,
    sessions: Vec<SessionRow>,
    players: Vec<PlayerRecord>,
    tournaments: Vec<TournamentRecord>,
    registrations: Vec<(i32, String)>,
    games: Vec<GameRow>,
    moves: Vec<MoveRow>,
    sequence: i32,
    unavailable: bool,
}

impl State {
    fn next_id(&mut self) -> i32 {
        self.sequence += 1;
        self.sequence
    }

    /// Strictly increasing creation time so "newest first" is deterministic
    fn stamp(&self) -> NaiveDateTime {
        now() + Duration::microseconds(i64::from(self.sequence))
    }

    fn user_view(&self, user: &UserRecord) -> UserRecord {
        let mut user = user.clone();
        user.player_id = self.players.iter().find(|p| p.user_id == Some(user.id)).map(|p| p.id);
        user
    }

    fn tournament_view(&self, tournament: &TournamentRecord) -> TournamentRecord {
        let mut t = tournament.clone();
        t.created_by_name = t
            .created_by
            .and_then(|id| self.users.iter().find(|u| u.id == id))
            .map(|u| u.full_name.clone());
        t.registered_count = self
            .registrations
            .iter()
            .filter(|(tournament_id, status)| *tournament_id == t.id && status == "registered")
            .count() as i64;
        t
    }

    fn game_summary(&self, game: &GameRow) -> GameSummary {
        let name = |id: i32| self.players.iter().find(|p| p.id == id).map(|p| p.name.clone());
        GameSummary {
            id: game.id,
            white_player_id: game.white_player_id,
            black_player_id: game.black_player_id,
            time_control: Some(game.time_control.clone()),
            result: game.result,
            moves_count: game.moves_count,
            started_at: Some(game.started_at),
            finished_at: game.finished_at,
            white_player: name(game.white_player_id),
            black_player: name(game.black_player_id),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Guarded access: fails like an unreachable database while `set_unavailable(true)`
    fn open(&self) -> Result<MutexGuard<'_, State>, DatabaseError> {
        let state = self.lock();
        if state.unavailable {
            return Err(DatabaseError::QueryError("connection refused".to_string()));
        }
        Ok(state)
    }

    /// Simulate the database going away
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    // Seeding

    /// Active user with an Argon2 hash of `password` and a linked player
    pub fn seed_user(&self, username: &str, password: &str, role: Role) -> UserRecord {
        let hash = hash_password(password).unwrap_or_default();
        self.seed_user_with_hash(username, &hash, role)
    }

    pub fn seed_user_with_hash(&self, username: &str, password_hash: &str, role: Role) -> UserRecord {
        let mut state = self.lock();
        let id = state.next_id();
        let created_at = state.stamp();
        let user = UserRecord {
            id,
            username: username.to_lowercase(),
            email: format!("{}@example.com", username.to_lowercase()),
            password_hash: password_hash.to_string(),
            full_name: username.to_string(),
            role,
            is_active: true,
            birth_date: None,
            fsr_id: None,
            coach: None,
            educational_institution: None,
            gender: None,
            representative_email: None,
            representative_phone: None,
            created_at: Some(created_at),
            updated_at: None,
            last_login: None,
            player_id: None,
        };
        state.users.push(user.clone());

        let player_id = state.next_id();
        state.players.push(PlayerRecord {
            id: player_id,
            user_id: Some(id),
            name: username.to_string(),
            email: Some(user.email.clone()),
            rating: 1200,
            games_played: 0,
            games_won: 0,
            games_lost: 0,
            games_drawn: 0,
        });

        state.user_view(&user)
    }

    /// Store a session for the user that expires after `ttl`; returns the token
    pub fn seed_session(&self, user_id: i32, ttl: Duration) -> String {
        let token = generate_token();
        self.lock().sessions.push(SessionRow {
            user_id,
            token: token.clone(),
            expires_at: now() + ttl,
        });
        token
    }

    pub fn seed_tournament(&self, name: &str, status: TournamentStatus, start_date: NaiveDate, created_by: Option<i32>) -> TournamentRecord {
        let mut state = self.lock();
        let id = state.next_id();
        let created_at = state.stamp();
        let tournament = TournamentRecord {
            id,
            name: name.to_string(),
            description: Some(String::new()),
            start_date,
            end_date: Some(start_date),
            location: Some(String::new()),
            max_participants: Some(100),
            registration_deadline: None,
            entry_fee: Some(BigDecimal::from(0)),
            prize_fund: Some(BigDecimal::from(0)),
            tournament_type: TournamentType::Swiss,
            time_control: Some(String::new()),
            rounds: Some(9),
            status,
            created_by,
            created_at: Some(created_at),
            updated_at: None,
            created_by_name: None,
            registered_count: 0,
        };
        state.tournaments.push(tournament.clone());
        state.tournament_view(&tournament)
    }

    pub fn seed_registration(&self, tournament_id: i32, status: &str) {
        self.lock().registrations.push((tournament_id, status.to_string()));
    }

    // Inspection

    pub fn user(&self, id: i32) -> Option<UserRecord> {
        let state = self.lock();
        state.users.iter().find(|u| u.id == id).map(|u| state.user_view(u))
    }

    pub fn player(&self, id: i32) -> Option<PlayerRecord> {
        self.lock().players.iter().find(|p| p.id == id).cloned()
    }

    pub fn tournament(&self, id: i32) -> Option<TournamentRecord> {
        let state = self.lock();
        state.tournaments.iter().find(|t| t.id == id).map(|t| state.tournament_view(t))
    }

    pub fn tournament_count(&self) -> usize {
        self.lock().tournaments.len()
    }

    pub fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }

    pub fn session_expiry(&self, token: &str) -> Option<NaiveDateTime> {
        self.lock().sessions.iter().find(|s| s.token == token).map(|s| s.expires_at)
    }

    /// Move a session's expiry to the past
    pub fn expire_session(&self, token: &str) {
        let mut state = self.lock();
        if let Some(session) = state.sessions.iter_mut().find(|s| s.token == token) {
            session.expires_at = now() - Duration::seconds(1);
        }
    }
}

fn opt_text(value: &PatchValue) -> Option<String> {
    value.as_text().map(str::to_string)
}

fn apply_user_patch(user: &mut UserRecord, patch: &Patch) {
    for assignment in patch.assignments() {
        let v = &assignment.value;
        match assignment.column {
            "full_name" => user.full_name = opt_text(v).unwrap_or_default(),
            "email" => user.email = opt_text(v).unwrap_or_default(),
            "role" => {
                if let Some(role) = v.as_text().and_then(|r| r.parse().ok()) {
                    user.role = role;
                }
            }
            "is_active" => user.is_active = v.as_bool().unwrap_or(user.is_active),
            "birth_date" => user.birth_date = v.as_date(),
            "fsr_id" => user.fsr_id = opt_text(v),
            "coach" => user.coach = opt_text(v),
            "educational_institution" => user.educational_institution = opt_text(v),
            "gender" => user.gender = opt_text(v),
            "representative_email" => user.representative_email = opt_text(v),
            "representative_phone" => user.representative_phone = opt_text(v),
            _ => {}
        }
    }
}

fn apply_tournament_patch(t: &mut TournamentRecord, patch: &Patch) {
    for assignment in patch.assignments() {
        let v = &assignment.value;
        match assignment.column {
            "name" => t.name = opt_text(v).unwrap_or_default(),
            "description" => t.description = opt_text(v),
            "start_date" => {
                if let Some(date) = v.as_date() {
                    t.start_date = date;
                }
            }
            "end_date" => t.end_date = v.as_date(),
            "location" => t.location = opt_text(v),
            "max_participants" => t.max_participants = v.as_integer(),
            "registration_deadline" => t.registration_deadline = v.as_date(),
            "entry_fee" => t.entry_fee = v.as_money().cloned(),
            "prize_fund" => t.prize_fund = v.as_money().cloned(),
            "tournament_type" => {
                if let Some(kind) = v.as_text().and_then(|k| k.parse().ok()) {
                    t.tournament_type = kind;
                }
            }
            "time_control" => t.time_control = opt_text(v),
            "rounds" => t.rounds = v.as_integer(),
            "status" => {
                if let Some(status) = v.as_text().and_then(|s| s.parse().ok()) {
                    t.status = status;
                }
            }
            _ => {}
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        self.open().map(|_| ())
    }

    async fn find_session_user(&self, token: &str, now: NaiveDateTime) -> Result<Option<UserRecord>, DatabaseError> {
        let state = self.open()?;
        let user = state
            .sessions
            .iter()
            .find(|s| s.token == token && s.expires_at > now)
            .and_then(|s| state.users.iter().find(|u| u.id == s.user_id && u.is_active))
            .map(|u| state.user_view(u));
        Ok(user)
    }

    async fn create_session(&self, user_id: i32, token: &str, expires_at: NaiveDateTime) -> Result<(), DatabaseError> {
        self.open()?.sessions.push(SessionRow {
            user_id,
            token: token.to_string(),
            expires_at,
        });
        Ok(())
    }

    async fn delete_session(&self, token: &str) -> Result<u64, DatabaseError> {
        let mut state = self.open()?;
        let before = state.sessions.len();
        state.sessions.retain(|s| s.token != token);
        Ok((before - state.sessions.len()) as u64)
    }

    async fn purge_expired_sessions(&self, now: NaiveDateTime) -> Result<u64, DatabaseError> {
        let mut state = self.open()?;
        let before = state.sessions.len();
        state.sessions.retain(|s| s.expires_at > now);
        Ok((before - state.sessions.len()) as u64)
    }

    async fn find_login_user(&self, login: &str) -> Result<Option<UserRecord>, DatabaseError> {
        let state = self.open()?;
        let user = state
            .users
            .iter()
            .filter(|u| u.is_active)
            .find(|u| u.username.to_lowercase() == login || u.email.to_lowercase() == login)
            .map(|u| state.user_view(u));
        Ok(user)
    }

    async fn username_or_email_taken(&self, username: &str, email: &str) -> Result<bool, DatabaseError> {
        let state = self.open()?;
        Ok(state
            .users
            .iter()
            .any(|u| u.username.to_lowercase() == username || u.email.to_lowercase() == email))
    }

    async fn register_user(&self, new_user: NewUser) -> Result<UserRecord, DatabaseError> {
        let mut state = self.open()?;
        if state
            .users
            .iter()
            .any(|u| u.username == new_user.username || u.email == new_user.email)
        {
            return Err(DatabaseError::Conflict("A user with this username or email already exists".into()));
        }

        let id = state.next_id();
        let created_at = state.stamp();
        let user = UserRecord {
            id,
            username: new_user.username,
            email: new_user.email.clone(),
            password_hash: new_user.password_hash,
            full_name: new_user.full_name.clone(),
            role: Role::Player,
            is_active: true,
            birth_date: new_user.birth_date,
            fsr_id: new_user.fsr_id,
            coach: new_user.coach,
            educational_institution: new_user.educational_institution,
            gender: new_user.gender,
            representative_email: new_user.representative_email,
            representative_phone: new_user.representative_phone,
            created_at: Some(created_at),
            updated_at: None,
            last_login: None,
            player_id: None,
        };
        state.users.push(user.clone());

        let player_id = state.next_id();
        state.players.push(PlayerRecord {
            id: player_id,
            user_id: Some(id),
            name: new_user.full_name,
            email: Some(new_user.email),
            rating: 1200,
            games_played: 0,
            games_won: 0,
            games_lost: 0,
            games_drawn: 0,
        });

        Ok(state.user_view(&user))
    }

    async fn record_login(&self, user_id: i32, at: NaiveDateTime) -> Result<(), DatabaseError> {
        let mut state = self.open()?;
        if let Some(user) = state.users.iter_mut().find(|u| u.id == user_id) {
            user.last_login = Some(at);
        }
        Ok(())
    }

    async fn update_password_hash(&self, user_id: i32, password_hash: &str) -> Result<(), DatabaseError> {
        let mut state = self.open()?;
        if let Some(user) = state.users.iter_mut().find(|u| u.id == user_id) {
            user.password_hash = password_hash.to_string();
            user.updated_at = Some(now());
        }
        Ok(())
    }

    async fn list_users(&self, include_inactive: bool) -> Result<Vec<UserRecord>, DatabaseError> {
        let state = self.open()?;
        let mut users: Vec<UserRecord> = state
            .users
            .iter()
            .filter(|u| include_inactive || u.is_active)
            .map(|u| state.user_view(u))
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(users)
    }

    async fn find_user(&self, id: i32) -> Result<Option<UserRecord>, DatabaseError> {
        let state = self.open()?;
        Ok(state.users.iter().find(|u| u.id == id).map(|u| state.user_view(u)))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, DatabaseError> {
        let state = self.open()?;
        let wanted = username.to_lowercase();
        Ok(state
            .users
            .iter()
            .find(|u| u.username.to_lowercase() == wanted)
            .map(|u| state.user_view(u)))
    }

    async fn update_user(&self, id: i32, patch: &Patch) -> Result<Option<UserRecord>, DatabaseError> {
        let mut state = self.open()?;

        if let Some(email) = patch.get("email").and_then(PatchValue::as_text) {
            if state.users.iter().any(|u| u.id != id && u.email == email) {
                return Err(DatabaseError::Conflict("A user with this email already exists".into()));
            }
        }

        let Some(user) = state.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        apply_user_patch(user, patch);
        user.updated_at = Some(now());
        let user = user.clone();

        Ok(Some(state.user_view(&user)))
    }

    async fn deactivate_user(&self, id: i32) -> Result<(), DatabaseError> {
        let mut state = self.open()?;
        if let Some(user) = state.users.iter_mut().find(|u| u.id == id) {
            user.is_active = false;
            user.updated_at = Some(now());
        }
        Ok(())
    }

    async fn list_tournaments(&self) -> Result<Vec<TournamentRecord>, DatabaseError> {
        let state = self.open()?;
        let mut tournaments: Vec<TournamentRecord> = state.tournaments.iter().map(|t| state.tournament_view(t)).collect();
        tournaments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(tournaments)
    }

    async fn list_public_tournaments(&self, query: TournamentQuery) -> Result<Vec<TournamentRecord>, DatabaseError> {
        let state = self.open()?;
        let mut tournaments: Vec<TournamentRecord> = state
            .tournaments
            .iter()
            .filter(|t| query.status.map_or(true, |status| t.status == status))
            .map(|t| state.tournament_view(t))
            .collect();
        tournaments.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));
        tournaments.truncate(usize::try_from(query.limit).unwrap_or(0));
        Ok(tournaments)
    }

    async fn find_tournament(&self, id: i32) -> Result<Option<TournamentRecord>, DatabaseError> {
        let state = self.open()?;
        Ok(state.tournaments.iter().find(|t| t.id == id).map(|t| state.tournament_view(t)))
    }

    async fn create_tournament(&self, t: NewTournament) -> Result<TournamentRecord, DatabaseError> {
        let mut state = self.open()?;
        let id = state.next_id();
        let created_at = state.stamp();
        let tournament = TournamentRecord {
            id,
            name: t.name,
            description: Some(t.description),
            start_date: t.start_date,
            end_date: Some(t.end_date),
            location: Some(t.location),
            max_participants: Some(t.max_participants),
            registration_deadline: t.registration_deadline,
            entry_fee: Some(t.entry_fee),
            prize_fund: Some(t.prize_fund),
            tournament_type: t.tournament_type,
            time_control: Some(t.time_control),
            rounds: Some(t.rounds),
            status: t.status,
            created_by: Some(t.created_by),
            created_at: Some(created_at),
            updated_at: None,
            created_by_name: None,
            registered_count: 0,
        };
        state.tournaments.push(tournament.clone());
        Ok(state.tournament_view(&tournament))
    }

    async fn update_tournament(&self, id: i32, patch: &Patch) -> Result<Option<TournamentRecord>, DatabaseError> {
        let mut state = self.open()?;
        let Some(tournament) = state.tournaments.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        apply_tournament_patch(tournament, patch);
        tournament.updated_at = Some(now());
        let tournament = tournament.clone();
        Ok(Some(state.tournament_view(&tournament)))
    }

    async fn cancel_tournament(&self, id: i32) -> Result<(), DatabaseError> {
        let mut state = self.open()?;
        if let Some(tournament) = state.tournaments.iter_mut().find(|t| t.id == id) {
            tournament.status = TournamentStatus::Cancelled;
            tournament.updated_at = Some(now());
        }
        Ok(())
    }

    async fn create_player(&self, name: &str, email: Option<&str>) -> Result<PlayerRecord, DatabaseError> {
        let mut state = self.open()?;
        let id = state.next_id();
        let player = PlayerRecord {
            id,
            user_id: None,
            name: name.to_string(),
            email: email.map(str::to_string),
            rating: 1200,
            games_played: 0,
            games_won: 0,
            games_lost: 0,
            games_drawn: 0,
        };
        state.players.push(player.clone());
        Ok(player)
    }

    async fn list_players(&self) -> Result<Vec<PlayerRecord>, DatabaseError> {
        let state = self.open()?;
        let mut players = state.players.clone();
        players.sort_by(|a, b| b.rating.cmp(&a.rating).then(a.id.cmp(&b.id)));
        Ok(players)
    }

    async fn find_player(&self, id: i32) -> Result<Option<PlayerRecord>, DatabaseError> {
        Ok(self.open()?.players.iter().find(|p| p.id == id).cloned())
    }

    async fn create_game(&self, game: NewGame) -> Result<i32, DatabaseError> {
        let mut state = self.open()?;
        let id = state.next_id();
        let started_at = state.stamp();
        state.games.push(GameRow {
            id,
            white_player_id: game.white_player_id,
            black_player_id: game.black_player_id,
            time_control: game.time_control,
            result: GameResult::InProgress,
            moves_count: 0,
            started_at,
            finished_at: None,
        });
        Ok(id)
    }

    async fn list_games(&self, limit: i64) -> Result<Vec<GameSummary>, DatabaseError> {
        let state = self.open()?;
        let mut games: Vec<GameSummary> = state.games.iter().map(|g| state.game_summary(g)).collect();
        games.sort_by(|a, b| b.started_at.cmp(&a.started_at).then(b.id.cmp(&a.id)));
        games.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(games)
    }

    async fn find_game(&self, id: i32) -> Result<Option<GameDetails>, DatabaseError> {
        let state = self.open()?;
        let Some(game) = state.games.iter().find(|g| g.id == id) else {
            return Ok(None);
        };

        let mut moves: Vec<MoveRecord> = state
            .moves
            .iter()
            .filter(|m| m.game_id == id)
            .map(|m| m.record.clone())
            .collect();
        moves.sort_by_key(|m| m.move_number);

        Ok(Some(GameDetails {
            game: state.game_summary(game),
            moves,
        }))
    }

    async fn save_move(&self, chess_move: NewMove) -> Result<bool, DatabaseError> {
        let mut state = self.open()?;
        let Some(game) = state.games.iter_mut().find(|g| g.id == chess_move.game_id) else {
            return Ok(false);
        };
        game.moves_count = chess_move.move_number;

        state.moves.push(MoveRow {
            game_id: chess_move.game_id,
            record: MoveRecord {
                move_number: chess_move.move_number,
                player_color: chess_move.player_color,
                notation: chess_move.notation,
                board_state: chess_move.board_state,
            },
        });
        Ok(true)
    }

    async fn finish_game(&self, game_id: i32, result: GameResult, at: NaiveDateTime) -> Result<FinishOutcome, DatabaseError> {
        let mut state = self.open()?;
        let Some(game) = state.games.iter_mut().find(|g| g.id == game_id) else {
            return Ok(FinishOutcome::NotFound);
        };
        if game.result.is_finished() {
            return Ok(FinishOutcome::AlreadyFinished);
        }

        game.result = result;
        game.finished_at = Some(at);
        let sides = [(game.white_player_id, PlayerColor::White), (game.black_player_id, PlayerColor::Black)];

        for (player_id, color) in sides {
            let Some(player) = state.players.iter_mut().find(|p| p.id == player_id) else {
                continue;
            };
            player.games_played += 1;
            match result.outcome_for(color) {
                Some(crate::types::Outcome::Won) => player.games_won += 1,
                Some(crate::types::Outcome::Lost) => player.games_lost += 1,
                Some(crate::types::Outcome::Drawn) => player.games_drawn += 1,
                None => {}
            }
        }

        Ok(FinishOutcome::Finished)
    }
}
