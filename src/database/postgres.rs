// database/postgres.rs - Store implementation over sqlx/PostgreSQL
//
// All values are bound as parameters. The only interpolated fragments are
// table names (validated schema + fixed names) and whitelisted patch columns.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{
    FinishOutcome, GameDetails, GameSummary, MoveRecord, NewGame, NewMove, NewTournament, NewUser, PlayerRecord,
    TournamentQuery, TournamentRecord, UserRecord,
};
use super::patch::Patch;
use super::store::Store;
use crate::config::AppConfig;
use crate::types::GameResult;

pub struct PgStore {
    db: DatabaseManager,
}

impl PgStore {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, DatabaseError> {
        Ok(Self::new(DatabaseManager::new(config.database.clone())?))
    }

    pub fn manager(&self) -> &DatabaseManager {
        &self.db
    }

    async fn pool(&self) -> Result<&PgPool, DatabaseError> {
        self.db.pool().await
    }

    fn user_select(&self) -> String {
        format!(
            r#"SELECT u.id, u.username, u.email, COALESCE(u.password_hash, '') AS password_hash,
                   COALESCE(u.full_name, '') AS full_name, COALESCE(u.role, 'player') AS role,
                   COALESCE(u.is_active, TRUE) AS is_active, u.birth_date::date AS birth_date,
                   u.fsr_id, u.coach, u.educational_institution, u.gender,
                   u.representative_email, u.representative_phone,
                   u.created_at::timestamp AS created_at, u.updated_at::timestamp AS updated_at,
                   u.last_login::timestamp AS last_login,
                   (SELECT p.id FROM {players} p WHERE p.user_id = u.id ORDER BY p.id LIMIT 1) AS player_id
              FROM {users} u"#,
            users = self.db.table("users"),
            players = self.db.table("players"),
        )
    }

    fn tournament_select(&self) -> String {
        format!(
            r#"SELECT t.id, t.name, t.description, t.start_date::date AS start_date, t.end_date::date AS end_date,
                   t.location, t.max_participants, t.registration_deadline::date AS registration_deadline,
                   t.entry_fee::numeric AS entry_fee, t.prize_fund::numeric AS prize_fund,
                   COALESCE(t.tournament_type, 'swiss') AS tournament_type, t.time_control, t.rounds,
                   COALESCE(t.status, 'planned') AS status, t.created_by,
                   t.created_at::timestamp AS created_at, t.updated_at::timestamp AS updated_at,
                   creator.full_name AS created_by_name,
                   (SELECT COUNT(*) FROM {registrations} r
                     WHERE r.tournament_id = t.id AND r.status = 'registered') AS registered_count
              FROM {tournaments} t
              LEFT JOIN {users} creator ON creator.id = t.created_by"#,
            tournaments = self.db.table("tournaments"),
            registrations = self.db.table("tournament_registrations"),
            users = self.db.table("users"),
        )
    }

    fn player_select(&self) -> String {
        format!(
            r#"SELECT id, user_id, name, email, COALESCE(rating, 1200) AS rating,
                   COALESCE(games_played, 0) AS games_played, COALESCE(games_won, 0) AS games_won,
                   COALESCE(games_lost, 0) AS games_lost, COALESCE(games_drawn, 0) AS games_drawn
              FROM {players}"#,
            players = self.db.table("players"),
        )
    }

    fn game_select(&self) -> String {
        format!(
            r#"SELECT g.id, g.white_player_id, g.black_player_id, g.time_control,
                   COALESCE(g.result, 'in_progress') AS result, COALESCE(g.moves_count, 0) AS moves_count,
                   g.started_at::timestamp AS started_at, g.finished_at::timestamp AS finished_at,
                   wp.name AS white_player, bp.name AS black_player
              FROM {games} g
              LEFT JOIN {players} wp ON wp.id = g.white_player_id
              LEFT JOIN {players} bp ON bp.id = g.black_player_id"#,
            games = self.db.table("games"),
            players = self.db.table("players"),
        )
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        self.db.health_check().await
    }

    async fn find_session_user(&self, token: &str, now: NaiveDateTime) -> Result<Option<UserRecord>, DatabaseError> {
        let sql = format!(
            "{} JOIN {} s ON s.user_id = u.id \
             WHERE s.session_token = $1 AND s.expires_at > $2 AND COALESCE(u.is_active, TRUE) = TRUE \
             LIMIT 1",
            self.user_select(),
            self.db.table("user_sessions"),
        );

        let user = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(token)
            .bind(now)
            .fetch_optional(self.pool().await?)
            .await?;
        Ok(user)
    }

    async fn create_session(&self, user_id: i32, token: &str, expires_at: NaiveDateTime) -> Result<(), DatabaseError> {
        let sql = format!(
            "INSERT INTO {} (user_id, session_token, expires_at) VALUES ($1, $2, $3)",
            self.db.table("user_sessions")
        );
        sqlx::query(&sql)
            .bind(user_id)
            .bind(token)
            .bind(expires_at)
            .execute(self.pool().await?)
            .await?;
        Ok(())
    }

    async fn delete_session(&self, token: &str) -> Result<u64, DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE session_token = $1", self.db.table("user_sessions"));
        let result = sqlx::query(&sql).bind(token).execute(self.pool().await?).await?;
        Ok(result.rows_affected())
    }

    async fn purge_expired_sessions(&self, now: NaiveDateTime) -> Result<u64, DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE expires_at <= $1", self.db.table("user_sessions"));
        let result = sqlx::query(&sql).bind(now).execute(self.pool().await?).await?;
        Ok(result.rows_affected())
    }

    async fn find_login_user(&self, login: &str) -> Result<Option<UserRecord>, DatabaseError> {
        let sql = format!(
            "{} WHERE (LOWER(u.username) = $1 OR LOWER(u.email) = $1) AND COALESCE(u.is_active, TRUE) = TRUE \
             ORDER BY u.id LIMIT 1",
            self.user_select()
        );
        let user = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(login)
            .fetch_optional(self.pool().await?)
            .await?;
        Ok(user)
    }

    async fn username_or_email_taken(&self, username: &str, email: &str) -> Result<bool, DatabaseError> {
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE LOWER(username) = $1 OR LOWER(email) = $2)",
            self.db.table("users")
        );
        let taken = sqlx::query_scalar::<_, bool>(&sql)
            .bind(username)
            .bind(email)
            .fetch_one(self.pool().await?)
            .await?;
        Ok(taken)
    }

    async fn register_user(&self, user: NewUser) -> Result<UserRecord, DatabaseError> {
        let mut tx = self.pool().await?.begin().await?;

        let insert_user = format!(
            "INSERT INTO {} (username, email, password_hash, full_name, role, is_active, birth_date, fsr_id, coach, \
                             educational_institution, gender, representative_email, representative_phone) \
             VALUES ($1, $2, $3, $4, 'player', TRUE, $5, $6, $7, $8, $9, $10, $11) RETURNING id",
            self.db.table("users")
        );
        let user_id: i32 = sqlx::query_scalar(&insert_user)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.full_name)
            .bind(user.birth_date)
            .bind(&user.fsr_id)
            .bind(&user.coach)
            .bind(&user.educational_institution)
            .bind(&user.gender)
            .bind(&user.representative_email)
            .bind(&user.representative_phone)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| DatabaseError::from_unique_violation(e, "A user with this username or email already exists"))?;

        let insert_player = format!(
            "INSERT INTO {} (user_id, name, email) VALUES ($1, $2, $3)",
            self.db.table("players")
        );
        sqlx::query(&insert_player)
            .bind(user_id)
            .bind(&user.full_name)
            .bind(&user.email)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.find_user(user_id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("user {}", user_id)))
    }

    async fn record_login(&self, user_id: i32, at: NaiveDateTime) -> Result<(), DatabaseError> {
        let sql = format!("UPDATE {} SET last_login = $2 WHERE id = $1", self.db.table("users"));
        sqlx::query(&sql).bind(user_id).bind(at).execute(self.pool().await?).await?;
        Ok(())
    }

    async fn update_password_hash(&self, user_id: i32, password_hash: &str) -> Result<(), DatabaseError> {
        let sql = format!(
            "UPDATE {} SET password_hash = $2, updated_at = NOW() WHERE id = $1",
            self.db.table("users")
        );
        sqlx::query(&sql)
            .bind(user_id)
            .bind(password_hash)
            .execute(self.pool().await?)
            .await?;
        Ok(())
    }

    async fn list_users(&self, include_inactive: bool) -> Result<Vec<UserRecord>, DatabaseError> {
        let filter = if include_inactive { "" } else { " WHERE COALESCE(u.is_active, TRUE) = TRUE" };
        let sql = format!(
            "{}{} ORDER BY u.created_at DESC NULLS LAST, u.id DESC",
            self.user_select(),
            filter
        );
        let users = sqlx::query_as::<_, UserRecord>(&sql).fetch_all(self.pool().await?).await?;
        Ok(users)
    }

    async fn find_user(&self, id: i32) -> Result<Option<UserRecord>, DatabaseError> {
        let sql = format!("{} WHERE u.id = $1", self.user_select());
        let user = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(id)
            .fetch_optional(self.pool().await?)
            .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, DatabaseError> {
        let sql = format!("{} WHERE LOWER(u.username) = LOWER($1)", self.user_select());
        let user = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(username)
            .fetch_optional(self.pool().await?)
            .await?;
        Ok(user)
    }

    async fn update_user(&self, id: i32, patch: &Patch) -> Result<Option<UserRecord>, DatabaseError> {
        let sql = patch.update_sql(&self.db.table("users"), "id");
        let updated = patch
            .bind(sqlx::query(&sql))
            .bind(id)
            .fetch_optional(self.pool().await?)
            .await
            .map_err(|e| DatabaseError::from_unique_violation(e, "A user with this email already exists"))?;

        match updated {
            Some(_) => self.find_user(id).await,
            None => Ok(None),
        }
    }

    async fn deactivate_user(&self, id: i32) -> Result<(), DatabaseError> {
        let sql = format!(
            "UPDATE {} SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
            self.db.table("users")
        );
        sqlx::query(&sql).bind(id).execute(self.pool().await?).await?;
        Ok(())
    }

    async fn list_tournaments(&self) -> Result<Vec<TournamentRecord>, DatabaseError> {
        let sql = format!("{} ORDER BY t.created_at DESC NULLS LAST, t.id DESC", self.tournament_select());
        let tournaments = sqlx::query_as::<_, TournamentRecord>(&sql)
            .fetch_all(self.pool().await?)
            .await?;
        Ok(tournaments)
    }

    async fn list_public_tournaments(&self, query: TournamentQuery) -> Result<Vec<TournamentRecord>, DatabaseError> {
        let sql = format!(
            "{} WHERE ($1::text IS NULL OR t.status = $1) ORDER BY t.start_date ASC, t.id ASC LIMIT $2",
            self.tournament_select()
        );
        let tournaments = sqlx::query_as::<_, TournamentRecord>(&sql)
            .bind(query.status.map(|s| s.as_str()))
            .bind(query.limit)
            .fetch_all(self.pool().await?)
            .await?;
        Ok(tournaments)
    }

    async fn find_tournament(&self, id: i32) -> Result<Option<TournamentRecord>, DatabaseError> {
        let sql = format!("{} WHERE t.id = $1", self.tournament_select());
        let tournament = sqlx::query_as::<_, TournamentRecord>(&sql)
            .bind(id)
            .fetch_optional(self.pool().await?)
            .await?;
        Ok(tournament)
    }

    async fn create_tournament(&self, t: NewTournament) -> Result<TournamentRecord, DatabaseError> {
        let sql = format!(
            "INSERT INTO {} (name, description, start_date, end_date, location, max_participants, \
                             registration_deadline, entry_fee, prize_fund, tournament_type, time_control, \
                             rounds, status, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) RETURNING id",
            self.db.table("tournaments")
        );
        let id: i32 = sqlx::query_scalar(&sql)
            .bind(&t.name)
            .bind(&t.description)
            .bind(t.start_date)
            .bind(t.end_date)
            .bind(&t.location)
            .bind(t.max_participants)
            .bind(t.registration_deadline)
            .bind(&t.entry_fee)
            .bind(&t.prize_fund)
            .bind(t.tournament_type.as_str())
            .bind(&t.time_control)
            .bind(t.rounds)
            .bind(t.status.as_str())
            .bind(t.created_by)
            .fetch_one(self.pool().await?)
            .await?;

        self.find_tournament(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("tournament {}", id)))
    }

    async fn update_tournament(&self, id: i32, patch: &Patch) -> Result<Option<TournamentRecord>, DatabaseError> {
        let sql = patch.update_sql(&self.db.table("tournaments"), "id");
        let updated = patch
            .bind(sqlx::query(&sql))
            .bind(id)
            .fetch_optional(self.pool().await?)
            .await?;

        match updated {
            Some(_) => self.find_tournament(id).await,
            None => Ok(None),
        }
    }

    async fn cancel_tournament(&self, id: i32) -> Result<(), DatabaseError> {
        let sql = format!(
            "UPDATE {} SET status = 'cancelled', updated_at = NOW() WHERE id = $1",
            self.db.table("tournaments")
        );
        sqlx::query(&sql).bind(id).execute(self.pool().await?).await?;
        Ok(())
    }

    async fn create_player(&self, name: &str, email: Option<&str>) -> Result<PlayerRecord, DatabaseError> {
        let sql = format!(
            "INSERT INTO {} (name, email) VALUES ($1, $2) \
             RETURNING id, user_id, name, email, COALESCE(rating, 1200) AS rating, \
                       COALESCE(games_played, 0) AS games_played, COALESCE(games_won, 0) AS games_won, \
                       COALESCE(games_lost, 0) AS games_lost, COALESCE(games_drawn, 0) AS games_drawn",
            self.db.table("players")
        );
        let player = sqlx::query_as::<_, PlayerRecord>(&sql)
            .bind(name)
            .bind(email)
            .fetch_one(self.pool().await?)
            .await?;
        Ok(player)
    }

    async fn list_players(&self) -> Result<Vec<PlayerRecord>, DatabaseError> {
        let sql = format!("{} ORDER BY rating DESC NULLS LAST, id ASC", self.player_select());
        let players = sqlx::query_as::<_, PlayerRecord>(&sql).fetch_all(self.pool().await?).await?;
        Ok(players)
    }

    async fn find_player(&self, id: i32) -> Result<Option<PlayerRecord>, DatabaseError> {
        let sql = format!("{} WHERE id = $1", self.player_select());
        let player = sqlx::query_as::<_, PlayerRecord>(&sql)
            .bind(id)
            .fetch_optional(self.pool().await?)
            .await?;
        Ok(player)
    }

    async fn create_game(&self, game: NewGame) -> Result<i32, DatabaseError> {
        let sql = format!(
            "INSERT INTO {} (white_player_id, black_player_id, time_control, result, moves_count, started_at) \
             VALUES ($1, $2, $3, 'in_progress', 0, NOW()) RETURNING id",
            self.db.table("games")
        );
        let id: i32 = sqlx::query_scalar(&sql)
            .bind(game.white_player_id)
            .bind(game.black_player_id)
            .bind(&game.time_control)
            .fetch_one(self.pool().await?)
            .await?;
        Ok(id)
    }

    async fn list_games(&self, limit: i64) -> Result<Vec<GameSummary>, DatabaseError> {
        let sql = format!("{} ORDER BY g.started_at DESC NULLS LAST, g.id DESC LIMIT $1", self.game_select());
        let games = sqlx::query_as::<_, GameSummary>(&sql)
            .bind(limit)
            .fetch_all(self.pool().await?)
            .await?;
        Ok(games)
    }

    async fn find_game(&self, id: i32) -> Result<Option<GameDetails>, DatabaseError> {
        let pool = self.pool().await?;

        let sql = format!("{} WHERE g.id = $1", self.game_select());
        let Some(game) = sqlx::query_as::<_, GameSummary>(&sql).bind(id).fetch_optional(pool).await? else {
            return Ok(None);
        };

        let moves_sql = format!(
            "SELECT move_number, player_color, move_notation AS notation, board_state::text AS board_state \
               FROM {} WHERE game_id = $1 ORDER BY move_number ASC, id ASC",
            self.db.table("moves")
        );
        let moves = sqlx::query_as::<_, MoveRecord>(&moves_sql).bind(id).fetch_all(pool).await?;

        Ok(Some(GameDetails { game, moves }))
    }

    async fn save_move(&self, chess_move: NewMove) -> Result<bool, DatabaseError> {
        let mut tx = self.pool().await?.begin().await?;

        // Lock the game row so concurrent moves serialise on moves_count
        let lock = format!("SELECT id FROM {} WHERE id = $1 FOR UPDATE", self.db.table("games"));
        let exists: Option<i32> = sqlx::query_scalar(&lock)
            .bind(chess_move.game_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Ok(false);
        }

        let insert = format!(
            "INSERT INTO {} (game_id, move_number, player_color, move_notation, board_state) VALUES ($1, $2, $3, $4, $5)",
            self.db.table("moves")
        );
        sqlx::query(&insert)
            .bind(chess_move.game_id)
            .bind(chess_move.move_number)
            .bind(chess_move.player_color.as_str())
            .bind(&chess_move.notation)
            .bind(&chess_move.board_state)
            .execute(&mut *tx)
            .await?;

        let update = format!("UPDATE {} SET moves_count = $2 WHERE id = $1", self.db.table("games"));
        sqlx::query(&update)
            .bind(chess_move.game_id)
            .bind(chess_move.move_number)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn finish_game(&self, game_id: i32, result: GameResult, at: NaiveDateTime) -> Result<FinishOutcome, DatabaseError> {
        let games = self.db.table("games");
        let mut tx = self.pool().await?.begin().await?;

        // Only a running game can finish; a second finish matches no row
        let finish = format!(
            "UPDATE {} SET result = $2, finished_at = $3 WHERE id = $1 AND COALESCE(result, 'in_progress') = 'in_progress' \
             RETURNING id",
            games
        );
        let finished: Option<i32> = sqlx::query_scalar(&finish)
            .bind(game_id)
            .bind(result.as_str())
            .bind(at)
            .fetch_optional(&mut *tx)
            .await?;

        if finished.is_none() {
            let exists_sql = format!("SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1)", games);
            let exists: bool = sqlx::query_scalar(&exists_sql)
                .bind(game_id)
                .fetch_one(&mut *tx)
                .await?;
            return Ok(if exists { FinishOutcome::AlreadyFinished } else { FinishOutcome::NotFound });
        }

        // One statement for both participants, keyed on the result
        let aggregate = format!(
            r#"UPDATE {players} p
                  SET games_played = COALESCE(p.games_played, 0) + 1,
                      games_won = COALESCE(p.games_won, 0) + CASE
                          WHEN (p.id = g.white_player_id AND $2 = 'white_wins')
                            OR (p.id = g.black_player_id AND $2 = 'black_wins') THEN 1 ELSE 0 END,
                      games_lost = COALESCE(p.games_lost, 0) + CASE
                          WHEN (p.id = g.white_player_id AND $2 = 'black_wins')
                            OR (p.id = g.black_player_id AND $2 = 'white_wins') THEN 1 ELSE 0 END,
                      games_drawn = COALESCE(p.games_drawn, 0) + CASE WHEN $2 = 'draw' THEN 1 ELSE 0 END,
                      updated_at = $3
                 FROM {games} g
                WHERE g.id = $1
                  AND p.id IN (SELECT g.white_player_id UNION SELECT g.black_player_id)"#,
            players = self.db.table("players"),
            games = games,
        );
        sqlx::query(&aggregate)
            .bind(game_id)
            .bind(result.as_str())
            .bind(at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(FinishOutcome::Finished)
    }
}
