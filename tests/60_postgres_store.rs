//! Runs the functions against `PgStore` and a real PostgreSQL.
//!
//! Each test creates its own schema from `fixtures/schema.sql` and drops it at
//! the end. Without `DATABASE_URL` the tests return early.

mod common;

use anyhow::{Context, Result};
use chess_tournament_api::api::Event;
use chess_tournament_api::config::DatabaseConfig;
use chess_tournament_api::database::schemas::ADMIN_USER;
use chess_tournament_api::database::{DatabaseManager, Patch, PgStore, Store};
use chess_tournament_api::handlers::Function;
use chess_tournament_api::types::Role;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use sqlx::{Executor, PgPool};
use uuid::Uuid;

use common::{call, post};

const SCHEMA_SQL: &str = include_str!("fixtures/schema.sql");

struct TestDatabase {
    admin_pool: PgPool,
    schema: String,
    store: PgStore,
}

impl TestDatabase {
    async fn connect() -> Result<Option<Self>> {
        dotenvy::dotenv().ok();
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL is not set; skipping PostgreSQL tests");
            return Ok(None);
        };

        let schema = format!("chess_test_{}", Uuid::new_v4().simple());
        let admin_pool = PgPool::connect(&url).await.context("connect to DATABASE_URL")?;
        admin_pool
            .execute(SCHEMA_SQL.replace("__SCHEMA__", &schema).as_str())
            .await
            .context("create test schema")?;

        let manager = DatabaseManager::new(DatabaseConfig {
            url: Some(url),
            schema: Some(schema.clone()),
            max_connections: 2,
            connection_timeout: 10,
        })?;

        Ok(Some(Self {
            admin_pool,
            schema,
            store: PgStore::new(manager),
        }))
    }

    fn table(&self, name: &str) -> String {
        format!("{}.{}", self.schema, name)
    }

    async fn teardown(self) -> Result<()> {
        self.store.manager().close().await;
        self.admin_pool
            .execute(format!("DROP SCHEMA {} CASCADE", self.schema).as_str())
            .await?;
        self.admin_pool.close().await;
        Ok(())
    }
}

async fn register(store: &dyn Store, username: &str) -> Result<(i64, String)> {
    let body = json!({
        "action": "register",
        "username": username,
        "email": format!("{username}@example.com"),
        "password": common::PASSWORD,
        "fullName": format!("{username} Full"),
    });
    let (status, body) = call(Function::Auth, store, post(body)).await?;
    assert_eq!(status, 200, "{body}");
    let id = body["user"]["id"].as_i64().context("user id")?;
    let token = body["sessionToken"].as_str().context("session token")?.to_string();
    Ok((id, token))
}

async fn promote(store: &dyn Store, user_id: i64, role: Role) -> Result<()> {
    let patch = Patch::from_input(&ADMIN_USER, &json!({ "role": role.as_str() }))?;
    store.update_user(user_id as i32, &patch).await?.context("user to promote")?;
    Ok(())
}

async fn chess(store: &dyn Store, body: Value) -> Result<(u16, Value)> {
    call(Function::ChessApi, store, post(body)).await
}

#[tokio::test]
async fn registration_and_login_round_trip() -> Result<()> {
    let Some(db) = TestDatabase::connect().await? else {
        return Ok(());
    };
    let store = &db.store;

    let (anna_id, token) = register(store, "anna").await?;

    let (_, body) = call(Function::Auth, store, Event::new("GET", "/").with_session(&token)).await?;
    assert_eq!(body["authenticated"], json!(true));
    assert_eq!(body["user"]["role"], json!("player"));
    assert!(body["user"]["playerId"].is_number(), "{body}");

    let (status, _) = call(
        Function::Auth,
        store,
        post(json!({"action": "register", "username": "ANNA", "email": "other@example.com", "password": "secret1", "fullName": "A"})),
    )
    .await?;
    assert_eq!(status, 409);

    let login = json!({"action": "login", "username": "Anna@Example.com", "password": common::PASSWORD});
    let (status, body) = call(Function::Auth, store, post(login)).await?;
    assert_eq!(status, 200, "{body}");
    assert_ne!(body["sessionToken"], json!(token));

    let wrong = json!({"action": "login", "username": "anna", "password": "nope"});
    let (status, _) = call(Function::Auth, store, post(wrong)).await?;
    assert_eq!(status, 401);

    // legacy digest: accepted once, then replaced by an argon2 hash
    let digest = format!("{:x}", Sha256::digest(b"legacy-pass"));
    sqlx::query(&format!("UPDATE {} SET password_hash = $1 WHERE id = $2", db.table("users")))
        .bind(&digest)
        .bind(anna_id as i32)
        .execute(&db.admin_pool)
        .await?;
    let login = json!({"action": "login", "username": "anna", "password": "legacy-pass"});
    let (status, _) = call(Function::Auth, store, post(login)).await?;
    assert_eq!(status, 200);
    let stored = store.find_user(anna_id as i32).await?.context("anna")?;
    assert!(stored.password_hash.starts_with("$argon2"));
    assert!(stored.last_login.is_some());

    let logout = post(json!({"action": "logout"})).with_session(&token);
    call(Function::Auth, store, logout).await?;
    let (_, body) = call(Function::Auth, store, Event::new("GET", "/").with_session(&token)).await?;
    assert_eq!(body["authenticated"], json!(false));

    db.teardown().await
}

#[tokio::test]
async fn finishing_games_updates_both_players_once() -> Result<()> {
    let Some(db) = TestDatabase::connect().await? else {
        return Ok(());
    };
    let store = &db.store;

    let (_, white) = chess(store, json!({"action": "create_player", "name": "White"})).await?;
    let (_, black) = chess(store, json!({"action": "create_player", "name": "Black"})).await?;
    let white = white["player"]["id"].as_i64().context("white id")?;
    let black = black["player"]["id"].as_i64().context("black id")?;

    let new_game = json!({"action": "create_game", "white_player_id": white, "black_player_id": black});
    let (status, body) = chess(store, new_game.clone()).await?;
    assert_eq!(status, 200, "{body}");
    let drawn = body["game_id"].as_i64().context("game id")?;

    for (n, color, san) in [(2, "black", "e5"), (1, "white", "e4")] {
        let body = json!({"action": "save_move", "game_id": drawn, "move_number": n, "player_color": color, "move_notation": san});
        let (status, body) = chess(store, body).await?;
        assert_eq!(status, 200, "{body}");
    }

    let (status, body) = chess(store, json!({"action": "finish_game", "game_id": drawn, "result": "draw"})).await?;
    assert_eq!(status, 200, "{body}");

    for id in [white, black] {
        let p = store.find_player(id as i32).await?.context("player")?;
        assert_eq!((p.games_played, p.games_won, p.games_lost, p.games_drawn), (1, 0, 0, 1));
    }

    let (_, body) = chess(store, new_game).await?;
    let decisive = body["game_id"].as_i64().context("game id")?;
    let (status, _) = chess(store, json!({"action": "finish_game", "game_id": decisive, "result": "white_wins"})).await?;
    assert_eq!(status, 200);

    // a second finish matches no running game and changes nothing
    let (status, _) = chess(store, json!({"action": "finish_game", "game_id": decisive, "result": "black_wins"})).await?;
    assert_eq!(status, 409);
    let (status, _) = chess(store, json!({"action": "finish_game", "game_id": 999_999, "result": "draw"})).await?;
    assert_eq!(status, 404);

    let w = store.find_player(white as i32).await?.context("white")?;
    let b = store.find_player(black as i32).await?.context("black")?;
    assert_eq!((w.games_played, w.games_won, w.games_lost, w.games_drawn), (2, 1, 0, 1));
    assert_eq!((b.games_played, b.games_won, b.games_lost, b.games_drawn), (2, 0, 1, 1));

    let event = Event::new("GET", "/chess-api/game").with_query("id", &drawn.to_string());
    let (status, body) = call(Function::ChessApi, store, event).await?;
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["game"]["result"], json!("draw"));
    assert_eq!(body["game"]["moves_count"], json!(1));
    let numbers: Vec<i64> = body["game"]["moves"]
        .as_array()
        .context("moves")?
        .iter()
        .filter_map(|m| m["move_number"].as_i64())
        .collect();
    assert_eq!(numbers, vec![1, 2]);

    db.teardown().await
}

#[tokio::test]
async fn patches_bind_typed_values() -> Result<()> {
    let Some(db) = TestDatabase::connect().await? else {
        return Ok(());
    };
    let store = &db.store;

    let (root_id, admin) = register(store, "root").await?;
    promote(store, root_id, Role::Admin).await?;
    let (ivan_id, _) = register(store, "ivan").await?;

    let body = json!({"name": "Spring Open", "start_date": "2025-04-01", "end_date": "2025-04-03", "location": "Club"});
    let event = Event::new("POST", "/").with_json(body).with_session(&admin);
    let (status, body) = call(Function::AdminTournaments, store, event).await?;
    assert_eq!(status, 201, "{body}");
    let tournament_id = body["tournament"]["id"].as_i64().context("tournament id")?;
    assert_eq!(body["tournament"]["created_by_name"], json!("root Full"));

    let body = json!({"id": tournament_id, "prize_fund": "2500.75", "location": null, "rounds": "7", "status": "registration"});
    let event = Event::new("PUT", "/").with_json(body).with_session(&admin);
    let (status, body) = call(Function::AdminTournaments, store, event).await?;
    assert_eq!(status, 200, "{body}");
    let t = &body["tournament"];
    assert_eq!(t["prize_fund"], json!(2500.75));
    assert_eq!(t["location"], json!(null));
    assert_eq!(t["rounds"], json!(7));
    assert_eq!(t["status"], json!("registration"));
    assert!(t["updated_at"].is_string());

    sqlx::query(&format!(
        "INSERT INTO {} (tournament_id, status) VALUES ($1, 'registered'), ($1, 'registered'), ($1, 'cancelled')",
        db.table("tournament_registrations")
    ))
    .bind(tournament_id as i32)
    .execute(&db.admin_pool)
    .await?;

    let event = Event::new("GET", "/").with_query("status", "registration");
    let (status, body) = call(Function::GetTournaments, store, event).await?;
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["count"], json!(1));
    assert_eq!(body["tournaments"][0]["current_participants"], json!(2));

    let body = json!({"id": ivan_id, "full_name": "Ivan P", "birth_date": "2010-01-02", "coach": null});
    let event = Event::new("PUT", "/").with_json(body).with_session(&admin);
    let (status, body) = call(Function::AdminUsers, store, event).await?;
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["user"]["full_name"], json!("Ivan P"));
    assert_eq!(body["user"]["birth_date"], json!("2010-01-02"));

    let body = json!({"id": ivan_id, "email": "root@example.com"});
    let event = Event::new("PUT", "/").with_json(body).with_session(&admin);
    let (status, _) = call(Function::AdminUsers, store, event).await?;
    assert_eq!(status, 409);

    let body = json!({"id": ivan_id, "role": "admin", "is_active": false});
    let event = Event::new("PUT", "/").with_json(body).with_session(&admin);
    let (status, _) = call(Function::AdminUsers, store, event).await?;
    assert_eq!(status, 403);
    let ivan = store.find_user(ivan_id as i32).await?.context("ivan")?;
    assert_eq!(ivan.role, Role::Player);
    assert!(ivan.is_active);

    db.teardown().await
}

#[tokio::test]
async fn expired_sessions_are_purged() -> Result<()> {
    let Some(db) = TestDatabase::connect().await? else {
        return Ok(());
    };
    let store = &db.store;

    let (anna_id, live) = register(store, "anna").await?;
    let past = chrono::Utc::now().naive_utc() - chrono::Duration::hours(2);
    store.create_session(anna_id as i32, "stale-token", past).await?;

    let (_, body) = call(Function::Auth, store, Event::new("GET", "/").with_session("stale-token")).await?;
    assert_eq!(body["authenticated"], json!(false));

    let purged = store.purge_expired_sessions(chrono::Utc::now().naive_utc()).await?;
    assert_eq!(purged, 1);

    let (_, body) = call(Function::Auth, store, Event::new("GET", "/").with_session(&live)).await?;
    assert_eq!(body["authenticated"], json!(true));

    db.teardown().await
}
