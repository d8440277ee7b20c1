// handlers/public/chess/mod.rs - `chess-api` function
//
// POST dispatches on `action`; GET routes on the path:
//   .../players      → ratings table
//   .../games        → recent games (?limit=)
//   .../game?id=N    → one game with its moves

use serde_json::Value;

use crate::api::{ApiResult, Cors, Event, FunctionResponse};
use crate::database::Store;
use crate::error::ApiError;
use crate::handlers::invoke;

pub mod games;
pub mod players;

pub const CORS: Cors = Cors::new("GET, POST, OPTIONS");

pub async fn handle(store: &dyn Store, event: Event) -> FunctionResponse {
    invoke("chess-api", CORS, &event, dispatch(store, &event)).await
}

async fn dispatch(store: &dyn Store, event: &Event) -> ApiResult {
    match event.method().as_str() {
        "POST" => {
            let body = event.json_body()?;
            match body.get("action").and_then(Value::as_str).unwrap_or_default() {
                "create_player" => players::create_player(store, &body).await,
                "create_game" => games::create_game(store, &body).await,
                "save_move" => games::save_move(store, &body).await,
                "finish_game" => games::finish_game(store, &body).await,
                _ => Err(ApiError::bad_request("Unknown action")),
            }
        }
        "GET" => {
            let path = event.path.as_str();
            // "games" before "game": the plural list path contains both
            if path.contains("players") {
                players::list_players(store).await
            } else if path.contains("games") {
                games::list_games(store, event).await
            } else if path.contains("game") && event.query("id").is_some() {
                games::get_game(store, event).await
            } else {
                Err(ApiError::not_found("Endpoint not found"))
            }
        }
        _ => Err(ApiError::method_not_allowed()),
    }
}
