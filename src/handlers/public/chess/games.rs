// handlers/public/chess/games.rs - games, moves and results

use serde_json::{json, Map, Value};

use crate::api::{ApiResponse, ApiResult, Event};
use crate::auth::session::now;
use crate::config::config;
use crate::database::models::{FinishOutcome, NewGame, NewMove};
use crate::database::Store;
use crate::error::ApiError;
use crate::handlers::utils::{id_param, int_field, limit_param, optional_str, required_str};
use crate::types::{GameResult, PlayerColor};

const DEFAULT_TIME_CONTROL: &str = "10+0";

/**
 * Start a game between two existing players
 *
 * Expected Input:
 * ```json
 * { "action": "create_game", "white_player_id": 1, "black_player_id": 2, "time_control": "5+3" }
 * ```
 *
 * The game starts `in_progress`; `time_control` defaults to "10+0".
 */
pub async fn create_game(store: &dyn Store, body: &Map<String, Value>) -> ApiResult {
    let (Some(white_player_id), Some(black_player_id)) =
        (int_field(body, "white_player_id")?, int_field(body, "black_player_id")?)
    else {
        return Err(ApiError::bad_request("white_player_id and black_player_id are required"));
    };

    if white_player_id == black_player_id {
        return Err(ApiError::bad_request("A player cannot play against themselves"));
    }

    for player_id in [white_player_id, black_player_id] {
        if store.find_player(player_id).await?.is_none() {
            return Err(ApiError::not_found(format!("Player {} not found", player_id)));
        }
    }

    let game_id = store
        .create_game(NewGame {
            white_player_id,
            black_player_id,
            time_control: optional_str(body, "time_control").unwrap_or_else(|| DEFAULT_TIME_CONTROL.to_string()),
        })
        .await?;
    tracing::info!(game_id, white_player_id, black_player_id, "Started game");

    Ok(ApiResponse::success(json!({ "success": true, "game_id": game_id })))
}

/**
 * Record one move and bump the game's move counter
 *
 * Expected Input:
 * ```json
 * {
 *   "action": "save_move",
 *   "game_id": 3, "move_number": 1, "player_color": "white",
 *   "move_notation": "e4", "board_state": "<fen>"   // board_state optional
 * }
 * ```
 */
pub async fn save_move(store: &dyn Store, body: &Map<String, Value>) -> ApiResult {
    let game_id = int_field(body, "game_id")?;
    let move_number = int_field(body, "move_number")?;
    let player_color = required_str(body, "player_color");
    let notation = required_str(body, "move_notation");

    let (Some(game_id), Some(move_number), Some(player_color), Some(notation)) =
        (game_id, move_number, player_color, notation)
    else {
        return Err(ApiError::bad_request(
            "game_id, move_number, player_color and move_notation are required",
        ));
    };

    if move_number < 1 {
        return Err(ApiError::field_error("move_number", "move_number must be positive"));
    }
    let player_color: PlayerColor = player_color
        .parse()
        .map_err(|_| ApiError::field_error("player_color", "player_color must be white or black"))?;

    let saved = store
        .save_move(NewMove {
            game_id,
            move_number,
            player_color,
            notation: notation.to_string(),
            board_state: body.get("board_state").and_then(Value::as_str).map(str::to_string),
        })
        .await?;

    if !saved {
        return Err(ApiError::not_found("Game not found"));
    }
    Ok(ApiResponse::success(json!({ "success": true })))
}

/**
 * Close a game and credit both players
 *
 * Expected Input:
 * ```json
 * { "action": "finish_game", "game_id": 3, "result": "white_wins" }   // or black_wins, draw
 * ```
 *
 * A game can only be finished once; the second attempt is a 409 and leaves
 * the players' counters untouched.
 */
pub async fn finish_game(store: &dyn Store, body: &Map<String, Value>) -> ApiResult {
    let game_id = int_field(body, "game_id")?.ok_or_else(|| ApiError::bad_request("game_id is required"))?;
    let result = required_str(body, "result")
        .and_then(|r| r.parse::<GameResult>().ok())
        .filter(GameResult::is_finished)
        .ok_or_else(|| ApiError::field_error("result", "result must be one of white_wins, black_wins, draw"))?;

    match store.finish_game(game_id, result, now()).await? {
        FinishOutcome::Finished => {
            tracing::info!(game_id, result = %result, "Game finished");
            Ok(ApiResponse::success(json!({ "success": true })))
        }
        FinishOutcome::AlreadyFinished => Err(ApiError::conflict("Game is already finished")),
        FinishOutcome::NotFound => Err(ApiError::not_found("Game not found")),
    }
}

/// Most recent games first, `?limit=` clamped to the configured maximum
pub async fn list_games(store: &dyn Store, event: &Event) -> ApiResult {
    let api = &config().api;
    let limit = limit_param(event, api.games_default_limit, api.games_max_limit)?;

    let games = store.list_games(limit).await?;
    Ok(ApiResponse::success(json!({ "games": games })))
}

/// One game with its moves in order
pub async fn get_game(store: &dyn Store, event: &Event) -> ApiResult {
    let game_id = id_param(event, "id", "Game ID must be a number")?;
    let game = store
        .find_game(game_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Game not found"))?;

    Ok(ApiResponse::success(json!({ "game": game })))
}
