// handlers/public/chess/players.rs - player creation and the ratings table

use serde_json::{json, Map, Value};

use crate::api::{ApiResponse, ApiResult};
use crate::database::Store;
use crate::error::ApiError;
use crate::handlers::utils::{optional_str, required_str};

/// `{action: "create_player", name, email?}` → `{success, player: {id, name, rating}}`
pub async fn create_player(store: &dyn Store, body: &Map<String, Value>) -> ApiResult {
    let name = required_str(body, "name").ok_or_else(|| ApiError::field_error("name", "Player name is required"))?;
    let email = optional_str(body, "email").map(|e| e.to_lowercase());

    let player = store.create_player(name, email.as_deref()).await?;
    tracing::info!(player_id = player.id, "Created player");

    Ok(ApiResponse::success(json!({
        "success": true,
        "player": { "id": player.id, "name": player.name, "rating": player.rating },
    })))
}

/// Every player, highest rating first
pub async fn list_players(store: &dyn Store) -> ApiResult {
    let players = store.list_players().await?;
    Ok(ApiResponse::success(json!({ "players": players })))
}
