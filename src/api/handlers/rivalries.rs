use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::{error_response, AppState};
use crate::api::models::{PlayerRivalriesResponse, PlayerRivalryItem};
use crate::database::rivalries;
use crate::rivalry::pair_key;

pub async fn get_rivalry(
    State(state): State<Arc<AppState>>,
    Path((player_a, player_b)): Path<(String, String)>,
) -> impl IntoResponse {
    let conn = match state.pool.get() {
        Ok(conn) => conn,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "DB Connection Error").into_response(),
    };

    match rivalries::find_by_key(&conn, &pair_key(&player_a, &player_b)) {
        Ok(Some(rivalry)) => Json(rivalry).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_player_rivalries(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
) -> impl IntoResponse {
    let conn = match state.pool.get() {
        Ok(conn) => conn,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "DB Connection Error").into_response(),
    };

    let found = match rivalries::list_for_player(&conn, &player_id) {
        Ok(found) => found,
        Err(e) => return error_response(e),
    };

    let items = found
        .iter()
        .map(|rivalry| PlayerRivalryItem::from_rivalry(&player_id, rivalry))
        .collect();

    Json(PlayerRivalriesResponse { player_id, items }).into_response()
}
