use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers::{
    events::{get_event, register_event},
    rivalries::{get_player_rivalries, get_rivalry},
    rounds::deliver_round,
    series::{get_standings, register_series},
    AppState,
};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/series", post(register_series))
        .route("/api/series/:id/standings", get(get_standings))
        .route("/api/events", post(register_event))
        .route("/api/events/:id", get(get_event))
        .route("/api/rounds", post(deliver_round))
        .route("/api/rivalries/:player_a/:player_b", get(get_rivalry))
        .route("/api/players/:id/rivalries", get(get_player_rivalries))
        .with_state(state)
}
