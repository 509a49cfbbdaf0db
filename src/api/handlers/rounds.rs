use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::{error, warn};
use std::sync::Arc;

use super::{error_response, AppState};
use crate::domain::Round;

/// One finished round from the scoring service. The pipeline does blocking
/// database work, so it runs off the async executor.
pub async fn deliver_round(
    State(state): State<Arc<AppState>>,
    Json(round): Json<Round>,
) -> impl IntoResponse {
    let pipeline = state.pipeline.clone();
    let round_id = round.round_id.clone();

    let result = tokio::task::spawn_blocking(move || pipeline.handle_round(&round)).await;

    match result {
        Ok(Ok(outcome)) => Json(outcome).into_response(),
        Ok(Err(e)) => {
            if e.is_fatal_for_delivery() {
                warn!("Round {} discarded: {}", round_id, e);
            } else {
                error!("Round {} failed: {}", round_id, e);
            }
            error_response(e)
        }
        Err(e) => {
            error!("Round {} worker panicked: {}", round_id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Worker Error").into_response()
        }
    }
}
