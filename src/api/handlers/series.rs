use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::{error_response, AppState};
use crate::api::models::RegisteredResponse;
use crate::database::series;
use crate::domain::{ScoringMode, SeriesSpec};

pub async fn register_series(
    State(state): State<Arc<AppState>>,
    Json(spec): Json<SeriesSpec>,
) -> impl IntoResponse {
    if spec.scoring_mode == ScoringMode::Points && spec.points_by_rank.is_empty() {
        return (StatusCode::BAD_REQUEST, "Points scoring needs a points table").into_response();
    }

    let conn = match state.pool.get() {
        Ok(conn) => conn,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "DB Connection Error").into_response(),
    };

    match series::insert_series(&conn, &spec) {
        Ok(created) => {
            let status = if created { StatusCode::CREATED } else { StatusCode::OK };
            (status, Json(RegisteredResponse { id: spec.series_id, created })).into_response()
        }
        Err(e) => error_response(e),
    }
}

pub async fn get_standings(
    State(state): State<Arc<AppState>>,
    Path(series_id): Path<String>,
) -> impl IntoResponse {
    let conn = match state.pool.get() {
        Ok(conn) => conn,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "DB Connection Error").into_response(),
    };

    match series::latest_standings(&conn, &series_id) {
        Ok(Some(snapshot)) => Json(snapshot).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => error_response(e),
    }
}
