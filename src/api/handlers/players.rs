use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::Utc;
use std::sync::Arc;

use super::AppState;
use crate::api::error::ApiError;
use crate::api::models::PlayerProfileResponse;
use crate::services::history::HistoryService;

pub async fn get_player_detail(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<i64>,
) -> Result<Json<PlayerProfileResponse>, ApiError> {
    let mut conn = state.conn()?;
    let now = Utc::now().naive_utc();

    HistoryService::new(&mut conn)
        .player_profile(player_id, now)?
        .map(|profile| Json(profile.into()))
        .ok_or_else(|| ApiError::NotFound(format!("player {player_id}")))
}
