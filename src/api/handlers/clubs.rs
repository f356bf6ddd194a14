use axum::{
    extract::{Path, State},
    response::Json,
};
use std::sync::Arc;

use super::AppState;
use crate::api::error::ApiError;
use crate::services::history::{ClubRoster, HistoryService};

pub async fn get_club_roster(
    State(state): State<Arc<AppState>>,
    Path(club_id): Path<i64>,
) -> Result<Json<ClubRoster>, ApiError> {
    let mut conn = state.conn()?;

    HistoryService::new(&mut conn)
        .club_roster(club_id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("club {club_id}")))
}
