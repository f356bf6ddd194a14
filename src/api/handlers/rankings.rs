use axum::{
    extract::{Query, State},
    response::Json,
};
use std::str::FromStr;
use std::sync::Arc;

use super::AppState;
use crate::api::error::ApiError;
use crate::api::models::RankingParams;
use crate::database::SnapshotMetadata;
use crate::domain::{AgeCategory, Gender};
use crate::services::history::{HistoryService, RankingsView, SnapshotDate};

fn parse_param<T>(raw: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|value| value.parse::<T>().map_err(|e| ApiError::BadRequest(e.to_string())))
        .transpose()
}

pub async fn get_rankings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RankingParams>,
) -> Result<Json<RankingsView>, ApiError> {
    let gender = parse_param::<Gender>(params.gender.as_deref())?.unwrap_or(Gender::Male);
    let category = parse_param::<AgeCategory>(params.category.as_deref())?.unwrap_or(AgeCategory::Senior);
    let date = parse_param::<SnapshotDate>(params.date.as_deref().filter(|d| !d.is_empty()))?;

    let mut conn = state.conn()?;
    let view = HistoryService::new(&mut conn).rankings_with_history(gender, category, date)?;
    Ok(Json(view))
}

pub async fn get_ranking_dates(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RankingParams>,
) -> Result<Json<Vec<SnapshotMetadata>>, ApiError> {
    let gender = parse_param::<Gender>(params.gender.as_deref())?;
    let category = parse_param::<AgeCategory>(params.category.as_deref())?;

    let mut conn = state.conn()?;
    let dates = HistoryService::new(&mut conn).public_snapshot_dates(gender, category)?;
    Ok(Json(dates))
}
