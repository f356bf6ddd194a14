use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Json},
};
use chrono::Utc;
use log::info;
use std::sync::Arc;

use super::{AppState, Role, require_role};
use crate::api::error::ApiError;
use crate::api::models::{DependentsResponse, GenerateSnapshotRequest, SnapshotPatch};
use crate::database::{
    self, Club, ClubInput, Event, EventInput, Player, PlayerInput, PointRule, PointRuleInput, ResultRecord,
    SnapshotEntryDetail, SnapshotMetadata, SnapshotSummary,
};
use crate::domain::{CategorySelector, GenderSelector};
use crate::errors::{AdminError, FieldError};
use crate::export;
use crate::services::results::{NewResult, RecalculationReport, ResultService};
use crate::services::snapshots::{GenerationOutcome, SnapshotService};

type ApiResult<T> = Result<T, ApiError>;

// Snapshots

pub async fn list_snapshots(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<SnapshotSummary>>> {
    require_role(&state, &headers, Role::Admin)?;
    let mut conn = state.conn()?;
    Ok(Json(SnapshotService::new(&mut conn, &state.config).list()?))
}

pub async fn create_snapshot(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<GenerateSnapshotRequest>,
) -> ApiResult<Json<GenerationOutcome>> {
    require_role(&state, &headers, Role::Admin)?;

    let mut fields = Vec::new();
    let gender = request
        .gender
        .parse::<GenderSelector>()
        .map_err(|e| fields.push(FieldError::new("gender", e.to_string())))
        .ok();
    let category = request
        .category
        .parse::<CategorySelector>()
        .map_err(|e| fields.push(FieldError::new("category", e.to_string())))
        .ok();
    let (Some(gender), Some(category)) = (gender, category) else {
        return Err(AdminError::Validation(fields).into());
    };

    let mut conn = state.conn()?;
    let now = Utc::now().naive_utc();
    let outcome = SnapshotService::new(&mut conn, &state.config).generate(
        gender,
        category,
        request.name.as_deref(),
        now,
    );
    Ok(Json(outcome))
}

pub async fn update_snapshot(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(patch): Json<SnapshotPatch>,
) -> ApiResult<Json<SnapshotMetadata>> {
    require_role(&state, &headers, Role::Admin)?;
    let mut conn = state.conn()?;
    let mut service = SnapshotService::new(&mut conn, &state.config);

    if let Some(name) = patch.name.as_deref() {
        service.rename(id, Some(name))?;
    }
    if let Some(is_public) = patch.is_public {
        service.set_visibility(id, is_public)?;
    }

    database::snapshots::find_metadata(&mut conn, id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("snapshot {id}")))
}

pub async fn delete_snapshot(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    require_role(&state, &headers, Role::Admin)?;
    let mut conn = state.conn()?;
    SnapshotService::new(&mut conn, &state.config).delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn snapshot_entries(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<SnapshotEntryDetail>>> {
    require_role(&state, &headers, Role::Admin)?;
    let mut conn = state.conn()?;

    SnapshotService::new(&mut conn, &state.config)
        .entries(id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("snapshot {id}")))
}

pub async fn snapshot_csv(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    require_role(&state, &headers, Role::Admin)?;
    let mut conn = state.conn()?;
    let body = export::snapshot_csv(&mut conn, id)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"ranking-{id}.csv\""),
            ),
        ],
        body,
    ))
}

// Results

pub async fn add_result(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(event_id): Path<i64>,
    Json(input): Json<NewResult>,
) -> ApiResult<(StatusCode, Json<ResultRecord>)> {
    require_role(&state, &headers, Role::Admin)?;
    let mut conn = state.conn()?;
    let result = ResultService::new(&mut conn).add_result(event_id, &input)?;
    Ok((StatusCode::CREATED, Json(result)))
}

pub async fn delete_result(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    require_role(&state, &headers, Role::Admin)?;
    let mut conn = state.conn()?;
    ResultService::new(&mut conn).delete_result(id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn recalculate_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(event_id): Path<i64>,
) -> ApiResult<Json<RecalculationReport>> {
    require_role(&state, &headers, Role::Admin)?;
    let mut conn = state.conn()?;
    Ok(Json(ResultService::new(&mut conn).recalculate_event(event_id)?))
}

// Clubs

pub async fn list_clubs(State(state): State<Arc<AppState>>, headers: HeaderMap) -> ApiResult<Json<Vec<Club>>> {
    require_role(&state, &headers, Role::Admin)?;
    let mut conn = state.conn()?;
    Ok(Json(database::clubs::list_all(&mut conn)?))
}

pub async fn create_club(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(input): Json<ClubInput>,
) -> ApiResult<(StatusCode, Json<Club>)> {
    require_role(&state, &headers, Role::Admin)?;
    let mut conn = state.conn()?;
    let club = database::clubs::create(&mut conn, &input)?;
    info!("Created club {}", club.id);
    Ok((StatusCode::CREATED, Json(club)))
}

pub async fn update_club(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(input): Json<ClubInput>,
) -> ApiResult<Json<Club>> {
    require_role(&state, &headers, Role::Admin)?;
    let mut conn = state.conn()?;
    Ok(Json(database::clubs::update(&mut conn, id, &input)?))
}

pub async fn delete_club(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    require_role(&state, &headers, Role::Admin)?;
    let mut conn = state.conn()?;
    database::clubs::delete(&mut conn, id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn club_dependents(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<Json<DependentsResponse>> {
    require_role(&state, &headers, Role::Admin)?;
    let mut conn = state.conn()?;
    let dependents = database::clubs::count_players(&mut conn, id)?;
    Ok(Json(DependentsResponse { dependents }))
}

// Players

pub async fn list_players(State(state): State<Arc<AppState>>, headers: HeaderMap) -> ApiResult<Json<Vec<Player>>> {
    require_role(&state, &headers, Role::Admin)?;
    let mut conn = state.conn()?;
    Ok(Json(database::players::list_all(&mut conn)?))
}

pub async fn create_player(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(input): Json<PlayerInput>,
) -> ApiResult<(StatusCode, Json<Player>)> {
    require_role(&state, &headers, Role::Admin)?;
    let mut conn = state.conn()?;
    let player = database::players::create(&mut conn, &input)?;
    info!("Created player {}", player.id);
    Ok((StatusCode::CREATED, Json(player)))
}

pub async fn update_player(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(input): Json<PlayerInput>,
) -> ApiResult<Json<Player>> {
    require_role(&state, &headers, Role::Admin)?;
    let mut conn = state.conn()?;
    Ok(Json(database::players::update(&mut conn, id, &input)?))
}

pub async fn delete_player(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    require_role(&state, &headers, Role::Admin)?;
    let mut conn = state.conn()?;
    database::players::delete(&mut conn, id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn player_dependents(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<Json<DependentsResponse>> {
    require_role(&state, &headers, Role::Admin)?;
    let mut conn = state.conn()?;
    let dependents = database::players::count_dependents(&mut conn, id)?;
    Ok(Json(DependentsResponse { dependents }))
}

// Events (superadmin)

pub async fn list_events(State(state): State<Arc<AppState>>, headers: HeaderMap) -> ApiResult<Json<Vec<Event>>> {
    require_role(&state, &headers, Role::Admin)?;
    let mut conn = state.conn()?;
    Ok(Json(database::events::list_all(&mut conn)?))
}

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(input): Json<EventInput>,
) -> ApiResult<(StatusCode, Json<Event>)> {
    require_role(&state, &headers, Role::Superadmin)?;
    let mut conn = state.conn()?;
    let event = database::events::create(&mut conn, &input)?;
    info!("Created event {} ({})", event.id, event.name);
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(input): Json<EventInput>,
) -> ApiResult<Json<Event>> {
    require_role(&state, &headers, Role::Superadmin)?;
    let mut conn = state.conn()?;
    Ok(Json(database::events::update(&mut conn, id, &input)?))
}

pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    require_role(&state, &headers, Role::Superadmin)?;
    let mut conn = state.conn()?;
    database::events::delete(&mut conn, id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn event_dependents(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<Json<DependentsResponse>> {
    require_role(&state, &headers, Role::Superadmin)?;
    let mut conn = state.conn()?;
    let dependents = database::events::count_results(&mut conn, id)?;
    Ok(Json(DependentsResponse { dependents }))
}

// Point rules (superadmin)

pub async fn list_point_rules(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<PointRule>>> {
    require_role(&state, &headers, Role::Superadmin)?;
    let mut conn = state.conn()?;
    Ok(Json(database::point_rules::list_all(&mut conn)?))
}

pub async fn create_point_rule(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(input): Json<PointRuleInput>,
) -> ApiResult<(StatusCode, Json<PointRule>)> {
    require_role(&state, &headers, Role::Superadmin)?;
    let mut conn = state.conn()?;
    Ok((StatusCode::CREATED, Json(database::point_rules::create(&mut conn, &input)?)))
}

pub async fn delete_point_rule(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    require_role(&state, &headers, Role::Superadmin)?;
    let mut conn = state.conn()?;
    database::point_rules::delete(&mut conn, id)?;
    Ok(StatusCode::NO_CONTENT)
}
