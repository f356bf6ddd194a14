use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::domain::{AgeCategory, EventType, Gender};

/// One result joined with its player and event, as consumed by aggregation
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringRow {
    pub player_id: i64,
    pub player_name: String,
    pub gender: Gender,
    pub club_id: Option<i64>,
    pub club_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub license_id: Option<String>,
    pub event_id: i64,
    pub event_type: EventType,
    pub event_age_category: AgeCategory,
    pub validity_date: NaiveDateTime,
    pub points: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateFilter {
    pub gender: Gender,
    pub age_category: AgeCategory,
}

/// A player's combined points from one event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTotal {
    pub event_id: i64,
    pub event_type: EventType,
    pub points: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerAggregate {
    pub player_id: i64,
    pub player_name: String,
    pub gender: Gender,
    pub club_id: Option<i64>,
    pub club_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub license_id: Option<String>,
    pub total_points: i32,
    pub events_count: usize,
    pub counted_events: Vec<EventTotal>,
}
