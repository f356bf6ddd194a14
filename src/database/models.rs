use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::{AgeCategory, Category, EventGender, EventType, Gender, Position};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: i64,
    pub name: String,
    pub gender: Gender,
    pub club_id: Option<i64>,
    pub birth_date: Option<NaiveDate>,
    pub license_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub event_type: EventType,
    pub date: NaiveDate,
    pub validity_date: NaiveDateTime,
    pub age_category: AgeCategory,
    pub gender: EventGender,
    pub has_singles: bool,
    pub has_doubles: bool,
    pub has_mixed: bool,
    pub has_team: bool,
}

impl Event {
    pub fn offers(&self, category: Category) -> bool {
        match category {
            Category::Singles => self.has_singles,
            Category::Doubles => self.has_doubles,
            Category::Mixed => self.has_mixed,
            Category::Team => self.has_team,
        }
    }

    /// Results still count toward rankings at `now` (inclusive boundary)
    pub fn is_active(&self, now: NaiveDateTime) -> bool {
        self.validity_date >= now
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub id: i64,
    pub event_id: i64,
    pub player_id: i64,
    pub category: Category,
    pub position: Position,
    pub points: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointRule {
    pub id: i64,
    pub event_type: EventType,
    pub category: Category,
    pub position: Position,
    pub points: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    pub id: i64,
    pub snapshot_date: NaiveDateTime,
    pub gender: Gender,
    pub age_category: AgeCategory,
    pub name: Option<String>,
    pub is_public: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSummary {
    #[serde(flatten)]
    pub metadata: SnapshotMetadata,
    pub player_count: i64,
}

/// Header of a snapshot about to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewSnapshot {
    pub snapshot_date: NaiveDateTime,
    pub gender: Gender,
    pub age_category: AgeCategory,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Row of a persisted ranking, ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewSnapshotEntry {
    pub player_id: i64,
    pub rank_position: i32,
    pub total_points: i32,
    pub events_count: i32,
}

/// Snapshot entry joined with the player it refers to
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEntryDetail {
    pub metadata_id: i64,
    pub rank_position: i32,
    pub total_points: i32,
    pub events_count: i32,
    pub player_id: i64,
    pub player_name: String,
    pub gender: Gender,
    pub club_id: Option<i64>,
    pub club_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub license_id: Option<String>,
}

/// A player's entry in one public snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRow {
    pub snapshot_date: NaiveDateTime,
    pub name: Option<String>,
    pub gender: Gender,
    pub age_category: AgeCategory,
    pub rank_position: i32,
    pub total_points: i32,
    pub events_count: i32,
}

/// A player's result joined with its event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResultRow {
    pub result_id: i64,
    pub category: Category,
    pub position: Position,
    pub points: i32,
    pub event_id: i64,
    pub event_name: String,
    pub event_type: EventType,
    pub event_date: NaiveDate,
    pub validity_date: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClubInput {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInput {
    pub name: String,
    pub gender: String,
    pub club_id: Option<i64>,
    pub birth_date: Option<String>,
    pub license_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    pub name: String,
    pub event_type: String,
    pub date: String,
    pub validity_date: String,
    pub age_category: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub has_singles: bool,
    #[serde(default)]
    pub has_doubles: bool,
    #[serde(default)]
    pub has_mixed: bool,
    #[serde(default)]
    pub has_team: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointRuleInput {
    pub event_type: String,
    pub category: String,
    pub position: String,
    pub points: i32,
}
