use std::collections::HashSet;

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::database::HistoryRow;
use crate::services::history::PlayerProfile;

/// One point of a player's rank chart
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub label: String,
    pub rank: i32,
    pub points: i32,
}

const MONTHS: [&str; 12] = [
    "jan.", "febr.", "márc.", "ápr.", "máj.", "jún.", "júl.", "aug.", "szept.", "okt.", "nov.", "dec.",
];

/// Short Hungarian date such as "okt. 19."
fn short_date(date: NaiveDateTime) -> String {
    format!("{} {}.", MONTHS[date.month0() as usize], date.day())
}

/// Labels history points by snapshot name (or short date) and keeps only
/// the most recent point for a repeated label, in chronological order
pub fn chart_points(history: &[HistoryRow]) -> Vec<ChartPoint> {
    let mut seen = HashSet::new();
    let mut points: Vec<ChartPoint> = history
        .iter()
        .rev()
        .filter_map(|row| {
            let label = row
                .name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| short_date(row.snapshot_date));
            seen.insert(label.clone()).then(|| ChartPoint {
                label,
                rank: row.rank_position,
                points: row.total_points,
            })
        })
        .collect();

    points.reverse();
    points
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfileResponse {
    #[serde(flatten)]
    pub profile: PlayerProfile,
    pub chart: Vec<ChartPoint>,
    pub current_rank: Option<i32>,
    pub current_points: i32,
}

impl From<PlayerProfile> for PlayerProfileResponse {
    fn from(profile: PlayerProfile) -> Self {
        let latest = profile.history.last();
        Self {
            chart: chart_points(&profile.history),
            current_rank: latest.map(|h| h.rank_position),
            current_points: latest.map(|h| h.total_points).unwrap_or(0),
            profile,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependentsResponse {
    pub dependents: i64,
}

#[derive(Debug, Deserialize)]
pub struct RankingParams {
    pub gender: Option<String>,
    pub category: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSnapshotRequest {
    pub gender: String,
    pub category: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Partial update of a snapshot; an empty name clears it
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
}
