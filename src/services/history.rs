use std::collections::HashMap;
use std::str::FromStr;

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::database::{
    self, Club, DbConn, HistoryRow, Player, PlayerResultRow, SnapshotEntryDetail, SnapshotMetadata,
};
use crate::domain::{AgeCategory, Gender};
use crate::ranking::{Movement, classify};

/// Which public snapshot a rankings request is pinned to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotDate {
    Exact(NaiveDateTime),
    Day(NaiveDate),
}

impl FromStr for SnapshotDate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Ok(SnapshotDate::Day(day));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .map(SnapshotDate::Exact)
            .map_err(|_| format!("invalid snapshot date: '{raw}'"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    #[serde(flatten)]
    pub entry: SnapshotEntryDetail,
    #[serde(flatten)]
    pub movement: Movement,
}

/// A public ranking list with movement against the preceding snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingsView {
    pub snapshot: Option<SnapshotMetadata>,
    pub previous: Option<SnapshotMetadata>,
    pub entries: Vec<RankedEntry>,
}

impl RankingsView {
    fn empty() -> Self {
        Self {
            snapshot: None,
            previous: None,
            entries: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub player: Player,
    pub club_name: Option<String>,
    pub active_results: Vec<PlayerResultRow>,
    pub expired_results: Vec<PlayerResultRow>,
    pub history: Vec<HistoryRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterGroup {
    pub snapshot: SnapshotMetadata,
    pub entries: Vec<SnapshotEntryDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubRoster {
    pub club: Club,
    pub groups: Vec<RosterGroup>,
}

/// Read side over published snapshots
pub struct HistoryService<'a> {
    conn: &'a mut DbConn,
}

impl<'a> HistoryService<'a> {
    pub fn new(conn: &'a mut DbConn) -> Self {
        Self { conn }
    }

    /// Entries of the requested (or latest) public snapshot of a pair with
    /// rank movement against the public snapshot taken just before it.
    /// Nothing published means an empty view.
    pub fn rankings_with_history(
        &mut self,
        gender: Gender,
        age_category: AgeCategory,
        snapshot_date: Option<SnapshotDate>,
    ) -> Result<RankingsView> {
        let target = match snapshot_date {
            Some(SnapshotDate::Exact(at)) => {
                database::snapshots::public_at(self.conn, gender, age_category, at)?
            }
            Some(SnapshotDate::Day(day)) => {
                database::snapshots::public_on_day(self.conn, gender, age_category, day)?
            }
            None => database::snapshots::latest_public(self.conn, gender, age_category)?,
        };
        let Some(target) = target else {
            return Ok(RankingsView::empty());
        };

        let previous =
            database::snapshots::previous_public(self.conn, gender, age_category, target.snapshot_date)?;

        let previous_ranks: HashMap<i64, i32> = match &previous {
            Some(previous) => database::snapshots::list_entries(self.conn, previous.id)?
                .into_iter()
                .map(|entry| (entry.player_id, entry.rank_position))
                .collect(),
            None => HashMap::new(),
        };

        let entries = database::snapshots::list_entries(self.conn, target.id)?
            .into_iter()
            .map(|entry| {
                let movement = classify(entry.rank_position, previous_ranks.get(&entry.player_id).copied());
                RankedEntry { entry, movement }
            })
            .collect();

        Ok(RankingsView {
            snapshot: Some(target),
            previous,
            entries,
        })
    }

    /// Published snapshots for the date selector, newest first
    pub fn public_snapshot_dates(
        &mut self,
        gender: Option<Gender>,
        age_category: Option<AgeCategory>,
    ) -> Result<Vec<SnapshotMetadata>> {
        database::snapshots::list_public(self.conn, gender, age_category)
    }

    /// A player's placings across public snapshots, oldest first
    pub fn player_history(&mut self, player_id: i64) -> Result<Vec<HistoryRow>> {
        database::snapshots::history_for_player(self.conn, player_id)
    }

    pub fn player_profile(&mut self, player_id: i64, now: NaiveDateTime) -> Result<Option<PlayerProfile>> {
        let Some(player) = database::players::find_by_id(self.conn, player_id)? else {
            return Ok(None);
        };

        let club_name = match player.club_id {
            Some(club_id) => database::clubs::find_by_id(self.conn, club_id)?.map(|club| club.name),
            None => None,
        };

        let (active_results, expired_results): (Vec<_>, Vec<_>) =
            database::results::list_for_player(self.conn, player_id)?
                .into_iter()
                .partition(|result| result.validity_date >= now);

        let history = self.player_history(player_id)?;

        Ok(Some(PlayerProfile {
            player,
            club_name,
            active_results,
            expired_results,
            history,
        }))
    }

    /// The club's players in the latest public snapshot of every pair
    pub fn club_roster(&mut self, club_id: i64) -> Result<Option<ClubRoster>> {
        let Some(club) = database::clubs::find_by_id(self.conn, club_id)? else {
            return Ok(None);
        };

        let mut snapshots = database::snapshots::latest_public_per_pair(self.conn)?;
        snapshots.sort_by(|a, b| {
            (a.age_category != AgeCategory::Senior)
                .cmp(&(b.age_category != AgeCategory::Senior))
                .then(a.age_category.as_str().cmp(b.age_category.as_str()))
                .then(a.gender.as_str().cmp(b.gender.as_str()))
        });

        let mut groups = Vec::new();
        for snapshot in snapshots {
            let entries: Vec<_> = database::snapshots::list_entries(self.conn, snapshot.id)?
                .into_iter()
                .filter(|entry| entry.club_id == Some(club_id))
                .collect();
            if !entries.is_empty() {
                groups.push(RosterGroup { snapshot, entries });
            }
        }

        Ok(Some(ClubRoster { club, groups }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::{memory_conn, seed_club, seed_event, seed_player, seed_result};
    use crate::database::{NewSnapshot, NewSnapshotEntry};
    use crate::ranking::RankChange;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, day)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn publish(
        conn: &mut DbConn,
        day: u32,
        gender: Gender,
        age_category: AgeCategory,
        ranking: &[i64],
    ) -> SnapshotMetadata {
        let entries: Vec<_> = ranking
            .iter()
            .enumerate()
            .map(|(i, player_id)| NewSnapshotEntry {
                player_id: *player_id,
                rank_position: i as i32 + 1,
                total_points: 1000 - i as i32 * 100,
                events_count: 1,
            })
            .collect();
        let header = NewSnapshot {
            snapshot_date: at(day),
            gender,
            age_category,
            name: None,
            description: None,
        };
        let metadata = database::snapshots::insert_snapshot(conn, &header, &entries).unwrap();
        database::snapshots::set_visibility(conn, metadata.id, true).unwrap()
    }

    #[test]
    fn test_movement_between_consecutive_public_snapshots() {
        let mut conn = memory_conn();
        let a = seed_player(&mut conn, "A", "Male", None, None);
        let b = seed_player(&mut conn, "B", "Male", None, None);
        let c = seed_player(&mut conn, "C", "Male", None, None);
        let d = seed_player(&mut conn, "D", "Male", None, None);
        publish(&mut conn, 1, Gender::Male, AgeCategory::Senior, &[a, b, c]);
        publish(&mut conn, 8, Gender::Male, AgeCategory::Senior, &[c, a, d]);

        let view = HistoryService::new(&mut conn)
            .rankings_with_history(Gender::Male, AgeCategory::Senior, None)
            .unwrap();

        let moves: Vec<_> = view
            .entries
            .iter()
            .map(|e| (e.entry.player_id, e.movement.change, e.movement.rank_difference))
            .collect();
        assert_eq!(
            moves,
            vec![
                (c, RankChange::Up, 2),
                (a, RankChange::Down, 1),
                (d, RankChange::New, 0),
            ]
        );
    }

    #[test]
    fn test_first_public_snapshot_marks_everyone_new() {
        let mut conn = memory_conn();
        let a = seed_player(&mut conn, "A", "Female", None, None);
        publish(&mut conn, 1, Gender::Female, AgeCategory::U13, &[a]);

        let view = HistoryService::new(&mut conn)
            .rankings_with_history(Gender::Female, AgeCategory::U13, None)
            .unwrap();
        assert!(view.previous.is_none());
        assert_eq!(view.entries[0].movement.change, RankChange::New);
    }

    #[test]
    fn test_pinned_date_must_be_public() {
        let mut conn = memory_conn();
        let a = seed_player(&mut conn, "A", "Male", None, None);
        let old = publish(&mut conn, 1, Gender::Male, AgeCategory::Senior, &[a]);
        publish(&mut conn, 8, Gender::Male, AgeCategory::Senior, &[a]);
        database::snapshots::set_visibility(&mut conn, old.id, false).unwrap();

        let mut service = HistoryService::new(&mut conn);
        let pinned = service
            .rankings_with_history(Gender::Male, AgeCategory::Senior, Some(SnapshotDate::Exact(at(1))))
            .unwrap();
        assert!(pinned.entries.is_empty());

        let by_day = service
            .rankings_with_history(
                Gender::Male,
                AgeCategory::Senior,
                Some("2026-10-08".parse().unwrap()),
            )
            .unwrap();
        assert_eq!(by_day.entries.len(), 1);
        assert!(by_day.previous.is_none());
    }

    #[test]
    fn test_nothing_published_is_empty() {
        let mut conn = memory_conn();
        let view = HistoryService::new(&mut conn)
            .rankings_with_history(Gender::Male, AgeCategory::U19, None)
            .unwrap();
        assert_eq!(view, RankingsView::empty());
    }

    #[test]
    fn test_snapshot_date_parsing() {
        assert_eq!(
            "2026-10-01T10:00:00".parse::<SnapshotDate>().unwrap(),
            SnapshotDate::Exact(at(1))
        );
        assert_eq!(
            "2026-10-01".parse::<SnapshotDate>().unwrap(),
            SnapshotDate::Day(NaiveDate::from_ymd_opt(2026, 10, 1).unwrap())
        );
        assert!("last week".parse::<SnapshotDate>().is_err());
    }

    #[test]
    fn test_profile_splits_results_by_validity() {
        let mut conn = memory_conn();
        let club = seed_club(&mut conn, "BVSC");
        let a = seed_player(&mut conn, "A", "Male", Some(club), None);
        let current = seed_event(&mut conn, "Őszi", "OB", "Senior", "2026-09-01", "2027-09-01 23:59:59");
        let past = seed_event(&mut conn, "Tavalyi", "OB", "Senior", "2025-09-01", "2026-09-01 23:59:59");
        seed_result(&mut conn, current, a, "Egyes", "1", 400);
        seed_result(&mut conn, past, a, "Egyes", "2", 300);
        publish(&mut conn, 1, Gender::Male, AgeCategory::Senior, &[a]);

        let profile = HistoryService::new(&mut conn)
            .player_profile(a, at(19))
            .unwrap()
            .unwrap();

        assert_eq!(profile.club_name.as_deref(), Some("BVSC"));
        assert_eq!(profile.active_results.len(), 1);
        assert_eq!(profile.active_results[0].event_id, current);
        assert_eq!(profile.expired_results[0].event_id, past);
        assert_eq!(profile.history.len(), 1);

        assert!(HistoryService::new(&mut conn).player_profile(999, at(19)).unwrap().is_none());
    }

    #[test]
    fn test_club_roster_uses_latest_public_snapshots() {
        let mut conn = memory_conn();
        let club = seed_club(&mut conn, "BVSC");
        let member = seed_player(&mut conn, "Member", "Male", Some(club), None);
        let outsider = seed_player(&mut conn, "Outsider", "Male", None, None);
        publish(&mut conn, 1, Gender::Male, AgeCategory::U15, &[member]);
        publish(&mut conn, 8, Gender::Male, AgeCategory::U15, &[outsider, member]);
        publish(&mut conn, 2, Gender::Male, AgeCategory::Senior, &[member, outsider]);

        let roster = HistoryService::new(&mut conn).club_roster(club).unwrap().unwrap();

        let groups: Vec<_> = roster
            .groups
            .iter()
            .map(|g| (g.snapshot.age_category, g.entries.len(), g.entries[0].rank_position))
            .collect();
        assert_eq!(
            groups,
            vec![(AgeCategory::Senior, 1, 1), (AgeCategory::U15, 1, 2)]
        );
    }
}
