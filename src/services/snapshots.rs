use anyhow::Result;
use chrono::{NaiveDateTime, SubsecRound};
use log::{error, info, warn};
use serde::Serialize;

use crate::config::AppConfig;
use crate::database::{self, DbConn, NewSnapshot, NewSnapshotEntry, SnapshotEntryDetail, SnapshotMetadata, SnapshotSummary};
use crate::domain::{AgeCategory, CategorySelector, Gender, GenderSelector, SNAPSHOT_CATEGORIES};
use crate::errors::AdminResult;
use crate::ranking::{self, AggregateFilter, PlayerAggregate};

/// Result of a generation request, possibly covering several pairs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationOutcome {
    pub success: bool,
    pub message: String,
    pub count: usize,
}

impl GenerationOutcome {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            count: 0,
        }
    }
}

/// Orders aggregates into ranking order: more points first, then fewer
/// events, then name, then player id
pub fn rank_aggregates(mut aggregates: Vec<PlayerAggregate>) -> Vec<NewSnapshotEntry> {
    aggregates.sort_by(|a, b| {
        b.total_points
            .cmp(&a.total_points)
            .then(a.events_count.cmp(&b.events_count))
            .then_with(|| a.player_name.cmp(&b.player_name))
            .then(a.player_id.cmp(&b.player_id))
    });

    aggregates
        .iter()
        .enumerate()
        .map(|(index, aggregate)| NewSnapshotEntry {
            player_id: aggregate.player_id,
            rank_position: index as i32 + 1,
            total_points: aggregate.total_points,
            events_count: aggregate.events_count as i32,
        })
        .collect()
}

fn describe(gender: Gender, age_category: AgeCategory) -> String {
    format!("Auto-generated {gender} {age_category} ranking")
}

pub struct SnapshotService<'a> {
    conn: &'a mut DbConn,
    config: &'a AppConfig,
}

impl<'a> SnapshotService<'a> {
    pub fn new(conn: &'a mut DbConn, config: &'a AppConfig) -> Self {
        Self { conn, config }
    }

    /// Builds snapshots for every pair the selectors cover. Pairs are
    /// independent, the request succeeds when at least one of them did.
    pub fn generate(
        &mut self,
        gender: GenderSelector,
        category: CategorySelector,
        name: Option<&str>,
        now: NaiveDateTime,
    ) -> GenerationOutcome {
        let genders = match gender {
            GenderSelector::One(gender) => vec![gender],
            GenderSelector::Both => vec![Gender::Male, Gender::Female],
        };
        let categories = match category {
            CategorySelector::One(category) => vec![category],
            CategorySelector::All => SNAPSHOT_CATEGORIES.to_vec(),
        };

        let mut outcomes = Vec::new();
        for gender in &genders {
            for category in &categories {
                outcomes.push(self.generate_pair(*gender, *category, name, now));
            }
        }

        if outcomes.len() == 1 {
            return outcomes.remove(0);
        }
        combine(outcomes)
    }

    /// Snapshot of a single (gender, category) pair
    pub fn generate_pair(
        &mut self,
        gender: Gender,
        age_category: AgeCategory,
        name: Option<&str>,
        now: NaiveDateTime,
    ) -> GenerationOutcome {
        match self.try_generate_pair(gender, age_category, name, now) {
            Ok(Some((metadata, count))) => {
                info!(
                    "Created snapshot {} for {gender} {age_category} with {count} players",
                    metadata.id
                );
                GenerationOutcome {
                    success: true,
                    message: format!("Snapshot created for {gender} {age_category} with {count} players."),
                    count,
                }
            }
            Ok(None) => {
                warn!("No qualifying players for {gender} {age_category}, snapshot skipped");
                GenerationOutcome::failure(format!("No players found for {gender} {age_category}."))
            }
            Err(e) => {
                error!("Snapshot generation failed for {gender} {age_category}: {e:?}");
                GenerationOutcome::failure("Database error while creating snapshot.")
            }
        }
    }

    fn try_generate_pair(
        &mut self,
        gender: Gender,
        age_category: AgeCategory,
        name: Option<&str>,
        now: NaiveDateTime,
    ) -> Result<Option<(SnapshotMetadata, usize)>> {
        let rows = database::results::list_scoring_rows(self.conn)?;
        let filter = AggregateFilter { gender, age_category };
        let aggregates = ranking::aggregate(&rows, filter, now, &self.config.ranking);

        if aggregates.is_empty() {
            return Ok(None);
        }

        let entries = rank_aggregates(aggregates);
        let header = NewSnapshot {
            snapshot_date: now.trunc_subsecs(6),
            gender,
            age_category,
            name: name.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string),
            description: Some(describe(gender, age_category)),
        };

        let metadata = database::snapshots::insert_snapshot(self.conn, &header, &entries)?;
        Ok(Some((metadata, entries.len())))
    }

    pub fn rename(&mut self, id: i64, name: Option<&str>) -> AdminResult<SnapshotMetadata> {
        database::snapshots::rename(self.conn, id, name)
    }

    pub fn set_visibility(&mut self, id: i64, is_public: bool) -> AdminResult<SnapshotMetadata> {
        let metadata = database::snapshots::set_visibility(self.conn, id, is_public)?;
        info!(
            "Snapshot {id} is now {}",
            if is_public { "public" } else { "private" }
        );
        Ok(metadata)
    }

    pub fn list(&mut self) -> Result<Vec<SnapshotSummary>> {
        database::snapshots::list_summaries(self.conn)
    }

    /// Entries of any snapshot regardless of visibility, for admin preview
    pub fn entries(&mut self, id: i64) -> Result<Option<Vec<SnapshotEntryDetail>>> {
        if database::snapshots::find_metadata(self.conn, id)?.is_none() {
            return Ok(None);
        }
        database::snapshots::list_entries(self.conn, id).map(Some)
    }

    pub fn delete(&mut self, id: i64) -> AdminResult<()> {
        database::snapshots::delete(self.conn, id)?;
        info!("Deleted snapshot {id}");
        Ok(())
    }
}

fn combine(outcomes: Vec<GenerationOutcome>) -> GenerationOutcome {
    let created = outcomes.iter().filter(|o| o.success).count();
    let count = outcomes.iter().map(|o| o.count).sum();

    GenerationOutcome {
        success: created > 0,
        message: format!(
            "Created {created} of {} snapshots ({count} player entries).",
            outcomes.len()
        ),
        count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    use crate::config::AuthSettings;
    use crate::database::test_support::{memory_conn, seed_event, seed_player, seed_result};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_nano_opt(12, 30, 0, 123_456_789)
            .unwrap()
    }

    fn aggregate(player_id: i64, name: &str, total_points: i32, events_count: usize) -> PlayerAggregate {
        PlayerAggregate {
            player_id,
            player_name: name.to_string(),
            gender: Gender::Male,
            club_id: None,
            club_name: None,
            birth_date: None,
            license_id: None,
            total_points,
            events_count,
            counted_events: Vec::new(),
        }
    }

    #[test]
    fn test_ranking_order_breaks_ties_by_events_then_name() {
        let entries = rank_aggregates(vec![
            aggregate(1, "Zöld", 900, 3),
            aggregate(2, "Bíró", 1200, 4),
            aggregate(3, "Antal", 900, 3),
            aggregate(4, "Kovács", 900, 2),
        ]);

        let order: Vec<_> = entries.iter().map(|e| (e.player_id, e.rank_position)).collect();
        assert_eq!(order, vec![(2, 1), (4, 2), (3, 3), (1, 4)]);
    }

    #[test]
    fn test_generate_persists_private_ranked_snapshot() {
        let mut conn = memory_conn();
        let config = AppConfig::with_parts(":memory:", AuthSettings::default());
        let anna = seed_player(&mut conn, "Kiss Anna", "Female", None, None);
        let lili = seed_player(&mut conn, "Tóth Lili", "Female", None, None);
        let event = seed_event(&mut conn, "OB", "OB", "Senior", "2026-03-01", "2027-03-01 23:59:59");
        seed_result(&mut conn, event, anna, "Egyes", "2", 300);
        seed_result(&mut conn, event, lili, "Egyes", "1", 500);

        let outcome = SnapshotService::new(&mut conn, &config).generate(
            GenderSelector::One(Gender::Female),
            CategorySelector::One(AgeCategory::Senior),
            Some("  "),
            now(),
        );
        assert!(outcome.success);
        assert_eq!(outcome.count, 2);

        let summaries = database::snapshots::list_summaries(&mut conn).unwrap();
        assert_eq!(summaries.len(), 1);
        let metadata = &summaries[0].metadata;
        assert!(!metadata.is_public);
        assert_eq!(metadata.name, None);
        assert_eq!(metadata.description.as_deref(), Some("Auto-generated Female Senior ranking"));
        assert_eq!(metadata.snapshot_date, now().trunc_subsecs(6));

        let entries = database::snapshots::list_entries(&mut conn, metadata.id).unwrap();
        let ranked: Vec<_> = entries.iter().map(|e| (e.player_id, e.rank_position)).collect();
        assert_eq!(ranked, vec![(lili, 1), (anna, 2)]);
    }

    #[test]
    fn test_empty_pair_fails_without_writing() {
        let mut conn = memory_conn();
        let config = AppConfig::with_parts(":memory:", AuthSettings::default());

        let outcome = SnapshotService::new(&mut conn, &config).generate(
            GenderSelector::One(Gender::Male),
            CategorySelector::One(AgeCategory::U11),
            None,
            now(),
        );
        assert!(!outcome.success);
        assert_eq!(outcome.count, 0);
        assert!(database::snapshots::list_summaries(&mut conn).unwrap().is_empty());
    }

    #[test]
    fn test_fan_out_succeeds_when_any_pair_succeeds() {
        let mut conn = memory_conn();
        let config = AppConfig::with_parts(":memory:", AuthSettings::default());
        let anna = seed_player(&mut conn, "Kiss Anna", "Female", None, None);
        let event = seed_event(&mut conn, "OB", "OB", "U15", "2026-03-01", "2027-03-01 23:59:59");
        seed_result(&mut conn, event, anna, "Egyes", "1", 500);

        let outcome = SnapshotService::new(&mut conn, &config).generate(
            GenderSelector::Both,
            CategorySelector::All,
            Some("Október"),
            now(),
        );

        assert!(outcome.success);
        assert_eq!(outcome.count, 1);
        let summaries = database::snapshots::list_summaries(&mut conn).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].metadata.age_category, AgeCategory::U15);
        assert_eq!(summaries[0].metadata.name.as_deref(), Some("Október"));
    }

    #[test]
    fn test_snapshot_is_unchanged_by_later_result_edits() {
        let mut conn = memory_conn();
        let config = AppConfig::with_parts(":memory:", AuthSettings::default());
        let anna = seed_player(&mut conn, "Kiss Anna", "Female", None, None);
        let event = seed_event(&mut conn, "OB", "OB", "Senior", "2026-03-01", "2027-03-01 23:59:59");
        let result = seed_result(&mut conn, event, anna, "Egyes", "1", 500);

        SnapshotService::new(&mut conn, &config).generate(
            GenderSelector::One(Gender::Female),
            CategorySelector::One(AgeCategory::Senior),
            None,
            now(),
        );
        database::results::update_points(&mut conn, result, 50).unwrap();

        let later = now() + Duration::days(1);
        SnapshotService::new(&mut conn, &config).generate(
            GenderSelector::One(Gender::Female),
            CategorySelector::One(AgeCategory::Senior),
            None,
            later,
        );

        let summaries = database::snapshots::list_summaries(&mut conn).unwrap();
        let totals: Vec<_> = summaries
            .iter()
            .rev()
            .map(|s| database::snapshots::list_entries(&mut conn, s.metadata.id).unwrap()[0].total_points)
            .collect();
        assert_eq!(totals, vec![500, 50]);
    }
}
