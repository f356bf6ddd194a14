use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDateTime};

use super::selection::select_best_events;
use super::types::{AggregateFilter, EventTotal, PlayerAggregate, ScoringRow};
use crate::config::RankingSettings;

/// Player and event filters applied before grouping
fn qualifies(row: &ScoringRow, filter: AggregateFilter, now: NaiveDateTime) -> bool {
    if row.validity_date < now {
        return false;
    }
    if row.gender != filter.gender || row.event_age_category != filter.age_category {
        return false;
    }

    // Unknown birth dates stay eligible for youth lists
    match (filter.age_category.max_age(), row.birth_date) {
        (Some(ceiling), Some(birth_date)) => now.year() - birth_date.year() <= ceiling,
        _ => true,
    }
}

struct PlayerEvents<'a> {
    first_row: &'a ScoringRow,
    events: BTreeMap<i64, EventTotal>,
}

/// Computes every qualifying player's total for one ranking list.
///
/// Results whose event validity ended before `now` are ignored. Entries a
/// player has in several categories of the same event are summed into one
/// event total before the best-events selection runs. The returned order is
/// not meaningful, ranking happens when a snapshot is built.
pub fn aggregate(
    rows: &[ScoringRow],
    filter: AggregateFilter,
    now: NaiveDateTime,
    settings: &RankingSettings,
) -> Vec<PlayerAggregate> {
    let mut players: BTreeMap<i64, PlayerEvents> = BTreeMap::new();

    for row in rows.iter().filter(|row| qualifies(row, filter, now)) {
        let player = players.entry(row.player_id).or_insert_with(|| PlayerEvents {
            first_row: row,
            events: BTreeMap::new(),
        });

        player
            .events
            .entry(row.event_id)
            .and_modify(|total| total.points = total.points.saturating_add(row.points))
            .or_insert(EventTotal {
                event_id: row.event_id,
                event_type: row.event_type,
                points: row.points,
            });
    }

    players.into_values().map(|player| build_aggregate(player, settings)).collect()
}

fn build_aggregate(player: PlayerEvents, settings: &RankingSettings) -> PlayerAggregate {
    let mut totals: Vec<EventTotal> = player.events.into_values().collect();
    totals.sort_by(|a, b| b.points.cmp(&a.points).then(a.event_id.cmp(&b.event_id)));

    let counted_events = select_best_events(&totals, settings);
    let row = player.first_row;

    PlayerAggregate {
        player_id: row.player_id,
        player_name: row.player_name.clone(),
        gender: row.gender,
        club_id: row.club_id,
        club_name: row.club_name.clone(),
        birth_date: row.birth_date,
        license_id: row.license_id.clone(),
        total_points: counted_events
            .iter()
            .fold(0, |sum: i32, e| sum.saturating_add(e.points)),
        events_count: counted_events.len(),
        counted_events,
    }
}
