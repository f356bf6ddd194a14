use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::database::{self, DbConn, ResultRecord};
use crate::domain::{Category, Position};
use crate::errors::{AdminError, AdminResult, Validator};
use crate::ranking::{MAX_POINTS, resolve_points};

/// A finish to record, as submitted by an operator
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResult {
    pub player_id: i64,
    pub category: String,
    pub position: String,
    #[serde(default)]
    pub manual_points: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalculationReport {
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub struct ResultService<'a> {
    conn: &'a mut DbConn,
}

impl<'a> ResultService<'a> {
    pub fn new(conn: &'a mut DbConn) -> Self {
        Self { conn }
    }

    /// Records a finish, pricing it from the point rules unless points
    /// were given explicitly
    pub fn add_result(&mut self, event_id: i64, input: &NewResult) -> AdminResult<ResultRecord> {
        let event = database::events::find_by_id(self.conn, event_id)?
            .ok_or_else(|| AdminError::NotFound(format!("event {event_id}")))?;
        let player = database::players::find_by_id(self.conn, input.player_id)?;

        let mut validator = Validator::new();
        let category = validator.parse::<Category>("category", &input.category);
        let position = validator.parse::<Position>("position", &input.position);

        match &player {
            None => validator.check(false, "playerId", "Player does not exist"),
            Some(player) => validator.check(
                event.gender.admits(player.gender),
                "playerId",
                "Player is not eligible for this event",
            ),
        }
        if let Some(category) = category {
            validator.check(
                event.offers(category),
                "category",
                "Category is not offered by this event",
            );
        }
        if let Some(points) = input.manual_points {
            validator.check(points >= 0, "manualPoints", "Points must not be negative");
            validator.check(points <= MAX_POINTS, "manualPoints", "Points exceed the allowed maximum");
        }
        validator.finish()?;

        let (Some(category), Some(position)) = (category, position) else {
            return Err(AdminError::Validation(Vec::new()));
        };

        if category.requires_manual_points() && input.manual_points.is_none() {
            warn!(
                "Team result for player {} at event {event_id} recorded without points",
                input.player_id
            );
        }

        let table = database::point_rules::load_table(self.conn)?;
        let points = resolve_points(&table, event.event_type, category, position, input.manual_points);

        database::results::insert(self.conn, event_id, input.player_id, category, position, points)
    }

    pub fn delete_result(&mut self, id: i64) -> AdminResult<()> {
        database::results::delete(self.conn, id)
    }

    /// Reprices every table-priced result of an event from the current
    /// rules. A failed update is logged and skipped.
    pub fn recalculate_event(&mut self, event_id: i64) -> AdminResult<RecalculationReport> {
        let event = database::events::find_by_id(self.conn, event_id)?
            .ok_or_else(|| AdminError::NotFound(format!("event {event_id}")))?;
        let table = database::point_rules::load_table(self.conn)?;
        let results = database::results::list_by_event(self.conn, event_id)?;

        let mut report = RecalculationReport::default();
        for result in results {
            if result.category.requires_manual_points() {
                report.skipped += 1;
                continue;
            }

            let points = resolve_points(&table, event.event_type, result.category, result.position, None);
            match database::results::update_points(self.conn, result.id, points) {
                Ok(()) => report.updated += 1,
                Err(e) => {
                    warn!("Skipping result {}: {e:?}", result.id);
                    report.failed += 1;
                }
            }
        }

        info!(
            "Recalculated event {event_id}: {} updated, {} skipped, {} failed",
            report.updated, report.skipped, report.failed
        );
        Ok(report)
    }
}
