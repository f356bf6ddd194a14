use anyhow::{Context, Result};
use rusqlite::params;

use super::connection::DbConn;
use super::models::{PointRule, PointRuleInput};
use crate::domain::{Category, EventType, Position};
use crate::errors::{AdminError, AdminResult, Validator, classify_store_error};
use crate::ranking::{MAX_POINTS, PointTable};

const RULE_COLUMNS: &str = "id, event_type, category, position, points";
const DUPLICATE_RULE: &str = "A rule for this Type, Category and Position already exists.";

fn validate(input: &PointRuleInput) -> AdminResult<(EventType, Category, Position)> {
    let mut validator = Validator::new();

    let event_type = validator.parse::<EventType>("eventType", &input.event_type);
    let category = validator.parse::<Category>("category", &input.category);
    let position = validator.parse::<Position>("position", &input.position);

    if let Some(category) = category {
        validator.check(
            !category.requires_manual_points(),
            "category",
            "Team results are scored manually",
        );
    }
    validator.check(input.points >= 0, "points", "Points must not be negative");
    validator.check(input.points <= MAX_POINTS, "points", "Points exceed the allowed maximum");

    validator.finish()?;

    match (event_type, category, position) {
        (Some(event_type), Some(category), Some(position)) => Ok((event_type, category, position)),
        _ => Err(AdminError::Validation(Vec::new())),
    }
}

pub fn create(conn: &mut DbConn, input: &PointRuleInput) -> AdminResult<PointRule> {
    let (event_type, category, position) = validate(input)?;
    let sql = format!(
        "INSERT INTO point_rules (event_type, category, position, points) VALUES (?1, ?2, ?3, ?4) RETURNING {RULE_COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![event_type, category, position, input.points],
        parse_rule_row,
    )
    .map_err(|e| classify_store_error(e, DUPLICATE_RULE, "point rule"))
}

pub fn delete(conn: &mut DbConn, id: i64) -> AdminResult<()> {
    let deleted = conn
        .execute("DELETE FROM point_rules WHERE id = ?1", params![id])
        .map_err(|e| classify_store_error(e, "", "point rule"))?;

    if deleted == 0 {
        return Err(AdminError::NotFound(format!("point rule {id}")));
    }
    Ok(())
}

fn parse_rule_row(row: &rusqlite::Row) -> rusqlite::Result<PointRule> {
    Ok(PointRule {
        id: row.get(0)?,
        event_type: row.get(1)?,
        category: row.get(2)?,
        position: row.get(3)?,
        points: row.get(4)?,
    })
}

pub fn list_all(conn: &mut DbConn) -> Result<Vec<PointRule>> {
    let sql = format!("SELECT {RULE_COLUMNS} FROM point_rules");

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt
        .query_map([], parse_rule_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.sort_by(|a, b| {
        a.event_type
            .as_str()
            .cmp(b.event_type.as_str())
            .then(a.category.as_str().cmp(b.category.as_str()))
            .then(a.position.cmp(&b.position))
    });
    Ok(rows)
}

/// Loads the whole rule table for point resolution
pub fn load_table(conn: &mut DbConn) -> Result<PointTable> {
    let rules = list_all(conn).context("Failed to load point rules")?;

    Ok(rules
        .into_iter()
        .map(|rule| (rule.event_type, rule.category, rule.position, rule.points))
        .collect())
}
