use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{OptionalExtension, params};

use super::connection::DbConn;
use super::models::{Event, EventInput};
use crate::domain::{AgeCategory, EventGender, EventType};
use crate::errors::{AdminError, AdminResult, Validator, classify_store_error};

const EVENT_COLUMNS: &str = "id, name, event_type, date, validity_date, age_category, gender, has_singles, has_doubles, has_mixed, has_team";

struct ValidEvent {
    name: String,
    event_type: EventType,
    date: NaiveDate,
    validity_date: NaiveDateTime,
    age_category: AgeCategory,
    gender: EventGender,
}

/// A validity date given as a plain day lasts until the end of that day
pub fn parse_validity(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let end_of_day = NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999)?;
        return Some(date.and_time(end_of_day));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

fn validate(input: &EventInput) -> AdminResult<ValidEvent> {
    let mut validator = Validator::new();

    let name = input.name.trim().to_string();
    validator.check(name.chars().count() >= 2, "name", "Name must be at least 2 characters");

    let event_type = validator.parse::<EventType>("eventType", &input.event_type);
    let age_category = validator.parse::<AgeCategory>("ageCategory", &input.age_category);
    let gender = validator.parse::<EventGender>("gender", input.gender.as_deref().unwrap_or("Both"));

    let date = NaiveDate::parse_from_str(input.date.trim(), "%Y-%m-%d").ok();
    validator.check(date.is_some(), "date", "Invalid Date");

    let validity_date = parse_validity(&input.validity_date);
    validator.check(validity_date.is_some(), "validityDate", "Invalid Date");

    if let (Some(date), Some(validity)) = (date, validity_date) {
        validator.check(
            validity.date() >= date,
            "validityDate",
            "Validity date must not precede the event date",
        );
    }

    validator.check(
        input.has_singles || input.has_doubles || input.has_mixed || input.has_team,
        "categories",
        "At least one category must be offered",
    );

    validator.finish()?;

    match (event_type, date, validity_date, age_category, gender) {
        (Some(event_type), Some(date), Some(validity_date), Some(age_category), Some(gender)) => {
            Ok(ValidEvent {
                name,
                event_type,
                date,
                validity_date,
                age_category,
                gender,
            })
        }
        _ => Err(AdminError::Validation(Vec::new())),
    }
}

pub fn create(conn: &mut DbConn, input: &EventInput) -> AdminResult<Event> {
    let event = validate(input)?;
    let sql = format!(
        "INSERT INTO events (name, event_type, date, validity_date, age_category, gender, has_singles, has_doubles, has_mixed, has_team) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) RETURNING {EVENT_COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![
            event.name,
            event.event_type,
            event.date,
            event.validity_date,
            event.age_category,
            event.gender,
            input.has_singles,
            input.has_doubles,
            input.has_mixed,
            input.has_team
        ],
        parse_event_row,
    )
    .map_err(|e| classify_store_error(e, "Event already exists.", "event"))
}

pub fn update(conn: &mut DbConn, id: i64, input: &EventInput) -> AdminResult<Event> {
    let event = validate(input)?;
    let sql = format!(
        "UPDATE events SET name = ?1, event_type = ?2, date = ?3, validity_date = ?4, age_category = ?5, gender = ?6, has_singles = ?7, has_doubles = ?8, has_mixed = ?9, has_team = ?10 WHERE id = ?11 RETURNING {EVENT_COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![
            event.name,
            event.event_type,
            event.date,
            event.validity_date,
            event.age_category,
            event.gender,
            input.has_singles,
            input.has_doubles,
            input.has_mixed,
            input.has_team,
            id
        ],
        parse_event_row,
    )
    .optional()
    .map_err(|e| classify_store_error(e, "Event already exists.", "event"))?
    .ok_or_else(|| AdminError::NotFound(format!("event {id}")))
}

/// Deletes an event without recorded results
pub fn delete(conn: &mut DbConn, id: i64) -> AdminResult<()> {
    let dependents = count_results(conn, id)?;
    if dependents > 0 {
        return Err(AdminError::Referential {
            entity: "event",
            dependents,
        });
    }

    let deleted = conn
        .execute("DELETE FROM events WHERE id = ?1", params![id])
        .map_err(|e| classify_store_error(e, "", "event"))?;

    if deleted == 0 {
        return Err(AdminError::NotFound(format!("event {id}")));
    }
    Ok(())
}

pub fn count_results(conn: &mut DbConn, id: i64) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM results WHERE event_id = ?1",
        params![id],
        |row| row.get(0),
    )
    .context("Failed to count event results")
}

fn parse_event_row(row: &rusqlite::Row) -> rusqlite::Result<Event> {
    Ok(Event {
        id: row.get(0)?,
        name: row.get(1)?,
        event_type: row.get(2)?,
        date: row.get(3)?,
        validity_date: row.get(4)?,
        age_category: row.get(5)?,
        gender: row.get(6)?,
        has_singles: row.get(7)?,
        has_doubles: row.get(8)?,
        has_mixed: row.get(9)?,
        has_team: row.get(10)?,
    })
}

pub fn find_by_id(conn: &mut DbConn, id: i64) -> Result<Option<Event>> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1");

    conn.query_row(&sql, params![id], parse_event_row)
        .optional()
        .context("Failed to query event by id")
}

pub fn list_all(conn: &mut DbConn) -> Result<Vec<Event>> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY date DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], parse_event_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}
