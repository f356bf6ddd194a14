use anyhow::{Context, Result};
use rusqlite::{OptionalExtension, params};

use super::connection::DbConn;
use super::models::{PlayerResultRow, ResultRecord};
use crate::domain::{Category, Position};
use crate::errors::{AdminError, AdminResult, classify_store_error};
use crate::ranking::ScoringRow;

const RESULT_COLUMNS: &str = "id, event_id, player_id, category, position, points";
const DUPLICATE_RESULT: &str = "This player already has a result in this category for the event.";

pub fn insert(
    conn: &mut DbConn,
    event_id: i64,
    player_id: i64,
    category: Category,
    position: Position,
    points: i32,
) -> AdminResult<ResultRecord> {
    let sql = format!(
        "INSERT INTO results (event_id, player_id, category, position, points) VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {RESULT_COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![event_id, player_id, category, position, points],
        parse_result_row,
    )
    .map_err(|e| classify_store_error(e, DUPLICATE_RESULT, "result"))
}

pub fn delete(conn: &mut DbConn, id: i64) -> AdminResult<()> {
    let deleted = conn
        .execute("DELETE FROM results WHERE id = ?1", params![id])
        .map_err(|e| classify_store_error(e, "", "result"))?;

    if deleted == 0 {
        return Err(AdminError::NotFound(format!("result {id}")));
    }
    Ok(())
}

pub fn update_points(conn: &mut DbConn, id: i64, points: i32) -> Result<()> {
    conn.execute(
        "UPDATE results SET points = ?1 WHERE id = ?2",
        params![points, id],
    )
    .with_context(|| format!("Failed to update points of result {id}"))?;
    Ok(())
}

fn parse_result_row(row: &rusqlite::Row) -> rusqlite::Result<ResultRecord> {
    Ok(ResultRecord {
        id: row.get(0)?,
        event_id: row.get(1)?,
        player_id: row.get(2)?,
        category: row.get(3)?,
        position: row.get(4)?,
        points: row.get(5)?,
    })
}

pub fn find_by_id(conn: &mut DbConn, id: i64) -> Result<Option<ResultRecord>> {
    let sql = format!("SELECT {RESULT_COLUMNS} FROM results WHERE id = ?1");

    conn.query_row(&sql, params![id], parse_result_row)
        .optional()
        .context("Failed to query result by id")
}

pub fn list_by_event(conn: &mut DbConn, event_id: i64) -> Result<Vec<ResultRecord>> {
    let sql = format!("SELECT {RESULT_COLUMNS} FROM results WHERE event_id = ?1 ORDER BY id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![event_id], parse_result_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Every result joined with its player, club and event
pub fn list_scoring_rows(conn: &mut DbConn) -> Result<Vec<ScoringRow>> {
    let sql = "SELECT p.id, p.name, p.gender, p.club_id, c.name, p.birth_date, p.license_id, e.id, e.event_type, e.age_category, e.validity_date, r.points FROM results r JOIN players p ON p.id = r.player_id JOIN events e ON e.id = r.event_id LEFT JOIN clubs c ON c.id = p.club_id";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(ScoringRow {
                player_id: row.get(0)?,
                player_name: row.get(1)?,
                gender: row.get(2)?,
                club_id: row.get(3)?,
                club_name: row.get(4)?,
                birth_date: row.get(5)?,
                license_id: row.get(6)?,
                event_id: row.get(7)?,
                event_type: row.get(8)?,
                event_age_category: row.get(9)?,
                validity_date: row.get(10)?,
                points: row.get(11)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to load scoring rows")?;

    Ok(rows)
}

/// A player's results with their events, newest event first
pub fn list_for_player(conn: &mut DbConn, player_id: i64) -> Result<Vec<PlayerResultRow>> {
    let sql = "SELECT r.id, r.category, r.position, r.points, e.id, e.name, e.event_type, e.date, e.validity_date FROM results r JOIN events e ON e.id = r.event_id WHERE r.player_id = ?1 ORDER BY e.date DESC, r.id";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![player_id], |row| {
            Ok(PlayerResultRow {
                result_id: row.get(0)?,
                category: row.get(1)?,
                position: row.get(2)?,
                points: row.get(3)?,
                event_id: row.get(4)?,
                event_name: row.get(5)?,
                event_type: row.get(6)?,
                event_date: row.get(7)?,
                validity_date: row.get(8)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}
