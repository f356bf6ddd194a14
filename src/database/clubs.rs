use anyhow::{Context, Result};
use rusqlite::{OptionalExtension, params};

use super::connection::DbConn;
use super::models::{Club, ClubInput};
use crate::errors::{AdminError, AdminResult, Validator, classify_store_error};

const DUPLICATE_NAME: &str = "A club with this name already exists.";

fn validate(input: &ClubInput) -> AdminResult<String> {
    let name = input.name.trim();
    let mut validator = Validator::new();
    validator.check(name.chars().count() >= 2, "name", "Name must be at least 2 characters");
    validator.finish()?;
    Ok(name.to_string())
}

pub fn create(conn: &mut DbConn, input: &ClubInput) -> AdminResult<Club> {
    let name = validate(input)?;
    let sql = "INSERT INTO clubs (name) VALUES (?1) RETURNING id, name";

    conn.query_row(sql, params![name], parse_club_row)
        .map_err(|e| classify_store_error(e, DUPLICATE_NAME, "club"))
}

pub fn update(conn: &mut DbConn, id: i64, input: &ClubInput) -> AdminResult<Club> {
    let name = validate(input)?;
    let sql = "UPDATE clubs SET name = ?1 WHERE id = ?2 RETURNING id, name";

    conn.query_row(sql, params![name, id], parse_club_row)
        .optional()
        .map_err(|e| classify_store_error(e, DUPLICATE_NAME, "club"))?
        .ok_or_else(|| AdminError::NotFound(format!("club {id}")))
}

/// Deletes a club that no player belongs to
pub fn delete(conn: &mut DbConn, id: i64) -> AdminResult<()> {
    let dependents = count_players(conn, id)?;
    if dependents > 0 {
        return Err(AdminError::Referential {
            entity: "club",
            dependents,
        });
    }

    let deleted = conn
        .execute("DELETE FROM clubs WHERE id = ?1", params![id])
        .map_err(|e| classify_store_error(e, "", "club"))?;

    if deleted == 0 {
        return Err(AdminError::NotFound(format!("club {id}")));
    }
    Ok(())
}

pub fn count_players(conn: &mut DbConn, id: i64) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM players WHERE club_id = ?1",
        params![id],
        |row| row.get(0),
    )
    .context("Failed to count club players")
}

fn parse_club_row(row: &rusqlite::Row) -> rusqlite::Result<Club> {
    Ok(Club {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

pub fn find_by_id(conn: &mut DbConn, id: i64) -> Result<Option<Club>> {
    conn.query_row("SELECT id, name FROM clubs WHERE id = ?1", params![id], parse_club_row)
        .optional()
        .context("Failed to query club by id")
}

pub fn list_all(conn: &mut DbConn) -> Result<Vec<Club>> {
    let mut stmt = conn.prepare("SELECT id, name FROM clubs ORDER BY name")?;
    let rows = stmt
        .query_map([], parse_club_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}
