use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{OptionalExtension, params};

use super::connection::DbConn;
use super::models::{Player, PlayerInput};
use crate::domain::Gender;
use crate::errors::{AdminError, AdminResult, FieldError, Validator, classify_store_error};

const PLAYER_COLUMNS: &str = "id, name, gender, club_id, birth_date, license_id";
const DUPLICATE_LICENSE: &str = "A player with this license id already exists.";

struct ValidPlayer {
    name: String,
    gender: Gender,
    club_id: Option<i64>,
    birth_date: Option<NaiveDate>,
    license_id: Option<String>,
}

fn validate(conn: &mut DbConn, input: &PlayerInput) -> AdminResult<ValidPlayer> {
    let mut validator = Validator::new();

    let name = input.name.trim().to_string();
    validator.check(name.chars().count() >= 2, "name", "Name must be at least 2 characters");

    let gender = validator.parse::<Gender>("gender", &input.gender);

    let birth_date = match input.birth_date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                validator.push(FieldError::new("birthDate", "Invalid date"));
                None
            }
        },
    };

    if let Some(club_id) = input.club_id {
        validator.check(
            super::clubs::find_by_id(conn, club_id)?.is_some(),
            "clubId",
            "Club does not exist",
        );
    }

    validator.finish()?;
    let gender = gender.ok_or_else(|| AdminError::Validation(Vec::new()))?;

    Ok(ValidPlayer {
        name,
        gender,
        club_id: input.club_id,
        birth_date,
        license_id: input
            .license_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    })
}

pub fn create(conn: &mut DbConn, input: &PlayerInput) -> AdminResult<Player> {
    let player = validate(conn, input)?;
    let sql = format!(
        "INSERT INTO players (name, gender, club_id, birth_date, license_id) VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {PLAYER_COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![player.name, player.gender, player.club_id, player.birth_date, player.license_id],
        parse_player_row,
    )
    .map_err(|e| classify_store_error(e, DUPLICATE_LICENSE, "player"))
}

pub fn update(conn: &mut DbConn, id: i64, input: &PlayerInput) -> AdminResult<Player> {
    let player = validate(conn, input)?;
    let sql = format!(
        "UPDATE players SET name = ?1, gender = ?2, club_id = ?3, birth_date = ?4, license_id = ?5 WHERE id = ?6 RETURNING {PLAYER_COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![player.name, player.gender, player.club_id, player.birth_date, player.license_id, id],
        parse_player_row,
    )
    .optional()
    .map_err(|e| classify_store_error(e, DUPLICATE_LICENSE, "player"))?
    .ok_or_else(|| AdminError::NotFound(format!("player {id}")))
}

/// Deletes a player without recorded results or snapshot entries
pub fn delete(conn: &mut DbConn, id: i64) -> AdminResult<()> {
    let dependents = count_dependents(conn, id)?;
    if dependents > 0 {
        return Err(AdminError::Referential {
            entity: "player",
            dependents,
        });
    }

    let deleted = conn
        .execute("DELETE FROM players WHERE id = ?1", params![id])
        .map_err(|e| classify_store_error(e, "", "player"))?;

    if deleted == 0 {
        return Err(AdminError::NotFound(format!("player {id}")));
    }
    Ok(())
}

pub fn count_dependents(conn: &mut DbConn, id: i64) -> Result<i64> {
    let sql = "SELECT (SELECT COUNT(*) FROM results WHERE player_id = ?1) + (SELECT COUNT(*) FROM ranking_snapshots WHERE player_id = ?1)";
    conn.query_row(sql, params![id], |row| row.get(0))
        .context("Failed to count player dependents")
}

fn parse_player_row(row: &rusqlite::Row) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        name: row.get(1)?,
        gender: row.get(2)?,
        club_id: row.get(3)?,
        birth_date: row.get(4)?,
        license_id: row.get(5)?,
    })
}

pub fn find_by_id(conn: &mut DbConn, id: i64) -> Result<Option<Player>> {
    let sql = format!("SELECT {PLAYER_COLUMNS} FROM players WHERE id = ?1");

    conn.query_row(&sql, params![id], parse_player_row)
        .optional()
        .context("Failed to query player by id")
}

pub fn list_all(conn: &mut DbConn) -> Result<Vec<Player>> {
    let sql = format!("SELECT {PLAYER_COLUMNS} FROM players ORDER BY name");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], parse_player_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}
