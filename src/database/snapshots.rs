use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{OptionalExtension, params};

use super::connection::DbConn;
use super::models::{
    HistoryRow, NewSnapshot, NewSnapshotEntry, SnapshotEntryDetail, SnapshotMetadata, SnapshotSummary,
};
use crate::domain::{AgeCategory, Gender};
use crate::errors::{AdminError, AdminResult, classify_store_error};

const METADATA_COLUMNS: &str = "id, snapshot_date, gender, age_category, name, is_public, description";

/// Persists a snapshot header and all of its entries atomically
pub fn insert_snapshot(
    conn: &mut DbConn,
    snapshot: &NewSnapshot,
    entries: &[NewSnapshotEntry],
) -> Result<SnapshotMetadata> {
    let tx = conn
        .transaction()
        .context("Failed to begin snapshot transaction")?;

    let sql = format!(
        "INSERT INTO snapshot_metadata (snapshot_date, gender, age_category, name, is_public, description) VALUES (?1, ?2, ?3, ?4, 0, ?5) RETURNING {METADATA_COLUMNS}"
    );
    let metadata = tx
        .query_row(
            &sql,
            params![
                snapshot.snapshot_date,
                snapshot.gender,
                snapshot.age_category,
                snapshot.name,
                snapshot.description
            ],
            parse_metadata_row,
        )
        .context("Failed to insert snapshot metadata")?;

    {
        let mut stmt = tx.prepare(
            "INSERT INTO ranking_snapshots (metadata_id, player_id, rank_position, total_points, events_count, snapshot_date) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for entry in entries {
            stmt.execute(params![
                metadata.id,
                entry.player_id,
                entry.rank_position,
                entry.total_points,
                entry.events_count,
                snapshot.snapshot_date
            ])
            .with_context(|| format!("Failed to insert snapshot entry for player {}", entry.player_id))?;
        }
    }

    tx.commit().context("Failed to commit snapshot")?;
    Ok(metadata)
}

fn parse_metadata_row(row: &rusqlite::Row) -> rusqlite::Result<SnapshotMetadata> {
    Ok(SnapshotMetadata {
        id: row.get(0)?,
        snapshot_date: row.get(1)?,
        gender: row.get(2)?,
        age_category: row.get(3)?,
        name: row.get(4)?,
        is_public: row.get(5)?,
        description: row.get(6)?,
    })
}

fn query_metadata(
    conn: &mut DbConn,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<SnapshotMetadata>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, parse_metadata_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn find_metadata(conn: &mut DbConn, id: i64) -> Result<Option<SnapshotMetadata>> {
    let sql = format!("SELECT {METADATA_COLUMNS} FROM snapshot_metadata WHERE id = ?1");

    conn.query_row(&sql, params![id], parse_metadata_row)
        .optional()
        .context("Failed to query snapshot metadata")
}

pub fn latest_public(
    conn: &mut DbConn,
    gender: Gender,
    age_category: AgeCategory,
) -> Result<Option<SnapshotMetadata>> {
    let sql = format!(
        "SELECT {METADATA_COLUMNS} FROM snapshot_metadata WHERE is_public = 1 AND gender = ?1 AND age_category = ?2 ORDER BY snapshot_date DESC, id DESC LIMIT 1"
    );

    conn.query_row(&sql, params![gender, age_category], parse_metadata_row)
        .optional()
        .context("Failed to query latest public snapshot")
}

pub fn public_at(
    conn: &mut DbConn,
    gender: Gender,
    age_category: AgeCategory,
    snapshot_date: NaiveDateTime,
) -> Result<Option<SnapshotMetadata>> {
    let sql = format!(
        "SELECT {METADATA_COLUMNS} FROM snapshot_metadata WHERE is_public = 1 AND gender = ?1 AND age_category = ?2 AND snapshot_date = ?3 ORDER BY id DESC LIMIT 1"
    );

    conn.query_row(&sql, params![gender, age_category, snapshot_date], parse_metadata_row)
        .optional()
        .context("Failed to query public snapshot by date")
}

/// Latest public snapshot of the pair taken on `day`
pub fn public_on_day(
    conn: &mut DbConn,
    gender: Gender,
    age_category: AgeCategory,
    day: NaiveDate,
) -> Result<Option<SnapshotMetadata>> {
    let sql = format!(
        "SELECT {METADATA_COLUMNS} FROM snapshot_metadata WHERE is_public = 1 AND gender = ?1 AND age_category = ?2 AND date(snapshot_date) = ?3 ORDER BY snapshot_date DESC, id DESC LIMIT 1"
    );

    conn.query_row(&sql, params![gender, age_category, day], parse_metadata_row)
        .optional()
        .context("Failed to query public snapshot by day")
}

/// Latest public snapshot of the pair strictly older than `before`
pub fn previous_public(
    conn: &mut DbConn,
    gender: Gender,
    age_category: AgeCategory,
    before: NaiveDateTime,
) -> Result<Option<SnapshotMetadata>> {
    let sql = format!(
        "SELECT {METADATA_COLUMNS} FROM snapshot_metadata WHERE is_public = 1 AND gender = ?1 AND age_category = ?2 AND snapshot_date < ?3 ORDER BY snapshot_date DESC, id DESC LIMIT 1"
    );

    conn.query_row(&sql, params![gender, age_category, before], parse_metadata_row)
        .optional()
        .context("Failed to query previous public snapshot")
}

/// Public snapshots, newest first, optionally narrowed to a gender or category
pub fn list_public(
    conn: &mut DbConn,
    gender: Option<Gender>,
    age_category: Option<AgeCategory>,
) -> Result<Vec<SnapshotMetadata>> {
    let sql = format!(
        "SELECT {METADATA_COLUMNS} FROM snapshot_metadata WHERE is_public = 1 AND (?1 IS NULL OR gender = ?1) AND (?2 IS NULL OR age_category = ?2) ORDER BY snapshot_date DESC, id DESC"
    );
    query_metadata(conn, &sql, params![gender, age_category])
}

/// Most recent public snapshot of every (gender, category) pair
pub fn latest_public_per_pair(conn: &mut DbConn) -> Result<Vec<SnapshotMetadata>> {
    let sql = format!(
        "SELECT {METADATA_COLUMNS} FROM snapshot_metadata m WHERE is_public = 1 AND id = (SELECT id FROM snapshot_metadata WHERE is_public = 1 AND gender = m.gender AND age_category = m.age_category ORDER BY snapshot_date DESC, id DESC LIMIT 1)"
    );
    query_metadata(conn, &sql, [])
}

/// All snapshots with their entry counts, newest first
pub fn list_summaries(conn: &mut DbConn) -> Result<Vec<SnapshotSummary>> {
    let sql = "SELECT m.id, m.snapshot_date, m.gender, m.age_category, m.name, m.is_public, m.description, (SELECT COUNT(*) FROM ranking_snapshots s WHERE s.metadata_id = m.id) FROM snapshot_metadata m ORDER BY m.snapshot_date DESC, m.id DESC";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(SnapshotSummary {
                metadata: parse_metadata_row(row)?,
                player_count: row.get(7)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Entries of one snapshot with player and club details, by rank
pub fn list_entries(conn: &mut DbConn, metadata_id: i64) -> Result<Vec<SnapshotEntryDetail>> {
    let sql = "SELECT s.metadata_id, s.rank_position, s.total_points, s.events_count, p.id, p.name, p.gender, p.club_id, c.name, p.birth_date, p.license_id FROM ranking_snapshots s JOIN players p ON p.id = s.player_id LEFT JOIN clubs c ON c.id = p.club_id WHERE s.metadata_id = ?1 ORDER BY s.rank_position, p.id";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![metadata_id], |row| {
            Ok(SnapshotEntryDetail {
                metadata_id: row.get(0)?,
                rank_position: row.get(1)?,
                total_points: row.get(2)?,
                events_count: row.get(3)?,
                player_id: row.get(4)?,
                player_name: row.get(5)?,
                gender: row.get(6)?,
                club_id: row.get(7)?,
                club_name: row.get(8)?,
                birth_date: row.get(9)?,
                license_id: row.get(10)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to load snapshot entries")?;

    Ok(rows)
}

/// A player's entries across public snapshots, oldest first
pub fn history_for_player(conn: &mut DbConn, player_id: i64) -> Result<Vec<HistoryRow>> {
    let sql = "SELECT m.snapshot_date, m.name, m.gender, m.age_category, s.rank_position, s.total_points, s.events_count FROM ranking_snapshots s JOIN snapshot_metadata m ON m.id = s.metadata_id WHERE s.player_id = ?1 AND m.is_public = 1 ORDER BY m.snapshot_date ASC, m.id ASC";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![player_id], |row| {
            Ok(HistoryRow {
                snapshot_date: row.get(0)?,
                name: row.get(1)?,
                gender: row.get(2)?,
                age_category: row.get(3)?,
                rank_position: row.get(4)?,
                total_points: row.get(5)?,
                events_count: row.get(6)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn rename(conn: &mut DbConn, id: i64, name: Option<&str>) -> AdminResult<SnapshotMetadata> {
    let name = name.map(str::trim).filter(|n| !n.is_empty());
    let sql = format!("UPDATE snapshot_metadata SET name = ?1 WHERE id = ?2 RETURNING {METADATA_COLUMNS}");

    conn.query_row(&sql, params![name, id], parse_metadata_row)
        .optional()
        .map_err(|e| classify_store_error(e, "", "snapshot"))?
        .ok_or_else(|| AdminError::NotFound(format!("snapshot {id}")))
}

pub fn set_visibility(conn: &mut DbConn, id: i64, is_public: bool) -> AdminResult<SnapshotMetadata> {
    let sql = format!("UPDATE snapshot_metadata SET is_public = ?1 WHERE id = ?2 RETURNING {METADATA_COLUMNS}");

    conn.query_row(&sql, params![is_public, id], parse_metadata_row)
        .optional()
        .map_err(|e| classify_store_error(e, "", "snapshot"))?
        .ok_or_else(|| AdminError::NotFound(format!("snapshot {id}")))
}

/// Deletes a snapshot together with its entries
pub fn delete(conn: &mut DbConn, id: i64) -> AdminResult<()> {
    let deleted = conn
        .execute("DELETE FROM snapshot_metadata WHERE id = ?1", params![id])
        .map_err(|e| classify_store_error(e, "", "snapshot"))?;

    if deleted == 0 {
        return Err(AdminError::NotFound(format!("snapshot {id}")));
    }
    Ok(())
}
