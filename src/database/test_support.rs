use rusqlite::params;

use super::connection::{DbConn, create_memory_pool, get_connection};
use super::setup::ensure_schema;

/// Connection to a fresh in-memory database with the schema applied
pub fn memory_conn() -> DbConn {
    let pool = create_memory_pool().unwrap();
    let mut conn = get_connection(&pool).unwrap();
    ensure_schema(&mut conn).unwrap();
    conn
}

pub fn seed_club(conn: &mut DbConn, name: &str) -> i64 {
    conn.query_row(
        "INSERT INTO clubs (name) VALUES (?1) RETURNING id",
        params![name],
        |row| row.get(0),
    )
    .unwrap()
}

pub fn seed_player(
    conn: &mut DbConn,
    name: &str,
    gender: &str,
    club_id: Option<i64>,
    birth_date: Option<&str>,
) -> i64 {
    conn.query_row(
        "INSERT INTO players (name, gender, club_id, birth_date) VALUES (?1, ?2, ?3, ?4) RETURNING id",
        params![name, gender, club_id, birth_date],
        |row| row.get(0),
    )
    .unwrap()
}

/// Event offering every category, open to both genders
pub fn seed_event(
    conn: &mut DbConn,
    name: &str,
    event_type: &str,
    age_category: &str,
    date: &str,
    validity_date: &str,
) -> i64 {
    conn.query_row(
        "INSERT INTO events (name, event_type, date, validity_date, age_category, has_singles, has_doubles, has_mixed, has_team) VALUES (?1, ?2, ?3, ?4, ?5, 1, 1, 1, 1) RETURNING id",
        params![name, event_type, date, validity_date, age_category],
        |row| row.get(0),
    )
    .unwrap()
}

pub fn seed_result(
    conn: &mut DbConn,
    event_id: i64,
    player_id: i64,
    category: &str,
    position: &str,
    points: i32,
) -> i64 {
    conn.query_row(
        "INSERT INTO results (event_id, player_id, category, position, points) VALUES (?1, ?2, ?3, ?4, ?5) RETURNING id",
        params![event_id, player_id, category, position, points],
        |row| row.get(0),
    )
    .unwrap()
}
