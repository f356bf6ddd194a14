use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use ::csv::{QuoteStyle, ReaderBuilder, WriterBuilder};

use crate::database::{self, DbConn, SnapshotEntryDetail};
use crate::domain::Gender;
use crate::errors::{AdminError, AdminResult};

pub const HEADER: [&str; 8] = [
    "Helyezés",
    "Engedélyszám",
    "Név",
    "Egyesület",
    "Nem",
    "Születési dátum",
    "Pontszám",
    "Versenyek száma",
];

const BIRTH_DATE_FORMAT: &str = "%Y. %m. %d.";
const DELIMITER: u8 = b';';

/// One line of an exported ranking
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRow {
    pub rank: i32,
    pub license_id: Option<String>,
    pub name: String,
    pub club: Option<String>,
    pub gender: Gender,
    pub birth_date: Option<NaiveDate>,
    pub total_points: i32,
    pub events_count: i32,
}

/// Spreadsheet export of one snapshot, empty when it has no entries
pub fn snapshot_csv(conn: &mut DbConn, metadata_id: i64) -> AdminResult<String> {
    if database::snapshots::find_metadata(conn, metadata_id)?.is_none() {
        return Err(AdminError::NotFound(format!("snapshot {metadata_id}")));
    }

    let entries = database::snapshots::list_entries(conn, metadata_id)?;
    if entries.is_empty() {
        return Ok(String::new());
    }
    Ok(render(&entries)?)
}

pub fn render(entries: &[SnapshotEntryDetail]) -> Result<String> {
    // Header cells go out bare, data cells are always quoted
    let mut header = HEADER.join(";").into_bytes();
    header.push(b'\n');

    let mut writer = WriterBuilder::new()
        .delimiter(DELIMITER)
        .quote_style(QuoteStyle::Always)
        .from_writer(header);

    for entry in entries {
        let birth_date = entry
            .birth_date
            .map(|d| d.format(BIRTH_DATE_FORMAT).to_string())
            .unwrap_or_default();

        writer.write_record([
            entry.rank_position.to_string(),
            entry.license_id.clone().unwrap_or_default(),
            entry.player_name.clone(),
            entry.club_name.clone().unwrap_or_default(),
            entry.gender.localized().to_string(),
            birth_date,
            entry.total_points.to_string(),
            entry.events_count.to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV writer: {e}"))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

fn optional(value: &str) -> Option<String> {
    Some(value.trim()).filter(|v| !v.is_empty()).map(str::to_string)
}

fn parse_gender(label: &str) -> Result<Gender> {
    match label {
        "Férfi" => Ok(Gender::Male),
        "Nő" => Ok(Gender::Female),
        other => other.parse().map_err(|e| anyhow!("{e}")),
    }
}

/// Reads an exported ranking back
pub fn parse_snapshot_csv(text: &str) -> Result<Vec<CsvRow>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read CSV row {}", line + 1))?;
        let field = |i: usize| record.get(i).unwrap_or_default();

        let birth_date = match optional(field(5)) {
            Some(raw) => Some(
                NaiveDate::parse_from_str(&raw, BIRTH_DATE_FORMAT)
                    .with_context(|| format!("Invalid birth date '{raw}' in row {}", line + 1))?,
            ),
            None => None,
        };

        rows.push(CsvRow {
            rank: field(0).parse().context("Invalid rank")?,
            license_id: optional(field(1)),
            name: field(2).to_string(),
            club: optional(field(3)),
            gender: parse_gender(field(4))?,
            birth_date,
            total_points: field(6).parse().context("Invalid total points")?,
            events_count: field(7).parse().context("Invalid events count")?,
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::database::test_support::{memory_conn, seed_club, seed_player};
    use crate::database::{NewSnapshot, NewSnapshotEntry};
    use crate::domain::AgeCategory;

    fn entry(rank_position: i32, name: &str, gender: Gender, birth_date: Option<NaiveDate>) -> SnapshotEntryDetail {
        SnapshotEntryDetail {
            metadata_id: 1,
            rank_position,
            total_points: 2000 - rank_position * 100,
            events_count: 6,
            player_id: rank_position as i64,
            player_name: name.to_string(),
            gender,
            club_id: None,
            club_name: Some("Szentesi TE".to_string()),
            birth_date,
            license_id: Some(format!("L-{rank_position}")),
        }
    }

    #[test]
    fn test_header_is_bare_and_data_cells_are_quoted() {
        let text = render(&[entry(1, "Kiss Anna", Gender::Female, NaiveDate::from_ymd_opt(2011, 4, 2))]).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(
            lines[0],
            "Helyezés;Engedélyszám;Név;Egyesület;Nem;Születési dátum;Pontszám;Versenyek száma"
        );
        assert_eq!(
            lines[1],
            "\"1\";\"L-1\";\"Kiss Anna\";\"Szentesi TE\";\"Nő\";\"2011. 04. 02.\";\"1900\";\"6\""
        );
    }

    #[test]
    fn test_round_trip_preserves_rank_order_and_totals() {
        let entries = vec![
            entry(1, "Kiss \"Kicsi\" Anna", Gender::Female, None),
            entry(2, "Nagy; Bence", Gender::Male, NaiveDate::from_ymd_opt(2009, 12, 31)),
        ];

        let rows = parse_snapshot_csv(&render(&entries).unwrap()).unwrap();

        let parsed: Vec<_> = rows.iter().map(|r| (r.rank, r.name.as_str(), r.total_points)).collect();
        assert_eq!(
            parsed,
            vec![(1, "Kiss \"Kicsi\" Anna", 1900), (2, "Nagy; Bence", 1800)]
        );
        assert_eq!(rows[0].birth_date, None);
        assert_eq!(rows[1].gender, Gender::Male);
        assert_eq!(rows[1].birth_date, NaiveDate::from_ymd_opt(2009, 12, 31));
    }

    #[test]
    fn test_snapshot_export_reads_store() {
        let mut conn = memory_conn();
        let club = seed_club(&mut conn, "BVSC");
        let player = seed_player(&mut conn, "Kiss Anna", "Female", Some(club), Some("2011-04-02"));
        let header = NewSnapshot {
            snapshot_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap().and_hms_opt(9, 0, 0).unwrap(),
            gender: Gender::Female,
            age_category: AgeCategory::U15,
            name: None,
            description: None,
        };
        let entries = [NewSnapshotEntry {
            player_id: player,
            rank_position: 1,
            total_points: 640,
            events_count: 3,
        }];
        let empty = database::snapshots::insert_snapshot(&mut conn, &header, &[]).unwrap();
        let filled = database::snapshots::insert_snapshot(&mut conn, &header, &entries).unwrap();

        assert_eq!(snapshot_csv(&mut conn, empty.id).unwrap(), "");
        let rows = parse_snapshot_csv(&snapshot_csv(&mut conn, filled.id).unwrap()).unwrap();
        assert_eq!(rows[0].club.as_deref(), Some("BVSC"));
        assert_eq!(rows[0].total_points, 640);
        assert!(matches!(snapshot_csv(&mut conn, 77).unwrap_err(), AdminError::NotFound(_)));
    }
}
