pub mod csv;

pub use self::csv::{CsvRow, parse_snapshot_csv, snapshot_csv};
