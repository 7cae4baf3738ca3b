// src/data_input/log_parser.rs

use csv::ReaderBuilder;
use log::{debug, info, warn};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::constants::{
    CURRENT_COLUMN, DATE_COLUMN, GPS_COMBINED_COLUMN, GPS_LATITUDE_COLUMN, GPS_LONGITUDE_COLUMN,
    TIME_COLUMN, VFAS_COLUMN,
};
use crate::error::ImportError;

/// Header and data rows exactly as read from the log, one `String` per cell.
///
/// Every row has the same width as `headers`: short rows are padded with empty cells and
/// overlong rows are truncated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Reads an Ethos CSV log from disk.
pub fn parse_log_file(input_file_path: &Path) -> Result<RawTable, ImportError> {
    let file = File::open(input_file_path)?;
    parse_log_reader(file)
}

/// Reads an Ethos CSV log from any byte source.
///
/// Rows the CSV reader cannot decode are skipped with a warning rather than failing the import.
pub fn parse_log_reader<R: Read>(reader: R) -> Result<RawTable, ImportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let header_record = reader.headers()?.clone();
    let headers = deduplicate_headers(header_record.iter().map(|h| h.trim_matches('"')));
    debug!("Headers found in CSV: {:?}", headers);
    log_header_mapping(&headers);

    let width = headers.len();
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut skipped = 0usize;

    for (row_index, result) in reader.records().enumerate() {
        match result {
            Ok(record) => {
                let mut row: Vec<String> = record.iter().take(width).map(|s| s.to_string()).collect();
                if record.len() != width {
                    debug!("Row {} has {} fields, expected {}", row_index + 1, record.len(), width);
                }
                row.resize(width, String::new());
                rows.push(row);
            }
            Err(e) => {
                warn!("Skipping row {} due to CSV read error: {}", row_index + 1, e);
                skipped += 1;
            }
        }
    }

    info!("Finished reading {} data rows ({} skipped).", rows.len(), skipped);
    Ok(RawTable { headers, rows })
}

/// Renames repeated header names to `name.1`, `name.2`, ... so every column is addressable.
fn deduplicate_headers<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for name in names {
        let mut candidate = name.to_string();
        let mut suffix = 1;
        while headers.contains(&candidate) {
            candidate = format!("{}.{}", name, suffix);
            suffix += 1;
        }
        headers.push(candidate);
    }
    headers
}

fn log_header_mapping(headers: &[String]) {
    let status = |name: &str| {
        if headers.iter().any(|h| h == name) {
            "Found"
        } else {
            "Not Found"
        }
    };
    info!("Header mapping status:");
    info!("  '{}': {} (Elapsed time axis)", TIME_COLUMN, status(TIME_COLUMN));
    info!("  '{}': {} (Optional, absolute timestamps)", DATE_COLUMN, status(DATE_COLUMN));
    if headers.iter().any(|h| h == GPS_LATITUDE_COLUMN) {
        info!(
            "  '{}'/'{}': Found (previously processed log)",
            GPS_LATITUDE_COLUMN, GPS_LONGITUDE_COLUMN
        );
    } else {
        info!("  '{}': {} (GPS track and projection)", GPS_COMBINED_COLUMN, status(GPS_COMBINED_COLUMN));
    }
    info!("  '{}': {} (Power)", VFAS_COLUMN, status(VFAS_COLUMN));
    info!("  '{}': {} (Power)", CURRENT_COLUMN, status(CURRENT_COLUMN));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_header_and_rows() {
        let csv = "Date,Time,RSSI(dB)\n2025-05-10,14:00:00.000,-60\n2025-05-10,14:00:00.500,-61\n";
        let raw = parse_log_reader(csv.as_bytes()).unwrap();
        assert_eq!(raw.headers, vec!["Date", "Time", "RSSI(dB)"]);
        assert_eq!(raw.row_count(), 2);
        assert_eq!(raw.rows[1][2], "-61");
    }

    #[test]
    fn quoted_gps_field_stays_in_one_cell() {
        let csv = "Time,GPS,Alt(m)\n12:00:00.0,\"45.5,-73.6\",10\n";
        let raw = parse_log_reader(csv.as_bytes()).unwrap();
        assert_eq!(raw.rows[0], vec!["12:00:00.0", "45.5,-73.6", "10"]);
    }

    #[test]
    fn ragged_rows_are_padded_and_truncated() {
        let csv = "A,B,C\n1,2\n1,2,3,4\n";
        let raw = parse_log_reader(csv.as_bytes()).unwrap();
        assert_eq!(raw.rows[0], vec!["1", "2", ""]);
        assert_eq!(raw.rows[1], vec!["1", "2", "3"]);
    }

    #[test]
    fn duplicate_headers_get_numeric_suffix() {
        let csv = "Curr(A),Curr(A),Curr(A)\n1,2,3\n";
        let raw = parse_log_reader(csv.as_bytes()).unwrap();
        assert_eq!(raw.headers, vec!["Curr(A)", "Curr(A).1", "Curr(A).2"]);
    }

    #[test]
    fn header_only_file_has_no_rows() {
        let raw = parse_log_reader("A,B\n".as_bytes()).unwrap();
        assert_eq!(raw.row_count(), 0);
    }
}

// src/data_input/log_parser.rs
