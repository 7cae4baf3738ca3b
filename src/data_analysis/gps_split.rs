// src/data_analysis/gps_split.rs

use log::{debug, info, warn};

use crate::constants::{GPS_LATITUDE_COLUMN, GPS_LONGITUDE_COLUMN, MALFORMED_GPS_WARNING_LIMIT};
use crate::data_input::log_data::{Column, ColumnTable};
use crate::error::CoordinateError;
use crate::types::LatLon;

/// Outcome of splitting the combined GPS column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitSummary {
    pub valid_rows: usize,
    pub missing_rows: usize,
    pub malformed_rows: usize,
}

/// Parses one combined GPS field.
///
/// Ethos writes `"<lat> <lon>"`; `"<lat>,<lon>"` (with or without spaces) is accepted too.
pub fn parse_combined_coordinate(raw: &str) -> Result<LatLon, CoordinateError> {
    let parts: Vec<&str> = raw
        .trim()
        .trim_matches('"')
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();

    if parts.len() != 2 {
        return Err(CoordinateError::malformed(
            raw,
            format!("expected latitude and longitude, found {} values", parts.len()),
        ));
    }

    let latitude = parse_degrees(raw, parts[0], "latitude", 90.0)?;
    let longitude = parse_degrees(raw, parts[1], "longitude", 180.0)?;
    Ok((latitude, longitude))
}

fn parse_degrees(raw: &str, token: &str, what: &str, limit: f64) -> Result<f64, CoordinateError> {
    let value = token
        .parse::<f64>()
        .map_err(|_| CoordinateError::malformed(raw, format!("{} '{}' is not a number", what, token)))?;
    if !value.is_finite() || value.abs() > limit {
        return Err(CoordinateError::malformed(
            raw,
            format!("{} {} outside ±{}", what, value, limit),
        ));
    }
    Ok(value)
}

/// Replaces the combined GPS column with `GPS.Latitude` and `GPS.Longitude` at the same
/// position. Rows that fail to parse are left missing. Returns `None` when the column is absent.
pub fn split_gps_column(table: &mut ColumnTable, gps_column: &str) -> Option<SplitSummary> {
    let index = table.position(gps_column)?;
    let raw_values = table.columns()[index].as_text()?;

    let mut summary = SplitSummary {
        valid_rows: 0,
        missing_rows: 0,
        malformed_rows: 0,
    };
    let mut latitudes = Vec::with_capacity(raw_values.len());
    let mut longitudes = Vec::with_capacity(raw_values.len());

    for (row_index, value) in raw_values.iter().enumerate() {
        let parsed = match value.as_deref() {
            None => {
                summary.missing_rows += 1;
                None
            }
            Some(text) => match parse_combined_coordinate(text) {
                Ok(pair) => {
                    summary.valid_rows += 1;
                    Some(pair)
                }
                Err(e) => {
                    if summary.malformed_rows < MALFORMED_GPS_WARNING_LIMIT {
                        warn!("Row {}: {}", row_index + 1, e);
                    } else {
                        debug!("Row {}: {}", row_index + 1, e);
                    }
                    summary.malformed_rows += 1;
                    None
                }
            },
        };
        latitudes.push(parsed.map(|(lat, _)| lat));
        longitudes.push(parsed.map(|(_, lon)| lon));
    }

    if summary.malformed_rows > 1 {
        warn!("{} rows have malformed '{}' values", summary.malformed_rows, gps_column);
    }
    info!(
        "Split '{}' into {}/{}: {} valid, {} missing, {} malformed",
        gps_column,
        GPS_LATITUDE_COLUMN,
        GPS_LONGITUDE_COLUMN,
        summary.valid_rows,
        summary.missing_rows,
        summary.malformed_rows
    );

    table.splice_at(
        index,
        vec![
            Column::numeric(GPS_LATITUDE_COLUMN, latitudes),
            Column::numeric(GPS_LONGITUDE_COLUMN, longitudes),
        ],
    );
    Some(summary)
}


// src/data_analysis/gps_split.rs
