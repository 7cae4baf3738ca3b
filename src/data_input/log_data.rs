// src/data_input/log_data.rs

use std::collections::HashMap;

use crate::constants::{ALTITUDE_COLUMN_CANDIDATES, GPS_LATITUDE_COLUMN, GPS_LONGITUDE_COLUMN};
use crate::data_analysis::geodetic::Centroid;
use crate::types::{NumericSeries, TextSeries};

/// How a column came to be in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Source column whose values all parse as numbers.
    Numeric,
    /// Source column kept verbatim (dates, clock times, flight modes).
    Text,
    /// The combined "lat lon" GPS field, before splitting.
    StringCoordinate,
    /// Computed during import; never present in the raw file.
    Derived,
}

/// Row-aligned values of one column. `None` is a missing sample.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Numeric(NumericSeries),
    Text(TextSeries),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Numeric(values) => values.len(),
            ColumnValues::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of rows holding a value.
    pub fn valid_count(&self) -> usize {
        match self {
            ColumnValues::Numeric(values) => values.iter().filter(|v| v.is_some()).count(),
            ColumnValues::Text(values) => values.iter().filter(|v| v.is_some()).count(),
        }
    }

    /// Text rendering of one row, as written to a processed CSV.
    pub fn display_value(&self, row: usize) -> Option<String> {
        match self {
            ColumnValues::Numeric(values) => values.get(row).copied().flatten().map(|v| v.to_string()),
            ColumnValues::Text(values) => values.get(row).cloned().flatten(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: ColumnValues,
}

impl Column {
    pub fn numeric(name: &str, values: NumericSeries) -> Self {
        Self {
            name: name.to_string(),
            kind: ColumnKind::Numeric,
            values: ColumnValues::Numeric(values),
        }
    }

    pub fn text(name: &str, values: TextSeries) -> Self {
        Self {
            name: name.to_string(),
            kind: ColumnKind::Text,
            values: ColumnValues::Text(values),
        }
    }

    pub fn derived(name: &str, values: NumericSeries) -> Self {
        Self {
            name: name.to_string(),
            kind: ColumnKind::Derived,
            values: ColumnValues::Numeric(values),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match &self.values {
            ColumnValues::Numeric(values) => Some(values),
            ColumnValues::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&[Option<String>]> {
        match &self.values {
            ColumnValues::Text(values) => Some(values),
            ColumnValues::Numeric(_) => None,
        }
    }

    pub fn has_valid_values(&self) -> bool {
        self.values.valid_count() > 0
    }
}

/// The in-progress table owned by a single import call. Every pipeline stage works on it in
/// turn; it is frozen into a `LogDataset` once the last stage returns.
#[derive(Debug, Clone, Default)]
pub struct ColumnTable {
    columns: Vec<Column>,
    row_count: usize,
}

impl ColumnTable {
    pub fn new(row_count: usize) -> Self {
        Self {
            columns: Vec::new(),
            row_count,
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn numeric(&self, name: &str) -> Option<&[Option<f64>]> {
        self.column(name).and_then(Column::as_numeric)
    }

    /// Appends a column, or replaces an existing column of the same name in place.
    pub fn push(&mut self, column: Column) {
        assert_eq!(
            column.len(),
            self.row_count,
            "column '{}' has {} rows, table has {}",
            column.name,
            column.len(),
            self.row_count
        );
        match self.position(&column.name) {
            Some(index) => self.columns[index] = column,
            None => self.columns.push(column),
        }
    }

    /// Replaces the column at `index` with `replacements`, keeping their order.
    pub fn splice_at(&mut self, index: usize, replacements: Vec<Column>) {
        for column in &replacements {
            assert_eq!(column.len(), self.row_count, "column '{}' length mismatch", column.name);
        }
        // Stale copies of the replacement names (a re-imported processed file) are dropped.
        let mut target = index;
        let mut kept = Vec::with_capacity(self.columns.len());
        for (i, column) in std::mem::take(&mut self.columns).into_iter().enumerate() {
            if i != index && replacements.iter().any(|r| r.name == column.name) {
                if i < index {
                    target -= 1;
                }
                continue;
            }
            kept.push(column);
        }
        kept.splice(target..=target, replacements);
        self.columns = kept;
    }

    pub fn sort_by_name(&mut self) {
        self.columns.sort_by(|a, b| a.name.cmp(&b.name));
    }

    fn into_columns(self) -> Vec<Column> {
        self.columns
    }
}

/// Human-readable outcome of an import, listing what was found and generated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub notes: Vec<String>,
    pub dropped_columns: Vec<String>,
    pub malformed_coordinates: usize,
}

impl ImportReport {
    pub fn note(&mut self, message: impl Into<String>) {
        self.notes.push(message.into());
    }

    pub fn status_text(&self) -> String {
        self.notes.iter().map(|n| format!("{}\n", n)).collect()
    }
}

/// A fully imported, read-only telemetry log.
///
/// Built once by the import pipeline and never mutated afterwards; a re-import produces a
/// new value. Every column holds exactly `row_count` values.
#[derive(Debug, Clone)]
pub struct LogDataset {
    source_name: String,
    columns: Vec<Column>,
    index: HashMap<String, usize>,
    row_count: usize,
    time_base: Option<f64>,
    centroid: Option<Centroid>,
    has_gps: bool,
    altitude_column: Option<String>,
    report: ImportReport,
}

impl LogDataset {
    pub fn assemble(
        source_name: &str,
        table: ColumnTable,
        time_base: Option<f64>,
        centroid: Option<Centroid>,
        report: ImportReport,
    ) -> Self {
        let row_count = table.row_count();
        let columns = table.into_columns();
        debug_assert!(columns.iter().all(|c| c.len() == row_count));

        let index: HashMap<String, usize> =
            columns.iter().enumerate().map(|(i, c)| (c.name.clone(), i)).collect();

        let numeric = |name: &str| index.get(name).and_then(|&i| columns[i].as_numeric());
        // Same condition the projector needs: numeric columns with one complete pair.
        let has_gps = match (numeric(GPS_LATITUDE_COLUMN), numeric(GPS_LONGITUDE_COLUMN)) {
            (Some(lat), Some(lon)) => lat.iter().zip(lon).any(|(lat, lon)| lat.is_some() && lon.is_some()),
            _ => false,
        };
        let altitude_column = if has_gps {
            ALTITUDE_COLUMN_CANDIDATES
                .iter()
                .find(|name| {
                    index
                        .get(**name)
                        .map(|&i| columns[i].as_numeric().is_some() && columns[i].has_valid_values())
                        .unwrap_or(false)
                })
                .map(|name| name.to_string())
        } else {
            None
        };

        Self {
            source_name: source_name.to_string(),
            columns,
            index,
            row_count,
            time_base,
            centroid,
            has_gps,
            altitude_column,
            report,
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Timestamp of the first row in seconds, when the log carries time data.
    pub fn time_base(&self) -> Option<f64> {
        self.time_base
    }

    pub fn centroid(&self) -> Option<Centroid> {
        self.centroid
    }

    pub fn has_gps(&self) -> bool {
        self.has_gps
    }

    pub fn has_altitude(&self) -> bool {
        self.altitude_column.is_some()
    }

    pub fn altitude_column(&self) -> Option<&str> {
        self.altitude_column.as_deref()
    }

    pub fn report(&self) -> &ImportReport {
        &self.report
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.index.get(name).map(|&i| &self.columns[i])
    }

    pub fn numeric(&self, name: &str) -> Option<&[Option<f64>]> {
        self.column(name).and_then(Column::as_numeric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gps_table(lat: Vec<Option<f64>>, lon: Vec<Option<f64>>) -> ColumnTable {
        let mut table = ColumnTable::new(lat.len());
        table.push(Column::numeric(GPS_LATITUDE_COLUMN, lat));
        table.push(Column::numeric(GPS_LONGITUDE_COLUMN, lon));
        table
    }

    #[test]
    fn push_replaces_same_name_in_place() {
        let mut table = ColumnTable::new(2);
        table.push(Column::numeric("A", vec![Some(1.0), Some(2.0)]));
        table.push(Column::numeric("B", vec![Some(3.0), None]));
        table.push(Column::derived("A", vec![None, Some(9.0)]));
        assert_eq!(table.columns().len(), 2);
        assert_eq!(table.position("A"), Some(0));
        assert_eq!(table.numeric("A"), Some(&[None, Some(9.0)][..]));
    }

    #[test]
    #[should_panic(expected = "has 1 rows")]
    fn push_rejects_length_mismatch() {
        let mut table = ColumnTable::new(2);
        table.push(Column::numeric("A", vec![Some(1.0)]));
    }

    #[test]
    fn splice_keeps_position_of_replaced_column() {
        let mut table = ColumnTable::new(1);
        table.push(Column::text("Date", vec![Some("2025-01-01".into())]));
        table.push(Column::text("GPS", vec![Some("1 2".into())]));
        table.push(Column::numeric("RSSI", vec![Some(-70.0)]));
        table.splice_at(
            1,
            vec![
                Column::numeric(GPS_LATITUDE_COLUMN, vec![Some(1.0)]),
                Column::numeric(GPS_LONGITUDE_COLUMN, vec![Some(2.0)]),
            ],
        );
        let names: Vec<&str> = table.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Date", GPS_LATITUDE_COLUMN, GPS_LONGITUDE_COLUMN, "RSSI"]);
    }

    #[test]
    fn gps_flag_requires_both_columns_with_values() {
        let table = gps_table(vec![Some(45.0), None], vec![Some(-73.0), None]);
        let dataset = LogDataset::assemble("log.csv", table, None, None, ImportReport::default());
        assert!(dataset.has_gps());
        assert!(!dataset.has_altitude());

        let mut table = ColumnTable::new(1);
        table.push(Column::numeric(GPS_LATITUDE_COLUMN, vec![Some(45.0)]));
        let dataset = LogDataset::assemble("log.csv", table, None, None, ImportReport::default());
        assert!(!dataset.has_gps());
    }

    #[test]
    fn gps_flag_needs_numeric_columns_and_a_complete_pair() {
        let mut table = ColumnTable::new(2);
        table.push(Column::text(GPS_LATITUDE_COLUMN, vec![Some("45.5".into()), Some("north".into())]));
        table.push(Column::numeric(GPS_LONGITUDE_COLUMN, vec![Some(-73.6), Some(-73.7)]));
        let dataset = LogDataset::assemble("log.csv", table, None, None, ImportReport::default());
        assert!(!dataset.has_gps());

        let table = gps_table(vec![Some(45.0), None], vec![None, Some(-73.0)]);
        let dataset = LogDataset::assemble("log.csv", table, None, None, ImportReport::default());
        assert!(!dataset.has_gps());
    }

    #[test]
    fn altitude_flag_uses_first_candidate_with_data() {
        let mut table = gps_table(vec![Some(45.0)], vec![Some(-73.0)]);
        table.push(Column::numeric("GPS.Altitude", vec![Some(120.0)]));
        let dataset = LogDataset::assemble("log.csv", table, None, None, ImportReport::default());
        assert!(dataset.has_altitude());
        assert_eq!(dataset.altitude_column(), Some("GPS.Altitude"));
    }

    #[test]
    fn display_value_formats_numbers_and_gaps() {
        let values = ColumnValues::Numeric(vec![Some(30.0), None, Some(4.1)]);
        assert_eq!(values.display_value(0).as_deref(), Some("30"));
        assert_eq!(values.display_value(1), None);
        assert_eq!(values.display_value(2).as_deref(), Some("4.1"));
        assert_eq!(values.valid_count(), 2);
    }
}

// src/data_input/log_data.rs
