// src/log_import.rs

use log::info;
use std::io::Read;
use std::path::Path;

use crate::data_analysis::derived_series::{default_rules, synthesize};
use crate::data_analysis::geodetic::project_gps_columns;
use crate::data_analysis::gps_split::split_gps_column;
use crate::data_input::log_data::{ImportReport, LogDataset};
use crate::data_input::log_parser::{parse_log_file, parse_log_reader, RawTable};
use crate::data_input::schema::normalize_columns;
use crate::settings::ImportOptions;
use crate::types::LogImportResult;

/// Imports one Ethos log file into a new dataset.
pub fn import_log_file(path: &Path, options: &ImportOptions) -> LogImportResult {
    info!("Importing '{}'", path.display());
    let raw = parse_log_file(path)?;
    let source_name = path.to_string_lossy();
    build_dataset(&source_name, &raw, options)
}

/// Imports a log from any byte source; `source_name` is recorded on the dataset.
pub fn import_log_reader<R: Read>(source_name: &str, reader: R, options: &ImportOptions) -> LogImportResult {
    let raw = parse_log_reader(reader)?;
    build_dataset(source_name, &raw, options)
}

/// Runs the pipeline stages in order: normalize, split GPS, project, derive, assemble.
pub fn build_dataset(source_name: &str, raw: &RawTable, options: &ImportOptions) -> LogImportResult {
    let mut report = ImportReport::default();

    let (mut table, dropped) = normalize_columns(raw, options)?;
    report.dropped_columns = dropped;

    if let Some(split) = split_gps_column(&mut table, &options.gps_column) {
        report.malformed_coordinates = split.malformed_rows;
    }

    let centroid = project_gps_columns(&mut table);
    if centroid.is_some() {
        report.note("Contains GPS data.");
    } else {
        report.note("No GPS data found.");
    }

    let synthesis = synthesize(&mut table, &default_rules(options));
    if synthesis.time_base.is_none() {
        report.note("No time data found.");
    }
    for column in &synthesis.generated {
        report.note(format!("Generated '{}' data.", column));
    }

    if options.sort_columns {
        table.sort_by_name();
    }

    let dataset = LogDataset::assemble(source_name, table, synthesis.time_base, centroid, report);
    info!(
        "'{}' imported: {} rows, {} columns",
        source_name,
        dataset.row_count(),
        dataset.columns().len()
    );
    Ok(dataset)
}

// src/log_import.rs
