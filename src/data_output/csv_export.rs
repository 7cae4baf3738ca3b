// src/data_output/csv_export.rs

use csv::Writer;
use log::info;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::constants::PROCESSED_FILE_PREFIX;
use crate::data_input::log_data::LogDataset;
use crate::error::ExportError;

/// `logs/flight.csv` -> `logs/processed_flight.csv`.
pub fn default_export_path(source: &Path) -> PathBuf {
    let file_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "log.csv".to_string());
    source.with_file_name(format!("{}{}", PROCESSED_FILE_PREFIX, file_name))
}

/// Writes every column of `dataset`, derived ones included. Missing samples become empty fields.
pub fn write_processed_csv<W: Write>(dataset: &LogDataset, output: W) -> Result<W, ExportError> {
    let mut writer = Writer::from_writer(output);
    writer.write_record(dataset.column_names())?;

    let columns = dataset.columns();
    for row in 0..dataset.row_count() {
        let record: Vec<String> = columns
            .iter()
            .map(|column| column.values.display_value(row).unwrap_or_default())
            .collect();
        writer.write_record(&record)?;
    }

    writer.flush()?;
    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

pub fn export_processed_csv(dataset: &LogDataset, path: &Path) -> Result<PathBuf, ExportError> {
    let file = std::fs::File::create(path)?;
    write_processed_csv(dataset, file)?;
    info!("Processed data saved: {}", path.display());
    Ok(path.to_path_buf())
}


// src/data_output/csv_export.rs
