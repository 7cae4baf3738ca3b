// src/data_input/schema.rs

use log::{info, warn};

use crate::constants::MISSING_VALUE_TOKENS;
use crate::data_input::log_data::{Column, ColumnKind, ColumnTable, ColumnValues};
use crate::data_input::log_parser::RawTable;
use crate::error::ImportError;
use crate::settings::ImportOptions;

/// True for empty cells and the usual "no value" spellings.
pub fn is_missing(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || MISSING_VALUE_TOKENS.contains(&trimmed)
}

/// Parses a cell as a number; missing cells and non-numbers give `None`.
pub fn parse_numeric(value: &str) -> Option<f64> {
    if is_missing(value) {
        return None;
    }
    value.trim().parse::<f64>().ok()
}

/// Converts raw rows into typed columns.
///
/// Columns without a single valid value are dropped. A column is numeric when more than half
/// of its present values parse as numbers; the cells that do not parse become missing for
/// that row only. Other columns are kept as text. The combined GPS column is always kept as
/// text for the splitter. Returns the table and the names of dropped columns.
pub fn normalize_columns(
    raw: &RawTable,
    options: &ImportOptions,
) -> Result<(ColumnTable, Vec<String>), ImportError> {
    if raw.rows.is_empty() {
        return Err(ImportError::EmptyDataset {
            reason: "log contains no data rows".to_string(),
        });
    }

    let mut table = ColumnTable::new(raw.row_count());
    let mut dropped: Vec<String> = Vec::new();

    for (col_index, name) in raw.headers.iter().enumerate() {
        let cells: Vec<Option<&str>> = raw
            .rows
            .iter()
            .map(|row| row.get(col_index).map(|s| s.trim()).filter(|s| !is_missing(s)))
            .collect();

        if cells.iter().all(Option::is_none) {
            dropped.push(name.clone());
            continue;
        }

        let present = cells.iter().flatten().count();
        let parsed = cells.iter().flatten().filter(|v| v.parse::<f64>().is_ok()).count();
        let is_numeric = parsed * 2 > present;
        let column = if *name == options.gps_column {
            Column {
                name: name.clone(),
                kind: ColumnKind::StringCoordinate,
                values: ColumnValues::Text(cells.iter().map(|c| c.map(str::to_string)).collect()),
            }
        } else if is_numeric {
            if parsed < present {
                warn!(
                    "'{}': {} non-numeric values treated as missing",
                    name,
                    present - parsed
                );
            }
            Column::numeric(name, cells.iter().map(|c| c.and_then(|v| v.parse::<f64>().ok())).collect())
        } else {
            Column::text(name, cells.iter().map(|c| c.map(str::to_string)).collect())
        };
        table.push(column);
    }

    if !dropped.is_empty() {
        info!("Dropped {} empty columns: {:?}", dropped.len(), dropped);
    }

    if table.is_empty() {
        return Err(ImportError::EmptyDataset {
            reason: format!("all {} columns are empty", raw.headers.len()),
        });
    }

    Ok((table, dropped))
}


// src/data_input/schema.rs
