// src/error.rs

use thiserror::Error;

/// Fatal import failures. No dataset is produced when one of these is returned.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("I/O error reading log: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error reading log: {0}")]
    Csv(#[from] csv::Error),
    #[error("empty dataset: {reason}")]
    EmptyDataset { reason: String },
}

/// A single combined GPS field that could not be split. Recovered as a missing value for
/// that row only.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordinateError {
    #[error("malformed coordinate '{raw}': {reason}")]
    MalformedCoordinate { raw: String, reason: String },
}

impl CoordinateError {
    pub fn malformed(raw: &str, reason: impl Into<String>) -> Self {
        CoordinateError::MalformedCoordinate {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }
}

/// A derivation rule whose source columns are absent. Not a failure: the rule is skipped.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("rule '{rule}' skipped, missing input: {}", .missing.join(", "))]
pub struct MissingDerivationInput {
    pub rule: &'static str,
    pub missing: Vec<String>,
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error writing export: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error writing export: {0}")]
    Csv(#[from] csv::Error),
    #[error("XML error writing KML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("no valid GPS data found for KML creation")]
    NoGpsData,
}

// src/error.rs
