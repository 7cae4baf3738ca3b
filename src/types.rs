// src/types.rs
// Type aliases shared by the import pipeline and the exporters

use crate::data_input::log_data::LogDataset;
use crate::error::ImportError;

// One value per row; `None` marks a missing or unparseable sample.
pub type NumericSeries = Vec<Option<f64>>;
pub type TextSeries = Vec<Option<String>>;

// Geodetic pair as (latitude, longitude) in degrees.
pub type LatLon = (f64, f64);

// Planar offset as (east, north) in meters.
pub type PlanarOffset = (f64, f64);

pub type LogImportResult = Result<LogDataset, ImportError>;
