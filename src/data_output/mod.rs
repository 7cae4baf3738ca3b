// src/data_output/mod.rs

pub mod csv_export;
pub mod kml_export;

// src/data_output/mod.rs
