// src/data_analysis/mod.rs

pub mod column_stats;
pub mod derived_series;
pub mod geodetic;
pub mod gps_split;

// src/data_analysis/mod.rs
