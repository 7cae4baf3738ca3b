// src/data_input/mod.rs

pub mod log_data;
pub mod log_parser;
pub mod schema;

// src/data_input/mod.rs
