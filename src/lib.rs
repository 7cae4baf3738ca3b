// src/lib.rs - Library interface for the import pipeline and exporters

#![allow(non_snake_case)]

pub mod constants;
pub mod data_analysis;
pub mod data_input;
pub mod data_output;
pub mod error;
pub mod log_import;
pub mod session;
pub mod settings;
pub mod types;

// Expose crate version derived from vergen-generated env vars at compile time.
pub fn crate_version() -> &'static str {
    option_env!("VERGEN_GIT_SEMVER").unwrap_or(env!("CARGO_PKG_VERSION"))
}

// src/lib.rs
