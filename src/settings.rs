// src/settings.rs

use std::path::Path;

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use serde::Deserialize;

use crate::constants::{DEFAULT_MISSING_HOUR_PREFIX, GPS_COMBINED_COLUMN};

/// Knobs for a single import.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Name of the combined "lat lon" column.
    pub gps_column: String,
    /// Sort columns alphabetically after import.
    pub sort_columns: bool,
    /// Prefix added to clock times that lost their hour field.
    pub missing_hour_prefix: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            gps_column: GPS_COMBINED_COLUMN.to_string(),
            sort_columns: false,
            missing_hour_prefix: DEFAULT_MISSING_HOUR_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    pub debug: bool,
    pub log_file: Option<String>,
}

/// Program settings, read from an optional TOML file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub import: ImportOptions,
}

impl Settings {
    pub fn new(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut s = ConfigBuilder::<DefaultState>::default();
        if let Some(path) = path {
            s = s.add_source(File::from(path).format(FileFormat::Toml));
        }

        let config = s.build()?;

        config.try_deserialize()
    }
}
