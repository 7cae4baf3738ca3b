// src/main.rs

#![allow(non_snake_case)]

use clap::Parser;
use log::{info, warn};
use simplelog::{ColorChoice, CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, TerminalMode, WriteLogger};
use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

use Ethos_CSV_Analyzer::data_analysis::column_stats::{gps_track_stats, summarize};
use Ethos_CSV_Analyzer::data_output::csv_export::{default_export_path, export_processed_csv};
use Ethos_CSV_Analyzer::data_output::kml_export::{create_kml_file, default_kml_path};
use Ethos_CSV_Analyzer::session::LogSession;
use Ethos_CSV_Analyzer::settings::{GeneralSettings, Settings};

#[derive(Parser, Debug)]
#[command(name = "Ethos_CSV_Analyzer", version = Ethos_CSV_Analyzer::crate_version(), about)]
struct Cli {
    /// Ethos telemetry log (.csv)
    input: PathBuf,

    /// Write the GPS track as KML, next to the log unless a path is given
    #[arg(long, num_args = 0..=1, value_name = "PATH")]
    kml: Option<Option<PathBuf>>,

    /// Write the processed table as CSV, `processed_<log>` unless a path is given
    #[arg(long, num_args = 0..=1, value_name = "PATH")]
    export: Option<Option<PathBuf>>,

    /// TOML settings file
    #[arg(short, long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Sort columns alphabetically
    #[arg(long)]
    sort_columns: bool,

    /// Log at debug level
    #[arg(long)]
    debug: bool,
}

fn initialize_logger(general: &GeneralSettings) -> Result<(), Box<dyn Error>> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();

    let log_level = if general.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    loggers.push(TermLogger::new(
        log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ));

    if let Some(log_file) = &general.log_file {
        match File::create(log_file) {
            Ok(file) => loggers.push(WriteLogger::new(log_level, Config::default(), file)),
            Err(e) => eprintln!("Warning: Unable to create log file '{}': {}", log_file, e),
        }
    }

    CombinedLogger::init(loggers)?;

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let mut settings = Settings::new(cli.settings.as_deref())?;
    settings.general.debug |= cli.debug;
    settings.import.sort_columns |= cli.sort_columns;

    initialize_logger(&settings.general)?;
    info!("Ethos_CSV_Analyzer {}", Ethos_CSV_Analyzer::crate_version());

    let mut session = LogSession::new(settings.import.clone());
    let dataset = session.import(&cli.input)?;

    println!("\n--- Import Status ---");
    print!("{}", dataset.report().status_text());
    if !dataset.report().dropped_columns.is_empty() {
        println!("Dropped empty columns: {}", dataset.report().dropped_columns.join(", "));
    }
    if dataset.report().malformed_coordinates > 0 {
        println!(
            "Malformed GPS values treated as missing: {}",
            dataset.report().malformed_coordinates
        );
    }
    if let Some(base) = dataset.time_base() {
        println!("Time base: {:.3} s", base);
    }

    println!("\n--- Columns ({} rows) ---", dataset.row_count());
    for column in dataset.columns() {
        match column.as_numeric().and_then(summarize) {
            Some(summary) => println!(
                "  {:<24} {:?}: {} values, min {:.3}, max {:.3}, mean {:.3}",
                column.name, column.kind, summary.count, summary.min, summary.max, summary.mean
            ),
            None => println!(
                "  {:<24} {:?}: {} values",
                column.name,
                column.kind,
                column.values.valid_count()
            ),
        }
    }

    if let Some(track) = gps_track_stats(&dataset) {
        println!("\n--- GPS Track ---");
        println!("  Points: {}", track.points);
        println!("  Latitude: {:.6} .. {:.6}", track.latitude.0, track.latitude.1);
        println!("  Longitude: {:.6} .. {:.6}", track.longitude.0, track.longitude.1);
        println!("  Center: {:.6}, {:.6} (zoom {})", track.center.0, track.center.1, track.zoom);
        if let Some(altitude) = dataset.altitude_column() {
            println!("  Altitude column: {}", altitude);
        }
    }

    if let Some(kml) = &cli.kml {
        let path = kml.clone().unwrap_or_else(|| default_kml_path(&cli.input));
        match create_kml_file(&dataset, &path) {
            Ok(path) => println!("\nKML file saved as '{}'.", path.display()),
            Err(e) => warn!("Skipping KML export: {}", e),
        }
    }

    if let Some(export) = &cli.export {
        let path = export.clone().unwrap_or_else(|| default_export_path(&cli.input));
        let path = export_processed_csv(&dataset, &path)?;
        println!("Processed data saved as '{}'.", path.display());
    }

    Ok(())
}

// src/main.rs
