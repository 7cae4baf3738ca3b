// tests/import_pipeline_test.rs

use std::io::Write;
use std::path::Path;

use Ethos_CSV_Analyzer::data_input::log_data::{ColumnKind, LogDataset};
use Ethos_CSV_Analyzer::error::ImportError;
use Ethos_CSV_Analyzer::log_import::{import_log_file, import_log_reader};
use Ethos_CSV_Analyzer::session::LogSession;
use Ethos_CSV_Analyzer::settings::ImportOptions;

const FLIGHT_LOG: &str = "\
Date,Time,GPS,GPS alt(m),LiPo1(V),LiPo2(V),VFAS(V),Current(A),Empty
2024-05-01,10:15:00.0,45.5000 -73.6000,100,4.1,4.0,8.1,2.0,
2024-05-01,10:15:00.5,45.5010 -73.6010,105,4.1,,8.0,2.5,
2024-05-01,10:15:01.2,garbage,110,4.0,4.0,8.0,3.0,
";

fn import(csv: &str) -> LogDataset {
    import_log_reader("flight.csv", csv.as_bytes(), &ImportOptions::default()).expect("import failed")
}

fn assert_close(actual: &[Option<f64>], expected: &[Option<f64>], tolerance: f64) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        match (a, e) {
            (Some(a), Some(e)) => assert!((a - e).abs() < tolerance, "{} != {}", a, e),
            (None, None) => {}
            _ => panic!("{:?} != {:?}", actual, expected),
        }
    }
}

#[test]
fn full_log_produces_all_derived_series() {
    let dataset = import(FLIGHT_LOG);

    assert_eq!(dataset.row_count(), 3);
    assert!(dataset.columns().iter().all(|c| c.len() == dataset.row_count()));
    assert!(!dataset.contains("Empty"));
    assert!(!dataset.contains("GPS"));
    assert_eq!(dataset.report().dropped_columns, vec!["Empty"]);

    assert!(dataset.has_gps());
    assert!(dataset.has_altitude());
    assert_eq!(dataset.altitude_column(), Some("GPS alt(m)"));

    assert_close(dataset.numeric("ElapsedTime").unwrap(), &[Some(0.0), Some(0.5), Some(1.2)], 1e-6);
    assert_close(dataset.numeric("LiPo Total(V)").unwrap(), &[Some(8.1), None, Some(8.0)], 1e-9);
    assert_close(dataset.numeric("Power(W)").unwrap(), &[Some(16.2), Some(20.0), Some(24.0)], 1e-9);

    for name in ["GPS.X(m)", "GPS.Y(m)", "ElapsedTime", "LiPo Total(V)", "Power(W)"] {
        assert_eq!(dataset.column(name).unwrap().kind, ColumnKind::Derived, "{}", name);
    }

    let status = dataset.report().status_text();
    assert!(status.contains("Contains GPS data."));
    assert!(status.contains("Generated 'Power(W)' data."));
    assert!(status.contains("Generated 'LiPo Total(V)' data."));
}

#[test]
fn malformed_gps_row_only_affects_that_row() {
    let dataset = import(FLIGHT_LOG);

    assert_eq!(dataset.report().malformed_coordinates, 1);
    assert_eq!(dataset.numeric("GPS.Latitude").unwrap(), &[Some(45.5), Some(45.501), None]);
    assert_eq!(dataset.numeric("GPS.Longitude").unwrap(), &[Some(-73.6), Some(-73.601), None]);
    assert_eq!(dataset.numeric("GPS.X(m)").unwrap()[2], None);
    assert!(dataset.numeric("GPS.X(m)").unwrap()[0].is_some());
    assert!(dataset.numeric("Power(W)").unwrap()[2].is_some());
}

#[test]
fn stray_tokens_in_numeric_columns_only_affect_their_row() {
    let dataset = import(
        "\
Time,GPS.Latitude,GPS.Longitude,LiPo1(V),LiPo2(V),VFAS(V),Current(A)
100.0,45.5,-73.6,4.1,4.0,12.0,2.0
100.5,bad,-73.7,---,4.0,ERR,2.5
101.2,45.6,-73.8,4.0,4.0,12.0,3.0
",
    );

    for name in ["GPS.Latitude", "LiPo1(V)", "VFAS(V)"] {
        assert_eq!(dataset.column(name).unwrap().kind, ColumnKind::Numeric, "{}", name);
        assert_eq!(dataset.numeric(name).unwrap()[1], None, "{}", name);
    }

    assert_close(dataset.numeric("LiPo Total(V)").unwrap(), &[Some(8.1), None, Some(8.0)], 1e-9);
    assert_close(dataset.numeric("Power(W)").unwrap(), &[Some(24.0), None, Some(36.0)], 1e-9);
    assert_close(dataset.numeric("ElapsedTime").unwrap(), &[Some(0.0), Some(0.5), Some(1.2)], 1e-9);

    assert!(dataset.has_gps());
    let x = dataset.numeric("GPS.X(m)").unwrap();
    assert!(x[0].is_some() && x[1].is_none() && x[2].is_some());
    assert!(dataset.numeric("GPS.Y(m)").unwrap()[2].is_some());
}

#[test]
fn text_coordinates_do_not_count_as_gps() {
    let dataset = import("GPS.Latitude,GPS.Longitude\nnorth,-73.6\nsouth,-73.7\n");
    assert!(!dataset.has_gps());
    assert!(!dataset.contains("GPS.X(m)"));
}

#[test]
fn unreadable_first_timestamp_leaves_elapsed_missing() {
    let dataset = import("Time,RSSI(dB)\n,-60\n100.5,-61\n101.2,-62\n");
    assert!(dataset.time_base().is_none());
    assert_eq!(dataset.numeric("ElapsedTime").unwrap(), &[None::<f64>, None, None]);
    assert!(dataset.report().status_text().contains("No time data found."));
}

#[test]
fn projected_track_is_centered_on_the_centroid() {
    let dataset = import(FLIGHT_LOG);
    let centroid = dataset.centroid().unwrap();
    assert!((centroid.latitude - 45.5005).abs() < 1e-9);
    assert!((centroid.longitude + 73.6005).abs() < 1e-9);

    for name in ["GPS.X(m)", "GPS.Y(m)"] {
        let values: Vec<f64> = dataset.numeric(name).unwrap().iter().flatten().copied().collect();
        assert_eq!(values.len(), 2);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        assert!(mean.abs() < 0.1, "{} mean {}", name, mean);
    }

    // First point lies south-east of the centroid.
    let x = dataset.numeric("GPS.X(m)").unwrap()[0].unwrap();
    let y = dataset.numeric("GPS.Y(m)").unwrap()[0].unwrap();
    assert!(x > 0.0 && y < 0.0);
}

#[test]
fn log_without_gps_or_time_still_imports() {
    let dataset = import("VFAS(V),Current(A)\n12.0,2.5\n11.8,\n");

    assert!(!dataset.has_gps());
    assert!(!dataset.has_altitude());
    assert!(dataset.centroid().is_none());
    assert!(dataset.time_base().is_none());
    assert!(!dataset.contains("GPS.X(m)"));
    assert!(!dataset.contains("ElapsedTime"));
    assert_eq!(dataset.numeric("Power(W)").unwrap(), &[Some(30.0), None]);

    let status = dataset.report().status_text();
    assert!(status.contains("No GPS data found."));
    assert!(status.contains("No time data found."));
}

#[test]
fn header_only_log_is_an_empty_dataset() {
    let err = import_log_reader("empty.csv", "Time,GPS\n".as_bytes(), &ImportOptions::default()).unwrap_err();
    assert!(matches!(err, ImportError::EmptyDataset { .. }));
}

#[test]
fn log_of_empty_columns_is_an_empty_dataset() {
    let err = import_log_reader("blank.csv", "A,B\n,\nNaN,\n".as_bytes(), &ImportOptions::default()).unwrap_err();
    assert!(matches!(err, ImportError::EmptyDataset { .. }));
}

#[test]
fn sort_option_orders_columns_by_name() {
    let options = ImportOptions {
        sort_columns: true,
        ..ImportOptions::default()
    };
    let dataset = import_log_reader("flight.csv", FLIGHT_LOG.as_bytes(), &options).unwrap();
    let names = dataset.column_names();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}

#[test]
fn session_replaces_dataset_on_reimport_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");
    std::fs::File::create(&first).unwrap().write_all(FLIGHT_LOG.as_bytes()).unwrap();
    std::fs::File::create(&second)
        .unwrap()
        .write_all(b"VFAS(V),Current(A)\n12.0,2.5\n")
        .unwrap();

    let mut session = LogSession::default();
    let before = session.import(&first).unwrap();
    assert_eq!(before.row_count(), 3);

    let after = session.import(&second).unwrap();
    assert_eq!(after.row_count(), 1);
    assert_eq!(session.current().unwrap().source_name(), second.to_string_lossy());
    assert_eq!(before.row_count(), 3);

    assert!(session.import(Path::new("/nonexistent/third.csv")).is_err());
    assert_eq!(session.current().unwrap().row_count(), 1);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = import_log_file(Path::new("/nonexistent/flight.csv"), &ImportOptions::default()).unwrap_err();
    assert!(matches!(err, ImportError::Io(_)));
}

// tests/import_pipeline_test.rs
