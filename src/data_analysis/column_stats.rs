// src/data_analysis/column_stats.rs

use ndarray::Array1;
use ndarray_stats::QuantileExt; // Import QuantileExt for .min() and .max() on Array1

use crate::constants::{GPS_LATITUDE_COLUMN, GPS_LONGITUDE_COLUMN, ZOOM_CLOSEST, ZOOM_THRESHOLDS_DEG};
use crate::data_input::log_data::LogDataset;

/// Count, range and mean over the valid samples of a numeric series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Summarizes the finite values of a series. `None` if there are none.
pub fn summarize(values: &[Option<f64>]) -> Option<ColumnSummary> {
    let valid: Array1<f64> = values.iter().flatten().copied().filter(|v| v.is_finite()).collect();
    if valid.is_empty() {
        return None;
    }
    Some(ColumnSummary {
        count: valid.len(),
        min: *valid.min().ok()?,
        max: *valid.max().ok()?,
        mean: valid.mean()?,
    })
}

/// Extent of a GPS track, with a map zoom level that fits it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsTrackStats {
    pub points: usize,
    pub latitude: (f64, f64),
    pub longitude: (f64, f64),
    pub center: (f64, f64),
    pub zoom: u8,
}

/// Zoom level for a track spanning `max_range_deg` degrees.
pub fn suggested_zoom(max_range_deg: f64) -> u8 {
    ZOOM_THRESHOLDS_DEG
        .iter()
        .find(|(threshold, _)| max_range_deg > *threshold)
        .map(|&(_, zoom)| zoom)
        .unwrap_or(ZOOM_CLOSEST)
}

/// Track statistics over rows where both coordinates are present.
pub fn gps_track_stats(dataset: &LogDataset) -> Option<GpsTrackStats> {
    if !dataset.has_gps() {
        return None;
    }
    let latitudes = dataset.numeric(GPS_LATITUDE_COLUMN)?;
    let longitudes = dataset.numeric(GPS_LONGITUDE_COLUMN)?;
    let (lat, lon): (Vec<Option<f64>>, Vec<Option<f64>>) = latitudes
        .iter()
        .zip(longitudes)
        .filter_map(|(lat, lon)| lat.zip(*lon))
        .map(|(lat, lon)| (Some(lat), Some(lon)))
        .unzip();

    let lat = summarize(&lat)?;
    let lon = summarize(&lon)?;
    let max_range = (lat.max - lat.min).max(lon.max - lon.min);

    Some(GpsTrackStats {
        points: lat.count,
        latitude: (lat.min, lat.max),
        longitude: (lon.min, lon.max),
        center: (lat.mean, lon.mean),
        zoom: suggested_zoom(max_range),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_skips_missing_values() {
        let summary = summarize(&[Some(3.0), None, Some(1.0), Some(f64::NAN), Some(5.0)]).unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 5.0);
        assert!((summary.mean - 3.0).abs() < 1e-12);
        assert!(summarize(&[None, None]).is_none());
    }

    #[test]
    fn zoom_levels_follow_track_spread() {
        assert_eq!(suggested_zoom(2.0), 8);
        assert_eq!(suggested_zoom(0.5), 12);
        assert_eq!(suggested_zoom(0.05), 15);
        assert_eq!(suggested_zoom(0.001), 17);
    }
}

// src/data_analysis/column_stats.rs
