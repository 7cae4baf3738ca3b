// src/data_output/kml_export.rs

use log::info;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::constants::{
    ELAPSED_TIME_COLUMN, GPS_LATITUDE_COLUMN, GPS_LONGITUDE_COLUMN, KML_DOCUMENT_NAME, KML_END_ICON, KML_NAMESPACE,
    KML_START_ICON, KML_TRACK_COLOR, KML_TRACK_WIDTH,
};
use crate::data_input::log_data::LogDataset;
use crate::error::ExportError;

/// One track vertex in geodetic degrees, altitude in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
}

impl TrackPoint {
    /// KML coordinate tuple: `lon,lat,alt`, altitude 0 when unknown.
    pub fn kml_coordinates(&self) -> String {
        format!("{},{},{}", self.longitude, self.latitude, self.altitude.unwrap_or(0.0))
    }
}

/// Rows with latitude, longitude and, when the log has altitude, altitude all present.
pub fn collect_track_points(dataset: &LogDataset) -> Result<Vec<TrackPoint>, ExportError> {
    if !dataset.has_gps() {
        return Err(ExportError::NoGpsData);
    }
    let latitudes = dataset.numeric(GPS_LATITUDE_COLUMN).ok_or(ExportError::NoGpsData)?;
    let longitudes = dataset.numeric(GPS_LONGITUDE_COLUMN).ok_or(ExportError::NoGpsData)?;
    let altitudes = dataset.altitude_column().and_then(|name| dataset.numeric(name));

    let points: Vec<TrackPoint> = (0..dataset.row_count())
        .filter_map(|row| {
            let (latitude, longitude) = latitudes[row].zip(longitudes[row])?;
            let altitude = match altitudes {
                Some(alt) => Some(alt[row]?),
                None => None,
            };
            Some(TrackPoint {
                latitude,
                longitude,
                altitude,
            })
        })
        .collect();

    if points.is_empty() {
        return Err(ExportError::NoGpsData);
    }
    Ok(points)
}

/// `flight.csv` -> `flight.kml`.
pub fn default_kml_path(source: &Path) -> PathBuf {
    source.with_extension("kml")
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<(), ExportError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn start<W: Write>(writer: &mut Writer<W>, element: BytesStart) -> Result<(), ExportError> {
    writer.write_event(Event::Start(element))?;
    Ok(())
}

fn end<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<(), ExportError> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_icon_style<W: Write>(writer: &mut Writer<W>, id: &str, href: &str) -> Result<(), ExportError> {
    start(writer, BytesStart::new("Style").with_attributes([("id", id)]))?;
    start(writer, BytesStart::new("IconStyle"))?;
    start(writer, BytesStart::new("Icon"))?;
    write_text_element(writer, "href", href)?;
    end(writer, "Icon")?;
    end(writer, "IconStyle")?;
    end(writer, "Style")
}

fn point_description(label: &str, point: &TrackPoint) -> String {
    let mut text = format!("{}\nLat: {}\nLon: {}", label, point.latitude, point.longitude);
    if let Some(altitude) = point.altitude {
        text.push_str(&format!("\nAlt: {}m", altitude));
    }
    text
}

fn write_point_placemark<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    description: &str,
    style: &str,
    point: &TrackPoint,
) -> Result<(), ExportError> {
    start(writer, BytesStart::new("Placemark"))?;
    write_text_element(writer, "name", name)?;
    write_text_element(writer, "description", description)?;
    write_text_element(writer, "styleUrl", style)?;
    start(writer, BytesStart::new("Point"))?;
    write_text_element(writer, "coordinates", &point.kml_coordinates())?;
    end(writer, "Point")?;
    end(writer, "Placemark")
}

/// Writes the flight track of `dataset` as a KML 2.2 document: start and end placemarks plus
/// the full path as a LineString.
pub fn write_kml<W: Write>(dataset: &LogDataset, output: W) -> Result<W, ExportError> {
    let points = collect_track_points(dataset)?;
    let has_altitude = dataset.has_altitude();
    let source_file = Path::new(dataset.source_name())
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dataset.source_name().to_string());

    let mut writer = Writer::new_with_indent(output, b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    start(&mut writer, BytesStart::new("kml").with_attributes([("xmlns", KML_NAMESPACE)]))?;
    start(&mut writer, BytesStart::new("Document"))?;
    write_text_element(&mut writer, "name", KML_DOCUMENT_NAME)?;
    write_text_element(
        &mut writer,
        "description",
        &format!(
            "GPS track exported from log file {} by Ethos_CSV_Analyzer {}",
            source_file,
            crate::crate_version()
        ),
    )?;

    start(&mut writer, BytesStart::new("Style").with_attributes([("id", "trackStyle")]))?;
    start(&mut writer, BytesStart::new("LineStyle"))?;
    write_text_element(&mut writer, "color", KML_TRACK_COLOR)?;
    write_text_element(&mut writer, "width", KML_TRACK_WIDTH)?;
    end(&mut writer, "LineStyle")?;
    end(&mut writer, "Style")?;
    write_icon_style(&mut writer, "startStyle", KML_START_ICON)?;
    write_icon_style(&mut writer, "endStyle", KML_END_ICON)?;

    let first = &points[0];
    let last = &points[points.len() - 1];
    write_point_placemark(
        &mut writer,
        "Start",
        &point_description("Flight start point", first),
        "#startStyle",
        first,
    )?;
    write_point_placemark(
        &mut writer,
        "End",
        &point_description("Flight end point", last),
        "#endStyle",
        last,
    )?;

    start(&mut writer, BytesStart::new("Placemark"))?;
    write_text_element(&mut writer, "name", "Flight Path")?;
    write_text_element(
        &mut writer,
        "description",
        &format!(
            "Flight track with {} GPS points\nAltitude data: {}\nTimestamp data: {}",
            points.len(),
            if has_altitude { "Yes" } else { "No" },
            if dataset.contains(ELAPSED_TIME_COLUMN) { "Yes" } else { "No" }
        ),
    )?;
    write_text_element(&mut writer, "styleUrl", "#trackStyle")?;
    start(&mut writer, BytesStart::new("LineString"))?;
    write_text_element(
        &mut writer,
        "altitudeMode",
        if has_altitude { "absolute" } else { "clampToGround" },
    )?;
    let coordinates: Vec<String> = points.iter().map(TrackPoint::kml_coordinates).collect();
    write_text_element(&mut writer, "coordinates", &coordinates.join(" "))?;
    end(&mut writer, "LineString")?;
    end(&mut writer, "Placemark")?;

    end(&mut writer, "Document")?;
    end(&mut writer, "kml")?;
    Ok(writer.into_inner())
}

/// Writes the track to `path` and returns the path written.
pub fn create_kml_file(dataset: &LogDataset, path: &Path) -> Result<PathBuf, ExportError> {
    let file = BufWriter::new(File::create(path)?);
    let mut file = write_kml(dataset, file)?;
    file.flush()?;
    info!("KML file saved: {}", path.display());
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_import::import_log_reader;
    use crate::settings::ImportOptions;

    const TRACK: &str = "Time,GPS,GPS alt(m)\n\
        12:00:00.0,45.5 -73.6,100\n\
        12:00:01.0,45.6 -73.7,\n\
        12:00:02.0,45.7 -73.8,120\n";

    fn dataset(csv: &str) -> LogDataset {
        import_log_reader("logs/flight.csv", csv.as_bytes(), &ImportOptions::default()).unwrap()
    }

    #[test]
    fn rows_missing_altitude_are_left_out_of_the_track() {
        let points = collect_track_points(&dataset(TRACK)).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].kml_coordinates(), "-73.8,45.7,120");
    }

    #[test]
    fn kml_document_has_start_end_and_path() {
        let bytes = write_kml(&dataset(TRACK), Vec::new()).unwrap();
        let kml = String::from_utf8(bytes).unwrap();
        assert!(kml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(kml.contains("<kml xmlns=\"http://www.opengis.net/kml/2.2\">"));
        assert!(kml.contains("<name>Start</name>"));
        assert!(kml.contains("<coordinates>-73.6,45.5,100</coordinates>"));
        assert!(kml.contains("<altitudeMode>absolute</altitudeMode>"));
        assert!(kml.contains("<coordinates>-73.6,45.5,100 -73.8,45.7,120</coordinates>"));
        assert!(kml.contains("log file flight.csv"));
        assert!(kml.contains("Timestamp data: Yes"));
    }

    #[test]
    fn track_without_altitude_is_clamped_to_ground() {
        let bytes = write_kml(&dataset("GPS\n45.5 -73.6\n45.6 -73.7\n"), Vec::new()).unwrap();
        let kml = String::from_utf8(bytes).unwrap();
        assert!(kml.contains("<altitudeMode>clampToGround</altitudeMode>"));
        assert!(kml.contains("-73.7,45.6,0"));
    }

    #[test]
    fn log_without_gps_is_rejected() {
        let err = write_kml(&dataset("Time,RSSI(dB)\n12:00:00.0,-60\n"), Vec::new()).unwrap_err();
        assert!(matches!(err, ExportError::NoGpsData));
    }

    #[test]
    fn default_path_swaps_extension() {
        assert_eq!(default_kml_path(Path::new("/tmp/flight.csv")), PathBuf::from("/tmp/flight.kml"));
    }
}

// src/data_output/kml_export.rs
