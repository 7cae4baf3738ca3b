// src/constants.rs

// --- Source column names (Ethos native naming) ---
pub const GPS_COMBINED_COLUMN: &str = "GPS";
pub const DATE_COLUMN: &str = "Date";
pub const TIME_COLUMN: &str = "Time";
pub const VFAS_COLUMN: &str = "VFAS(V)";
pub const CURRENT_COLUMN: &str = "Current(A)";

// Altitude columns in order of preference. The first one present with data is used.
pub const ALTITUDE_COLUMN_CANDIDATES: [&str; 4] = ["GPS alt(m)", "GPS alt (m)", "GPS.Altitude", "Altitude"];

// --- Produced column names ---
pub const GPS_LATITUDE_COLUMN: &str = "GPS.Latitude";
pub const GPS_LONGITUDE_COLUMN: &str = "GPS.Longitude";
pub const GPS_X_COLUMN: &str = "GPS.X(m)";
pub const GPS_Y_COLUMN: &str = "GPS.Y(m)";
pub const ELAPSED_TIME_COLUMN: &str = "ElapsedTime";
pub const LIPO_TOTAL_COLUMN: &str = "LiPo Total(V)";
pub const POWER_COLUMN: &str = "Power(W)";

// Per-cell battery voltage columns, e.g. "LiPo1(V)" or "LiPo3 (V)".
pub const LIPO_CELL_PATTERN: &str = r"^LiPo(\d+) ?\(V\)$";

// Raw tokens treated as "no value" in addition to empty fields.
pub const MISSING_VALUE_TOKENS: [&str; 8] = ["NaN", "nan", "-nan", "NA", "N/A", "null", "NULL", "None"];

// Malformed GPS values reported individually at warn level; the rest go to debug.
pub const MALFORMED_GPS_WARNING_LIMIT: usize = 5;

// Clock time with the hour dropped (spreadsheet round-trips strip a leading "12:").
pub const CLOCK_WITHOUT_HOUR_PATTERN: &str = r"^\d{1,2}:\d{2}\.\d+$";
pub const DEFAULT_MISSING_HOUR_PREFIX: &str = "12:";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// --- WGS84 ellipsoid ---
pub const WGS84_SEMI_MAJOR_AXIS_M: f64 = 6_378_137.0;
pub const WGS84_INVERSE_FLATTENING: f64 = 298.257_223_563;

// Vincenty iteration control.
pub const VINCENTY_CONVERGENCE_THRESHOLD: f64 = 1e-12;
pub const VINCENTY_MAX_ITERATIONS: usize = 200;

// --- Map zoom suggestion (degrees of spread -> zoom level) ---
pub const ZOOM_THRESHOLDS_DEG: [(f64, u8); 3] = [(1.0, 8), (0.1, 12), (0.01, 15)];
pub const ZOOM_CLOSEST: u8 = 17;

// --- KML export ---
pub const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";
pub const KML_DOCUMENT_NAME: &str = "Flight Track";
pub const KML_TRACK_COLOR: &str = "ff0000ff"; // Red, KML colors are AABBGGRR.
pub const KML_TRACK_WIDTH: &str = "3";
pub const KML_START_ICON: &str = "http://maps.google.com/mapfiles/kml/paddle/grn-circle.png";
pub const KML_END_ICON: &str = "http://maps.google.com/mapfiles/kml/paddle/red-circle.png";
pub const PROCESSED_FILE_PREFIX: &str = "processed_";

// src/constants.rs
