// src/data_analysis/geodetic.rs

//! Local planar frame for GPS tracks.
//!
//! Points are mapped with the ellipsoidal azimuthal equidistant projection centred on the
//! track's centroid: the geodesic from the centroid to each point gives a distance `s` and a
//! forward azimuth `α`, and the point lands at `(s·sin α, s·cos α)` meters east/north of the
//! origin. Distances from the origin are exact, so the frame stays accurate well beyond the
//! tens of kilometers a flight covers. Geodesics use Vincenty's formulae on WGS84.

use log::{info, warn};

use crate::constants::{
    GPS_LATITUDE_COLUMN, GPS_LONGITUDE_COLUMN, GPS_X_COLUMN, GPS_Y_COLUMN, VINCENTY_CONVERGENCE_THRESHOLD,
    VINCENTY_MAX_ITERATIONS, WGS84_INVERSE_FLATTENING, WGS84_SEMI_MAJOR_AXIS_M,
};
use crate::data_input::log_data::{Column, ColumnTable};
use crate::types::{LatLon, PlanarOffset};

/// Reference ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    pub semi_major_axis: f64,
    pub flattening: f64,
}

impl Ellipsoid {
    pub const WGS84: Ellipsoid = Ellipsoid {
        semi_major_axis: WGS84_SEMI_MAJOR_AXIS_M,
        flattening: 1.0 / WGS84_INVERSE_FLATTENING,
    };

    pub fn semi_minor_axis(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.flattening)
    }
}

/// Mean latitude/longitude of all valid GPS samples; the origin of the planar frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    pub latitude: f64,
    pub longitude: f64,
}

impl Centroid {
    /// Averages every row where both coordinates are present. `None` without such a row.
    pub fn from_samples(latitudes: &[Option<f64>], longitudes: &[Option<f64>]) -> Option<Self> {
        let (sum_lat, sum_lon, count) = latitudes
            .iter()
            .zip(longitudes)
            .filter_map(|(lat, lon)| lat.zip(*lon))
            .fold((0.0, 0.0, 0usize), |(sl, so, n), (lat, lon)| (sl + lat, so + lon, n + 1));
        if count == 0 {
            return None;
        }
        Some(Self {
            latitude: sum_lat / count as f64,
            longitude: sum_lon / count as f64,
        })
    }
}

/// Geodesic between two points: length in meters and forward azimuth at the start point in
/// radians, clockwise from north.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodesic {
    pub distance: f64,
    pub initial_azimuth: f64,
}

// Vincenty's series coefficients A and B for the reduced parameter u².
fn series_coefficients(u_sq: f64) -> (f64, f64) {
    let a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
    (a, b)
}

fn delta_sigma(b: f64, sin_sigma: f64, cos_sigma: f64, cos_2sigma_m: f64) -> f64 {
    let c2 = cos_2sigma_m * cos_2sigma_m;
    b * sin_sigma
        * (cos_2sigma_m
            + b / 4.0
                * (cos_sigma * (-1.0 + 2.0 * c2)
                    - b / 6.0 * cos_2sigma_m * (-3.0 + 4.0 * sin_sigma * sin_sigma) * (-3.0 + 4.0 * c2)))
}

fn reduced_latitude(ellipsoid: &Ellipsoid, latitude_rad: f64) -> (f64, f64) {
    let tan_u = (1.0 - ellipsoid.flattening) * latitude_rad.tan();
    let cos_u = 1.0 / (1.0 + tan_u * tan_u).sqrt();
    (tan_u * cos_u, cos_u)
}

/// Vincenty inverse problem. `None` if the iteration does not converge (nearly antipodal
/// points, which a single flight never produces).
pub fn vincenty_inverse(ellipsoid: &Ellipsoid, from: LatLon, to: LatLon) -> Option<Geodesic> {
    let f = ellipsoid.flattening;
    let a = ellipsoid.semi_major_axis;
    let b = ellipsoid.semi_minor_axis();

    let l = (to.1 - from.1).to_radians();
    let (sin_u1, cos_u1) = reduced_latitude(ellipsoid, from.0.to_radians());
    let (sin_u2, cos_u2) = reduced_latitude(ellipsoid, to.0.to_radians());

    let mut lambda = l;
    for _ in 0..VINCENTY_MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let t1 = cos_u2 * sin_lambda;
        let t2 = cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda;
        let sin_sq_sigma = t1 * t1 + t2 * t2;
        if sin_sq_sigma == 0.0 {
            // Coincident points.
            return Some(Geodesic {
                distance: 0.0,
                initial_azimuth: 0.0,
            });
        }
        let sin_sigma = sin_sq_sigma.sqrt();
        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        // Equatorial lines have cos²α = 0.
        let cos_2sigma_m = if cos_sq_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        } else {
            0.0
        };
        let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
        let previous = lambda;
        lambda = l
            + (1.0 - c)
                * f
                * sin_alpha
                * (sigma + c * sin_sigma * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

        if (lambda - previous).abs() <= VINCENTY_CONVERGENCE_THRESHOLD {
            let u_sq = cos_sq_alpha * (a * a - b * b) / (b * b);
            let (big_a, big_b) = series_coefficients(u_sq);
            let d_sigma = delta_sigma(big_b, sin_sigma, cos_sigma, cos_2sigma_m);
            let (sin_lambda, cos_lambda) = lambda.sin_cos();
            return Some(Geodesic {
                distance: b * big_a * (sigma - d_sigma),
                initial_azimuth: (cos_u2 * sin_lambda).atan2(cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda),
            });
        }
    }
    None
}

/// Vincenty direct problem: the point reached from `from` after `distance` meters along
/// `initial_azimuth` (radians). Longitude is normalized to [-180, 180].
pub fn vincenty_direct(ellipsoid: &Ellipsoid, from: LatLon, initial_azimuth: f64, distance: f64) -> LatLon {
    let f = ellipsoid.flattening;
    let a = ellipsoid.semi_major_axis;
    let b = ellipsoid.semi_minor_axis();

    let (sin_alpha1, cos_alpha1) = initial_azimuth.sin_cos();
    let (sin_u1, cos_u1) = reduced_latitude(ellipsoid, from.0.to_radians());
    let sigma1 = (sin_u1 / cos_u1).atan2(cos_alpha1);
    let sin_alpha = cos_u1 * sin_alpha1;
    let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
    let u_sq = cos_sq_alpha * (a * a - b * b) / (b * b);
    let (big_a, big_b) = series_coefficients(u_sq);

    let base_sigma = distance / (b * big_a);
    let mut sigma = base_sigma;
    for _ in 0..VINCENTY_MAX_ITERATIONS {
        let cos_2sigma_m = (2.0 * sigma1 + sigma).cos();
        let (sin_sigma, cos_sigma) = sigma.sin_cos();
        let previous = sigma;
        sigma = base_sigma + delta_sigma(big_b, sin_sigma, cos_sigma, cos_2sigma_m);
        if (sigma - previous).abs() <= VINCENTY_CONVERGENCE_THRESHOLD {
            break;
        }
    }

    let cos_2sigma_m = (2.0 * sigma1 + sigma).cos();
    let (sin_sigma, cos_sigma) = sigma.sin_cos();
    let x = sin_u1 * sin_sigma - cos_u1 * cos_sigma * cos_alpha1;
    let latitude = (sin_u1 * cos_sigma + cos_u1 * sin_sigma * cos_alpha1)
        .atan2((1.0 - f) * (sin_alpha * sin_alpha + x * x).sqrt());
    let lambda = (sin_sigma * sin_alpha1).atan2(cos_u1 * cos_sigma - sin_u1 * sin_sigma * cos_alpha1);
    let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
    let l = lambda
        - (1.0 - c)
            * f
            * sin_alpha
            * (sigma + c * sin_sigma * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

    let longitude = normalize_longitude(from.1 + l.to_degrees());
    (latitude.to_degrees(), longitude)
}

fn normalize_longitude(degrees: f64) -> f64 {
    let wrapped = (degrees + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && degrees > 0.0 {
        180.0
    } else {
        wrapped
    }
}

/// Azimuthal equidistant projection centred on a fixed origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AzimuthalEquidistant {
    origin: Centroid,
    ellipsoid: Ellipsoid,
}

impl AzimuthalEquidistant {
    pub fn new(origin: Centroid) -> Self {
        Self {
            origin,
            ellipsoid: Ellipsoid::WGS84,
        }
    }

    pub fn origin(&self) -> Centroid {
        self.origin
    }

    /// Geodetic degrees to (east, north) meters. `None` if the geodesic fails to converge.
    pub fn project(&self, latitude: f64, longitude: f64) -> Option<PlanarOffset> {
        let geodesic = vincenty_inverse(
            &self.ellipsoid,
            (self.origin.latitude, self.origin.longitude),
            (latitude, longitude),
        )?;
        let (sin_az, cos_az) = geodesic.initial_azimuth.sin_cos();
        Some((geodesic.distance * sin_az, geodesic.distance * cos_az))
    }

    /// (east, north) meters back to geodetic degrees.
    pub fn unproject(&self, x: f64, y: f64) -> LatLon {
        let distance = x.hypot(y);
        if distance == 0.0 {
            return (self.origin.latitude, self.origin.longitude);
        }
        vincenty_direct(
            &self.ellipsoid,
            (self.origin.latitude, self.origin.longitude),
            x.atan2(y),
            distance,
        )
    }
}

/// Adds `GPS.X(m)`/`GPS.Y(m)` relative to the centroid of all valid GPS pairs.
///
/// Needs numeric `GPS.Latitude` and `GPS.Longitude` columns with at least one complete pair;
/// otherwise the table is left untouched and `None` is returned.
pub fn project_gps_columns(table: &mut ColumnTable) -> Option<Centroid> {
    let latitudes = table.numeric(GPS_LATITUDE_COLUMN)?;
    let longitudes = table.numeric(GPS_LONGITUDE_COLUMN)?;
    let centroid = Centroid::from_samples(latitudes, longitudes)?;
    let projection = AzimuthalEquidistant::new(centroid);

    let mut failed = 0usize;
    let (xs, ys): (Vec<Option<f64>>, Vec<Option<f64>>) = latitudes
        .iter()
        .zip(longitudes)
        .map(|(lat, lon)| match lat.zip(*lon) {
            Some((lat, lon)) => match projection.project(lat, lon) {
                Some((x, y)) => (Some(x), Some(y)),
                None => {
                    failed += 1;
                    (None, None)
                }
            },
            None => (None, None),
        })
        .unzip();

    if failed > 0 {
        warn!("{} GPS samples could not be projected", failed);
    }
    info!(
        "Projected GPS track around centroid ({:.6}, {:.6})",
        centroid.latitude, centroid.longitude
    );

    table.push(Column::derived(GPS_X_COLUMN, xs));
    table.push(Column::derived(GPS_Y_COLUMN, ys));
    Some(centroid)
}


// src/data_analysis/geodetic.rs
