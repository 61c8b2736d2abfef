//! Bearing and great-circle arithmetic on WGS84 coordinates.
//!
//! Everything here is pure. Bad input never panics or errors; it yields a
//! sentinel instead (an unset [`GeoPoint`], [`CardinalDirection::Unknown`]
//! or a zero bearing) and the caller decides whether that matters.

use std::f64::consts::PI;
use std::fmt;

use geo::{GeodesicBearing, GeodesicDistance, HaversineBearing, Point};
use serde::{Deserialize, Serialize};

/// Sentinel for a latitude or longitude that was never set.
pub const NO_VALUE: f64 = f64::MAX;

/// Mean Earth radius in metres, used by the spherical formulas.
pub const EARTH_MEAN_RADIUS: f64 = 6_371_000.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// A point whose coordinates are both [`NO_VALUE`].
    pub fn unset() -> Self {
        Self::new(NO_VALUE, NO_VALUE)
    }

    /// False when either coordinate is [`NO_VALUE`] or NaN.
    pub fn is_set(&self) -> bool {
        let unset = |v: f64| v == NO_VALUE || v.is_nan();
        !unset(self.latitude) && !unset(self.longitude)
    }

    /// True when the point is set and both coordinates are in range.
    pub fn is_valid(&self) -> bool {
        self.is_set() && self.latitude.abs() <= 90.0 && self.longitude.abs() <= 180.0
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        Self::unset()
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(p: GeoPoint) -> Self {
        Point::new(p.longitude, p.latitude)
    }
}

impl From<Point<f64>> for GeoPoint {
    fn from(p: Point<f64>) -> Self {
        GeoPoint::new(p.y(), p.x())
    }
}

/// The 16 points of the compass, plus a sentinel for bearings that could not
/// be classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardinalDirection {
    Unknown,
    N,
    NNE,
    NE,
    ENE,
    E,
    ESE,
    SE,
    SSE,
    S,
    SSW,
    SW,
    WSW,
    W,
    WNW,
    NW,
    NNW,
}

impl CardinalDirection {
    /// Compass points in clockwise order starting at north.
    pub const ALL: [CardinalDirection; 16] = [
        CardinalDirection::N,
        CardinalDirection::NNE,
        CardinalDirection::NE,
        CardinalDirection::ENE,
        CardinalDirection::E,
        CardinalDirection::ESE,
        CardinalDirection::SE,
        CardinalDirection::SSE,
        CardinalDirection::S,
        CardinalDirection::SSW,
        CardinalDirection::SW,
        CardinalDirection::WSW,
        CardinalDirection::W,
        CardinalDirection::WNW,
        CardinalDirection::NW,
        CardinalDirection::NNW,
    ];

    /// Midpoint of the sector in degrees; `-1.0` for `Unknown`.
    pub fn degrees(self) -> f64 {
        match self {
            CardinalDirection::Unknown => -1.0,
            other => {
                let index = Self::ALL.iter().position(|d| *d == other).unwrap_or(0);
                index as f64 * 22.5
            }
        }
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            CardinalDirection::Unknown => "Unknown",
            CardinalDirection::N => "N",
            CardinalDirection::NNE => "NNE",
            CardinalDirection::NE => "NE",
            CardinalDirection::ENE => "ENE",
            CardinalDirection::E => "E",
            CardinalDirection::ESE => "ESE",
            CardinalDirection::SE => "SE",
            CardinalDirection::SSE => "SSE",
            CardinalDirection::S => "S",
            CardinalDirection::SSW => "SSW",
            CardinalDirection::SW => "SW",
            CardinalDirection::WSW => "WSW",
            CardinalDirection::W => "W",
            CardinalDirection::WNW => "WNW",
            CardinalDirection::NW => "NW",
            CardinalDirection::NNW => "NNW",
        }
    }
}

impl fmt::Display for CardinalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Map any bearing into `[0, 360)`. Non-finite input comes back as NaN.
pub fn normalize_bearing(bearing: f64) -> f64 {
    if !bearing.is_finite() {
        return f64::NAN;
    }
    let normalized = bearing.rem_euclid(360.0);
    // rem_euclid can round tiny negative inputs up to exactly 360.
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Bucket a normalized bearing into one of 16 compass sectors of 22.5°.
///
/// The bearing is scaled by ten and rounded to a multiple of 225, which
/// indexes the sector table. Halves round up (towards positive infinity),
/// so an unnormalized `-11.25` lands on north. A result of 3600 (a bearing
/// that rounds up to 360°) wraps back to north. Anything outside the table
/// is `Unknown`.
pub fn cardinal_direction_for(normalized_bearing: f64) -> CardinalDirection {
    if !normalized_bearing.is_finite() {
        return CardinalDirection::Unknown;
    }
    let sector = (10.0 * normalized_bearing / 225.0 + 0.5).floor().abs();
    if sector > 16.0 {
        return CardinalDirection::Unknown;
    }
    match sector as usize {
        16 => CardinalDirection::N,
        index => CardinalDirection::ALL[index],
    }
}

/// Initial bearing from `from` to `to` on the WGS84 ellipsoid, normalized to
/// `[0, 360)`. Returns `0.0` if either point is invalid.
pub fn bearing_between(from: &GeoPoint, to: &GeoPoint) -> f64 {
    if !from.is_valid() || !to.is_valid() {
        return 0.0;
    }
    let bearing = Point::from(*from).geodesic_bearing(Point::from(*to));
    normalize_bearing(bearing)
}

/// Initial bearing on a sphere, normalized to `[0, 360)`.
///
/// This is the inverse of the bearing used by [`project_point`]. Returns
/// `0.0` if either point is invalid.
pub fn initial_bearing(from: &GeoPoint, to: &GeoPoint) -> f64 {
    if !from.is_valid() || !to.is_valid() {
        return 0.0;
    }
    normalize_bearing(Point::from(*from).haversine_bearing(Point::from(*to)))
}

/// Haversine distance in metres using [`EARTH_MEAN_RADIUS`].
///
/// Returns NaN if either point is invalid.
pub fn spherical_distance(from: &GeoPoint, to: &GeoPoint) -> f64 {
    if !from.is_valid() || !to.is_valid() {
        return f64::NAN;
    }
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (to.longitude - from.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_MEAN_RADIUS * c
}

/// Distance in metres on the WGS84 ellipsoid. Returns NaN if either point is
/// invalid.
pub fn geodesic_distance(from: &GeoPoint, to: &GeoPoint) -> f64 {
    if !from.is_valid() || !to.is_valid() {
        return f64::NAN;
    }
    Point::from(*from).geodesic_distance(&Point::from(*to))
}

/// Destination latitude/longitude in radians, longitude wrapped to `[-π, π)`.
fn forward_geodesic(origin: &GeoPoint, bearing: f64, distance: f64) -> Option<(f64, f64)> {
    if !origin.is_valid() || !bearing.is_finite() || !distance.is_finite() {
        return None;
    }
    let angular = distance / EARTH_MEAN_RADIUS;
    let lat1 = origin.latitude.to_radians();
    let lon1 = origin.longitude.to_radians();
    let theta = bearing.to_radians();

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * theta.cos()).asin();
    let lon2 = lon1
        + (theta.sin() * angular.sin() * lat1.cos()).atan2(angular.cos() - lat1.sin() * lat2.sin());
    let lon2 = (lon2 + PI).rem_euclid(2.0 * PI) - PI;

    Some((lat2, lon2))
}

/// Point reached by travelling `distance` metres from `origin` along the
/// initial `bearing` (degrees) on a sphere of [`EARTH_MEAN_RADIUS`].
///
/// If either computed coordinate is exactly zero the whole result collapses
/// to `(0, 0)`, matching previously recorded data. Use
/// [`project_point_exact`] to keep the computed point. An invalid origin or
/// a non-finite bearing or distance gives [`GeoPoint::unset`].
pub fn project_point(origin: &GeoPoint, bearing: f64, distance: f64) -> GeoPoint {
    match forward_geodesic(origin, bearing, distance) {
        Some((lat2, lon2)) if lat2 == 0.0 || lon2 == 0.0 => GeoPoint::new(0.0, 0.0),
        Some((lat2, lon2)) => GeoPoint::new(lat2.to_degrees(), lon2.to_degrees()),
        None => GeoPoint::unset(),
    }
}

/// Same as [`project_point`] without the zero-coordinate collapse.
pub fn project_point_exact(origin: &GeoPoint, bearing: f64, distance: f64) -> GeoPoint {
    match forward_geodesic(origin, bearing, distance) {
        Some((lat2, lon2)) => GeoPoint::new(lat2.to_degrees(), lon2.to_degrees()),
        None => GeoPoint::unset(),
    }
}
