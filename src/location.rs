//! Recorded position fixes and their storage encodings.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde_json::{json, Map, Value};

use crate::logger;
use crate::math::{GeoPoint, NO_VALUE};

pub const UNKNOWN_ACCURACY: f32 = -1.0;
pub const UNKNOWN_ALTITUDE: f64 = -1.0;
pub const UNKNOWN_BEARING: f32 = -1.0;
pub const UNKNOWN_SPEED: f32 = -1.0;

const FIELD_LATITUDE: &str = "latitude";
const FIELD_LONGITUDE: &str = "longitude";
const FIELD_ACCURACY: &str = "accuracy";
const FIELD_ALTITUDE: &str = "altitude";
const FIELD_BEARING: &str = "bearing";
const FIELD_SPEED: &str = "speed";
const FIELD_RECORDED_AT: &str = "recordedAt";
const FIELD_PROVIDER_ID: &str = "providerId";

/// Where a fix came from. The numeric ids are stored and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProviderType {
    #[default]
    Unknown,
    GooglePlayServices,
    GooglePlayServicesHighAccuracy,
    CellId,
    WiFi,
    Gps,
    CreatedProgrammatically,
    CreatedFromPreferences,
    CreatedFromSelf,
}

impl ProviderType {
    pub const ALL: [ProviderType; 9] = [
        ProviderType::Unknown,
        ProviderType::GooglePlayServices,
        ProviderType::GooglePlayServicesHighAccuracy,
        ProviderType::CellId,
        ProviderType::WiFi,
        ProviderType::Gps,
        ProviderType::CreatedProgrammatically,
        ProviderType::CreatedFromPreferences,
        ProviderType::CreatedFromSelf,
    ];

    pub fn db_id(self) -> i64 {
        match self {
            ProviderType::Unknown => 0,
            ProviderType::GooglePlayServices => 1,
            ProviderType::GooglePlayServicesHighAccuracy => 2,
            ProviderType::CellId => 3,
            ProviderType::WiFi => 4,
            ProviderType::Gps => 5,
            ProviderType::CreatedProgrammatically => 6,
            ProviderType::CreatedFromPreferences => 7,
            ProviderType::CreatedFromSelf => 8,
        }
    }

    /// Unrecognised ids map to `Unknown`.
    pub fn from_db_id(id: i64) -> ProviderType {
        Self::ALL
            .into_iter()
            .find(|p| p.db_id() == id)
            .unwrap_or(ProviderType::Unknown)
    }

    /// Map a platform provider string (`"fused"`, `"gps"`, ...) to a type.
    pub fn from_literal(literal: &str) -> ProviderType {
        match literal {
            "" => ProviderType::Unknown,
            "fused" => ProviderType::GooglePlayServices,
            "gps" => ProviderType::Gps,
            "geobits" => ProviderType::CreatedProgrammatically,
            "geobits-preferences" => ProviderType::CreatedFromPreferences,
            "recorded" => ProviderType::CreatedFromSelf,
            other => {
                logger::warn(&format!(
                    "Could not find location provider type with literal value: {}",
                    other
                ));
                ProviderType::Unknown
            }
        }
    }

    fn label(self) -> &'static str {
        match self {
            ProviderType::Unknown => "Unknown",
            ProviderType::GooglePlayServices => "GooglePlayServices",
            ProviderType::GooglePlayServicesHighAccuracy => "GooglePlayServicesHighAccuracy",
            ProviderType::CellId => "CellID",
            ProviderType::WiFi => "WiFi",
            ProviderType::Gps => "GPS",
            ProviderType::CreatedProgrammatically => "CreatedProgrammatically",
            ProviderType::CreatedFromPreferences => "CreatedFromPreferences",
            ProviderType::CreatedFromSelf => "CreatedFromSelf",
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProviderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.label() == s)
            .ok_or_else(|| format!("Unknown location provider type: {}", s))
    }
}

/// A single position fix with whatever extra readings came with it.
///
/// Readings that were not recorded hold their `UNKNOWN_*` sentinel and the
/// coordinates hold [`NO_VALUE`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f32,
    pub altitude: f64,
    pub bearing: f32,
    pub speed: f32,
    /// Milliseconds since the Unix epoch.
    pub recorded_at: i64,
    pub provider: ProviderType,
}

impl Default for RecordedLocation {
    fn default() -> Self {
        Self {
            latitude: NO_VALUE,
            longitude: NO_VALUE,
            accuracy: UNKNOWN_ACCURACY,
            altitude: UNKNOWN_ALTITUDE,
            bearing: UNKNOWN_BEARING,
            speed: UNKNOWN_SPEED,
            recorded_at: 0,
            provider: ProviderType::Unknown,
        }
    }
}

impl RecordedLocation {
    pub fn new(position: GeoPoint, recorded_at: i64, provider: ProviderType) -> Self {
        Self {
            latitude: position.latitude,
            longitude: position.longitude,
            recorded_at,
            provider,
            ..Self::default()
        }
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    pub fn is_from_gps(&self) -> bool {
        self.provider == ProviderType::Gps
    }

    /// Decode from a JSON object. Never fails: any field that is missing or
    /// has the wrong type keeps its "unknown" value.
    pub fn from_json(value: &Value) -> Self {
        let defaults = Self::default();
        let float = |key: &str, fallback: f64| {
            value.get(key).and_then(Value::as_f64).unwrap_or(fallback)
        };

        Self {
            latitude: float(FIELD_LATITUDE, defaults.latitude),
            longitude: float(FIELD_LONGITUDE, defaults.longitude),
            accuracy: float(FIELD_ACCURACY, defaults.accuracy as f64) as f32,
            altitude: float(FIELD_ALTITUDE, defaults.altitude),
            bearing: float(FIELD_BEARING, defaults.bearing as f64) as f32,
            speed: float(FIELD_SPEED, defaults.speed as f64) as f32,
            recorded_at: value
                .get(FIELD_RECORDED_AT)
                .and_then(Value::as_i64)
                .unwrap_or(defaults.recorded_at),
            provider: value
                .get(FIELD_PROVIDER_ID)
                .and_then(Value::as_i64)
                .map(ProviderType::from_db_id)
                .unwrap_or_default(),
        }
    }

    /// Encode as a JSON object. A concise encoding leaves out altitude,
    /// bearing and speed.
    pub fn to_json(&self, concise: bool) -> Value {
        let mut object = Map::new();
        object.insert(FIELD_LATITUDE.into(), json!(self.latitude));
        object.insert(FIELD_LONGITUDE.into(), json!(self.longitude));
        object.insert(FIELD_ACCURACY.into(), json!(self.accuracy));
        if !concise {
            object.insert(FIELD_ALTITUDE.into(), json!(self.altitude));
            object.insert(FIELD_BEARING.into(), json!(self.bearing));
            object.insert(FIELD_SPEED.into(), json!(self.speed));
        }
        object.insert(FIELD_RECORDED_AT.into(), json!(self.recorded_at));
        object.insert(FIELD_PROVIDER_ID.into(), json!(self.provider.db_id()));
        Value::Object(object)
    }
}

/// Sort fixes by timestamp, oldest first unless `descending`.
pub fn sort_by_recorded_at(locations: &mut [RecordedLocation], descending: bool) {
    locations.sort_by(|a, b| {
        let order: Ordering = a.recorded_at.cmp(&b.recorded_at);
        if descending {
            order.reverse()
        } else {
            order
        }
    });
}

/// Parse a stored latitude or longitude. Empty or unparsable text gives
/// [`NO_VALUE`].
pub fn parse_coordinate(value: &str) -> f64 {
    let value = value.trim();
    if value.is_empty() {
        return NO_VALUE;
    }
    match value.parse::<f64>() {
        Ok(parsed) => parsed,
        Err(e) => {
            logger::warn(&format!(
                "Could not parse lat/lng value as double from {}: {}",
                value, e
            ));
            NO_VALUE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_all_unknown() {
        let location = RecordedLocation::default();
        assert!(!location.position().is_set());
        assert_eq!(location.accuracy, UNKNOWN_ACCURACY);
        assert_eq!(location.recorded_at, 0);
        assert_eq!(location.provider, ProviderType::Unknown);
    }

    #[test]
    fn test_provider_db_ids_are_stable() {
        for provider in ProviderType::ALL {
            assert_eq!(ProviderType::from_db_id(provider.db_id()), provider);
        }
        assert_eq!(ProviderType::Gps.db_id(), 5);
        assert_eq!(ProviderType::from_db_id(42), ProviderType::Unknown);
        assert_eq!(ProviderType::from_db_id(-1), ProviderType::Unknown);
    }

    #[test]
    fn test_provider_literals() {
        assert_eq!(ProviderType::from_literal("fused"), ProviderType::GooglePlayServices);
        assert_eq!(ProviderType::from_literal("gps"), ProviderType::Gps);
        assert_eq!(ProviderType::from_literal(""), ProviderType::Unknown);
        assert_eq!(ProviderType::from_literal("carrier-pigeon"), ProviderType::Unknown);
    }

    #[test]
    fn test_provider_display_parses_back() {
        for provider in ProviderType::ALL {
            assert_eq!(provider.to_string().parse::<ProviderType>(), Ok(provider));
        }
        assert!("Satellite".parse::<ProviderType>().is_err());
    }

    #[test]
    fn test_from_json_full_object() {
        let value = json!({
            "latitude": 45.5,
            "longitude": -73.5,
            "accuracy": 12.5,
            "altitude": 30.0,
            "bearing": 90.0,
            "speed": 1.5,
            "recordedAt": 1_400_000_000_000i64,
            "providerId": 5
        });
        let location = RecordedLocation::from_json(&value);
        assert_eq!(location.position(), GeoPoint::new(45.5, -73.5));
        assert_eq!(location.accuracy, 12.5);
        assert_eq!(location.altitude, 30.0);
        assert_eq!(location.bearing, 90.0);
        assert_eq!(location.speed, 1.5);
        assert_eq!(location.recorded_at, 1_400_000_000_000);
        assert!(location.is_from_gps());
    }

    #[test]
    fn test_from_json_tolerates_missing_and_mistyped_fields() {
        let value = json!({
            "latitude": "not a number",
            "longitude": 10.0,
            "speed": null,
            "providerId": "five"
        });
        let location = RecordedLocation::from_json(&value);
        assert_eq!(location.latitude, NO_VALUE);
        assert_eq!(location.longitude, 10.0);
        assert_eq!(location.speed, UNKNOWN_SPEED);
        assert_eq!(location.provider, ProviderType::Unknown);

        let from_array = RecordedLocation::from_json(&json!([1, 2, 3]));
        assert_eq!(from_array, RecordedLocation::default());
    }

    #[test]
    fn test_to_json_concise_drops_optional_readings() {
        let mut location = RecordedLocation::new(GeoPoint::new(1.0, 2.0), 99, ProviderType::WiFi);
        location.altitude = 12.0;

        let concise = location.to_json(true);
        assert!(concise.get("altitude").is_none());
        assert!(concise.get("bearing").is_none());
        assert_eq!(concise["providerId"], json!(4));
        assert_eq!(concise["recordedAt"], json!(99));

        let full = location.to_json(false);
        assert_eq!(full["altitude"], json!(12.0));
        assert_eq!(RecordedLocation::from_json(&full), location);
    }

    #[test]
    fn test_sort_by_recorded_at() {
        let mut locations: Vec<RecordedLocation> = [30, 10, 20]
            .into_iter()
            .map(|t| RecordedLocation::new(GeoPoint::new(0.0, 0.0), t, ProviderType::Gps))
            .collect();

        sort_by_recorded_at(&mut locations, false);
        let times: Vec<i64> = locations.iter().map(|l| l.recorded_at).collect();
        assert_eq!(times, vec![10, 20, 30]);

        sort_by_recorded_at(&mut locations, true);
        let times: Vec<i64> = locations.iter().map(|l| l.recorded_at).collect();
        assert_eq!(times, vec![30, 20, 10]);
    }

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate("45.25"), 45.25);
        assert_eq!(parse_coordinate(" -73.5 "), -73.5);
        assert_eq!(parse_coordinate(""), NO_VALUE);
        assert_eq!(parse_coordinate("north"), NO_VALUE);
    }
}
