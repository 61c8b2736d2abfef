//! GeoJSON import of candidate places and export of distance rankings.

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use serde_json::json;
use std::fs;
use std::path::Path;

use crate::error::{GeobitsError, Result};
use crate::logger;
use crate::math::GeoPoint;
use crate::places::NamedPlace;

/// Reader for GeoJSON files of named points.
///
/// Keeps every `Point` feature that has a string `name` property. Optional
/// `region` and `time_zone` string properties are carried over. Coordinates
/// are WGS84 longitude/latitude.
pub struct PlacesReader {
    places: Vec<NamedPlace>,
}

impl PlacesReader {
    /// Opens and parses a GeoJSON file.
    pub fn open(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GeobitsError::FileNotFound(path.display().to_string())
            } else {
                GeobitsError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// Parses GeoJSON text.
    pub fn parse(content: &str) -> Result<Self> {
        let geojson: GeoJson = content
            .parse()
            .map_err(|e| GeobitsError::GeojsonParseError(format!("{}", e)))?;

        let places = extract_places(&geojson);
        if places.is_empty() {
            return Err(GeobitsError::EmptyGeojson);
        }
        logger::debug(&format!("Loaded {} places from GeoJSON", places.len()));

        Ok(Self { places })
    }

    pub fn places(&self) -> &[NamedPlace] {
        &self.places
    }

    pub fn into_places(self) -> Vec<NamedPlace> {
        self.places
    }
}

fn extract_places(geojson: &GeoJson) -> Vec<NamedPlace> {
    match geojson {
        // A bare geometry has nowhere to carry a name.
        GeoJson::Geometry(_) => Vec::new(),
        GeoJson::Feature(feature) => feature_to_place(feature).into_iter().collect(),
        GeoJson::FeatureCollection(collection) => collection
            .features
            .iter()
            .filter_map(feature_to_place)
            .collect(),
    }
}

fn feature_to_place(feature: &Feature) -> Option<NamedPlace> {
    let geometry = feature.geometry.as_ref()?;
    let location = match &geometry.value {
        Value::Point(position) if position.len() >= 2 => GeoPoint::new(position[1], position[0]),
        _ => return None,
    };

    let string_property =
        |key: &str| feature.property(key).and_then(|v| v.as_str()).map(str::to_string);

    let Some(name) = string_property("name") else {
        logger::warn("Skipping point feature without a 'name' property");
        return None;
    };

    Some(NamedPlace {
        name,
        region: string_property("region"),
        time_zone: string_property("time_zone"),
        location,
    })
}

/// Build a FeatureCollection with one point per ranked place.
///
/// Each feature carries `name`, `rank` (1-based), `distance_m`, and the
/// place's `region` / `time_zone` when known. The origin is recorded as a
/// top-level `origin` member.
pub fn ranking_to_feature_collection(
    origin: &GeoPoint,
    ranked: &[(&NamedPlace, f64)],
) -> FeatureCollection {
    let features = ranked
        .iter()
        .enumerate()
        .map(|(index, (place, distance))| {
            let mut properties = JsonObject::new();
            properties.insert("name".into(), json!(place.name));
            properties.insert("rank".into(), json!(index + 1));
            properties.insert("distance_m".into(), json!(distance));
            if let Some(region) = &place.region {
                properties.insert("region".into(), json!(region));
            }
            if let Some(time_zone) = &place.time_zone {
                properties.insert("time_zone".into(), json!(time_zone));
            }

            Feature {
                bbox: None,
                geometry: Some(point_geometry(&place.location)),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    let mut foreign_members = JsonObject::new();
    foreign_members.insert(
        "origin".into(),
        json!([origin.longitude, origin.latitude]),
    );

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(foreign_members),
    }
}

/// Write a FeatureCollection to disk, creating missing parent directories.
pub fn write_feature_collection(collection: &FeatureCollection, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, collection.to_string())?;
    Ok(())
}

fn point_geometry(point: &GeoPoint) -> Geometry {
    Geometry::new(Value::Point(vec![point.longitude, point.latitude]))
}
