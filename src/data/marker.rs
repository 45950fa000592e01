use crate::{
    core::geo::LatLng,
    prelude::HashSet,
    traits::MarkerDataSource,
    MapError, Result,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    path::Path,
    sync::{Arc, RwLock},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Geometry {
    location: LatLng,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// A point of interest as delivered by the marker data provider.
///
/// Serialized in the provider's place shape:
/// `{ "place_id": "...", "geometry": { "location": { "lat": .., "lng": .. } }, ... }`.
/// Every field the map does not read is kept in `extra` for the click handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerRecord {
    #[serde(rename = "place_id")]
    pub id: String,
    geometry: Geometry,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MarkerRecord {
    pub fn new(id: impl Into<String>, location: LatLng) -> Self {
        Self {
            id: id.into(),
            geometry: Geometry {
                location,
                extra: Map::new(),
            },
            extra: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn location(&self) -> LatLng {
        self.geometry.location
    }

    pub fn lat(&self) -> f64 {
        self.geometry.location.lat
    }

    pub fn lng(&self) -> f64 {
        self.geometry.location.lng
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(MapError::InvalidCoordinates("marker without place_id".to_string()).into());
        }
        if !self.location().is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "marker {} has invalid location {:?}",
                self.id,
                self.location()
            ))
            .into());
        }
        Ok(())
    }
}

/// Parses a JSON array of place records, rejecting bad coordinates and duplicate ids
pub fn parse_markers(json: &str) -> Result<Vec<MarkerRecord>> {
    let markers: Vec<MarkerRecord> = serde_json::from_str(json).map_err(MapError::from)?;

    let mut seen = HashSet::default();
    for marker in &markers {
        marker.validate()?;
        if !seen.insert(marker.id.as_str()) {
            return Err(MapError::InvalidCoordinates(format!(
                "duplicate place_id {}",
                marker.id
            ))
            .into());
        }
    }

    Ok(markers)
}

/// In-memory marker provider.
///
/// Each [`replace`](Self::replace) publishes a new snapshot; readers holding
/// the previous `Arc` keep seeing the old data.
#[derive(Debug)]
pub struct StaticMarkerSource {
    markers: RwLock<Arc<[MarkerRecord]>>,
}

impl StaticMarkerSource {
    pub fn new(markers: Vec<MarkerRecord>) -> Self {
        Self {
            markers: RwLock::new(markers.into()),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(Self::new(parse_markers(json)?))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(MapError::from)?;
        let source = Self::from_json_str(&json)?;
        log::info!(
            "loaded {} markers from {}",
            source.markers().len(),
            path.display()
        );
        Ok(source)
    }

    pub fn replace(&self, markers: Vec<MarkerRecord>) {
        match self.markers.write() {
            Ok(mut guard) => *guard = markers.into(),
            Err(poisoned) => *poisoned.into_inner() = markers.into(),
        }
    }
}

impl Default for StaticMarkerSource {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl MarkerDataSource for StaticMarkerSource {
    fn markers(&self) -> Arc<[MarkerRecord]> {
        match self.markers.read() {
            Ok(guard) => (*guard).clone(),
            Err(poisoned) => (*poisoned.into_inner()).clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PLACES: &str = r#"[
        {
            "place_id": "ChIJ-a",
            "formatted_address": "Antakya, Hatay",
            "geometry": { "location": { "lat": 36.2021, "lng": 36.1606 }, "location_type": "APPROXIMATE" }
        },
        {
            "place_id": "ChIJ-b",
            "geometry": { "location": { "lat": 37.0662, "lng": 37.3833 } }
        }
    ]"#;

    #[test]
    fn test_parse_place_shape() {
        let markers = parse_markers(PLACES).unwrap();
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].id, "ChIJ-a");
        assert_eq!(markers[0].location(), LatLng::new(36.2021, 36.1606));
        assert_eq!(
            markers[0].field("formatted_address"),
            Some(&json!("Antakya, Hatay"))
        );
        assert!(markers[1].extra.is_empty());
    }

    #[test]
    fn test_extra_fields_survive_round_trip() {
        let markers = parse_markers(PLACES).unwrap();
        let value = serde_json::to_value(&markers[0]).unwrap();
        assert_eq!(value["geometry"]["location_type"], json!("APPROXIMATE"));
        assert_eq!(value["place_id"], json!("ChIJ-a"));
    }

    #[test]
    fn test_rejects_bad_records() {
        let out_of_range = r#"[{ "place_id": "x", "geometry": { "location": { "lat": 120.0, "lng": 36.0 } } }]"#;
        assert!(parse_markers(out_of_range).is_err());

        let duplicate = r#"[
            { "place_id": "x", "geometry": { "location": { "lat": 36.0, "lng": 36.0 } } },
            { "place_id": "x", "geometry": { "location": { "lat": 37.0, "lng": 37.0 } } }
        ]"#;
        assert!(parse_markers(duplicate).is_err());

        let missing_location = r#"[{ "place_id": "x", "geometry": {} }]"#;
        assert!(parse_markers(missing_location).is_err());
    }

    #[test]
    fn test_source_snapshots() {
        let source = StaticMarkerSource::new(vec![MarkerRecord::new("a", LatLng::new(36.0, 36.0))]);
        let first = source.markers();
        assert!(Arc::ptr_eq(&first, &source.markers()));

        source.replace(vec![
            MarkerRecord::new("a", LatLng::new(36.0, 36.0)),
            MarkerRecord::new("b", LatLng::new(37.0, 37.0)),
        ]);
        let second = source.markers();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 2);
    }
}
