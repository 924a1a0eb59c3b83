//! Structured open-data point feed loader.
//!
//! The feed is a FeatureCollection document: one feature per incident, a
//! property bag (`ADDRESS`, `CODE_DEFINED`, `DATEEND`, `TIMESTART`) and a
//! point geometry in `[longitude, latitude]` order. Individual features
//! missing fields are never dropped, since downstream display must account
//! for every published incident. A structurally broken document fails the
//! whole batch with no partial emission.

use crime_track_models::{
    CrimeIncident, GeoPoint, IncidentSource, UNKNOWN_CRIME, UNKNOWN_LOCATION,
};
use geojson::{Feature, GeoJson};

use crate::IngestionError;
use crate::parsing::{normalize_feed_date, normalize_feed_time};

/// Parses a raw feed document into canonical incidents.
///
/// # Errors
///
/// Returns [`IngestionError::StructuralParse`] when the document is not a
/// valid FeatureCollection.
pub fn parse_feed(raw: &str) -> Result<Vec<CrimeIncident>, IngestionError> {
    let geojson = raw
        .parse::<GeoJson>()
        .map_err(|e| IngestionError::StructuralParse {
            message: e.to_string(),
        })?;

    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(IngestionError::StructuralParse {
            message: "top-level value is not a FeatureCollection".to_string(),
        });
    };

    let mut incidents = Vec::with_capacity(collection.features.len());

    for feature in &collection.features {
        incidents.push(feature_to_incident(feature));
    }

    log::info!("structured feed: parsed {} incidents", incidents.len());

    Ok(incidents)
}

/// Maps a single feature to a canonical incident, substituting placeholders
/// for missing fields.
fn feature_to_incident(feature: &Feature) -> CrimeIncident {
    let location =
        property_string(feature, "ADDRESS").unwrap_or_else(|| UNKNOWN_LOCATION.to_string());
    let offense_type =
        property_string(feature, "CODE_DEFINED").unwrap_or_else(|| UNKNOWN_CRIME.to_string());
    let raw_date = property_string(feature, "DATEEND").unwrap_or_default();
    let raw_time = property_string(feature, "TIMESTART").unwrap_or_default();

    let display_date = normalize_feed_date(&raw_date);
    let display_time = normalize_feed_time(&raw_time);

    CrimeIncident {
        offense_type,
        location,
        display_date,
        display_time,
        raw_date,
        raw_time,
        coordinates: point_coordinates(feature),
        source: IncidentSource::StructuredFeed,
    }
}

/// Reads a property as a non-empty string. Numeric values are rendered to
/// strings; some portals publish `TIMESTART` clock values as bare numbers.
fn property_string(feature: &Feature, key: &str) -> Option<String> {
    let value = feature.properties.as_ref()?.get(key)?;
    if let Some(s) = value.as_str() {
        if s.is_empty() {
            return None;
        }
        return Some(s.to_string());
    }
    value.as_i64().map(|n| n.to_string())
}

/// Extracts the `[longitude, latitude]` pair of a point geometry,
/// re-ordered to (lat, lng).
///
/// Non-point geometries contribute a display-only incident without
/// coordinates. Zero or out-of-range coordinates are treated as missing.
fn point_coordinates(feature: &Feature) -> Option<GeoPoint> {
    let geometry = feature.geometry.as_ref()?;
    let geojson::Value::Point(coords) = &geometry.value else {
        log::debug!("structured feed: non-point geometry, emitting without coordinates");
        return None;
    };

    let longitude = *coords.first()?;
    let latitude = *coords.get(1)?;

    if latitude == 0.0
        || longitude == 0.0
        || !(-90.0..=90.0).contains(&latitude)
        || !(-180.0..=180.0).contains(&longitude)
    {
        return None;
    }

    Some(GeoPoint::new(latitude, longitude))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_doc(features: serde_json::Value) -> String {
        serde_json::json!({
            "type": "FeatureCollection",
            "features": features,
        })
        .to_string()
    }

    #[test]
    fn parses_geo_tagged_feature() {
        let raw = feed_doc(serde_json::json!([{
            "type": "Feature",
            "properties": {
                "ADDRESS": "100 Waverly Ave",
                "CODE_DEFINED": "Burglary",
                "DATEEND": "Thu, 02 Jan 2025 00:00:00 EST",
                "TIMESTART": "1806",
            },
            "geometry": {
                "type": "Point",
                "coordinates": [-76.1343, 43.0384],
            },
        }]));

        let incidents = parse_feed(&raw).unwrap();
        assert_eq!(incidents.len(), 1);

        let incident = &incidents[0];
        assert_eq!(incident.offense_type, "Burglary");
        assert_eq!(incident.location, "100 Waverly Ave");
        assert_eq!(incident.display_date, "01/02/2025");
        assert_eq!(incident.display_time, "06:06 PM");
        assert_eq!(incident.raw_date, "Thu, 02 Jan 2025 00:00:00 EST");
        assert_eq!(incident.raw_time, "1806");

        let coords = incident.coordinates.unwrap();
        assert!((coords.latitude - 43.0384).abs() < f64::EPSILON);
        assert!((coords.longitude - -76.1343).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_fields_get_placeholders() {
        let raw = feed_doc(serde_json::json!([{
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "Point",
                "coordinates": [-76.1343, 43.0384],
            },
        }]));

        let incidents = parse_feed(&raw).unwrap();
        assert_eq!(incidents.len(), 1);
        assert_eq!(incidents[0].location, "Unknown Location");
        assert_eq!(incidents[0].offense_type, "Unknown Crime");
        assert_eq!(incidents[0].display_date, "Unknown");
        assert_eq!(incidents[0].display_time, "Unknown");
    }

    #[test]
    fn empty_address_gets_placeholder() {
        let raw = feed_doc(serde_json::json!([{
            "type": "Feature",
            "properties": {"ADDRESS": ""},
            "geometry": null,
        }]));

        let incidents = parse_feed(&raw).unwrap();
        assert_eq!(incidents[0].location, "Unknown Location");
    }

    #[test]
    fn numeric_time_is_rendered() {
        let raw = feed_doc(serde_json::json!([{
            "type": "Feature",
            "properties": {"TIMESTART": 806},
            "geometry": null,
        }]));

        let incidents = parse_feed(&raw).unwrap();
        assert_eq!(incidents[0].raw_time, "806");
        assert_eq!(incidents[0].display_time, "08:06 AM");
    }

    #[test]
    fn non_point_geometry_has_no_coordinates() {
        let raw = feed_doc(serde_json::json!([{
            "type": "Feature",
            "properties": {"ADDRESS": "100 Waverly Ave"},
            "geometry": {
                "type": "LineString",
                "coordinates": [[-76.1, 43.0], [-76.2, 43.1]],
            },
        }]));

        let incidents = parse_feed(&raw).unwrap();
        assert_eq!(incidents.len(), 1);
        assert!(incidents[0].coordinates.is_none());
        assert_eq!(incidents[0].location, "100 Waverly Ave");
    }

    #[test]
    fn zero_coordinates_are_treated_as_missing() {
        let raw = feed_doc(serde_json::json!([{
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "Point",
                "coordinates": [0.0, 0.0],
            },
        }]));

        let incidents = parse_feed(&raw).unwrap();
        assert!(incidents[0].coordinates.is_none());
    }

    #[test]
    fn malformed_document_is_a_structural_error() {
        let err = parse_feed("{not json").unwrap_err();
        assert!(matches!(err, IngestionError::StructuralParse { .. }));

        let err = parse_feed("{\"type\": \"Point\", \"coordinates\": [0, 0]}").unwrap_err();
        assert!(matches!(err, IngestionError::StructuralParse { .. }));
    }

    #[test]
    fn empty_collection_is_empty_not_an_error() {
        let incidents = parse_feed(&feed_doc(serde_json::json!([]))).unwrap();
        assert!(incidents.is_empty());
    }
}
