#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Canonical crime incident record and geographic point types.
//!
//! Every ingestion path (structured open-data feed, text bulletin) produces
//! [`CrimeIncident`] records in this shared shape. Records are immutable
//! after creation; a reprocessing pass emits fresh records rather than
//! mutating previously published ones.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Placeholder offense type for source records missing a classification.
pub const UNKNOWN_CRIME: &str = "Unknown Crime";

/// Placeholder location for source records missing an address.
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// Placeholder for date/time fields that are absent from the source record.
pub const UNKNOWN: &str = "Unknown";

/// Which ingestion path produced a record.
///
/// Also selects the date/time grammar used to interpret the record's raw
/// date and time encodings.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentSource {
    /// Geo-tagged open-data point feed (FeatureCollection document).
    StructuredFeed,
    /// Text bulletin recovered from a periodically published document.
    Bulletin,
}

/// A WGS84 coordinate pair.
///
/// Used both for incident coordinates and for route polyline vertices. An
/// ordered slice of points is a route; ordering defines segment adjacency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    /// Latitude (WGS84 decimal degrees).
    pub latitude: f64,
    /// Longitude (WGS84 decimal degrees).
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a point from a latitude/longitude pair.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A crime incident normalized to the canonical shape.
///
/// `offense_type` and `location` are never empty; loaders substitute
/// [`UNKNOWN_CRIME`] / [`UNKNOWN_LOCATION`] when the source omits them.
/// `display_date` and `display_time` are always set; when normalization
/// fails they carry the raw value, or [`UNKNOWN`] when the raw value is
/// itself empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrimeIncident {
    /// Human-readable classification (e.g. "Burglary").
    pub offense_type: String,
    /// Free-text address/location description.
    pub location: String,
    /// Original source date encoding, retained for sort/debug.
    pub raw_date: String,
    /// Original source time encoding, retained for sort/debug.
    pub raw_time: String,
    /// Normalized, user-facing date.
    pub display_date: String,
    /// Normalized, user-facing time.
    pub display_time: String,
    /// Coordinates, present only when the source is geo-tagged. Bulletin
    /// incidents never carry coordinates.
    pub coordinates: Option<GeoPoint>,
    /// Which ingestion path produced this record.
    pub source: IncidentSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incident_source_serializes_screaming_snake() {
        let json = serde_json::to_string(&IncidentSource::StructuredFeed).unwrap();
        assert_eq!(json, "\"STRUCTURED_FEED\"");
        let json = serde_json::to_string(&IncidentSource::Bulletin).unwrap();
        assert_eq!(json, "\"BULLETIN\"");
    }

    #[test]
    fn incident_round_trips_through_json() {
        let incident = CrimeIncident {
            offense_type: "LARCENY".to_string(),
            location: "123 University Pl".to_string(),
            raw_date: "12/07/2025".to_string(),
            raw_time: "14:32".to_string(),
            display_date: "12/07/2025".to_string(),
            display_time: "14:32".to_string(),
            coordinates: Some(GeoPoint::new(43.0384, -76.1343)),
            source: IncidentSource::Bulletin,
        };
        let json = serde_json::to_string(&incident).unwrap();
        let back: CrimeIncident = serde_json::from_str(&json).unwrap();
        assert_eq!(back, incident);
    }
}
