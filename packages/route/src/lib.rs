#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Route–incident correlation.
//!
//! Given a route polyline and a set of incidents with coordinates,
//! determines which incidents lie within a buffer distance of the route.
//! Pure, synchronous and stateless: no I/O, no shared state, safe to call
//! from any thread, including the caller's primary thread for small
//! incident sets.

use crime_track_models::{CrimeIncident, GeoPoint};
use geo::{Bearing, Distance, Haversine, Point};

/// Default buffer radius in meters (≈ 1 mile).
pub const DEFAULT_BUFFER_RADIUS_M: f64 = 1609.34;

/// Mean earth radius used for the angular cross-track math, matching the
/// sphere the haversine measures are computed on.
const MEAN_EARTH_RADIUS_M: f64 = 6_371_008.771_415_059;

/// The set of incidents within the buffer radius of a route.
///
/// Built in a single pass over the incident set, so membership is keyed by
/// incident identity and duplicates are impossible. Correlating the same
/// inputs twice yields the same result.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CorrelationResult {
    /// The matching incidents, in input order.
    pub matches: Vec<CrimeIncident>,
}

impl CorrelationResult {
    /// Number of incidents along the route.
    #[must_use]
    pub fn count(&self) -> usize {
        self.matches.len()
    }

    /// Returns `true` when no incident fell within the buffer.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Returns the incidents whose coordinates lie within `radius_m` meters of
/// the route polyline.
///
/// Incidents without coordinates are excluded up front. An incident exactly
/// at the buffer boundary is included (`<=`, not `<`). A route with fewer
/// than 2 points yields an empty result, not an error.
#[must_use]
pub fn correlate(
    route: &[GeoPoint],
    incidents: &[CrimeIncident],
    radius_m: f64,
) -> CorrelationResult {
    if route.len() < 2 {
        log::debug!("correlate: route has {} points, no match set", route.len());
        return CorrelationResult::default();
    }

    let matches: Vec<CrimeIncident> = incidents
        .iter()
        .filter(|incident| {
            incident.coordinates.is_some_and(|coords| {
                distance_to_route(coords, route).is_some_and(|d| d <= radius_m)
            })
        })
        .cloned()
        .collect();

    log::info!(
        "correlate: {} of {} incidents within {radius_m} m of route",
        matches.len(),
        incidents.len(),
    );

    CorrelationResult { matches }
}

/// Minimum geodesic distance in meters from a point to the open polyline
/// formed by consecutive route points.
///
/// Returns `None` when the route has fewer than 2 points.
#[must_use]
pub fn distance_to_route(point: GeoPoint, route: &[GeoPoint]) -> Option<f64> {
    if route.len() < 2 {
        return None;
    }

    let p = to_point(point);
    route
        .windows(2)
        .map(|segment| point_to_segment_distance(p, to_point(segment[0]), to_point(segment[1])))
        .min_by(f64::total_cmp)
}

/// `geo` points are (x, y) = (longitude, latitude).
fn to_point(p: GeoPoint) -> Point<f64> {
    Point::new(p.longitude, p.latitude)
}

/// Minimum great-circle distance from `point` to the segment `a`–`b`.
///
/// Standard cross-track/along-track construction: project the point onto
/// the great circle through the segment, clamping to the segment's
/// endpoints when the projection falls outside it.
fn point_to_segment_distance(point: Point<f64>, a: Point<f64>, b: Point<f64>) -> f64 {
    let d_ap = Haversine.distance(a, point);
    let d_ab = Haversine.distance(a, b);

    if d_ab == 0.0 || d_ap == 0.0 {
        return d_ap;
    }

    let relative = (Haversine.bearing(a, point) - Haversine.bearing(a, b)).to_radians();

    // Projection falls behind the segment start.
    if relative.cos() <= 0.0 {
        return d_ap;
    }

    let angular_ap = d_ap / MEAN_EARTH_RADIUS_M;
    let cross_track = (angular_ap.sin() * relative.sin()).asin();
    let along_track =
        (angular_ap.cos() / cross_track.cos()).clamp(-1.0, 1.0).acos() * MEAN_EARTH_RADIUS_M;

    // Projection falls beyond the segment end.
    if along_track > d_ab {
        return Haversine.distance(b, point);
    }

    cross_track.abs() * MEAN_EARTH_RADIUS_M
}

#[cfg(test)]
mod tests {
    use crime_track_models::IncidentSource;

    use super::*;

    fn incident(name: &str, coordinates: Option<GeoPoint>) -> CrimeIncident {
        CrimeIncident {
            offense_type: name.to_string(),
            location: "somewhere".to_string(),
            raw_date: "12/07/2025".to_string(),
            raw_time: "14:32".to_string(),
            display_date: "12/07/2025".to_string(),
            display_time: "14:32".to_string(),
            coordinates,
            source: IncidentSource::StructuredFeed,
        }
    }

    /// Equatorial route from (0°, 0°) to (0°, 1°E).
    fn equator_route() -> Vec<GeoPoint> {
        vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0)]
    }

    /// A point `meters` east of the route's end vertex, along the equator.
    fn east_of_route_end(meters: f64) -> GeoPoint {
        let delta_deg = (meters / MEAN_EARTH_RADIUS_M).to_degrees();
        GeoPoint::new(0.0, 1.0 + delta_deg)
    }

    #[test]
    fn incident_on_route_matches_at_zero_distance() {
        let route = equator_route();
        let on_route = GeoPoint::new(0.0, 0.5);
        let d = distance_to_route(on_route, &route).unwrap();
        assert!(d < 1.0, "expected ~0 m, got {d}");

        let result = correlate(&route, &[incident("on-route", Some(on_route))], 0.0);
        assert_eq!(result.count(), 1);
    }

    #[test]
    fn cross_track_distance_is_sane() {
        // One degree of latitude north of the segment midpoint is about
        // 111 km off the route.
        let d = distance_to_route(GeoPoint::new(1.0, 0.5), &equator_route()).unwrap();
        assert!((d - 111_195.0).abs() < 100.0, "got {d}");
    }

    #[test]
    fn boundary_is_inclusive() {
        let route = equator_route();
        let near_boundary = east_of_route_end(DEFAULT_BUFFER_RADIUS_M);
        let incidents = [incident("boundary", Some(near_boundary))];

        // Exactly the measured distance matches (<=); a hair under the
        // measured distance does not.
        let d = distance_to_route(near_boundary, &route).unwrap();
        assert!((d - DEFAULT_BUFFER_RADIUS_M).abs() < 0.01);
        assert_eq!(correlate(&route, &incidents, d).count(), 1);
        assert_eq!(correlate(&route, &incidents, d - 0.01).count(), 0);
    }

    #[test]
    fn just_past_boundary_is_excluded() {
        let route = equator_route();
        let past = east_of_route_end(1609.35);
        let result = correlate(
            &route,
            &[incident("past", Some(past))],
            DEFAULT_BUFFER_RADIUS_M,
        );
        assert!(result.is_empty());
    }

    #[test]
    fn incidents_without_coordinates_are_excluded() {
        let result = correlate(
            &equator_route(),
            &[incident("bulletin-derived", None)],
            DEFAULT_BUFFER_RADIUS_M,
        );
        assert!(result.is_empty());
    }

    #[test]
    fn degenerate_routes_yield_empty_results() {
        let incidents = [incident("anywhere", Some(GeoPoint::new(0.0, 0.5)))];
        assert!(correlate(&[], &incidents, DEFAULT_BUFFER_RADIUS_M).is_empty());
        assert!(
            correlate(
                &[GeoPoint::new(0.0, 0.5)],
                &incidents,
                DEFAULT_BUFFER_RADIUS_M
            )
            .is_empty()
        );
        assert!(distance_to_route(GeoPoint::new(0.0, 0.5), &[]).is_none());
    }

    #[test]
    fn correlation_is_idempotent() {
        let route = vec![
            GeoPoint::new(43.0384, -76.1343),
            GeoPoint::new(43.0450, -76.1300),
            GeoPoint::new(43.0500, -76.1200),
        ];
        let incidents = [
            incident("near", Some(GeoPoint::new(43.0400, -76.1320))),
            incident("far", Some(GeoPoint::new(43.5000, -76.5000))),
            incident("no-coords", None),
        ];

        let first = correlate(&route, &incidents, DEFAULT_BUFFER_RADIUS_M);
        let second = correlate(&route, &incidents, DEFAULT_BUFFER_RADIUS_M);
        assert_eq!(first, second);
        assert_eq!(first.count(), 1);
        assert_eq!(first.matches[0].offense_type, "near");
    }

    #[test]
    fn vertex_clamping_uses_nearest_endpoint() {
        // A point west of the route start is measured to the start vertex.
        let west = GeoPoint::new(0.0, -0.5);
        let d = distance_to_route(west, &equator_route()).unwrap();
        let expected = 0.5_f64.to_radians() * MEAN_EARTH_RADIUS_M;
        assert!((d - expected).abs() < 1.0, "got {d}, expected {expected}");
    }
}
