//! Great-circle distance between GPS readings and job sites.
//!
//! Null propagates: a missing reading (or an un-geocoded job) yields no
//! distance at all, which downstream code must never conflate with a
//! distance of zero.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Spherical-earth radius used for the haversine formula, in miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Coord {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coord {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Coord { latitude, longitude }
    }

    /// Builds a coordinate only when both components are present.
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(lat), Some(lng)) => Some(Coord::new(lat, lng)),
            _ => None,
        }
    }
}

/// Haversine great-circle distance in miles between two points.
pub fn haversine_miles(a: Coord, b: Coord) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlng = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().asin()
}

/// Distance in miles, or `None` when either point is absent. Full
/// precision is retained here; rounding happens only for display.
pub fn distance_miles(a: Option<Coord>, b: Option<Coord>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(haversine_miles(a, b)),
        _ => None,
    }
}

/// Stable 2-decimal rounding for report rows.
pub fn round2(miles: f64) -> f64 {
    (miles * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance_at_same_point() {
        let p = Coord::new(40.0, -74.0);
        let d = distance_miles(Some(p), Some(p)).unwrap();
        assert!(d.abs() < 1e-9);
    }

    #[test]
    fn test_known_offset_distance() {
        // 0.03 degrees of latitude is about 2.07 miles.
        let site = Coord::new(40.0, -74.0);
        let away = Coord::new(40.03, -74.0);
        let d = distance_miles(Some(site), Some(away)).unwrap();
        assert!((d - 2.07).abs() < 0.02, "expected ~2.07 mi, got {}", d);
    }

    #[test]
    fn test_missing_point_yields_none_not_zero() {
        let p = Coord::new(40.0, -74.0);
        assert!(distance_miles(None, Some(p)).is_none());
        assert!(distance_miles(Some(p), None).is_none());
        assert!(distance_miles(None, None).is_none());
    }

    #[test]
    fn test_distance_is_non_negative_and_symmetric() {
        let a = Coord::new(40.7128, -74.0060);
        let b = Coord::new(40.7589, -73.9851);
        let d1 = haversine_miles(a, b);
        let d2 = haversine_miles(b, a);
        assert!(d1 > 0.0);
        assert!((d1 - d2).abs() < 1e-9);
    }

    #[test]
    fn test_from_parts_requires_both_components() {
        assert!(Coord::from_parts(Some(40.0), Some(-74.0)).is_some());
        assert!(Coord::from_parts(Some(40.0), None).is_none());
        assert!(Coord::from_parts(None, Some(-74.0)).is_none());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(2.0749), 2.07);
        assert_eq!(round2(0.005), 0.01);
        assert_eq!(round2(0.0), 0.0);
    }
}
