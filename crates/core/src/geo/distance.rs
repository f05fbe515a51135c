//! Great-circle distance on a spherical earth.
//!
//! Uses the same sphere radius as the document store's spherical geometry
//! (6 378 100 m), so distances computed here agree with stored-query results.

use super::point::{GeoError, GeoPoint};

/// Earth radius used for all great-circle math, in meters.
pub const EARTH_RADIUS_M: f64 = 6_378_100.0;

/// Haversine distance between two points, in meters.
///
/// ```rust
/// use songpin_core::{GeoPoint, geo::haversine_m};
///
/// let nyc = GeoPoint::new(40.7128, -74.006).unwrap();
/// let la = GeoPoint::new(34.0522, -118.2437).unwrap();
/// let km = haversine_m(nyc, la) / 1000.0;
/// assert!((3900.0..4000.0).contains(&km));
/// ```
#[must_use]
pub fn haversine_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude().to_radians();
    let lat2 = b.latitude().to_radians();
    let d_lat = lat2 - lat1;
    let d_lng = (b.longitude() - a.longitude()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.clamp(0.0, 1.0).sqrt().asin()
}

/// The point reached by travelling `distance_m` meters from `start` along the
/// great circle with initial `bearing_deg` (clockwise from north).
///
/// # Errors
///
/// Returns [`GeoError::NonFinite`] when the inputs produce a non-finite result.
pub fn destination(start: GeoPoint, bearing_deg: f64, distance_m: f64) -> Result<GeoPoint, GeoError> {
    let angular = distance_m / EARTH_RADIUS_M;
    let bearing = bearing_deg.to_radians();
    let lat1 = start.latitude().to_radians();
    let lng1 = start.longitude().to_radians();

    let sin_lat2 = lat1
        .sin()
        .mul_add(angular.cos(), lat1.cos() * angular.sin() * bearing.cos());
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();
    let lng2 = lng1
        + (bearing.sin() * angular.sin() * lat1.cos())
            .atan2(angular.cos() - lat1.sin() * sin_lat2);

    GeoPoint::normalized(lat2.to_degrees(), lng2.to_degrees())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn geo(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    #[test]
    fn test_zero_distance() {
        let p = geo(37.7749, -122.4194);
        assert!(haversine_m(p, p).abs() < 1e-6);
    }

    #[test]
    fn test_symmetric() {
        let a = geo(51.5074, -0.1278);
        let b = geo(48.8566, 2.3522);
        assert!((haversine_m(a, b) - haversine_m(b, a)).abs() < 1e-6);
    }

    #[test]
    fn test_quarter_meridian() {
        let d = haversine_m(geo(0.0, 0.0), geo(90.0, 0.0));
        let expected = EARTH_RADIUS_M * std::f64::consts::FRAC_PI_2;
        assert!((d - expected).abs() < 1e-3);
    }

    #[test]
    fn test_across_antimeridian() {
        let d = haversine_m(geo(0.0, 179.5), geo(0.0, -179.5));
        let expected = EARTH_RADIUS_M * 1f64.to_radians();
        assert!((d - expected).abs() < 1e-3);
    }

    #[test]
    fn test_destination_roundtrip_distance() {
        let nyc = geo(40.7128, -74.006);
        for bearing in [0.0, 45.0, 90.0, 200.0, 315.0] {
            for meters in [10.0, 4000.0, 6000.0, 250_000.0] {
                let p = destination(nyc, bearing, meters).unwrap();
                assert!(
                    (haversine_m(nyc, p) - meters).abs() < 1e-3,
                    "bearing {bearing}, {meters} m"
                );
            }
        }
    }

    #[test]
    fn test_destination_due_north() {
        let p = destination(geo(0.0, 10.0), 0.0, 111_000.0).unwrap();
        assert!(p.latitude() > 0.9 && p.latitude() < 1.1);
        assert!((p.longitude() - 10.0).abs() < 1e-9);
    }
}
