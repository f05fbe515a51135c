//! The proximity query contract.
//!
//! A query is a center and a radius in whole meters. Results are every pin
//! within the radius, nearest first; pins at equal distance keep the order in
//! which they were stored. Store backends either evaluate the query
//! themselves with the same metric ([`crate::geo::haversine_m`]) or call
//! [`rank_nearby`] over their pins.
//!
//! Radius parsing follows the public API's rules: absent or non-numeric
//! input falls back to [`DEFAULT_MAX_DISTANCE_M`]; a numeric value that is
//! zero, negative or beyond `u32` is rejected.

use serde::Serialize;

use crate::geo::{GeoPoint, haversine_m};
use crate::types::{NearbyPin, Pin};

/// Radius used when the caller does not supply a usable one, in meters.
pub const DEFAULT_MAX_DISTANCE_M: u32 = 5000;

/// Errors produced while building a [`ProximityQuery`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProximityError {
    /// Latitude/longitude missing, non-numeric or out of range.
    #[error("invalid center: {0}")]
    InvalidCenter(String),
    /// Radius zero, negative or too large.
    #[error("invalid radius: {0}")]
    InvalidRadius(String),
}

/// A validated proximity query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProximityQuery {
    center: GeoPoint,
    max_distance_m: u32,
}

impl ProximityQuery {
    /// Create a query from already-validated parts.
    ///
    /// # Errors
    ///
    /// Returns [`ProximityError::InvalidRadius`] when `max_distance_m` is 0.
    pub fn new(center: GeoPoint, max_distance_m: u32) -> Result<Self, ProximityError> {
        if max_distance_m == 0 {
            return Err(ProximityError::InvalidRadius(
                "must be greater than 0".to_owned(),
            ));
        }
        Ok(Self {
            center,
            max_distance_m,
        })
    }

    /// Build a query from raw request parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ProximityError::InvalidCenter`] for a missing, non-numeric or
    /// out-of-range latitude/longitude, and [`ProximityError::InvalidRadius`]
    /// per [`parse_max_distance`].
    pub fn from_params(
        latitude: Option<&str>,
        longitude: Option<&str>,
        max_distance: Option<&str>,
    ) -> Result<Self, ProximityError> {
        let latitude = parse_component("latitude", latitude)?;
        let longitude = parse_component("longitude", longitude)?;
        let center = GeoPoint::new(latitude, longitude)
            .map_err(|e| ProximityError::InvalidCenter(e.to_string()))?;
        Self::new(center, parse_max_distance(max_distance)?)
    }

    #[must_use]
    pub const fn center(&self) -> GeoPoint {
        self.center
    }

    #[must_use]
    pub const fn max_distance_m(&self) -> u32 {
        self.max_distance_m
    }

    /// Distance from the center to `point`, if it is within the radius.
    #[must_use]
    pub fn distance_within(&self, point: GeoPoint) -> Option<f64> {
        let d = haversine_m(self.center, point);
        (d <= f64::from(self.max_distance_m)).then_some(d)
    }
}

fn parse_component(name: &str, raw: Option<&str>) -> Result<f64, ProximityError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ProximityError::InvalidCenter(format!("{name} is required")))?;
    raw.parse::<f64>()
        .map_err(|_| ProximityError::InvalidCenter(format!("{name} must be a number, got {raw:?}")))
}

/// Parse a radius parameter in meters.
///
/// - absent, empty or non-numeric: [`DEFAULT_MAX_DISTANCE_M`]
/// - integer: used as-is
/// - finite decimal: truncated toward zero
///
/// ```rust
/// use songpin_core::proximity::parse_max_distance;
///
/// assert_eq!(parse_max_distance(None), Ok(5000));
/// assert_eq!(parse_max_distance(Some("abc")), Ok(5000));
/// assert_eq!(parse_max_distance(Some("10000")), Ok(10000));
/// assert_eq!(parse_max_distance(Some("250.9")), Ok(250));
/// assert!(parse_max_distance(Some("0")).is_err());
/// assert!(parse_max_distance(Some("-5")).is_err());
/// ```
///
/// # Errors
///
/// Returns [`ProximityError::InvalidRadius`] when the number is not positive
/// after truncation or does not fit in a `u32`.
#[allow(clippy::cast_possible_truncation)]
pub fn parse_max_distance(raw: Option<&str>) -> Result<u32, ProximityError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(DEFAULT_MAX_DISTANCE_M);
    };

    let meters = if let Ok(n) = raw.parse::<i64>() {
        n
    } else {
        match raw.parse::<f64>() {
            // `as` saturates; the u32 conversion below rejects anything huge
            Ok(f) if f.is_finite() => f.trunc() as i64,
            _ => return Ok(DEFAULT_MAX_DISTANCE_M),
        }
    };

    if meters <= 0 {
        return Err(ProximityError::InvalidRadius(format!(
            "must be greater than 0, got {raw}"
        )));
    }
    u32::try_from(meters)
        .map_err(|_| ProximityError::InvalidRadius(format!("{raw} is too large")))
}

/// Filter `pins` to those within the query radius, nearest first.
///
/// Ties keep iteration order, so callers pass pins in insertion order.
pub fn rank_nearby<'a, I>(query: &ProximityQuery, pins: I) -> Vec<NearbyPin>
where
    I: IntoIterator<Item = &'a Pin>,
{
    let mut hits: Vec<NearbyPin> = pins
        .into_iter()
        .filter_map(|pin| {
            query.distance_within(pin.coordinate).map(|distance_m| NearbyPin {
                pin: pin.clone(),
                distance_m,
            })
        })
        .collect();

    // sort_by is stable
    hits.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
    hits
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geo::destination;
    use crate::types::{Song, UserId};

    fn geo(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    fn pin_at(song: &str, point: GeoPoint) -> Pin {
        Pin::new(
            Song::parse(song).unwrap(),
            UserId::parse("12345").unwrap(),
            point,
        )
    }

    const NYC: (f64, f64) = (40.7128, -74.006);
    const LA: (f64, f64) = (34.0522, -118.2437);

    #[test]
    fn test_nyc_query_excludes_la() {
        let query = ProximityQuery::new(geo(NYC.0, NYC.1), 10_000).unwrap();
        let pins = [
            pin_at("Shape of You", geo(NYC.0, NYC.1)),
            pin_at("Blinding Lights", geo(LA.0, LA.1)),
        ];

        let hits = rank_nearby(&query, &pins);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].pin.song.as_str(), "Shape of You");
        assert!(hits[0].distance_m.abs() < 1e-6);
    }

    #[test]
    fn test_default_radius_boundary() {
        let center = geo(NYC.0, NYC.1);
        let query =
            ProximityQuery::from_params(Some("40.7128"), Some("-74.006"), None).unwrap();
        assert_eq!(query.max_distance_m(), DEFAULT_MAX_DISTANCE_M);

        let pins = [
            pin_at("four", destination(center, 90.0, 4000.0).unwrap()),
            pin_at("six", destination(center, 90.0, 6000.0).unwrap()),
        ];
        let hits = rank_nearby(&query, &pins);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].pin.song.as_str(), "four");
    }

    #[test]
    fn test_results_are_nearest_first() {
        let center = geo(0.0, 0.0);
        let query = ProximityQuery::new(center, 50_000).unwrap();
        let pins = [
            pin_at("far", destination(center, 10.0, 30_000.0).unwrap()),
            pin_at("near", destination(center, 200.0, 1_000.0).unwrap()),
            pin_at("mid", destination(center, 300.0, 12_000.0).unwrap()),
        ];
        let order: Vec<_> = rank_nearby(&query, &pins)
            .into_iter()
            .map(|n| n.pin.song.to_string())
            .collect();
        assert_eq!(order, ["near", "mid", "far"]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let spot = geo(48.8566, 2.3522);
        let query = ProximityQuery::new(spot, 100).unwrap();
        let pins = [pin_at("first", spot), pin_at("second", spot), pin_at("third", spot)];
        let order: Vec<_> = rank_nearby(&query, &pins)
            .into_iter()
            .map(|n| n.pin.song.to_string())
            .collect();
        assert_eq!(order, ["first", "second", "third"]);
    }

    #[test]
    fn test_empty_result_is_not_an_error() {
        let query = ProximityQuery::new(geo(0.0, 0.0), 1).unwrap();
        assert!(rank_nearby(&query, &Vec::<Pin>::new()).is_empty());
    }

    #[test]
    fn test_parse_max_distance_rules() {
        assert_eq!(parse_max_distance(Some("")), Ok(DEFAULT_MAX_DISTANCE_M));
        assert_eq!(parse_max_distance(Some("  ")), Ok(DEFAULT_MAX_DISTANCE_M));
        assert_eq!(parse_max_distance(Some("NaN")), Ok(DEFAULT_MAX_DISTANCE_M));
        assert_eq!(parse_max_distance(Some("inf")), Ok(DEFAULT_MAX_DISTANCE_M));
        assert_eq!(parse_max_distance(Some(" 42 ")), Ok(42));
        assert!(matches!(
            parse_max_distance(Some("0.4")),
            Err(ProximityError::InvalidRadius(_))
        ));
        assert!(matches!(
            parse_max_distance(Some("99999999999")),
            Err(ProximityError::InvalidRadius(_))
        ));
    }

    #[test]
    fn test_from_params_center_errors() {
        assert!(matches!(
            ProximityQuery::from_params(None, Some("0"), None),
            Err(ProximityError::InvalidCenter(_))
        ));
        assert!(matches!(
            ProximityQuery::from_params(Some("north"), Some("0"), None),
            Err(ProximityError::InvalidCenter(_))
        ));
        assert!(matches!(
            ProximityQuery::from_params(Some("95"), Some("0"), None),
            Err(ProximityError::InvalidCenter(_))
        ));
        assert!(matches!(
            ProximityQuery::from_params(Some("10"), Some("-181"), None),
            Err(ProximityError::InvalidCenter(_))
        ));
    }

    #[test]
    fn test_new_rejects_zero_radius() {
        assert!(matches!(
            ProximityQuery::new(geo(0.0, 0.0), 0),
            Err(ProximityError::InvalidRadius(_))
        ));
    }
}
