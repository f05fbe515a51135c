//! Geographic points and their persisted `[longitude, latitude]` form.
//!
//! [`GeoPoint`] is the "where" used throughout the application and in all
//! projection math, which takes `(lat, lng)`. Storage and GeoJSON use the
//! opposite order, so the persisted pair gets its own type,
//! [`StoredCoordinate`], and the two only convert through `From`/`TryFrom`.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors produced by geographic validation and projection.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum GeoError {
    /// Latitude outside `[-90, 90]`.
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    /// Longitude outside `[-180, 180]`.
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    /// A coordinate component is NaN or infinite.
    #[error("coordinate components must be finite")]
    NonFinite,
    /// Inverse projection of a zero-length vector.
    #[error("cannot project a zero-length vector to a geographic point")]
    Degenerate,
    /// A persisted coordinate array does not have exactly two elements.
    #[error("persisted coordinate must have 2 elements, found {0}")]
    MalformedPair(usize),
}

/// A latitude/longitude pair in degrees.
///
/// ## Invariants
///
/// - `latitude` is finite and within `[-90, 90]`
/// - `longitude` is finite and within `[-180, 180]`
///
/// [`GeoPoint::new`] rejects values outside those ranges.
/// [`GeoPoint::normalized`] instead clamps latitude and wraps longitude, for
/// values computed rather than supplied by a client.
///
/// ```rust
/// use songpin_core::GeoPoint;
///
/// let nyc = GeoPoint::new(40.7128, -74.006).unwrap();
/// assert_eq!(nyc.to_string(), "40° 42' 46.08\" N, 74° 0' 21.60\" W");
///
/// assert!(GeoPoint::new(91.0, 0.0).is_err());
/// let wrapped = GeoPoint::normalized(95.0, 190.0).unwrap();
/// assert_eq!((wrapped.latitude(), wrapped.longitude()), (90.0, -170.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint", into = "RawGeoPoint")]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Create a validated point.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::NonFinite`] for NaN/infinite components, or the
    /// matching out-of-range error.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(GeoError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Create a point by clamping latitude and wrapping longitude into
    /// `[-180, 180)`.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::NonFinite`] for NaN/infinite components.
    pub fn normalized(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(GeoError::NonFinite);
        }
        Ok(Self {
            latitude: latitude.clamp(-90.0, 90.0),
            longitude: wrap_longitude(longitude),
        })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// The persisted `[longitude, latitude]` form of this point.
    #[must_use]
    pub const fn to_stored(self) -> StoredCoordinate {
        StoredCoordinate([self.longitude, self.latitude])
    }
}

/// Wrap a longitude into `[-180, 180)`.
#[must_use]
pub fn wrap_longitude(longitude: f64) -> f64 {
    let wrapped = (longitude + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 180.0 { wrapped - 360.0 } else { wrapped }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lat_dir = if self.latitude >= 0.0 { 'N' } else { 'S' };
        let lng_dir = if self.longitude >= 0.0 { 'E' } else { 'W' };
        write_dms(f, self.latitude, lat_dir)?;
        f.write_str(", ")?;
        write_dms(f, self.longitude, lng_dir)
    }
}

/// Degrees, whole minutes and seconds to two decimals, e.g. `40° 42' 46.08" N`.
///
/// Rounds to hundredths of a second before splitting, so a value just under
/// a whole minute carries into the minutes instead of printing `60.00"`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn write_dms(f: &mut fmt::Formatter<'_>, value: f64, direction: char) -> fmt::Result {
    const PER_MINUTE: u64 = 60 * 100;
    const PER_DEGREE: u64 = 60 * PER_MINUTE;

    // |value| <= 180, well inside u64
    let total = (value.abs() * PER_DEGREE as f64).round() as u64;
    let degrees = total / PER_DEGREE;
    let minutes = total % PER_DEGREE / PER_MINUTE;
    let seconds = (total % PER_MINUTE) as f64 / 100.0;
    write!(f, "{degrees}° {minutes}' {seconds:.2}\" {direction}")
}

/// Wire form of [`GeoPoint`]: `{ "lat": .., "lng": .. }`.
///
/// The long field names used by older clients are accepted on input.
#[derive(Serialize, Deserialize)]
struct RawGeoPoint {
    #[serde(alias = "latitude")]
    lat: f64,
    #[serde(alias = "longitude")]
    lng: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = GeoError;

    fn try_from(raw: RawGeoPoint) -> Result<Self, Self::Error> {
        Self::new(raw.lat, raw.lng)
    }
}

impl From<GeoPoint> for RawGeoPoint {
    fn from(point: GeoPoint) -> Self {
        Self {
            lat: point.latitude,
            lng: point.longitude,
        }
    }
}

/// A coordinate pair as persisted: `[longitude, latitude]`.
///
/// Deliberately not interchangeable with [`GeoPoint`]; convert explicitly.
///
/// ```rust
/// use songpin_core::{GeoPoint, StoredCoordinate};
///
/// let la = GeoPoint::new(34.0522, -118.2437).unwrap();
/// let stored = StoredCoordinate::from(la);
/// assert_eq!(stored.as_array(), [-118.2437, 34.0522]);
/// assert_eq!(GeoPoint::try_from(stored).unwrap(), la);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredCoordinate([f64; 2]);

impl StoredCoordinate {
    /// Build from a persisted slice, which must hold exactly `[lng, lat]`.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::MalformedPair`] when the slice length is not 2.
    pub fn from_slice(values: &[f64]) -> Result<Self, GeoError> {
        match values {
            [lng, lat] => Ok(Self([*lng, *lat])),
            _ => Err(GeoError::MalformedPair(values.len())),
        }
    }

    /// Longitude component (index 0).
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.0[0]
    }

    /// Latitude component (index 1).
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.0[1]
    }

    /// The raw `[lng, lat]` array.
    #[must_use]
    pub const fn as_array(&self) -> [f64; 2] {
        self.0
    }

    /// The raw pair as an owned vector, for array-typed database columns.
    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }
}

impl From<GeoPoint> for StoredCoordinate {
    fn from(point: GeoPoint) -> Self {
        point.to_stored()
    }
}

impl TryFrom<StoredCoordinate> for GeoPoint {
    type Error = GeoError;

    fn try_from(stored: StoredCoordinate) -> Result<Self, Self::Error> {
        Self::new(stored.latitude(), stored.longitude())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_bounds() {
        assert!(GeoPoint::new(90.0, 180.0).is_ok());
        assert!(GeoPoint::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert_eq!(
            GeoPoint::new(90.5, 0.0),
            Err(GeoError::LatitudeOutOfRange(90.5))
        );
        assert_eq!(
            GeoPoint::new(0.0, -180.1),
            Err(GeoError::LongitudeOutOfRange(-180.1))
        );
        assert_eq!(GeoPoint::new(f64::NAN, 0.0), Err(GeoError::NonFinite));
        assert_eq!(GeoPoint::new(0.0, f64::INFINITY), Err(GeoError::NonFinite));
    }

    #[test]
    fn test_normalized_clamps_latitude_and_wraps_longitude() {
        let p = GeoPoint::normalized(-120.0, -190.0).unwrap();
        assert!((p.latitude() - -90.0).abs() < f64::EPSILON);
        assert!((p.longitude() - 170.0).abs() < 1e-12);

        let p = GeoPoint::normalized(10.0, 180.0).unwrap();
        assert!((p.longitude() - -180.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_wrap_longitude_range() {
        for lng in [-540.0, -360.0, -180.0, -1e-18, 0.0, 179.999, 180.0, 725.5] {
            let w = wrap_longitude(lng);
            assert!((-180.0..180.0).contains(&w), "{lng} wrapped to {w}");
        }
    }

    #[test]
    fn test_dms_display() {
        let nyc = GeoPoint::new(40.7128, -74.006).unwrap();
        assert_eq!(nyc.to_string(), "40° 42' 46.08\" N, 74° 0' 21.60\" W");

        let sydney = GeoPoint::new(-33.8688, 151.2093).unwrap();
        assert!(sydney.to_string().starts_with("33° 52'"));
        assert!(sydney.to_string().ends_with("E"));
    }

    #[test]
    fn test_dms_carries_rounded_seconds() {
        let p = GeoPoint::new(10.999_999_9, 0.0).unwrap();
        assert_eq!(p.to_string(), "11° 0' 0.00\" N, 0° 0' 0.00\" E");

        let p = GeoPoint::new(-45.508_333_332, 20.016_666_666).unwrap();
        assert_eq!(p.to_string(), "45° 30' 30.00\" S, 20° 1' 0.00\" E");
    }

    #[test]
    fn test_json_uses_short_names_and_accepts_long() {
        let p = GeoPoint::new(37.7749, -122.4194).unwrap();
        let json = serde_json::to_value(p).unwrap();
        assert_eq!(json, serde_json::json!({ "lat": 37.7749, "lng": -122.4194 }));

        let long: GeoPoint =
            serde_json::from_str(r#"{"latitude": 37.7749, "longitude": -122.4194}"#).unwrap();
        assert_eq!(long, p);
    }

    #[test]
    fn test_json_rejects_out_of_range() {
        let bad: Result<GeoPoint, _> = serde_json::from_str(r#"{"lat": 100, "lng": 0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_stored_coordinate_is_longitude_first() {
        let p = GeoPoint::new(40.7128, -74.006).unwrap();
        let stored = p.to_stored();
        assert_eq!(stored.as_array(), [-74.006, 40.7128]);
        assert_eq!(serde_json::to_string(&stored).unwrap(), "[-74.006,40.7128]");
        assert_eq!(GeoPoint::try_from(stored).unwrap(), p);
    }

    #[test]
    fn test_stored_coordinate_from_slice() {
        let stored = StoredCoordinate::from_slice(&[-118.2437, 34.0522]).unwrap();
        assert!((stored.latitude() - 34.0522).abs() < f64::EPSILON);
        assert_eq!(
            StoredCoordinate::from_slice(&[1.0]),
            Err(GeoError::MalformedPair(1))
        );
        assert_eq!(
            StoredCoordinate::from_slice(&[1.0, 2.0, 3.0]),
            Err(GeoError::MalformedPair(3))
        );
    }

    #[test]
    fn test_swapped_pair_is_caught_on_conversion() {
        // [lat, lng] stored by mistake: latitude slot holds -122, out of range
        let swapped = StoredCoordinate::from_slice(&[37.7749, -122.4194]).unwrap();
        assert!(GeoPoint::try_from(swapped).is_err());
    }
}
