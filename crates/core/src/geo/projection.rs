//! Forward and inverse projection between [`GeoPoint`] and points on a sphere.
//!
//! The sphere is y-up: the north pole is `(0, r, 0)`. Longitude 0 lies on the
//! +x axis and longitude 90°E on -z, which matches how an equirectangular
//! earth texture wraps a right-handed sphere mesh.

use std::f64::consts::PI;

use glam::DVec3;

use super::point::{GeoError, GeoPoint};

/// A point on (or near) a sphere centered at the origin.
pub type CartesianPoint = DVec3;

/// Project a geographic point onto a sphere of the given radius.
///
/// Total for any `radius`; callers pass a positive one. Both poles collapse to
/// `(0, ±radius, 0)` whatever the longitude.
#[must_use]
pub fn to_cartesian(point: GeoPoint, radius: f64) -> CartesianPoint {
    let phi = (90.0 - point.latitude()) * (PI / 180.0);
    let theta = (point.longitude() + 180.0) * (PI / 180.0);

    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();

    // sin(phi) is ~6e-17 at the poles rather than 0
    let ring = if point.latitude().abs() == 90.0 {
        0.0
    } else {
        radius * sin_phi
    };

    DVec3::new(-ring * cos_theta, radius * cos_phi, ring * sin_theta)
}

/// Recover the geographic point a 3D direction points at.
///
/// Only the direction matters; the point need not lie on any particular
/// sphere. Longitude is normalized into `[-180, 180)`.
///
/// # Errors
///
/// Returns [`GeoError::Degenerate`] for a zero-length vector and
/// [`GeoError::NonFinite`] when a component is NaN or infinite.
pub fn to_geo(point: CartesianPoint) -> Result<GeoPoint, GeoError> {
    if !point.is_finite() {
        return Err(GeoError::NonFinite);
    }
    let radius = point.length();
    if radius == 0.0 {
        return Err(GeoError::Degenerate);
    }

    // exact next to the poles, unlike acos(y / r)
    let latitude = point.y.atan2(point.x.hypot(point.z)).to_degrees();

    let theta = point.z.atan2(-point.x);
    let longitude = theta * (180.0 / PI) - 180.0;

    GeoPoint::normalized(latitude, longitude)
}
