//! Geographic points and the math that places and picks them on a sphere.
//!
//! - [`point`] - [`GeoPoint`] and the persisted [`StoredCoordinate`]
//! - [`projection`] - lat/lng <-> Cartesian
//! - [`pick`] - ray-sphere intersection
//! - [`scale`] - camera-distance marker scaling
//! - [`distance`] - great-circle distance and destination points
//!
//! Everything here is pure and safe to call from any thread.

pub mod distance;
pub mod pick;
pub mod point;
pub mod projection;
pub mod scale;

pub use distance::{EARTH_RADIUS_M, destination, haversine_m};
pub use pick::{Ray, Sphere, pick_surface_point};
pub use point::{GeoError, GeoPoint, StoredCoordinate, wrap_longitude};
pub use projection::{CartesianPoint, to_cartesian, to_geo};
pub use scale::marker_scale;
