//! SongPin Core - shared types and geodesic math.
//!
//! This crate provides what every SongPin component agrees on:
//! - `api` - the REST backend
//! - `cli` - migrations, seeding and user management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. The `postgres` feature adds sqlx
//! encoding for the ID types.
//!
//! # Modules
//!
//! - [`types`] - IDs, songs, track references, pins and users
//! - [`geo`] - geographic points, sphere projection, picking, distances
//! - [`proximity`] - the "pins near a point" query contract
//! - [`globe`] - interaction state for the 3D globe view
//!
//! ```rust
//! use songpin_core::{GeoPoint, StoredCoordinate};
//!
//! let nyc = GeoPoint::new(40.7128, -74.006).unwrap();
//! assert_eq!(StoredCoordinate::from(nyc).as_array(), [-74.006, 40.7128]);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod geo;
pub mod globe;
pub mod proximity;
pub mod types;

pub use geo::{GeoError, GeoPoint, StoredCoordinate};
pub use proximity::{ProximityError, ProximityQuery};
pub use types::*;
