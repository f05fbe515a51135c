//! Interaction state for the 3D globe view.
//!
//! - [`camera`] - perspective camera and pixel/NDC mapping
//! - [`view`] - [`GlobeView`]: rotation, zoom, markers and pointer handling

pub mod camera;
pub mod view;

pub use camera::{PerspectiveCamera, Viewport};
pub use view::{GlobeConfig, GlobeView, Marker, MarkerHandle, PointerRelease, ZoomDirection};
