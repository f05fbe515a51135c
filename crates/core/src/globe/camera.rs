//! Perspective camera and viewport mapping for the globe.

use glam::{DVec2, DVec3};

use crate::geo::Ray;

/// A perspective camera on the +z axis looking at the origin, y up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view, in degrees.
    pub fov_y_deg: f64,
    /// Viewport width / height.
    pub aspect: f64,
    /// Distance from the origin along +z.
    pub distance: f64,
}

impl PerspectiveCamera {
    #[must_use]
    pub const fn position(&self) -> DVec3 {
        DVec3::new(0.0, 0.0, self.distance)
    }

    fn half_extent(&self) -> f64 {
        (self.fov_y_deg.to_radians() / 2.0).tan()
    }

    /// The ray through a point in normalized device coordinates (`[-1, 1]`,
    /// y up).
    #[must_use]
    pub fn ray_through(&self, ndc: DVec2) -> Ray {
        let half = self.half_extent();
        let dir = DVec3::new(ndc.x * half * self.aspect, ndc.y * half, -1.0);
        Ray::new(self.position(), dir)
    }

    /// Project a world point to normalized device coordinates.
    ///
    /// Returns `None` for points at or behind the camera plane.
    #[must_use]
    pub fn project(&self, world: DVec3) -> Option<DVec2> {
        let view = world - self.position();
        let depth = -view.z;
        if depth <= 0.0 {
            return None;
        }
        let half = self.half_extent();
        Some(DVec2::new(
            view.x / depth / (half * self.aspect),
            view.y / depth / half,
        ))
    }
}

/// The on-screen rectangle the globe is drawn into, in pixels (y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    #[must_use]
    pub fn aspect(&self) -> f64 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Whether a pointer position falls inside the viewport (edges included).
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.left + self.width && y >= self.top && y <= self.top + self.height
    }

    /// Pixel position to normalized device coordinates.
    #[must_use]
    pub fn to_ndc(&self, x: f64, y: f64) -> DVec2 {
        DVec2::new(
            ((x - self.left) / self.width).mul_add(2.0, -1.0),
            -((y - self.top) / self.height).mul_add(2.0, -1.0),
        )
    }

    /// Normalized device coordinates to a pixel position.
    #[must_use]
    pub fn to_pixels(&self, ndc: DVec2) -> DVec2 {
        DVec2::new(
            (ndc.x + 1.0) / 2.0 * self.width + self.left,
            (1.0 - ndc.y) / 2.0 * self.height + self.top,
        )
    }
}
