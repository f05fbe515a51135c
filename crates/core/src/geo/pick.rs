//! Ray-sphere intersection for pointer picking.

use glam::DVec3;

use super::projection::CartesianPoint;

/// A half-line starting at `origin`. `dir` need not be normalized.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    pub dir: DVec3,
}

impl Ray {
    pub const fn new(origin: DVec3, dir: DVec3) -> Self {
        Self { origin, dir }
    }

    /// The point at parameter `t` along the normalized direction.
    #[must_use]
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.dir.normalize_or_zero() * t
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sphere {
    pub center: DVec3,
    pub radius: f64,
}

impl Sphere {
    pub const fn new(center: DVec3, radius: f64) -> Self {
        Self { center, radius }
    }
}

/// Nearest point where `ray` meets the surface of `sphere`.
///
/// Returns `None` when the ray misses, when both intersections lie behind the
/// origin, or when the direction has zero length. An origin inside the sphere
/// yields the exit point, the only intersection ahead of it.
#[must_use]
pub fn pick_surface_point(ray: Ray, sphere: Sphere) -> Option<CartesianPoint> {
    let dir = ray.dir.try_normalize()?;
    let oc = ray.origin - sphere.center;

    // |dir| == 1 so the quadratic's `a` term is 1
    let b = oc.dot(dir);
    let c = sphere.radius.mul_add(-sphere.radius, oc.length_squared());
    let discriminant = b.mul_add(b, -c);
    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let near = -b - root;
    let far = -b + root;

    let t = if near >= 0.0 {
        near
    } else if far >= 0.0 {
        far
    } else {
        return None;
    };

    Some(ray.origin + dir * t)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn globe() -> Sphere {
        Sphere::new(DVec3::ZERO, 5.0)
    }

    #[test]
    fn test_ray_passing_outside_misses() {
        let ray = Ray::new(DVec3::new(0.0, 0.0, 20.0), DVec3::X);
        assert!(pick_surface_point(ray, globe()).is_none());
    }

    #[test]
    fn test_returns_near_intersection() {
        let ray = Ray::new(DVec3::new(0.0, 0.0, 20.0), DVec3::new(0.0, 0.0, -3.0));
        let hit = pick_surface_point(ray, globe()).unwrap();
        assert!(hit.distance(DVec3::new(0.0, 0.0, 5.0)) < 1e-12);
    }

    #[test]
    fn test_oblique_hit_lies_on_surface() {
        let ray = Ray::new(DVec3::new(1.0, 2.0, 15.0), DVec3::new(-0.05, -0.1, -1.0));
        let hit = pick_surface_point(ray, globe()).unwrap();
        assert!((hit.length() - 5.0).abs() < 1e-9);
        assert!(hit.z > 0.0, "near side faces the camera");
    }

    #[test]
    fn test_sphere_behind_origin_misses() {
        let ray = Ray::new(DVec3::new(0.0, 0.0, 20.0), DVec3::Z);
        assert!(pick_surface_point(ray, globe()).is_none());
    }

    #[test]
    fn test_origin_inside_returns_exit_point() {
        let ray = Ray::new(DVec3::ZERO, DVec3::Y);
        let hit = pick_surface_point(ray, globe()).unwrap();
        assert!(hit.distance(DVec3::new(0.0, 5.0, 0.0)) < 1e-12);
    }

    #[test]
    fn test_tangent_ray_touches() {
        let ray = Ray::new(DVec3::new(-10.0, 5.0, 0.0), DVec3::X);
        let hit = pick_surface_point(ray, globe()).unwrap();
        assert!(hit.distance(DVec3::new(0.0, 5.0, 0.0)) < 1e-9);
    }

    #[test]
    fn test_offset_sphere_center() {
        let sphere = Sphere::new(DVec3::new(10.0, 0.0, 0.0), 1.0);
        let ray = Ray::new(DVec3::ZERO, DVec3::X);
        let hit = pick_surface_point(ray, sphere).unwrap();
        assert!(hit.distance(DVec3::new(9.0, 0.0, 0.0)) < 1e-12);
    }

    #[test]
    fn test_zero_direction_misses() {
        let ray = Ray::new(DVec3::new(0.0, 0.0, 20.0), DVec3::ZERO);
        assert!(pick_surface_point(ray, globe()).is_none());
    }

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 0.0, -4.0));
        assert!(ray.at(2.0).distance(DVec3::new(0.0, 0.0, -2.0)) < 1e-12);
    }
}
