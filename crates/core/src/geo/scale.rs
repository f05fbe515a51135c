//! Marker scale as a function of camera distance.

/// Scale for a marker seen from `camera_distance`.
///
/// Linear in raw distance: `max_scale` at `min_dist`, `min_scale` at
/// `max_dist`. Distances outside `[min_dist, max_dist]` clamp to the nearer
/// end instead of extrapolating. A degenerate range (`max_dist <= min_dist`)
/// yields `max_scale` up to `min_dist` and `min_scale` beyond it.
///
/// ```rust
/// use songpin_core::geo::marker_scale;
///
/// assert_eq!(marker_scale(5.5, 5.5, 18.0, 0.03, 2.0), 2.0);
/// assert_eq!(marker_scale(18.0, 5.5, 18.0, 0.03, 2.0), 0.03);
/// assert_eq!(marker_scale(100.0, 5.5, 18.0, 0.03, 2.0), 0.03);
/// ```
#[must_use]
pub fn marker_scale(
    camera_distance: f64,
    min_dist: f64,
    max_dist: f64,
    min_scale: f64,
    max_scale: f64,
) -> f64 {
    let span = max_dist - min_dist;
    if span <= 0.0 {
        return if camera_distance <= min_dist {
            max_scale
        } else {
            min_scale
        };
    }

    let t = ((camera_distance - min_dist) / span).clamp(0.0, 1.0);
    // weighted form keeps both endpoints exact
    max_scale.mul_add(1.0 - t, min_scale * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN_DIST: f64 = 5.5;
    const MAX_DIST: f64 = 18.0;
    const MIN_SCALE: f64 = 0.03;
    const MAX_SCALE: f64 = 2.0;

    fn scale(d: f64) -> f64 {
        marker_scale(d, MIN_DIST, MAX_DIST, MIN_SCALE, MAX_SCALE)
    }

    #[test]
    fn test_endpoints() {
        assert!((scale(MIN_DIST) - MAX_SCALE).abs() < f64::EPSILON);
        assert!((scale(MAX_DIST) - MIN_SCALE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_midpoint_is_linear() {
        let mid = (MIN_DIST + MAX_DIST) / 2.0;
        assert!((scale(mid) - (MIN_SCALE + MAX_SCALE) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_clamped_outside_range() {
        assert!((scale(0.0) - MAX_SCALE).abs() < f64::EPSILON);
        assert!((scale(-3.0) - MAX_SCALE).abs() < f64::EPSILON);
        assert!((scale(1000.0) - MIN_SCALE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_monotonically_non_increasing() {
        let mut previous = f64::INFINITY;
        let mut d = 0.0;
        while d < 25.0 {
            let s = scale(d);
            assert!(s <= previous, "scale rose at distance {d}");
            assert!((MIN_SCALE..=MAX_SCALE).contains(&s));
            previous = s;
            d += 0.1;
        }
    }

    #[test]
    fn test_degenerate_range() {
        assert!((marker_scale(4.0, 5.0, 5.0, 0.1, 1.0) - 1.0).abs() < f64::EPSILON);
        assert!((marker_scale(6.0, 5.0, 5.0, 0.1, 1.0) - 0.1).abs() < f64::EPSILON);
    }
}
