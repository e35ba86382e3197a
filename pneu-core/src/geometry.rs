//! Planar geometry primitives.
//!
//! Each corner is solved in its own vertical plane, so everything here is
//! 2D. Distances are exact (no iteration); the capsule clearance check in
//! [`crate::interference`] is built on these.

use nalgebra::{Point2, Vector2};

/// Closest point to `p` on the segment `a`-`b`.
#[must_use]
pub fn closest_point_on_segment(p: Point2<f64>, a: Point2<f64>, b: Point2<f64>) -> Point2<f64> {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < 1e-18 {
        // Degenerate segment.
        return a;
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Distance from `p` to the segment `a`-`b`.
#[must_use]
pub fn point_segment_distance(p: Point2<f64>, a: Point2<f64>, b: Point2<f64>) -> f64 {
    (p - closest_point_on_segment(p, a, b)).norm()
}

/// Minimum distance between segments `p1`-`q1` and `p2`-`q2`.
///
/// Closed-form for the 2D case: if the segments properly intersect the
/// distance is zero, otherwise the minimum is attained at an endpoint.
#[must_use]
pub fn segment_segment_distance(
    p1: Point2<f64>,
    q1: Point2<f64>,
    p2: Point2<f64>,
    q2: Point2<f64>,
) -> f64 {
    if segments_intersect(p1, q1, p2, q2) {
        return 0.0;
    }
    point_segment_distance(p1, p2, q2)
        .min(point_segment_distance(q1, p2, q2))
        .min(point_segment_distance(p2, p1, q1))
        .min(point_segment_distance(q2, p1, q1))
}

/// Surface-to-surface clearance between two capsules.
///
/// Negative means the capsules overlap by that depth.
#[must_use]
pub fn capsule_clearance(
    p1: Point2<f64>,
    q1: Point2<f64>,
    r1: f64,
    p2: Point2<f64>,
    q2: Point2<f64>,
    r2: f64,
) -> f64 {
    segment_segment_distance(p1, q1, p2, q2) - (r1 + r2)
}

/// Signed area of the triangle `a`, `b`, `c` (twice the area, actually).
fn cross2(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Whether segments `p1`-`q1` and `p2`-`q2` intersect.
fn segments_intersect(
    p1: Point2<f64>,
    q1: Point2<f64>,
    p2: Point2<f64>,
    q2: Point2<f64>,
) -> bool {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let denom = cross2(d1, d2);
    if denom.abs() < 1e-15 {
        // Parallel; endpoint distances cover the collinear-overlap case
        // because any overlapping collinear pair has a zero endpoint
        // distance.
        return false;
    }
    let r = p2 - p1;
    let t = cross2(r, d2) / denom;
    let u = cross2(r, d1) / denom;
    (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_closest_point_interior() {
        let p = Point2::new(0.5, 1.0);
        let c = closest_point_on_segment(p, Point2::new(0.0, 0.0), Point2::new(1.0, 0.0));
        assert_relative_eq!(c.x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(c.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_closest_point_clamps_to_endpoint() {
        let p = Point2::new(2.0, 1.0);
        let c = closest_point_on_segment(p, Point2::new(0.0, 0.0), Point2::new(1.0, 0.0));
        assert_relative_eq!(c.x, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_point_segment_distance() {
        let d = point_segment_distance(
            Point2::new(0.5, 2.0),
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
        );
        assert_relative_eq!(d, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_crossing_segments_have_zero_distance() {
        let d = segment_segment_distance(
            Point2::new(-1.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, -1.0),
            Point2::new(0.0, 1.0),
        );
        assert_relative_eq!(d, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_parallel_segments() {
        let d = segment_segment_distance(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 0.3),
            Point2::new(1.0, 0.3),
        );
        assert_relative_eq!(d, 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_collinear_overlapping_segments() {
        let d = segment_segment_distance(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.5, 0.0),
            Point2::new(2.0, 0.0),
        );
        assert_relative_eq!(d, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_skew_segments() {
        // Closest approach is endpoint (1,0) to segment x=2.
        let d = segment_segment_distance(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, -1.0),
            Point2::new(2.0, 1.0),
        );
        assert_relative_eq!(d, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_capsule_clearance_at_exact_contact() {
        // Parallel capsules offset by exactly r1 + r2 touch.
        let c = capsule_clearance(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            0.1,
            Point2::new(0.0, 0.25),
            Point2::new(1.0, 0.25),
            0.15,
        );
        assert_relative_eq!(c, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_capsule_clearance_tracks_offset() {
        let eps = 1e-3;
        let c = capsule_clearance(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            0.1,
            Point2::new(0.0, 0.25 + eps),
            Point2::new(1.0, 0.25 + eps),
            0.15,
        );
        assert_relative_eq!(c, eps, epsilon = 1e-12);

        let overlapping = capsule_clearance(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            0.1,
            Point2::new(0.0, 0.2),
            Point2::new(1.0, 0.2),
            0.15,
        );
        assert_relative_eq!(overlapping, -0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_segment() {
        let p = Point2::new(0.0, 0.0);
        let d = point_segment_distance(Point2::new(3.0, 4.0), p, p);
        assert_relative_eq!(d, 5.0, epsilon = 1e-12);
    }
}
