//! Geometric primitives shared by the violation model, the planner and the
//! tactics. All distances are in mm.

use crate::{Angle, Rect, Vector2};

/// Finds the point on the segment `a..b` closest to `p`. Degenerate segments
/// (`a == b`) are treated as points.
pub fn closest_point_on_segment(a: Vector2, b: Vector2, p: Vector2) -> Vector2 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < f64::EPSILON {
        return a;
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Shortest distance from `p` to the segment `a..b`.
pub fn distance_to_segment(a: Vector2, b: Vector2, p: Vector2) -> f64 {
    (closest_point_on_segment(a, b, p) - p).norm()
}

/// Shortest distance between the segments `a1..a2` and `b1..b2`. Returns 0
/// when they intersect.
pub fn segment_segment_distance(a1: Vector2, a2: Vector2, b1: Vector2, b2: Vector2) -> f64 {
    if segments_intersect(a1, a2, b1, b2) {
        return 0.0;
    }
    distance_to_segment(b1, b2, a1)
        .min(distance_to_segment(b1, b2, a2))
        .min(distance_to_segment(a1, a2, b1))
        .min(distance_to_segment(a1, a2, b2))
}

/// Shortest distance from the segment `a..b` to the circle around `center`.
/// Negative when the segment enters the circle.
pub fn segment_circle_distance(a: Vector2, b: Vector2, center: Vector2, radius: f64) -> f64 {
    distance_to_segment(a, b, center) - radius
}

/// Shortest distance from the segment `a..b` to the rectangle. Zero when the
/// segment touches or crosses the boundary, negative when an endpoint lies
/// inside (by the deeper endpoint's penetration).
pub fn segment_rect_distance(a: Vector2, b: Vector2, rect: &Rect) -> f64 {
    let pen = rect.penetration(a).max(rect.penetration(b));
    if pen > 0.0 {
        return -pen;
    }
    rect.edges()
        .iter()
        .map(|(e1, e2)| segment_segment_distance(a, b, *e1, *e2))
        .fold(f64::INFINITY, f64::min)
}

fn segments_intersect(a1: Vector2, a2: Vector2, b1: Vector2, b2: Vector2) -> bool {
    let d1 = cross(b2 - b1, a1 - b1);
    let d2 = cross(b2 - b1, a2 - b1);
    let d3 = cross(a2 - a1, b1 - a1);
    let d4 = cross(a2 - a1, b2 - a1);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    // Collinear overlaps are caught by the endpoint distance checks in the
    // caller, which return 0 there anyway.
    false
}

fn cross(a: Vector2, b: Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Finds the intersection point of two lines, each given by a point and a
/// direction. Returns `None` if the lines are parallel.
pub fn find_intersection(
    point1: Vector2,
    direction1: Vector2,
    point2: Vector2,
    direction2: Vector2,
) -> Option<Vector2> {
    let det = direction1.x * direction2.y - direction1.y * direction2.x;
    if det.abs() < 1e-10 {
        return None;
    }
    let dp = point2 - point1;
    let t = (dp.x * direction2.y - dp.y * direction2.x) / det;
    Some(point1 + t * direction1)
}

/// The two unit tangent directions from `from` around the circle at `center`
/// with the given radius, as (counter-clockwise, clockwise) of the direction
/// to the center. Returns `None` when `from` is inside the circle, in which
/// case there is no cone to block.
pub fn block_cone(center: Vector2, radius: f64, from: Vector2) -> Option<(Vector2, Vector2)> {
    let d = center - from;
    let dist = d.norm();
    if dist <= radius {
        return None;
    }
    let half = (radius / dist).asin();
    let dir = d / dist;
    let left = nalgebra::Rotation2::new(half) * dir;
    let right = nalgebra::Rotation2::new(-half) * dir;
    Some((left, right))
}

/// Sweeps the angular interval subtended by the segment `a..b` as seen from
/// `origin` and returns the center and width (in radians) of the widest
/// sub-interval not blocked by any of the circular obstacles.
///
/// A width of 0.0 means the target is fully blocked (or degenerate); callers
/// must check the width before trusting the returned angle.
pub fn angle_sweep(
    origin: Vector2,
    a: Vector2,
    b: Vector2,
    obstacles: &[(Vector2, f64)],
) -> (Angle, f64) {
    let ang_a = Angle::between_points(origin, a);
    let ang_b = Angle::between_points(origin, b);
    let mut lo = ang_a;
    let mut span = (ang_b - ang_a).radians();
    if span < 0.0 {
        lo = ang_b;
        span = -span;
    }
    if span < f64::EPSILON {
        return (ang_a, 0.0);
    }

    // Blocked sub-intervals as offsets from `lo`, clipped to [0, span].
    let mut blocked: Vec<(f64, f64)> = Vec::new();
    for (center, radius) in obstacles {
        let d = center - origin;
        let dist = d.norm();
        if dist <= *radius {
            // Obstacle covers the origin, everything is blocked.
            return (lo + Angle::from_radians(span / 2.0), 0.0);
        }
        let half = (radius / dist).asin();
        let center_off = (Angle::between_points(origin, *center) - lo).radians();
        // Consider the interval both as-is and shifted by one turn so that
        // intervals straddling the start of the sweep are not missed.
        for off in [center_off, center_off - 2.0 * std::f64::consts::PI] {
            let start = (off - half).max(0.0);
            let end = (off + half).min(span);
            if start < end {
                blocked.push((start, end));
            }
        }
    }
    blocked.sort_by(|x, y| x.0.total_cmp(&y.0));

    // Walk the gaps between merged blocked intervals.
    let mut best_start = 0.0;
    let mut best_width = 0.0;
    let mut cursor = 0.0;
    for (start, end) in blocked {
        if start > cursor {
            let width = start - cursor;
            if width > best_width {
                best_width = width;
                best_start = cursor;
            }
        }
        cursor = cursor.max(end);
    }
    if span > cursor && span - cursor > best_width {
        best_width = span - cursor;
        best_start = cursor;
    }

    if best_width <= 0.0 {
        return (lo + Angle::from_radians(span / 2.0), 0.0);
    }
    (lo + Angle::from_radians(best_start + best_width / 2.0), best_width)
}
