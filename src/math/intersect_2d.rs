use super::{cross_2d, Point2, Vector2, TOLERANCE};

/// Parametric 2D line-line intersection.
///
/// Given lines `p1 + t * d1` and `p2 + u * d2`, returns `(t, u)` if not parallel.
#[must_use]
pub fn line_line_intersect_2d(
    p1: &Point2,
    d1: &Vector2,
    p2: &Point2,
    d2: &Vector2,
) -> Option<(f64, f64)> {
    let cross = cross_2d(d1, d2);
    if cross.abs() < TOLERANCE {
        return None;
    }
    let dp = p2 - p1;
    let t = cross_2d(&dp, d2) / cross;
    let u = cross_2d(&dp, d1) / cross;
    Some((t, u))
}

/// Bounded segment-segment intersection in 2D.
///
/// Returns `(intersection_point, t, u)` where `t` and `u` are in `[0, 1]`.
/// Parallel (including collinear) segments report no intersection.
#[must_use]
pub fn segment_segment_intersect_2d(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
) -> Option<(Point2, f64, f64)> {
    let da = a1 - a0;
    let db = b1 - b0;
    let (t, u) = line_line_intersect_2d(a0, &da, b0, &db)?;

    // Use a small epsilon to include endpoints.
    let eps = TOLERANCE;
    if t >= -eps && t <= 1.0 + eps && u >= -eps && u <= 1.0 + eps {
        let t_clamped = t.clamp(0.0, 1.0);
        Some((a0 + da * t_clamped, t_clamped, u.clamp(0.0, 1.0)))
    } else {
        None
    }
}

/// Casts a ray `origin + t * dir` (`t ≥ 0`) against segment `a → b`.
///
/// Returns the ray parameter of the hit; with a unit `dir` this is the
/// distance travelled.
#[must_use]
pub fn ray_segment_intersect_2d(
    origin: &Point2,
    dir: &Vector2,
    a: &Point2,
    b: &Point2,
) -> Option<f64> {
    let db = b - a;
    let (t, u) = line_line_intersect_2d(origin, dir, a, &db)?;
    if t >= -TOLERANCE && (-TOLERANCE..=1.0 + TOLERANCE).contains(&u) {
        Some(t.max(0.0))
    } else {
        None
    }
}
