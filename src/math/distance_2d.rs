use super::intersect_2d::segment_segment_intersect_2d;
use super::{cross_2d, Point2, TOLERANCE};

/// Returns the closest point on segment `a → b` to `p` and its distance.
#[must_use]
pub fn closest_point_on_segment(p: &Point2, a: &Point2, b: &Point2) -> (Point2, f64) {
    let d = b - a;
    let len_sq = d.norm_squared();

    if len_sq < 1e-20 {
        // Degenerate segment (zero length).
        return (*a, (p - a).norm());
    }

    // Project point onto the infinite line, clamp to [0, 1].
    let t = ((p - a).dot(&d) / len_sq).clamp(0.0, 1.0);
    let closest = a + d * t;
    (closest, (p - closest).norm())
}

/// Returns the minimum distance from `p` to the segment `a → b`.
#[must_use]
pub fn point_to_segment_dist(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    closest_point_on_segment(p, a, b).1
}

/// Signed perpendicular distance from `p` to the infinite line through `a → b`.
///
/// Positive when `p` lies to the left of the direction `a → b`. `None` when
/// the line is degenerate.
#[must_use]
pub fn signed_distance_to_line(p: &Point2, a: &Point2, b: &Point2) -> Option<f64> {
    let d = b - a;
    let len = d.norm();
    if len < TOLERANCE {
        return None;
    }
    Some(cross_2d(&d, &(p - a)) / len)
}

/// Nearest points between two segments: `(on_first, on_second, distance)`.
///
/// Crossing or touching segments report distance zero at the intersection.
#[must_use]
pub fn segment_to_segment(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
) -> (Point2, Point2, f64) {
    if let Some((pt, _, _)) = segment_segment_intersect_2d(a0, a1, b0, b1) {
        return (pt, pt, 0.0);
    }

    let candidates = [
        {
            let (q, d) = closest_point_on_segment(a0, b0, b1);
            (*a0, q, d)
        },
        {
            let (q, d) = closest_point_on_segment(a1, b0, b1);
            (*a1, q, d)
        },
        {
            let (q, d) = closest_point_on_segment(b0, a0, a1);
            (q, *b0, d)
        },
        {
            let (q, d) = closest_point_on_segment(b1, a0, a1);
            (q, *b1, d)
        },
    ];

    let mut best = candidates[0];
    for c in &candidates[1..] {
        if c.2 < best.2 {
            best = *c;
        }
    }
    best
}

/// Nearest points between two chains of vertices, each read as consecutive
/// segments. Set `closed_*` to include the segment from last back to first.
///
/// Returns `None` if either chain has no segment.
#[must_use]
pub fn chain_to_chain(
    first: &[Point2],
    closed_first: bool,
    second: &[Point2],
    closed_second: bool,
) -> Option<(Point2, Point2, f64)> {
    let segs_a = chain_segments(first, closed_first);
    let segs_b = chain_segments(second, closed_second);

    let mut best: Option<(Point2, Point2, f64)> = None;
    for (a0, a1) in &segs_a {
        for (b0, b1) in &segs_b {
            let found = segment_to_segment(a0, a1, b0, b1);
            if best.as_ref().is_none_or(|b| found.2 < b.2) {
                best = Some(found);
            }
        }
    }
    best
}

/// Splits a vertex chain into `(start, end)` pairs.
#[must_use]
pub fn chain_segments(points: &[Point2], closed: bool) -> Vec<(Point2, Point2)> {
    let n = points.len();
    if n < 2 {
        return Vec::new();
    }
    let mut out: Vec<(Point2, Point2)> = points.windows(2).map(|w| (w[0], w[1])).collect();
    if closed && n > 2 && (points[0] - points[n - 1]).norm() > TOLERANCE {
        out.push((points[n - 1], points[0]));
    }
    out
}
