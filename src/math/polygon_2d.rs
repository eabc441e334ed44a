use super::{cross_2d, Point2, Vector2, TOLERANCE};

/// Computes the signed area of a ring (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise. A repeated
/// closing point contributes nothing, so open and closed rings agree.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Drops the closing duplicate and consecutive duplicate vertices of a ring.
#[must_use]
pub fn dedup_ring(points: &[Point2]) -> Vec<Point2> {
    let mut out: Vec<Point2> = Vec::with_capacity(points.len());
    for &pt in points {
        if out.last().is_some_and(|last| (pt - last).norm() < TOLERANCE) {
            continue;
        }
        out.push(pt);
    }
    while out.len() > 1 {
        let (first, last) = (out[0], out[out.len() - 1]);
        if (first - last).norm() < TOLERANCE {
            out.pop();
        } else {
            break;
        }
    }
    out
}

/// Removes vertices that lie on the straight line through their neighbours.
///
/// The input ring is treated as closed; the output has no closing duplicate.
#[must_use]
pub fn remove_collinear(points: &[Point2]) -> Vec<Point2> {
    let mut ring = dedup_ring(points);
    loop {
        let n = ring.len();
        if n < 4 {
            return ring;
        }
        let mut removed = false;
        for i in 0..n {
            let prev = ring[(i + n - 1) % n];
            let next = ring[(i + 1) % n];
            let a = ring[i] - prev;
            let b = next - ring[i];
            let scale = a.norm() * b.norm();
            if scale < TOLERANCE || (cross_2d(&a, &b) / scale).abs() < 1e-9 && a.dot(&b) > 0.0 {
                ring.remove(i);
                removed = true;
                break;
            }
        }
        if !removed {
            return ring;
        }
    }
}

/// Returns the ring with counter-clockwise winding.
#[must_use]
pub fn ensure_ccw(mut points: Vec<Point2>) -> Vec<Point2> {
    if signed_area_2d(&points) < 0.0 {
        points.reverse();
    }
    points
}

/// Area-weighted centroid of a ring. `None` for rings with no area.
#[must_use]
pub fn ring_centroid(points: &[Point2]) -> Option<Point2> {
    let n = points.len();
    let area = signed_area_2d(points);
    if n < 3 || area.abs() < TOLERANCE {
        return None;
    }
    let (mut cx, mut cy) = (0.0, 0.0);
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        let f = p.x * q.y - q.x * p.y;
        cx += (p.x + q.x) * f;
        cy += (p.y + q.y) * f;
    }
    Some(Point2::new(cx / (6.0 * area), cy / (6.0 * area)))
}

/// Convex hull (Andrew's monotone chain), counter-clockwise, no closing point.
#[must_use]
pub fn convex_hull_2d(points: &[Point2]) -> Vec<Point2> {
    let mut pts: Vec<Point2> = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup_by(|a, b| (*a - *b).norm() < TOLERANCE);
    if pts.len() < 3 {
        return pts;
    }

    let turn = |o: &Point2, a: &Point2, b: &Point2| cross_2d(&(a - o), &(b - o));

    let mut lower: Vec<Point2> = Vec::with_capacity(pts.len());
    for p in &pts {
        while lower.len() >= 2 && turn(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0
        {
            lower.pop();
        }
        lower.push(*p);
    }
    let mut upper: Vec<Point2> = Vec::with_capacity(pts.len());
    for p in pts.iter().rev() {
        while upper.len() >= 2 && turn(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0
        {
            upper.pop();
        }
        upper.push(*p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// A minimum-area bounding rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedRect {
    /// Shorter side.
    pub width: f64,
    /// Longer side.
    pub length: f64,
    /// Corners, counter-clockwise.
    pub corners: [Point2; 4],
}

impl OrientedRect {
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width * self.length
    }
}

/// Computes the minimum-area bounding rectangle of a point set.
///
/// Rotating calipers over the convex hull edges: each hull edge is a
/// candidate rectangle side, extents are measured by projection so that
/// axis-aligned inputs are measured without rotation error.
#[must_use]
pub fn min_area_rect(points: &[Point2]) -> Option<OrientedRect> {
    let hull = convex_hull_2d(points);
    if hull.len() < 3 {
        return None;
    }

    let mut best: Option<(f64, OrientedRect)> = None;
    for i in 0..hull.len() {
        let edge = hull[(i + 1) % hull.len()] - hull[i];
        let len = edge.norm();
        if len < TOLERANCE {
            continue;
        }
        let u: Vector2 = edge / len;
        let v = Vector2::new(-u.y, u.x);

        let (mut min_u, mut max_u) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_v, mut max_v) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in &hull {
            let d = p - hull[i];
            let pu = d.dot(&u);
            let pv = d.dot(&v);
            min_u = min_u.min(pu);
            max_u = max_u.max(pu);
            min_v = min_v.min(pv);
            max_v = max_v.max(pv);
        }

        let side_u = max_u - min_u;
        let side_v = max_v - min_v;
        let area = side_u * side_v;
        if best.as_ref().is_some_and(|(a, _)| *a <= area) {
            continue;
        }

        let at = |a: f64, b: f64| hull[i] + u * a + v * b;
        let rect = OrientedRect {
            width: side_u.min(side_v),
            length: side_u.max(side_v),
            corners: [
                at(min_u, min_v),
                at(max_u, min_v),
                at(max_u, max_v),
                at(min_u, max_v),
            ],
        };
        best = Some((area, rect));
    }
    best.map(|(_, rect)| rect)
}

/// Axis-aligned bounds `(min, max)` of a point set.
#[must_use]
pub fn bounds_2d(points: &[Point2]) -> Option<(Point2, Point2)> {
    let first = points.first()?;
    let mut min = *first;
    let mut max = *first;
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Some((min, max))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn square() -> Vec<Point2> {
        vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)]
    }

    #[test]
    fn signed_area_ccw_square() {
        assert!((signed_area_2d(&square()) - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_cw_square() {
        let mut pts = square();
        pts.reverse();
        assert!((signed_area_2d(&pts) + 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_ignores_closing_point() {
        let mut pts = square();
        pts.push(p(0.0, 0.0));
        assert!((signed_area_2d(&pts) - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_degenerate() {
        assert!(signed_area_2d(&[p(0.0, 0.0)]).abs() < TOLERANCE);
        assert!(signed_area_2d(&[]).abs() < TOLERANCE);
    }

    #[test]
    fn collinear_vertices_are_removed() {
        let ring = vec![
            p(0.0, 0.0),
            p(5.0, 0.0),
            p(10.0, 0.0),
            p(10.0, 10.0),
            p(0.0, 10.0),
            p(0.0, 0.0),
        ];
        let cleaned = remove_collinear(&ring);
        assert_eq!(cleaned.len(), 4);
        assert!(!cleaned.contains(&p(5.0, 0.0)));
    }

    #[test]
    fn ensure_ccw_reverses_clockwise() {
        let mut pts = square();
        pts.reverse();
        let ccw = ensure_ccw(pts);
        assert!(signed_area_2d(&ccw) > 0.0);
    }

    #[test]
    fn centroid_of_offset_square() {
        let pts = vec![p(2.0, 2.0), p(4.0, 2.0), p(4.0, 4.0), p(2.0, 4.0)];
        let c = ring_centroid(&pts).unwrap();
        assert!((c.x - 3.0).abs() < 1e-12);
        assert!((c.y - 3.0).abs() < 1e-12);
    }

    #[test]
    fn hull_drops_interior_points() {
        let mut pts = square();
        pts.push(p(0.5, 0.5));
        let hull = convex_hull_2d(&pts);
        assert_eq!(hull.len(), 4);
        assert!(signed_area_2d(&hull) > 0.0);
    }

    #[test]
    fn min_rect_of_axis_aligned_rectangle_is_exact() {
        let pts = vec![p(0.0, 0.0), p(5000.0, 0.0), p(5000.0, 10000.0), p(0.0, 10000.0)];
        let rect = min_area_rect(&pts).unwrap();
        assert!((rect.width - 5000.0).abs() < 1e-9);
        assert!((rect.length - 10000.0).abs() < 1e-9);
    }

    #[test]
    fn min_rect_of_rotated_square() {
        // Square of side sqrt(2) rotated 45 degrees.
        let pts = vec![p(1.0, 0.0), p(2.0, 1.0), p(1.0, 2.0), p(0.0, 1.0)];
        let rect = min_area_rect(&pts).unwrap();
        assert!((rect.area() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn bounds_of_points() {
        let (min, max) = bounds_2d(&[p(3.0, -1.0), p(-2.0, 4.0)]).unwrap();
        assert_eq!(min, p(-2.0, -1.0));
        assert_eq!(max, p(3.0, 4.0));
        assert!(bounds_2d(&[]).is_none());
    }
}
