//! Polygon construction, repair and outline extraction on top of `geo`.

use geo::{Area, BooleanOps, Coord, LineString, MultiPolygon, Polygon, Validation};

use crate::error::GeometryError;
use crate::math::polygon_2d::{dedup_ring, ensure_ccw, remove_collinear, ring_centroid, signed_area_2d};
use crate::math::{Point2, TOLERANCE};

use super::linework::Segment;

/// Builds polygons from a ring of points.
///
/// The ring is closed automatically. A self-intersecting ring is repaired
/// with a unary union, the equivalent of a zero-width buffer, so a
/// figure-eight keeps only one of its lobes. Pieces with no area are dropped.
///
/// # Errors
///
/// Returns `GeometryError::InsufficientPoints` if fewer than 3 distinct
/// points are given, or `GeometryError::NonFinite` for NaN / infinite input.
pub fn polygons_from_points(points: &[Point2]) -> Result<Vec<Polygon<f64>>, GeometryError> {
    if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(GeometryError::NonFinite);
    }
    let ring = dedup_ring(points);
    if ring.len() < 3 {
        return Err(GeometryError::InsufficientPoints { found: ring.len() });
    }

    let polygon = Polygon::new(to_line_string(&ring), vec![]);
    if polygon.is_valid() {
        return Ok(vec![polygon]);
    }

    tracing::debug!(vertices = ring.len(), "repairing invalid polygon");
    let repaired = geo::unary_union([&polygon]);
    Ok(repaired
        .0
        .into_iter()
        .filter(|piece| piece.unsigned_area() > TOLERANCE)
        .collect())
}

/// Axis-aligned rectangle polygon.
#[must_use]
pub fn rectangle(min: Point2, max: Point2) -> Polygon<f64> {
    Polygon::new(
        LineString::from(vec![
            (min.x, min.y),
            (max.x, min.y),
            (max.x, max.y),
            (min.x, max.y),
            (min.x, min.y),
        ]),
        vec![],
    )
}

/// Unions any number of polygons into one footprint.
#[must_use]
pub fn union_all<'a>(polygons: impl IntoIterator<Item = &'a Polygon<f64>>) -> MultiPolygon<f64> {
    geo::unary_union(polygons)
}

/// Area of everything in `a` that is not in `b`.
#[must_use]
pub fn difference(a: &MultiPolygon<f64>, b: &Polygon<f64>) -> MultiPolygon<f64> {
    a.difference(&MultiPolygon::new(vec![b.clone()]))
}

#[must_use]
pub fn to_line_string(points: &[Point2]) -> LineString<f64> {
    LineString::from(
        points
            .iter()
            .map(|p| Coord { x: p.x, y: p.y })
            .collect::<Vec<_>>(),
    )
}

/// Exterior ring vertices of a polygon without the closing duplicate.
#[must_use]
pub fn exterior_points(polygon: &Polygon<f64>) -> Vec<Point2> {
    let pts: Vec<Point2> = polygon
        .exterior()
        .coords()
        .map(|c| Point2::new(c.x, c.y))
        .collect();
    dedup_ring(&pts)
}

/// Exterior rings of every polygon in a footprint.
#[must_use]
pub fn exterior_rings(footprint: &MultiPolygon<f64>) -> Vec<Vec<Point2>> {
    footprint.0.iter().map(exterior_points).collect()
}

/// Every exterior vertex of a footprint.
#[must_use]
pub fn all_points(footprint: &MultiPolygon<f64>) -> Vec<Point2> {
    footprint.0.iter().flat_map(exterior_points).collect()
}

/// Area-weighted centroid of the exterior rings of a footprint.
#[must_use]
pub fn footprint_centroid(footprint: &MultiPolygon<f64>) -> Option<Point2> {
    let mut weight = 0.0;
    let mut x = 0.0;
    let mut y = 0.0;
    for ring in exterior_rings(footprint) {
        let area = signed_area_2d(&ring).abs();
        if let Some(c) = ring_centroid(&ring) {
            x += c.x * area;
            y += c.y * area;
            weight += area;
        }
    }
    (weight > TOLERANCE).then(|| Point2::new(x / weight, y / weight))
}

/// Outline segments of a footprint, counter-clockwise per polygon, with
/// collinear runs merged. The building interior lies to the left of each
/// segment and the outward normal is its right normal.
#[must_use]
pub fn outline_segments(footprint: &MultiPolygon<f64>) -> Vec<Segment> {
    let mut segments = Vec::new();
    for ring in exterior_rings(footprint) {
        let ring = ensure_ccw(remove_collinear(&ring));
        let n = ring.len();
        if n < 3 {
            continue;
        }
        for i in 0..n {
            segments.push(Segment::new(ring[i], ring[(i + 1) % n]));
        }
    }
    segments
}
