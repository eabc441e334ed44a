use geo::{MultiPolygon, Polygon};
use serde::Serialize;

use crate::error::GeometryError;
use crate::geometry::footprint::{polygons_from_points, union_all};
use crate::math::polygon_2d::signed_area_2d;
use crate::math::{round_to, Point2, MM2_TO_M2};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AreaReport {
    pub area_mm2: f64,
    pub area_m2: f64,
}

/// Shoelace area of a polygon: exterior minus holes, in mm².
#[must_use]
pub fn polygon_area_mm2(polygon: &Polygon<f64>) -> f64 {
    let ring_area = |ring: &geo::LineString<f64>| {
        let pts: Vec<Point2> = ring.coords().map(|c| Point2::new(c.x, c.y)).collect();
        signed_area_2d(&pts).abs()
    };
    let holes: f64 = polygon.interiors().iter().map(ring_area).sum();
    ring_area(polygon.exterior()) - holes
}

/// Area of a closed ring given as points in millimetres.
///
/// Self-intersecting rings are repaired first, the same way a zero-width
/// buffer repairs them: a figure-eight keeps only one of its lobes.
///
/// # Errors
///
/// Returns `GeometryError::InsufficientPoints` for fewer than 3 distinct
/// points.
pub fn polygon_area(points: &[Point2]) -> Result<AreaReport, GeometryError> {
    let area_mm2: f64 = polygons_from_points(points)?.iter().map(polygon_area_mm2).sum();
    Ok(AreaReport {
        area_mm2,
        area_m2: round_to(area_mm2 * MM2_TO_M2, 2),
    })
}

/// Union of building outlines; overlaps are counted once.
#[must_use]
pub fn union_footprint<'a>(polygons: impl IntoIterator<Item = &'a Polygon<f64>>) -> MultiPolygon<f64> {
    union_all(polygons)
}

/// Area of a footprint in m², rounded to 2 dp.
#[must_use]
pub fn footprint_area_m2(footprint: &MultiPolygon<f64>) -> f64 {
    round_to(footprint_area_mm2(footprint) * MM2_TO_M2, 2)
}

#[must_use]
pub fn footprint_area_mm2(footprint: &MultiPolygon<f64>) -> f64 {
    footprint.0.iter().map(polygon_area_mm2).sum()
}
