use geo::{MultiPolygon, Polygon};
use serde::Serialize;

use crate::error::GeometryError;
use crate::geometry::footprint::{exterior_points, exterior_rings};
use crate::geometry::{Linework, Polyline};
use crate::math::distance_2d::chain_to_chain;
use crate::math::intersect_2d::ray_segment_intersect_2d;
use crate::math::{round_to, Point2, Vector2, MM_TO_M, TOLERANCE};

/// Buildings closer than this to the boundary fall under the eaves limit.
pub const BOUNDARY_ZONE_MM: f64 = 2000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundaryDistance {
    pub distance_mm: f64,
    pub distance_m: f64,
    pub within_2m: bool,
    pub nearest_building_point: Point2,
    pub nearest_boundary_point: Point2,
}

/// Minimum distance between a building's outline and the plot boundary.
///
/// Measured ring to ring, so a building wholly inside the plot reports the
/// gap to the nearest boundary edge rather than zero.
///
/// # Errors
///
/// Returns `GeometryError::InsufficientGeometry` if either outline is empty.
pub fn min_distance_to_boundary(
    building: &MultiPolygon<f64>,
    boundary: &Polygon<f64>,
) -> Result<BoundaryDistance, GeometryError> {
    let boundary_ring = exterior_points(boundary);
    let best = exterior_rings(building)
        .iter()
        .filter_map(|ring| chain_to_chain(ring, true, &boundary_ring, true))
        .min_by(|a, b| a.2.total_cmp(&b.2))
        .ok_or_else(|| {
            GeometryError::InsufficientGeometry("building or boundary outline is empty".into())
        })?;

    let (on_building, on_boundary, distance) = best;
    Ok(BoundaryDistance {
        distance_mm: distance.round(),
        distance_m: round_to(distance * MM_TO_M, 2),
        within_2m: distance < BOUNDARY_ZONE_MM,
        nearest_building_point: on_building,
        nearest_boundary_point: on_boundary,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HighwayDistance {
    pub distance_mm: f64,
    pub distance_m: f64,
    /// Index of the nearest highway in the input slice.
    pub nearest_index: usize,
}

/// Distance from a building outline to the nearest highway. `None` when no
/// highways are given.
#[must_use]
pub fn distance_to_highway(
    building: &MultiPolygon<f64>,
    highways: &[Polyline],
) -> Option<HighwayDistance> {
    let rings = exterior_rings(building);
    let mut best: Option<(usize, f64)> = None;
    for (index, highway) in highways.iter().enumerate() {
        let vertices = highway.vertices();
        for ring in &rings {
            if let Some((_, _, d)) = chain_to_chain(ring, true, &vertices, false) {
                if best.is_none_or(|(_, b)| d < b) {
                    best = Some((index, d));
                }
            }
        }
    }
    best.map(|(nearest_index, d)| HighwayDistance {
        distance_mm: d.round(),
        distance_m: round_to(d * MM_TO_M, 2),
        nearest_index,
    })
}

/// Distance in mm from `origin` along `direction` to the first crossing of
/// the boundary outline. `None` for a zero direction or when the ray leaves
/// without crossing.
#[must_use]
pub fn distance_along(origin: &Point2, direction: &Vector2, boundary: &Polygon<f64>) -> Option<f64> {
    let len = direction.norm();
    if len < TOLERANCE {
        return None;
    }
    let dir = direction / len;
    let ring = exterior_points(boundary);
    let n = ring.len();
    (0..n)
        .filter_map(|i| ray_segment_intersect_2d(origin, &dir, &ring[i], &ring[(i + 1) % n]))
        .filter(|t| *t > TOLERANCE)
        .min_by(f64::total_cmp)
}
