use geo::Polygon;
use serde::Serialize;

use crate::error::GeometryError;
use crate::geometry::footprint::exterior_points;
use crate::geometry::Segment;
use crate::math::distance_2d::signed_distance_to_line;
use crate::math::{round_to, MM_TO_M};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DepthReport {
    pub depth_mm: f64,
    pub depth_m: f64,
}

/// How far an extension projects behind a rear wall, measured
/// perpendicular to the wall line.
///
/// Only vertices to the left of `rear_wall.start → rear_wall.end` count as
/// behind the wall, so the wall must be oriented with the building exterior
/// on its left. An extension entirely in front of the wall has depth zero.
///
/// # Errors
///
/// Returns `GeometryError::InsufficientGeometry` for a zero-length wall.
pub fn extension_depth(
    extension: &Polygon<f64>,
    rear_wall: &Segment,
) -> Result<DepthReport, GeometryError> {
    let mut depth: f64 = 0.0;
    for v in exterior_points(extension) {
        let d = signed_distance_to_line(&v, &rear_wall.start, &rear_wall.end).ok_or_else(|| {
            GeometryError::InsufficientGeometry("rear wall has zero length".into())
        })?;
        if d > 0.0 {
            depth = depth.max(d);
        }
    }
    Ok(DepthReport {
        depth_mm: depth.round(),
        depth_m: round_to(depth * MM_TO_M, 2),
    })
}
