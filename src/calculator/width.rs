use geo::{MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::geometry::footprint::all_points;
use crate::math::polygon_2d::{bounds_2d, min_area_rect};
use crate::math::{round_to, MM_TO_M, TOLERANCE};

/// Which extent to report as width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidthAxis {
    /// Shorter side of the minimum-area rotated bounding rectangle.
    #[default]
    Auto,
    /// Extent along x of the axis-aligned box.
    X,
    /// Extent along y of the axis-aligned box.
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WidthReport {
    pub width_mm: f64,
    pub width_m: f64,
    pub length_mm: f64,
    pub length_m: f64,
}

/// Width and length of a building footprint.
///
/// # Errors
///
/// Returns `GeometryError::InsufficientGeometry` if the footprint has no
/// area to bound.
pub fn building_width(
    building: &MultiPolygon<f64>,
    axis: WidthAxis,
) -> Result<WidthReport, GeometryError> {
    let points = all_points(building);
    let (width, length) = match axis {
        WidthAxis::Auto => {
            let rect = min_area_rect(&points).ok_or_else(|| {
                GeometryError::InsufficientGeometry("footprint has no area to bound".into())
            })?;
            (rect.width, rect.length)
        }
        WidthAxis::X | WidthAxis::Y => {
            let (min, max) = bounds_2d(&points).ok_or_else(|| {
                GeometryError::InsufficientGeometry("footprint has no vertices".into())
            })?;
            let (dx, dy) = (max.x - min.x, max.y - min.y);
            if axis == WidthAxis::X {
                (dx, dy)
            } else {
                (dy, dx)
            }
        }
    };
    Ok(WidthReport {
        width_mm: width.round(),
        width_m: round_to(width * MM_TO_M, 2),
        length_mm: length.round(),
        length_m: round_to(length * MM_TO_M, 2),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HalfWidthReport {
    pub original_width_m: f64,
    pub extension_width_m: f64,
    pub half_original_width_m: f64,
    pub compliant: bool,
    pub excess_m: f64,
}

/// A side extension may be no wider than half the original house.
///
/// Widths are compared unrounded, in millimetres.
///
/// # Errors
///
/// Returns `GeometryError::InsufficientGeometry` if either outline is
/// degenerate.
pub fn half_width_rule(
    original: &MultiPolygon<f64>,
    extension: &Polygon<f64>,
) -> Result<HalfWidthReport, GeometryError> {
    let original_mm = raw_width(original)?;
    let extension_mm = raw_width(&MultiPolygon::new(vec![extension.clone()]))?;
    let half_mm = original_mm / 2.0;

    Ok(HalfWidthReport {
        original_width_m: round_to(original_mm * MM_TO_M, 2),
        extension_width_m: round_to(extension_mm * MM_TO_M, 2),
        half_original_width_m: round_to(half_mm * MM_TO_M, 2),
        compliant: extension_mm <= half_mm + TOLERANCE,
        excess_m: round_to((extension_mm - half_mm).max(0.0) * MM_TO_M, 2),
    })
}

fn raw_width(building: &MultiPolygon<f64>) -> Result<f64, GeometryError> {
    min_area_rect(&all_points(building))
        .map(|rect| rect.width)
        .ok_or_else(|| GeometryError::InsufficientGeometry("footprint has no area to bound".into()))
}
