use geo::MultiPolygon;
use serde::Serialize;

use super::Inference;
use crate::calculator::area::footprint_area_mm2;
use crate::config::InferenceConfig;
use crate::geometry::footprint::all_points;
use crate::math::polygon_2d::min_area_rect;
use crate::math::TOLERANCE;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LShape {
    pub is_l_shaped: bool,
    /// Footprint area over the area of its minimum rotated bounding rectangle.
    pub fill_ratio: f64,
}

/// A footprint that fills too little of its bounding rectangle is treated
/// as L-shaped (or otherwise irregular).
#[must_use]
pub fn detect_l_shape(footprint: &MultiPolygon<f64>, config: &InferenceConfig) -> Inference<LShape> {
    let rect_area = min_area_rect(&all_points(footprint)).map_or(0.0, |r| r.area());
    if rect_area < TOLERANCE {
        return Inference::confident(
            LShape {
                is_l_shaped: false,
                fill_ratio: 1.0,
            },
            1.0,
        );
    }
    let fill_ratio = footprint_area_mm2(footprint) / rect_area;
    Inference::confident(
        LShape {
            is_l_shaped: fill_ratio < config.l_shape_fill_threshold,
            fill_ratio,
        },
        1.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::footprint::{rectangle, union_all};
    use crate::math::Point2;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn rectangle_fills_its_box() {
        let fp = union_all([&rectangle(p(0.0, 0.0), p(8000.0, 5000.0))]);
        let shape = detect_l_shape(&fp, &InferenceConfig::default()).value;
        assert!(!shape.is_l_shaped);
        assert!((shape.fill_ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn l_footprint() {
        let fp = union_all([
            &rectangle(p(0.0, 0.0), p(10000.0, 4000.0)),
            &rectangle(p(0.0, 4000.0), p(4000.0, 10000.0)),
        ]);
        let shape = detect_l_shape(&fp, &InferenceConfig::default()).value;
        // 64 m² of a 100 m² box.
        assert!(shape.is_l_shaped);
        assert!((shape.fill_ratio - 0.64).abs() < 1e-9);
    }

    #[test]
    fn empty_footprint_is_not_l_shaped() {
        let shape = detect_l_shape(&MultiPolygon::new(vec![]), &InferenceConfig::default()).value;
        assert!(!shape.is_l_shaped);
    }
}
