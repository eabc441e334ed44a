use geo::{Area, BooleanOps, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::Inference;
use crate::config::InferenceConfig;
use crate::geometry::footprint::{all_points, difference, rectangle, to_line_string, union_all};
use crate::math::polygon_2d::{bounds_2d, convex_hull_2d};
use crate::math::{Point2, TOLERANCE};
use crate::parser::ParsedDrawing;

/// Layer-name fragments marking a wall as new work.
const EXTENSION_TAGS: [&str; 3] = ["extension", "proposed", "new"];

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DetectionMethod {
    LayerNames,
    GeometricHeuristic,
    #[default]
    None,
}

/// The house as first built, and what has been added to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OriginalSplit {
    pub original: Option<MultiPolygon<f64>>,
    pub extensions: Vec<Polygon<f64>>,
    pub method: DetectionMethod,
}

impl OriginalSplit {
    fn none() -> Self {
        Self {
            original: None,
            extensions: Vec::new(),
            method: DetectionMethod::None,
        }
    }
}

/// Separates the original house from extensions.
///
/// Layer names win when any wall is tagged as new work or the drawing has
/// explicit extension outlines. Otherwise the largest centred rectangle that
/// the footprint almost fills is taken as the original house.
#[must_use]
pub fn detect_original(parsed: &ParsedDrawing, config: &InferenceConfig) -> Inference<OriginalSplit> {
    if let Some(split) = split_by_layer(parsed) {
        tracing::debug!(extensions = split.extensions.len(), "original house from layer names");
        return Inference::confident(split, 0.9);
    }
    if parsed.walls.is_empty() {
        return Inference::confident(OriginalSplit::none(), 0.0);
    }

    let footprint = union_all(parsed.wall_outlines());
    let split = match main_rectangle(&footprint, config) {
        Some(rect) => {
            let extensions = difference(&footprint, &rect)
                .0
                .into_iter()
                .filter(|piece| piece.unsigned_area() >= config.min_extension_area_mm2)
                .collect();
            OriginalSplit {
                original: Some(MultiPolygon::new(vec![rect])),
                extensions,
                method: DetectionMethod::GeometricHeuristic,
            }
        }
        None => {
            let hull = convex_hull_2d(&all_points(&footprint));
            let original = (hull.len() >= 3)
                .then(|| MultiPolygon::new(vec![Polygon::new(to_line_string(&hull), vec![])]));
            OriginalSplit {
                original,
                extensions: Vec::new(),
                method: DetectionMethod::GeometricHeuristic,
            }
        }
    };
    tracing::debug!(extensions = split.extensions.len(), "original house estimated geometrically");
    Inference::confident(split, 0.6)
}

fn is_new_work(layer: &str) -> bool {
    let layer = layer.to_lowercase();
    EXTENSION_TAGS.iter().any(|tag| layer.contains(tag))
}

fn split_by_layer(parsed: &ParsedDrawing) -> Option<OriginalSplit> {
    let (new, existing): (Vec<_>, Vec<_>) = parsed.walls.iter().partition(|w| is_new_work(&w.layer));
    if new.is_empty() && parsed.extensions.is_empty() {
        return None;
    }
    let original = (!existing.is_empty()).then(|| union_all(existing.iter().map(|w| &w.outline)));
    let extensions = new
        .iter()
        .map(|w| w.outline.clone())
        .chain(parsed.extensions.iter().cloned())
        .collect();
    Some(OriginalSplit {
        original,
        extensions,
        method: DetectionMethod::LayerNames,
    })
}

/// Largest rectangle centred on the footprint's bounds that the footprint
/// covers to at least `min_rectangle_coverage`.
fn main_rectangle(footprint: &MultiPolygon<f64>, config: &InferenceConfig) -> Option<Polygon<f64>> {
    let (min, max) = bounds_2d(&all_points(footprint))?;
    let centre = Point2::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0);
    let (w, h) = (max.x - min.x, max.y - min.y);

    let mut best: Option<(f64, Polygon<f64>)> = None;
    for fw in &config.rectangle_factors {
        for fh in &config.rectangle_factors {
            let (half_w, half_h) = (w * fw / 2.0, h * fh / 2.0);
            let rect = rectangle(
                Point2::new(centre.x - half_w, centre.y - half_h),
                Point2::new(centre.x + half_w, centre.y + half_h),
            );
            let area = rect.unsigned_area();
            if area < TOLERANCE || best.as_ref().is_some_and(|(a, _)| *a >= area) {
                continue;
            }
            let covered = footprint
                .intersection(&MultiPolygon::new(vec![rect.clone()]))
                .unsigned_area();
            if covered / area >= config.min_rectangle_coverage {
                best = Some((area, rect));
            }
        }
    }
    best.map(|(_, rect)| rect)
}
