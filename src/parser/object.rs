use serde::{Deserialize, Serialize};

use crate::math::Point2;

/// A raw drawing record as exported by the drawing tool. Coordinates are
/// millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum DrawingObject {
    Line {
        #[serde(default)]
        layer: String,
        start: [f64; 2],
        end: [f64; 2],
    },
    Polyline {
        #[serde(default)]
        layer: String,
        #[serde(default)]
        closed: bool,
        points: Vec<[f64; 2]>,
    },
}

impl DrawingObject {
    #[must_use]
    pub fn line(layer: &str, start: [f64; 2], end: [f64; 2]) -> Self {
        Self::Line {
            layer: layer.to_string(),
            start,
            end,
        }
    }

    #[must_use]
    pub fn polyline(layer: &str, closed: bool, points: &[[f64; 2]]) -> Self {
        Self::Polyline {
            layer: layer.to_string(),
            closed,
            points: points.to_vec(),
        }
    }

    /// Closed rectangle from two opposite corners.
    #[must_use]
    pub fn rectangle(layer: &str, min: [f64; 2], max: [f64; 2]) -> Self {
        Self::polyline(
            layer,
            true,
            &[min, [max[0], min[1]], max, [min[0], max[1]]],
        )
    }

    #[must_use]
    pub fn layer(&self) -> &str {
        match self {
            Self::Line { layer, .. } | Self::Polyline { layer, .. } => layer,
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Polyline { closed: true, .. })
    }

    #[must_use]
    pub fn points(&self) -> Vec<Point2> {
        match self {
            Self::Line { start, end, .. } => {
                vec![Point2::new(start[0], start[1]), Point2::new(end[0], end[1])]
            }
            Self::Polyline { points, .. } => {
                points.iter().map(|p| Point2::new(p[0], p[1])).collect()
            }
        }
    }
}
