//! Turns raw drawing records into typed geometry sets.

pub mod classify;
pub mod object;
pub mod polygonize;

pub use classify::{classify, ObjectCategory};
pub use object::DrawingObject;

use std::collections::BTreeMap;

use geo::Polygon;
use serde::Serialize;

use crate::config::ParserConfig;
use crate::error::ParseError;
use crate::geometry::footprint::polygons_from_points;
use crate::geometry::Polyline;
use crate::math::Point2;

/// A wall outline together with the layer it was drawn on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wall {
    pub layer: String,
    pub outline: Polygon<f64>,
}

/// Typed geometry recovered from a drawing, in millimetres.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedDrawing {
    pub walls: Vec<Wall>,
    pub plot_boundary: Option<Polygon<f64>>,
    pub highways: Vec<Polyline>,
    pub doors: Vec<Polyline>,
    pub windows: Vec<Polyline>,
    pub extensions: Vec<Polygon<f64>>,
}

impl ParsedDrawing {
    /// True when the drawing holds neither walls nor a plot boundary.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.walls.is_empty() && self.plot_boundary.is_none()
    }

    #[must_use]
    pub fn wall_outlines(&self) -> Vec<&Polygon<f64>> {
        self.walls.iter().map(|w| &w.outline).collect()
    }

    fn set_plot_boundary(&mut self, polygon: Polygon<f64>, layer: &str) {
        if self.plot_boundary.is_some() {
            tracing::warn!(layer, "additional plot boundary ignored");
            return;
        }
        self.plot_boundary = Some(polygon);
    }

    fn add_polygon(&mut self, category: ObjectCategory, layer: &str, polygon: Polygon<f64>) {
        match category {
            ObjectCategory::PlotBoundary => self.set_plot_boundary(polygon, layer),
            ObjectCategory::Wall => self.walls.push(Wall {
                layer: layer.to_string(),
                outline: polygon,
            }),
            ObjectCategory::Extension => self.extensions.push(polygon),
            other => tracing::debug!(layer, category = %other, "closed outline not used"),
        }
    }

    fn add_linework(&mut self, category: ObjectCategory, line: Polyline) {
        match category {
            ObjectCategory::Highway => self.highways.push(line),
            ObjectCategory::Door => self.doors.push(line),
            ObjectCategory::Window => self.windows.push(line),
            _ => {}
        }
    }
}

/// Classifies drawing objects by layer and rebuilds outlines drawn as
/// loose lines.
#[derive(Debug, Clone, Default)]
pub struct DrawingParser {
    config: ParserConfig,
}

impl DrawingParser {
    #[must_use]
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parses drawing objects. Objects with unusable geometry are skipped
    /// and logged.
    #[must_use]
    pub fn parse(&self, objects: &[DrawingObject]) -> ParsedDrawing {
        let mut parsed = ParsedDrawing::default();
        // Layer name -> (category, chains). Ordered so reconstruction is
        // deterministic.
        let mut loose: BTreeMap<String, (ObjectCategory, Vec<Vec<Point2>>)> = BTreeMap::new();

        for (index, object) in objects.iter().enumerate() {
            let layer = object.layer();
            let category = classify(layer);
            let points = object.points();

            if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
                tracing::warn!(index, layer, "skipping object with non-finite coordinates");
                continue;
            }

            if object.is_closed() && points.len() >= 3 {
                if category.is_linework() {
                    let mut ring = points;
                    if let Some(&first) = ring.first() {
                        ring.push(first);
                    }
                    if let Ok(line) = Polyline::new(ring) {
                        parsed.add_linework(category, line);
                    }
                    continue;
                }
                match polygons_from_points(&points) {
                    Ok(pieces) => {
                        for piece in pieces {
                            parsed.add_polygon(category, layer, piece);
                        }
                    }
                    Err(err) => tracing::warn!(index, layer, %err, "skipping closed polyline"),
                }
                continue;
            }

            if points.len() < 2 {
                tracing::warn!(index, layer, points = points.len(), "skipping line with too few points");
                continue;
            }

            if category.is_linework() {
                if let Ok(line) = Polyline::new(points) {
                    parsed.add_linework(category, line);
                }
            } else {
                loose
                    .entry(layer.to_lowercase())
                    .or_insert_with(|| (category, Vec::new()))
                    .1
                    .push(points);
            }
        }

        for (layer, (category, chains)) in loose {
            let segments: usize = chains.iter().map(|c| c.len() - 1).sum();
            if segments < self.config.min_segments {
                tracing::debug!(layer, segments, "too few loose segments to polygonize");
                continue;
            }
            match polygonize::polygonize(&chains, self.config.snap_tolerance_mm) {
                Some(polygon) => {
                    tracing::debug!(layer, segments, "rebuilt outline from loose lines");
                    parsed.add_polygon(category, &layer, polygon);
                }
                None => tracing::warn!(layer, segments, "loose lines do not close; dropped"),
            }
        }

        tracing::debug!(
            walls = parsed.walls.len(),
            plot = parsed.plot_boundary.is_some(),
            highways = parsed.highways.len(),
            extensions = parsed.extensions.len(),
            "drawing parsed"
        );
        parsed
    }

    /// Parses a JSON array of drawing objects, skipping records that do not
    /// deserialize.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::NotAnArray` if `value` is not a JSON array.
    pub fn parse_json(&self, value: &serde_json::Value) -> Result<ParsedDrawing, ParseError> {
        Ok(self.parse(&read_objects(value)?))
    }
}

/// Deserializes every well-formed record of a JSON array.
///
/// # Errors
///
/// Returns `ParseError::NotAnArray` if `value` is not a JSON array.
pub fn read_objects(value: &serde_json::Value) -> Result<Vec<DrawingObject>, ParseError> {
    let items = value.as_array().ok_or(ParseError::NotAnArray)?;
    let mut objects = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match serde_json::from_value::<DrawingObject>(item.clone()) {
            Ok(object) => objects.push(object),
            Err(err) => {
                let err = ParseError::MalformedObject {
                    index,
                    reason: err.to_string(),
                };
                tracing::warn!(%err, "skipping drawing object");
            }
        }
    }
    Ok(objects)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use geo::Area;
    use serde_json::json;

    use super::*;

    fn parser() -> DrawingParser {
        DrawingParser::default()
    }

    #[test]
    fn closed_polylines_are_sorted_by_layer() {
        let parsed = parser().parse(&[
            DrawingObject::rectangle("plot_boundary", [0.0, 0.0], [20000.0, 20000.0]),
            DrawingObject::rectangle("walls", [5000.0, 5000.0], [15000.0, 15000.0]),
            DrawingObject::rectangle("extension", [5000.0, 15000.0], [9000.0, 18000.0]),
            DrawingObject::line("highway", [0.0, -2000.0], [20000.0, -2000.0]),
            DrawingObject::line("front door", [9000.0, 5000.0], [10000.0, 5000.0]),
            DrawingObject::line("window", [6000.0, 5000.0], [7000.0, 5000.0]),
        ]);
        assert!((parsed.plot_boundary.as_ref().unwrap().unsigned_area() - 4e8).abs() < 1.0);
        assert_eq!(parsed.walls.len(), 1);
        assert_eq!(parsed.walls[0].layer, "walls");
        assert_eq!(parsed.extensions.len(), 1);
        assert_eq!(parsed.highways.len(), 1);
        assert_eq!(parsed.doors.len(), 1);
        assert_eq!(parsed.windows.len(), 1);
        assert!(!parsed.is_empty());
    }

    #[test]
    fn first_plot_boundary_wins() {
        let parsed = parser().parse(&[
            DrawingObject::rectangle("plot", [0.0, 0.0], [20000.0, 20000.0]),
            DrawingObject::rectangle("boundary", [0.0, 0.0], [1000.0, 1000.0]),
        ]);
        assert!((parsed.plot_boundary.unwrap().unsigned_area() - 4e8).abs() < 1.0);
    }

    #[test]
    fn loose_wall_lines_are_polygonized() {
        let parsed = parser().parse(&[
            DrawingObject::line("WALLS", [0.0, 0.0], [8000.0, 0.0]),
            DrawingObject::line("WALLS", [8000.0, 0.0], [8000.0, 6000.0]),
            DrawingObject::line("WALLS", [8000.0, 6000.0], [0.0, 6000.0]),
            DrawingObject::line("WALLS", [0.0, 6000.0], [0.0, 20.0]),
        ]);
        assert_eq!(parsed.walls.len(), 1);
        assert!((parsed.walls[0].outline.unsigned_area() - 48e6).abs() / 48e6 < 0.01);
    }

    #[test]
    fn loose_plot_lines_do_not_replace_explicit_boundary() {
        let parsed = parser().parse(&[
            DrawingObject::rectangle("plot", [0.0, 0.0], [20000.0, 20000.0]),
            DrawingObject::line("plot", [0.0, 0.0], [1000.0, 0.0]),
            DrawingObject::line("plot", [1000.0, 0.0], [1000.0, 1000.0]),
            DrawingObject::line("plot", [1000.0, 1000.0], [0.0, 0.0]),
        ]);
        assert!((parsed.plot_boundary.unwrap().unsigned_area() - 4e8).abs() < 1.0);
    }

    #[test]
    fn two_loose_lines_are_not_enough() {
        let parsed = parser().parse(&[
            DrawingObject::line("wall", [0.0, 0.0], [8000.0, 0.0]),
            DrawingObject::line("wall", [8000.0, 0.0], [0.0, 0.0]),
        ]);
        assert!(parsed.walls.is_empty());
        assert!(parsed.is_empty());
    }

    #[test]
    fn degenerate_objects_are_skipped() {
        let parsed = parser().parse(&[
            DrawingObject::polyline("walls", true, &[[0.0, 0.0], [1.0, 1.0]]),
            DrawingObject::polyline("highway", false, &[[0.0, 0.0]]),
            DrawingObject::polyline("walls", true, &[[0.0, 0.0], [f64::NAN, 0.0], [1.0, 1.0]]),
        ]);
        assert!(parsed.is_empty());
        assert!(parsed.highways.is_empty());
    }

    #[test]
    fn closed_highway_kept_as_closed_line() {
        let parsed = parser().parse(&[DrawingObject::rectangle(
            "road",
            [0.0, -5000.0],
            [20000.0, -1000.0],
        )]);
        assert_eq!(parsed.highways.len(), 1);
        let pts = &parsed.highways[0].points;
        assert_eq!(pts.len(), 5);
        assert_eq!(pts.first(), pts.last());
    }

    #[test]
    fn json_with_malformed_records() {
        let value = json!([
            {"type": "POLYLINE", "layer": "walls", "closed": true,
             "points": [[0, 0], [10000, 0], [10000, 10000], [0, 10000]]},
            {"type": "LINE", "layer": "highway"},
            {"type": "ARC", "layer": "walls"},
            42,
            {"type": "LINE", "layer": "highway", "start": [0, -2000], "end": [10000, -2000]}
        ]);
        let parsed = parser().parse_json(&value).unwrap();
        assert_eq!(parsed.walls.len(), 1);
        assert_eq!(parsed.highways.len(), 1);
    }

    #[test]
    fn json_must_be_an_array() {
        let err = parser().parse_json(&json!({"type": "LINE"})).unwrap_err();
        assert!(matches!(err, ParseError::NotAnArray));
    }
}
