//! Semantic labelling of building geometry: which wall is the front, which
//! is the rear, which walls are shared, and which parts are extensions.
//!
//! Every stage reports a confidence and, when the geometry is ambiguous, a
//! question to put to the applicant. Ambiguity is never an error.

pub mod original;
pub mod party;
pub mod principal;
pub mod rear;
pub mod shape;

pub use original::{detect_original, DetectionMethod, OriginalSplit};
pub use party::{identify_party_walls, PartyWalls, Side};
pub use principal::{identify_principal_elevation, score_highways, HighwayScore, PrincipalElevation};
pub use rear::{identify_rear_wall, RearWall};
pub use shape::{detect_l_shape, LShape};

use geo::{MultiPolygon, Polygon};
use serde::Serialize;

use crate::config::InferenceConfig;
use crate::geometry::footprint::{outline_segments, union_all};
use crate::geometry::{Cardinal, Segment};
use crate::math::{round_to, MM_TO_M};
use crate::metadata::SessionMetadata;
use crate::parser::ParsedDrawing;

/// A value inferred from geometry, with how sure the engine is about it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inference<T> {
    pub value: T,
    /// In `[0, 1]`.
    pub confidence: f64,
    /// Question for the applicant when the value should be confirmed.
    pub clarification: Option<String>,
}

impl<T> Inference<T> {
    #[must_use]
    pub fn confident(value: T, confidence: f64) -> Self {
        Self {
            value,
            confidence,
            clarification: None,
        }
    }

    #[must_use]
    pub fn unsure(value: T, confidence: f64, reason: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            clarification: Some(reason.into()),
        }
    }

    #[must_use]
    pub fn requires_clarification(&self) -> bool {
        self.clarification.is_some()
    }
}

/// Everything the engine inferred about a drawing. Distances are
/// millimetres; see [`SpatialAnalysisResult::summary`] for the reported form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpatialAnalysisResult {
    /// Union of all wall outlines.
    pub footprint: MultiPolygon<f64>,

    /// Oriented with the building interior on its left.
    pub principal_wall: Option<Segment>,
    pub principal_direction: Option<Cardinal>,
    pub highway_distance_mm: Option<f64>,
    pub fronting_angle: Option<f64>,
    pub confidence: f64,
    pub requires_clarification: bool,
    pub clarification_reason: Option<String>,

    /// Oriented with the building exterior on its left.
    pub rear_wall: Option<Segment>,
    pub distance_from_principal_mm: Option<f64>,
    pub is_stepped: bool,

    pub is_l_shaped: bool,
    pub fill_ratio: f64,

    pub original_footprint: Option<MultiPolygon<f64>>,
    pub extensions: Vec<Polygon<f64>>,
    pub detection_method: DetectionMethod,
    pub original_confidence: f64,

    pub party_walls: Vec<Segment>,
    pub buildable_sides: Vec<Side>,
    /// `None` when party walls were not looked for.
    pub party_wall_confidence: Option<f64>,
}

impl Default for SpatialAnalysisResult {
    fn default() -> Self {
        Self {
            footprint: MultiPolygon::new(vec![]),
            principal_wall: None,
            principal_direction: None,
            highway_distance_mm: None,
            fronting_angle: None,
            confidence: 0.0,
            requires_clarification: false,
            clarification_reason: None,
            rear_wall: None,
            distance_from_principal_mm: None,
            is_stepped: false,
            is_l_shaped: false,
            fill_ratio: 1.0,
            original_footprint: None,
            extensions: Vec::new(),
            detection_method: DetectionMethod::None,
            original_confidence: 0.0,
            party_walls: Vec::new(),
            buildable_sides: vec![Side::Left, Side::Right],
            party_wall_confidence: None,
        }
    }
}

/// Reported projection of a [`SpatialAnalysisResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpatialSummary {
    pub principal_direction: Option<Cardinal>,
    pub highway_distance_m: Option<f64>,
    pub fronting_angle: Option<f64>,
    pub confidence: f64,
    pub requires_clarification: bool,
    pub clarification_reason: Option<String>,
    pub distance_from_principal_m: Option<f64>,
    pub is_stepped: bool,
    pub is_l_shaped: bool,
    pub fill_ratio: f64,
    pub detection_method: DetectionMethod,
    pub buildable_sides: Vec<Side>,
    pub extension_count: usize,
}

impl SpatialAnalysisResult {
    #[must_use]
    pub fn summary(&self) -> SpatialSummary {
        let metres = |mm: Option<f64>| mm.map(|d| round_to(d * MM_TO_M, 2));
        SpatialSummary {
            principal_direction: self.principal_direction,
            highway_distance_m: metres(self.highway_distance_mm),
            fronting_angle: self.fronting_angle.map(|a| round_to(a, 2)),
            confidence: self.confidence,
            requires_clarification: self.requires_clarification,
            clarification_reason: self.clarification_reason.clone(),
            distance_from_principal_m: metres(self.distance_from_principal_mm),
            is_stepped: self.is_stepped,
            is_l_shaped: self.is_l_shaped,
            fill_ratio: round_to(self.fill_ratio, 2),
            detection_method: self.detection_method,
            buildable_sides: self.buildable_sides.clone(),
            extension_count: self.extensions.len(),
        }
    }

    fn ask(&mut self, reason: Option<String>) {
        let Some(reason) = reason else { return };
        self.requires_clarification = true;
        self.clarification_reason = Some(match self.clarification_reason.take() {
            Some(existing) => format!("{existing}; {reason}"),
            None => reason,
        });
    }
}

/// Runs every inference stage over a parsed drawing.
#[derive(Debug, Clone, Default)]
pub struct SpatialInferenceEngine {
    config: InferenceConfig,
}

impl SpatialInferenceEngine {
    #[must_use]
    pub fn new(config: InferenceConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Analyses a drawing.
    ///
    /// The front and rear walls are looked for on the original house when
    /// layer names identify it, otherwise on the whole footprint.
    #[must_use]
    pub fn analyze(&self, parsed: &ParsedDrawing, metadata: &SessionMetadata) -> SpatialAnalysisResult {
        let mut result = SpatialAnalysisResult::default();
        if parsed.walls.is_empty() {
            result.ask(Some("No building walls found in drawing".into()));
            tracing::debug!("no walls; spatial analysis skipped");
            return result;
        }

        result.footprint = union_all(parsed.wall_outlines());

        let original = detect_original(parsed, &self.config);
        result.original_confidence = original.confidence;
        let split = original.value;
        let reference = match (&split.method, &split.original) {
            (DetectionMethod::LayerNames, Some(footprint)) => footprint.clone(),
            _ => result.footprint.clone(),
        };
        result.detection_method = split.method;
        result.original_footprint = split.original;
        result.extensions = split.extensions;

        let segments = outline_segments(&reference);
        let principal = identify_principal_elevation(&segments, parsed, &self.config);
        result.confidence = principal.confidence;
        result.ask(principal.clarification);
        if let Some(front) = principal.value {
            result.principal_wall = Some(front.wall);
            result.principal_direction = Some(front.direction);
            result.highway_distance_mm = front.highway_distance_mm;
            result.fronting_angle = front.fronting_angle;

            let rear = identify_rear_wall(&segments, &front, &self.config);
            result.ask(rear.clarification);
            if let Some(rear) = rear.value {
                result.rear_wall = Some(rear.wall);
                result.distance_from_principal_mm = Some(rear.distance_from_principal_mm);
                result.is_stepped = rear.is_stepped;
            }
        }

        let shape = detect_l_shape(&result.footprint, &self.config);
        result.is_l_shaped = shape.value.is_l_shaped;
        result.fill_ratio = shape.value.fill_ratio;

        if let (Some(house_type), Some(plot)) = (metadata.house_type, &parsed.plot_boundary) {
            let party = identify_party_walls(
                &outline_segments(&result.footprint),
                &result.footprint,
                plot,
                house_type,
                parsed,
                &self.config,
            );
            result.party_wall_confidence = Some(party.confidence);
            result.ask(party.clarification);
            result.party_walls = party.value.walls;
            result.buildable_sides = party.value.buildable_sides;
        }

        if result.confidence <= 0.0 && !result.requires_clarification {
            result.ask(Some("Could not identify the principal elevation".into()));
        }

        tracing::debug!(
            direction = ?result.principal_direction,
            confidence = result.confidence,
            method = %result.detection_method,
            clarification = result.requires_clarification,
            "spatial analysis complete"
        );
        result
    }
}
