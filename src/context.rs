//! The flat key/value context that compliance rules read.
//!
//! Keys are filled from calculator measurements over the parsed drawing and
//! the spatial result, plus whatever the caller knows about the property.
//! A measurement that cannot be made leaves its key absent.

use std::collections::BTreeMap;

use geo::Polygon;
use serde::{Deserialize, Serialize};

use crate::calculator::{
    distance_along, distance_to_highway, extension_depth, footprint_area_m2, half_width_rule,
    min_distance_to_boundary, union_footprint, CurtilageCoverage, ExtendsBeyondWall,
};
use crate::config::CalculatorConfig;
use crate::error::RuleError;
use crate::geometry::footprint::exterior_points;
use crate::inference::{DetectionMethod, SpatialAnalysisResult};
use crate::math::distance_2d::signed_distance_to_line;
use crate::math::{round_to, MM_TO_M};
use crate::metadata::SessionMetadata;
use crate::parser::ParsedDrawing;

/// Context key names.
pub mod keys {
    pub const COVERAGE_RATIO: &str = "coverage_ratio";
    pub const COVERAGE_PERCENT: &str = "coverage_percent";
    pub const COVERAGE_COMPLIANT: &str = "coverage_compliant";
    pub const REMAINING_ALLOWANCE_M2: &str = "remaining_allowance_m2";
    pub const PLOT_AREA_M2: &str = "plot_area_m2";
    pub const FOOTPRINT_AREA_M2: &str = "footprint_area_m2";
    pub const DISTANCE_TO_BOUNDARY_M: &str = "distance_to_boundary_m";
    pub const HIGHWAY_DISTANCE_M: &str = "highway_distance_m";
    pub const EXTENSION_DEPTH_M: &str = "extension_depth_m";
    pub const EXTENDS_BEYOND_PRINCIPAL: &str = "extends_beyond_principal";
    pub const EXTENSION_WIDTH_M: &str = "extension_width_m";
    pub const HALF_ORIGINAL_WIDTH_M: &str = "half_original_width_m";
    pub const HALF_WIDTH_COMPLIANT: &str = "half_width_compliant";
    pub const DISTANCE_TO_REAR_BOUNDARY_M: &str = "distance_to_rear_boundary_m";
    pub const PRINCIPAL_DIRECTION: &str = "principal_direction";
    pub const SPATIAL_CONFIDENCE: &str = "spatial_confidence";

    pub const HOUSE_TYPE: &str = "house_type";
    pub const LAND_TYPE: &str = "land_type";
    pub const EXTENSION_TYPE: &str = "extension_type";
    pub const STOREYS: &str = "storeys";
    pub const NEIGHBOUR_CONSULTATION: &str = "neighbour_consultation";
    pub const ROOF_TYPE: &str = "roof_type";
    pub const PRIOR_EXTENSIONS_SQM: &str = "prior_extensions_sqm";
    pub const EAVES_HEIGHT_M: &str = "eaves_height_m";
    pub const EXTENSION_HEIGHT_M: &str = "extension_height_m";
    pub const LOFT_VOLUME_M3: &str = "loft_volume_m3";
    pub const HAS_DORMER: &str = "has_dormer";
    pub const DORMER_SETBACK_M: &str = "dormer_setback_m";
    pub const HAS_ROOFLIGHT: &str = "has_rooflight";
    pub const ROOFLIGHT_PROTRUSION_M: &str = "rooflight_protrusion_m";
    pub const PORCH_AREA_M2: &str = "porch_area_m2";
    pub const PORCH_HEIGHT_M: &str = "porch_height_m";
    pub const OUTBUILDING_HEIGHT_M: &str = "outbuilding_height_m";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl From<f64> for ContextValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<u32> for ContextValue {
    fn from(v: u32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<bool> for ContextValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for ContextValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Flat evaluation context for one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationContext {
    values: BTreeMap<String, ContextValue>,
}

impl EvaluationContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: impl Into<ContextValue>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// Inserts only when the value is present.
    pub fn insert_opt<V: Into<ContextValue>>(&mut self, key: &str, value: Option<V>) {
        if let Some(v) = value {
            self.insert(key, v);
        }
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<ContextValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<ContextValue> {
        self.values.remove(key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.values.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContextValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// # Errors
    ///
    /// Returns `RuleError::TypeMismatch` when the key holds a non-number.
    pub fn number(&self, key: &str) -> Result<Option<f64>, RuleError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(ContextValue::Number(v)) => Ok(Some(*v)),
            Some(_) => Err(mismatch(key, "number")),
        }
    }

    /// A number that must be a non-negative measurement.
    ///
    /// # Errors
    ///
    /// Returns `RuleError::TypeMismatch` for a non-number and
    /// `RuleError::InvalidValue` for a negative or non-finite number.
    pub fn measurement(&self, key: &str) -> Result<Option<f64>, RuleError> {
        match self.number(key)? {
            Some(v) if !v.is_finite() || v < 0.0 => Err(RuleError::InvalidValue {
                key: key.to_string(),
                value: v,
            }),
            other => Ok(other),
        }
    }

    /// # Errors
    ///
    /// Returns `RuleError::TypeMismatch` when the key holds a non-boolean.
    pub fn boolean(&self, key: &str) -> Result<Option<bool>, RuleError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(ContextValue::Bool(v)) => Ok(Some(*v)),
            Some(_) => Err(mismatch(key, "boolean")),
        }
    }

    /// # Errors
    ///
    /// Returns `RuleError::TypeMismatch` when the key holds a non-string.
    pub fn text(&self, key: &str) -> Result<Option<&str>, RuleError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(ContextValue::Text(v)) => Ok(Some(v.as_str())),
            Some(_) => Err(mismatch(key, "string")),
        }
    }

    /// True when the key holds exactly this text.
    #[must_use]
    pub fn is(&self, key: &str, expected: &str) -> bool {
        matches!(self.values.get(key), Some(ContextValue::Text(v)) if v == expected)
    }

    /// True only when the key holds `true`.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.values.get(key), Some(ContextValue::Bool(true)))
    }

    /// The number under `key`, or `default` when absent or not a number.
    #[must_use]
    pub fn number_or(&self, key: &str, default: f64) -> f64 {
        match self.values.get(key) {
            Some(ContextValue::Number(v)) => *v,
            _ => default,
        }
    }

    /// Builds the context for one drawing.
    ///
    /// Measurements about "the extension" use the detected extensions when
    /// there are any, otherwise the whole footprint. Coverage only excludes
    /// the original house when layer names identified it.
    #[must_use]
    pub fn assemble(
        parsed: &ParsedDrawing,
        spatial: &SpatialAnalysisResult,
        metadata: &SessionMetadata,
        config: &CalculatorConfig,
    ) -> Self {
        let mut ctx = Self::new();
        ctx.add_metadata(metadata);
        ctx.insert(keys::SPATIAL_CONFIDENCE, spatial.confidence);
        ctx.insert_opt(
            keys::PRINCIPAL_DIRECTION,
            spatial.principal_direction.map(|d| d.to_string()),
        );

        let subject = if spatial.extensions.is_empty() {
            spatial.footprint.clone()
        } else {
            union_footprint(&spatial.extensions)
        };

        if !parsed.walls.is_empty() {
            let buildings = union_footprint(parsed.wall_outlines().into_iter().chain(&parsed.extensions));
            ctx.insert(keys::FOOTPRINT_AREA_M2, footprint_area_m2(&buildings));
        }

        if let Some(plot) = &parsed.plot_boundary {
            ctx.add_coverage(parsed, spatial, metadata, plot);
            if !subject.0.is_empty() {
                match min_distance_to_boundary(&subject, plot) {
                    Ok(d) => ctx.insert(keys::DISTANCE_TO_BOUNDARY_M, d.distance_m),
                    Err(e) => tracing::debug!(error = %e, "boundary distance not computed"),
                }
            }
        }

        if let Some(d) = distance_to_highway(&subject, &parsed.highways) {
            ctx.insert(keys::HIGHWAY_DISTANCE_M, d.distance_m);
        }

        ctx.add_extension_measurements(parsed, spatial, config);

        let rear_override = metadata.distance_to_rear_boundary_m;
        let rear_measured = rear_override.is_none().then(|| rear_boundary_distance(parsed, spatial)).flatten();
        ctx.insert_opt(keys::DISTANCE_TO_REAR_BOUNDARY_M, rear_override.or(rear_measured));

        tracing::debug!(keys = ctx.len(), "evaluation context assembled");
        ctx
    }

    fn add_metadata(&mut self, metadata: &SessionMetadata) {
        self.insert_opt(keys::HOUSE_TYPE, metadata.house_type.map(|h| h.to_string()));
        self.insert_opt(keys::LAND_TYPE, metadata.land_type.map(|l| l.to_string()));
        self.insert_opt(keys::EXTENSION_TYPE, metadata.extension_type.map(|e| e.category()));
        self.insert_opt(keys::STOREYS, metadata.effective_storeys());
        self.insert_opt(keys::NEIGHBOUR_CONSULTATION, metadata.neighbour_consultation);
        self.insert_opt(keys::ROOF_TYPE, metadata.roof_type.map(|r| r.to_string()));
        self.insert_opt(keys::PRIOR_EXTENSIONS_SQM, metadata.prior_extensions_sqm);
        self.insert_opt(keys::EAVES_HEIGHT_M, metadata.eaves_height_m);
        self.insert_opt(keys::EXTENSION_HEIGHT_M, metadata.extension_height_m);
        self.insert_opt(keys::LOFT_VOLUME_M3, metadata.loft_volume_m3);
        self.insert_opt(keys::HAS_DORMER, metadata.has_dormer);
        self.insert_opt(keys::DORMER_SETBACK_M, metadata.dormer_setback_m);
        self.insert_opt(keys::HAS_ROOFLIGHT, metadata.has_rooflight);
        self.insert_opt(keys::ROOFLIGHT_PROTRUSION_M, metadata.rooflight_protrusion_m);
        self.insert_opt(keys::PORCH_AREA_M2, metadata.porch_area_m2);
        self.insert_opt(keys::PORCH_HEIGHT_M, metadata.porch_height_m);
        self.insert_opt(keys::OUTBUILDING_HEIGHT_M, metadata.outbuilding_height_m);
    }

    fn add_coverage(
        &mut self,
        parsed: &ParsedDrawing,
        spatial: &SpatialAnalysisResult,
        metadata: &SessionMetadata,
        plot: &Polygon<f64>,
    ) {
        let buildings: Vec<Polygon<f64>> = parsed
            .walls
            .iter()
            .map(|w| w.outline.clone())
            .chain(parsed.extensions.iter().cloned())
            .collect();

        let mut op = CurtilageCoverage::new(plot, &buildings)
            .with_prior_extensions_m2(metadata.prior_extensions_sqm.unwrap_or(0.0));
        if spatial.detection_method == DetectionMethod::LayerNames {
            if let Some(original) = &spatial.original_footprint {
                op = op.with_original(original);
            }
        }
        let report = op.execute();

        self.insert(keys::PLOT_AREA_M2, report.curtilage_area_m2);
        self.insert(keys::COVERAGE_RATIO, report.exact_ratio);
        self.insert(keys::COVERAGE_PERCENT, report.coverage_percent);
        self.insert(keys::COVERAGE_COMPLIANT, report.compliant_50_percent);
        self.insert(keys::REMAINING_ALLOWANCE_M2, report.remaining_allowance_m2);
    }

    fn add_extension_measurements(
        &mut self,
        parsed: &ParsedDrawing,
        spatial: &SpatialAnalysisResult,
        config: &CalculatorConfig,
    ) {
        if let Some(rear) = &spatial.rear_wall {
            if !spatial.extensions.is_empty() {
                let depths: Result<Vec<f64>, _> = spatial
                    .extensions
                    .iter()
                    .map(|ext| extension_depth(ext, rear).map(|d| d.depth_mm))
                    .collect();
                match depths {
                    Ok(depths) => {
                        let deepest = depths.into_iter().fold(0.0, f64::max);
                        self.insert(keys::EXTENSION_DEPTH_M, round_to(deepest * MM_TO_M, 2));
                    }
                    Err(e) => tracing::debug!(error = %e, "extension depth not computed"),
                }
            }
        }

        // Needs a front wall and a plot even when there is nothing to test.
        if let (Some(front), Some(plot)) = (&spatial.principal_wall, &parsed.plot_boundary) {
            let beyond: Result<Vec<bool>, _> = spatial
                .extensions
                .iter()
                .map(|ext| {
                    ExtendsBeyondWall::new(ext, front, plot)
                        .with_line_extension(config.line_extension_mm)
                        .execute()
                })
                .collect();
            match beyond {
                Ok(flags) => self.insert(keys::EXTENDS_BEYOND_PRINCIPAL, flags.contains(&true)),
                Err(e) => tracing::debug!(error = %e, "principal elevation test not computed"),
            }
        }

        if let Some(original) = &spatial.original_footprint {
            let widest = spatial
                .extensions
                .iter()
                .filter_map(|ext| half_width_rule(original, ext).ok())
                .max_by(|a, b| a.extension_width_m.total_cmp(&b.extension_width_m));
            if let Some(report) = widest {
                self.insert(keys::EXTENSION_WIDTH_M, report.extension_width_m);
                self.insert(keys::HALF_ORIGINAL_WIDTH_M, report.half_original_width_m);
                self.insert(keys::HALF_WIDTH_COMPLIANT, report.compliant);
            }
        }
    }
}

fn mismatch(key: &str, expected: &'static str) -> RuleError {
    RuleError::TypeMismatch {
        key: key.to_string(),
        expected,
    }
}

/// Distance from the back of the building (the furthest extension vertex
/// behind the rear wall, or the rear wall itself) to the plot boundary,
/// measured straight out from the rear wall.
fn rear_boundary_distance(parsed: &ParsedDrawing, spatial: &SpatialAnalysisResult) -> Option<f64> {
    let plot = parsed.plot_boundary.as_ref()?;
    let rear = spatial.rear_wall.as_ref()?;
    let outward = rear.left_normal();

    let origin = spatial
        .extensions
        .iter()
        .flat_map(exterior_points)
        .filter_map(|v| signed_distance_to_line(&v, &rear.start, &rear.end).map(|d| (v, d)))
        .filter(|(_, d)| *d > 0.0)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map_or_else(|| rear.midpoint(), |(v, _)| v);

    distance_along(&origin, &outward, plot).map(|mm| round_to(mm * MM_TO_M, 2))
}
