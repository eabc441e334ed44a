//! End-to-end assessment of one drawing.

use serde::Serialize;

use crate::config::EngineConfig;
use crate::context::EvaluationContext;
use crate::error::Result;
use crate::inference::{SpatialInferenceEngine, SpatialSummary};
use crate::metadata::SessionMetadata;
use crate::parser::{read_objects, DrawingObject, DrawingParser};
use crate::report::{calculate, CalculationInputs, CalculationResult, DrawingSummary};
use crate::rules::{ComplianceSummary, RuleRegistry};

/// Everything produced for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub summary: DrawingSummary,
    pub spatial: SpatialSummary,
    pub calculations: Vec<CalculationResult>,
    pub compliance: ComplianceSummary,
    /// Sanity warnings about the drawing itself.
    pub warnings: Vec<String>,
    pub context: EvaluationContext,
}

/// Parses, interprets and checks drawings. Holds no per-request state, so
/// one engine can serve any number of threads.
#[derive(Debug, Clone, Default)]
pub struct ComplianceEngine {
    config: EngineConfig,
    parser: DrawingParser,
    inference: SpatialInferenceEngine,
    registry: RuleRegistry,
}

impl ComplianceEngine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            parser: DrawingParser::new(config.parser.clone()),
            inference: SpatialInferenceEngine::new(config.inference.clone()),
            registry: RuleRegistry::new(),
            config,
        }
    }

    /// Builds an engine from a TOML configuration document.
    ///
    /// # Errors
    ///
    /// Returns `PlanscopeError::Config` if the document is malformed or a
    /// value is out of range.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(Self::new(EngineConfig::from_toml_str(content)?))
    }

    /// Replaces the rule table.
    #[must_use]
    pub fn with_registry(mut self, registry: RuleRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Assesses a drawing against the rule table. `query` only selects which
    /// calculations are reported; every applicable rule is always checked.
    #[must_use]
    pub fn assess(&self, objects: &[DrawingObject], metadata: &SessionMetadata, query: &str) -> Assessment {
        let parsed = self.parser.parse(objects);
        let spatial = self.inference.analyze(&parsed, metadata);
        let context = EvaluationContext::assemble(&parsed, &spatial, metadata, &self.config.calculator);

        let summary = DrawingSummary::from_context(&context, !parsed.is_empty());
        let warnings = summary.validate();
        let calculations = calculate(
            &CalculationInputs {
                parsed: &parsed,
                spatial: &spatial,
                context: &context,
                registry: &self.registry,
            },
            query,
        );
        let compliance = self.registry.evaluate_all(&context);

        tracing::info!(
            walls = parsed.walls.len(),
            extensions = spatial.extensions.len(),
            calculations = calculations.len(),
            overall = ?compliance.overall_compliant,
            "assessment complete"
        );
        Assessment {
            summary,
            spatial: spatial.summary(),
            calculations,
            compliance,
            warnings,
            context,
        }
    }

    /// Like [`assess`](Self::assess), reading the drawing from a JSON array.
    /// Malformed records are skipped.
    ///
    /// # Errors
    ///
    /// Returns `PlanscopeError::Parse` if `drawing` is not a JSON array.
    pub fn assess_json(
        &self,
        drawing: &serde_json::Value,
        metadata: &SessionMetadata,
        query: &str,
    ) -> Result<Assessment> {
        let objects = read_objects(drawing)?;
        Ok(self.assess(&objects, metadata, query))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::PlanscopeError;
    use crate::metadata::HouseType;

    #[test]
    fn empty_drawing_needs_clarification() {
        let engine = ComplianceEngine::default();
        let assessment = engine.assess(&[], &SessionMetadata::default(), "coverage");
        assert!(!assessment.summary.has_drawing);
        assert!(assessment.spatial.requires_clarification);
        assert!(assessment.calculations.is_empty());
        assert_eq!(assessment.compliance.overall_compliant, None);
        // Coverage needs a plot and the front test needs a front wall.
        assert_eq!(assessment.compliance.rules_checked, 2);
        assert_eq!(assessment.compliance.rules_inconclusive, 2);
        assert_eq!(assessment.compliance.result("A.1(e)").unwrap().compliant, None);
        assert!(assessment.compliance.verdict.starts_with("INCONCLUSIVE"));
    }

    #[test]
    fn json_drawing() {
        let drawing = serde_json::json!([
            {"type": "POLYLINE", "layer": "Plot Boundary", "closed": true,
             "points": [[0, 0], [20000, 0], [20000, 20000], [0, 20000]]},
            {"type": "POLYLINE", "layer": "Walls", "closed": true,
             "points": [[5000, 5000], [15000, 5000], [15000, 15000], [5000, 15000]]},
            {"type": "CIRCLE", "layer": "Trees"}
        ]);
        let metadata = SessionMetadata {
            house_type: Some(HouseType::Detached),
            ..SessionMetadata::default()
        };
        let assessment = ComplianceEngine::default()
            .assess_json(&drawing, &metadata, "what is the coverage")
            .unwrap();
        let coverage = assessment.compliance.result("A.1(b)").unwrap();
        assert_eq!(coverage.compliant, Some(true));
        assert_eq!(assessment.summary.plot_area_sqm, Some(400.0));
        assert!(assessment.warnings.is_empty());
    }

    #[test]
    fn rejects_non_array_drawing() {
        let err = ComplianceEngine::default()
            .assess_json(&serde_json::json!({}), &SessionMetadata::default(), "")
            .unwrap_err();
        assert!(matches!(err, PlanscopeError::Parse(_)));
    }

    #[test]
    fn bad_config_is_an_error() {
        let err = ComplianceEngine::from_toml_str("[parser]\nmin_segments = 1\n").unwrap_err();
        assert!(matches!(err, PlanscopeError::Config(_)));
    }

    #[test]
    fn engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ComplianceEngine>();
    }
}
