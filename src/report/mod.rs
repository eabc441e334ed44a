//! Numeric answers to a user's question, each set against the limit that
//! governs it.

pub mod summary;

pub use summary::DrawingSummary;

use serde::Serialize;
use strum::{AsRefStr, Display};

use crate::calculator::{
    building_width, extension_depth, footprint_area_m2, polygon_area_mm2, union_footprint, WidthAxis,
};
use crate::context::{keys, EvaluationContext};
use crate::inference::SpatialAnalysisResult;
use crate::math::{round_to, MM2_TO_M2};
use crate::parser::ParsedDrawing;
use crate::rules::class_a::BOUNDARY_ZONE_M;
use crate::rules::RuleRegistry;

/// Group of calculations a query can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CalculationKind {
    Area,
    Distance,
    Extension,
    Width,
    Height,
}

impl CalculationKind {
    pub const ALL: [Self; 5] = [
        Self::Area,
        Self::Distance,
        Self::Extension,
        Self::Width,
        Self::Height,
    ];

    #[must_use]
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Area => &["area", "size", "square", "coverage", "50%", "curtilage"],
            Self::Distance => &["distance", "from boundary", "metres from", "within", "how far"],
            Self::Extension => &["extension", "depth", "project", "extend", "rear", "beyond"],
            Self::Width => &["width", "wide", "half", "side"],
            Self::Height => &["height", "tall", "eaves"],
        }
    }

    /// Kinds whose keywords occur in `query`, case-insensitively.
    #[must_use]
    pub fn requested_by(query: &str) -> Vec<Self> {
        let query = query.to_lowercase();
        Self::ALL
            .into_iter()
            .filter(|kind| kind.keywords().iter().any(|kw| query.contains(kw)))
            .collect()
    }
}

/// One reported measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationResult {
    pub calculation_type: String,
    pub description: String,
    pub result: f64,
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compliant: Option<bool>,
    /// Headroom to the limit; negative when the limit is exceeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CalculationResult {
    #[must_use]
    pub fn new(calculation_type: &str, description: impl Into<String>, result: f64, unit: &str) -> Self {
        Self {
            calculation_type: calculation_type.to_string(),
            description: description.into(),
            result,
            unit: unit.to_string(),
            limit: None,
            limit_source: None,
            compliant: None,
            margin: None,
            notes: None,
        }
    }

    /// Sets a limit, its source and the resulting verdict.
    #[must_use]
    pub fn with_limit(mut self, limit: f64, source: &str, compliant: bool, margin: f64) -> Self {
        self.limit = Some(limit);
        self.limit_source = Some(source.to_string());
        self.compliant = Some(compliant);
        self.margin = Some(margin);
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Everything a calculation may draw on.
#[derive(Debug, Clone, Copy)]
pub struct CalculationInputs<'a> {
    pub parsed: &'a ParsedDrawing,
    pub spatial: &'a SpatialAnalysisResult,
    pub context: &'a EvaluationContext,
    pub registry: &'a RuleRegistry,
}

/// Runs the calculations selected by `query`, in [`CalculationKind::ALL`]
/// order. A calculation without the geometry or facts it needs is left out.
#[must_use]
pub fn calculate(inputs: &CalculationInputs<'_>, query: &str) -> Vec<CalculationResult> {
    let kinds = CalculationKind::requested_by(query);
    let mut results = Vec::new();
    for kind in &kinds {
        match kind {
            CalculationKind::Area => area(inputs, &mut results),
            CalculationKind::Distance => distance(inputs, &mut results),
            CalculationKind::Extension => extension(inputs, &mut results),
            CalculationKind::Width => width(inputs, &mut results),
            CalculationKind::Height => height(inputs, &mut results),
        }
    }
    tracing::debug!(?kinds, count = results.len(), "calculations complete");
    results
}

fn area(inputs: &CalculationInputs<'_>, out: &mut Vec<CalculationResult>) {
    let parsed = inputs.parsed;
    if let Some(plot) = &parsed.plot_boundary {
        out.push(CalculationResult::new(
            "plot_area",
            "Plot boundary (curtilage) area",
            round_to(polygon_area_mm2(plot) * MM2_TO_M2, 2),
            "m2",
        ));
    }
    if !parsed.walls.is_empty() {
        let buildings = union_footprint(parsed.wall_outlines().into_iter().chain(&parsed.extensions));
        out.push(CalculationResult::new(
            "footprint_area",
            "Total building footprint area",
            footprint_area_m2(&buildings),
            "m2",
        ));
    }

    let ctx = inputs.context;
    let (Ok(Some(percent)), Ok(Some(compliant))) = (
        ctx.number(keys::COVERAGE_PERCENT),
        ctx.boolean(keys::COVERAGE_COMPLIANT),
    ) else {
        return;
    };
    let mut calc = CalculationResult::new(
        "coverage_percentage",
        format!("Building coverage ({percent}% of curtilage)"),
        percent,
        "%",
    )
    .with_limit(50.0, "Class A.1(b) - 50% curtilage rule", compliant, round_to(50.0 - percent, 1));
    let prior = ctx.number_or(keys::PRIOR_EXTENSIONS_SQM, 0.0);
    if prior > 0.0 {
        calc = calc.with_notes(format!("Includes {prior}m2 of prior extensions"));
    }
    out.push(calc);
}

fn distance(inputs: &CalculationInputs<'_>, out: &mut Vec<CalculationResult>) {
    let Ok(Some(d)) = inputs.context.number(keys::DISTANCE_TO_BOUNDARY_M) else {
        return;
    };
    let compliant = d >= BOUNDARY_ZONE_M;
    let mut calc = CalculationResult::new(
        "boundary_distance",
        "Minimum distance from building to plot boundary",
        d,
        "m",
    )
    .with_limit(
        BOUNDARY_ZONE_M,
        "Class A.1(i) - 2m boundary rule",
        compliant,
        round_to(d - BOUNDARY_ZONE_M, 2),
    );
    if !compliant {
        calc = calc.with_notes("Within 2m of boundary - eaves height limited to 3m");
    }
    out.push(calc);
}

fn extension(inputs: &CalculationInputs<'_>, out: &mut Vec<CalculationResult>) {
    let spatial = inputs.spatial;
    let Some(rear) = &spatial.rear_wall else {
        return;
    };
    let house_type = inputs.context.text(keys::HOUSE_TYPE).ok().flatten();
    let limit = house_type.and_then(|h| {
        let rule = inputs.registry.get("A.1(f)")?;
        rule.thresholds.get(h).ok()
    });

    for (i, ext) in spatial.extensions.iter().enumerate() {
        let depth = match extension_depth(ext, rear) {
            Ok(report) => report.depth_m,
            Err(e) => {
                tracing::debug!(extension = i, error = %e, "depth not computed");
                continue;
            }
        };
        let mut calc = CalculationResult::new(
            "extension_depth",
            format!("Extension {} depth beyond rear wall", i + 1),
            depth,
            "m",
        );
        if let (Some(limit), Some(house_type)) = (limit, house_type) {
            calc = calc.with_limit(
                limit,
                &format!("Class A.1(f) - {limit}m rear extension limit ({house_type})"),
                depth <= limit,
                round_to(limit - depth, 2),
            );
        }
        out.push(calc);
    }
}

fn width(inputs: &CalculationInputs<'_>, out: &mut Vec<CalculationResult>) {
    let Some(original) = &inputs.spatial.original_footprint else {
        return;
    };
    let report = match building_width(original, WidthAxis::Auto) {
        Ok(report) => report,
        Err(e) => {
            tracing::debug!(error = %e, "original width not computed");
            return;
        }
    };
    out.push(CalculationResult::new(
        "original_width",
        "Original house width",
        report.width_m,
        "m",
    ));

    let half = round_to(report.width_m / 2.0, 2);
    let ctx = inputs.context;
    match (
        ctx.number(keys::EXTENSION_WIDTH_M),
        ctx.boolean(keys::HALF_WIDTH_COMPLIANT),
    ) {
        (Ok(Some(ext)), Ok(Some(compliant))) => out.push(
            CalculationResult::new("side_extension_width", "Widest extension", ext, "m").with_limit(
                half,
                "Class A.1(j) - half original width",
                compliant,
                round_to(half - ext, 2),
            ),
        ),
        _ => out.push(CalculationResult::new(
            "max_side_extension_width",
            "Maximum allowed side extension width (50% of original)",
            half,
            "m",
        )),
    }
}

fn height(inputs: &CalculationInputs<'_>, out: &mut Vec<CalculationResult>) {
    let ctx = inputs.context;
    let eaves = ctx.measurement(keys::EAVES_HEIGHT_M).ok().flatten();
    let building = ctx.measurement(keys::EXTENSION_HEIGHT_M).ok().flatten();
    let (checked, label) = match (eaves, building) {
        (Some(h), _) => (h, "eaves"),
        (None, Some(h)) => (h, "building"),
        (None, None) => return,
    };

    let near_boundary = ctx
        .number(keys::DISTANCE_TO_BOUNDARY_M)
        .ok()
        .flatten()
        .is_some_and(|d| d < BOUNDARY_ZONE_M);
    let (limit, source) = if near_boundary {
        (3.0, "Class A.1(i) - eaves within 2m of boundary")
    } else {
        (4.0, "Class A.1(ja) - single storey max height")
    };

    out.push(
        CalculationResult::new("height_check", format!("Proposed {label} height"), round_to(checked, 2), "m")
            .with_limit(limit, source, checked <= limit, round_to(limit - checked, 2))
            .with_notes(format!("Checked {label} height")),
    );
}
