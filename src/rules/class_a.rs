//! Class A: enlargement, improvement or alteration of a house.

use super::{show, ComplianceCheckResult, ComplianceRule, SubCheck, Thresholds};
use crate::context::{keys, EvaluationContext};
use crate::error::RuleError;

/// Distance from the boundary inside which the eaves limit applies.
pub const BOUNDARY_ZONE_M: f64 = 2.0;

type CheckResult = Result<ComplianceCheckResult, RuleError>;

#[must_use]
pub fn rules() -> Vec<ComplianceRule> {
    vec![
        ComplianceRule::new(
            "A.1(b)",
            "Class A, Section 1(b)",
            10,
            "Total area of buildings must not exceed 50% of curtilage",
            coverage,
        )
        .with_thresholds(&[("max_coverage", 0.5)]),
        ComplianceRule::new(
            "A.1(e)",
            "Class A, Section 1(e)",
            14,
            "Cannot extend beyond principal elevation fronting highway",
            principal_elevation,
        ),
        ComplianceRule::new(
            "A.1(f)",
            "Class A, Section 1(f)",
            17,
            "Single-storey rear extension depth limit (4m detached, 3m other)",
            rear_depth,
        )
        .when(|ctx| is_single_storey_rear(ctx) && !ctx.is(keys::LAND_TYPE, "article_2_3"))
        .with_thresholds(&[
            ("detached", 4.0),
            ("semi-detached", 3.0),
            ("terraced", 3.0),
            ("end-terrace", 3.0),
        ]),
        ComplianceRule::new(
            "A.1(g)",
            "Class A, Section 1(g)",
            17,
            "Larger rear extension with neighbour consultation (8m detached, 6m other)",
            larger_rear_depth,
        )
        .when(|ctx| is_single_storey_rear(ctx) && ctx.flag(keys::NEIGHBOUR_CONSULTATION))
        .with_thresholds(&[
            ("detached", 8.0),
            ("semi-detached", 6.0),
            ("terraced", 6.0),
            ("end-terrace", 6.0),
        ]),
        ComplianceRule::new(
            "A.1(h)",
            "Class A, Section 1(h)",
            20,
            "Multi-storey rear extension: max 3m depth, 7m from rear boundary",
            multi_storey_rear,
        )
        .when(|ctx| ctx.is(keys::EXTENSION_TYPE, "rear") && ctx.number_or(keys::STOREYS, 1.0) > 1.0)
        .with_thresholds(&[("max_depth", 3.0), ("min_boundary_distance", 7.0)]),
        ComplianceRule::new(
            "A.1(i)",
            "Class A, Section 1(i)",
            22,
            "If within 2m of boundary, eaves max 3m",
            boundary_eaves,
        )
        .when(|ctx| ctx.number_or(keys::DISTANCE_TO_BOUNDARY_M, f64::INFINITY) < BOUNDARY_ZONE_M)
        .with_thresholds(&[("max_eaves", 3.0)]),
        ComplianceRule::new(
            "A.1(j)",
            "Class A, Section 1(j)",
            22,
            "Side extension: single storey, max 4m height, max half width",
            side_extension,
        )
        .when(|ctx| ctx.is(keys::EXTENSION_TYPE, "side"))
        .with_thresholds(&[("max_height", 4.0)]),
    ]
}

fn is_single_storey_rear(ctx: &EvaluationContext) -> bool {
    ctx.is(keys::EXTENSION_TYPE, "rear") && ctx.number_or(keys::STOREYS, 1.0) <= 1.0
}

fn coverage(ctx: &EvaluationContext, t: &Thresholds) -> CheckResult {
    let max = t.get("max_coverage")?;
    let Some(ratio) = ctx.measurement(keys::COVERAGE_RATIO)? else {
        return Ok(ComplianceCheckResult::missing("curtilage coverage"));
    };
    let percent = ctx.number(keys::COVERAGE_PERCENT)?.unwrap_or(ratio * 100.0);
    let limit = max * 100.0;
    let compliant = ratio <= max;
    Ok(ComplianceCheckResult::measured(
        compliant,
        percent,
        limit,
        "%",
        format!(
            "Coverage is {percent}% of curtilage ({})",
            if compliant {
                "compliant".to_string()
            } else {
                format!("exceeds {limit}% limit")
            }
        ),
    ))
}

fn principal_elevation(ctx: &EvaluationContext, _: &Thresholds) -> CheckResult {
    let Some(beyond) = ctx.boolean(keys::EXTENDS_BEYOND_PRINCIPAL)? else {
        return Ok(ComplianceCheckResult::missing("principal elevation position"));
    };
    Ok(ComplianceCheckResult::outcome(
        !beyond,
        format!(
            "Extension {} extend beyond the principal elevation",
            if beyond { "DOES" } else { "does NOT" }
        ),
    ))
}

/// Depth limit by house type.
fn depth_for_house_type(
    ctx: &EvaluationContext,
    t: &Thresholds,
    label: &str,
) -> CheckResult {
    let Some(house_type) = ctx.text(keys::HOUSE_TYPE)? else {
        return Ok(ComplianceCheckResult::missing("house type"));
    };
    let limit = t.get(house_type)?;
    let Some(depth) = ctx.measurement(keys::EXTENSION_DEPTH_M)? else {
        return Ok(ComplianceCheckResult::missing("extension depth"));
    };
    let compliant = depth <= limit;
    Ok(ComplianceCheckResult::measured(
        compliant,
        depth,
        limit,
        "m",
        format!(
            "{label} is {depth}m (limit for {house_type}: {limit}m) {}",
            if compliant { "COMPLIANT" } else { "EXCEEDS LIMIT" }
        ),
    ))
}

fn rear_depth(ctx: &EvaluationContext, t: &Thresholds) -> CheckResult {
    depth_for_house_type(ctx, t, "Rear extension depth")
}

fn larger_rear_depth(ctx: &EvaluationContext, t: &Thresholds) -> CheckResult {
    depth_for_house_type(ctx, t, "Under neighbour consultation, depth")
}

fn multi_storey_rear(ctx: &EvaluationContext, t: &Thresholds) -> CheckResult {
    let max_depth = t.get("max_depth")?;
    let min_distance = t.get("min_boundary_distance")?;
    let depth = ctx.measurement(keys::EXTENSION_DEPTH_M)?;
    let distance = ctx.measurement(keys::DISTANCE_TO_REAR_BOUNDARY_M)?;

    let message = format!(
        "Multi-storey rear: depth {} (max {max_depth}m), rear boundary distance {} (min {min_distance}m)",
        show(depth, "m"),
        show(distance, "m"),
    );
    Ok(ComplianceCheckResult::compound(
        vec![
            SubCheck::new("depth", depth, max_depth, "m", |d| d <= max_depth),
            SubCheck::new("rear_boundary_distance", distance, min_distance, "m", |d| {
                d >= min_distance
            }),
        ],
        depth,
        Some(max_depth),
        "m",
        message,
    ))
}

fn boundary_eaves(ctx: &EvaluationContext, t: &Thresholds) -> CheckResult {
    let max_eaves = t.get("max_eaves")?;
    let Some(eaves) = ctx.measurement(keys::EAVES_HEIGHT_M)? else {
        return Ok(ComplianceCheckResult::missing("eaves height"));
    };
    let distance = ctx.number(keys::DISTANCE_TO_BOUNDARY_M)?;
    let compliant = eaves <= max_eaves;
    Ok(ComplianceCheckResult::measured(
        compliant,
        eaves,
        max_eaves,
        "m",
        format!(
            "Eaves height is {eaves}m at {} from boundary (max {max_eaves}m when within 2m) {}",
            show(distance, "m"),
            if compliant { "COMPLIANT" } else { "EXCEEDS LIMIT" }
        ),
    ))
}

fn side_extension(ctx: &EvaluationContext, t: &Thresholds) -> CheckResult {
    let max_height = t.get("max_height")?;
    let width = ctx.measurement(keys::EXTENSION_WIDTH_M)?;
    let half = ctx.measurement(keys::HALF_ORIGINAL_WIDTH_M)?;
    let height = ctx.measurement(keys::EXTENSION_HEIGHT_M)?;

    let width_check = SubCheck {
        check: "width_ratio".to_string(),
        measured: width,
        threshold: half.unwrap_or(0.0),
        unit: "m".to_string(),
        compliant: ctx.boolean(keys::HALF_WIDTH_COMPLIANT)?,
    };
    let message = format!(
        "Side extension: width {} (max {} = half of original), height {} (max {max_height}m)",
        show(width, "m"),
        show(half, "m"),
        show(height, "m"),
    );
    Ok(ComplianceCheckResult::compound(
        vec![
            width_check,
            SubCheck::new("height", height, max_height, "m", |h| h <= max_height),
        ],
        width,
        half,
        "m",
        message,
    ))
}
