//! Classes C (other roof alterations), D (porches) and E (outbuildings).

use super::class_a::BOUNDARY_ZONE_M;
use super::{show, ComplianceCheckResult, ComplianceRule, SubCheck, Thresholds};
use crate::context::{keys, EvaluationContext};
use crate::error::RuleError;

type CheckResult = Result<ComplianceCheckResult, RuleError>;

#[must_use]
pub fn rules() -> Vec<ComplianceRule> {
    vec![
        ComplianceRule::new(
            "C.1(b)",
            "Class C, Section 1(b)",
            38,
            "Rooflight must not protrude more than 0.15m",
            rooflight,
        )
        .when(|ctx| ctx.flag(keys::HAS_ROOFLIGHT))
        .with_thresholds(&[("max_protrusion", 0.15)]),
        ComplianceRule::new(
            "D.1",
            "Class D, Section 1",
            40,
            "Porch: max 3m2 area, 3m height, 2m from highway",
            porch,
        )
        .when(|ctx| ctx.is(keys::EXTENSION_TYPE, "porch"))
        .with_thresholds(&[
            ("max_area", 3.0),
            ("max_height", 3.0),
            ("min_highway_distance", 2.0),
        ]),
        ComplianceRule::new(
            "E.1(e)",
            "Class E, Section 1(e)",
            43,
            "Outbuilding height: 4m dual-pitch, 2.5m within 2m boundary, 3m other",
            outbuilding_height,
        )
        .when(|ctx| ctx.is(keys::EXTENSION_TYPE, "outbuilding"))
        .with_thresholds(&[
            ("dual_pitched", 4.0),
            ("within_2m_boundary", 2.5),
            ("other", 3.0),
        ]),
    ]
}

fn rooflight(ctx: &EvaluationContext, t: &Thresholds) -> CheckResult {
    let max = t.get("max_protrusion")?;
    let Some(protrusion) = ctx.measurement(keys::ROOFLIGHT_PROTRUSION_M)? else {
        return Ok(ComplianceCheckResult::missing("rooflight protrusion"));
    };
    Ok(ComplianceCheckResult::measured(
        protrusion <= max,
        protrusion,
        max,
        "m",
        format!("Rooflight protrusion is {protrusion}m (max {max}m allowed)"),
    ))
}

fn porch(ctx: &EvaluationContext, t: &Thresholds) -> CheckResult {
    let max_area = t.get("max_area")?;
    let max_height = t.get("max_height")?;
    let min_highway = t.get("min_highway_distance")?;
    let area = ctx.measurement(keys::PORCH_AREA_M2)?;
    let height = ctx.measurement(keys::PORCH_HEIGHT_M)?;
    let highway = ctx.measurement(keys::HIGHWAY_DISTANCE_M)?;

    let message = format!(
        "Porch area {}, height {}, highway distance {}",
        show(area, "m2"),
        show(height, "m"),
        show(highway, "m"),
    );
    Ok(ComplianceCheckResult::compound(
        vec![
            SubCheck::new("area", area, max_area, "m2", |a| a <= max_area),
            SubCheck::new("height", height, max_height, "m", |h| h <= max_height),
            SubCheck::new("highway_distance", highway, min_highway, "m", |d| d >= min_highway),
        ],
        area,
        Some(max_area),
        "m2",
        message,
    ))
}

fn outbuilding_height(ctx: &EvaluationContext, t: &Thresholds) -> CheckResult {
    let near_boundary = ctx
        .number(keys::DISTANCE_TO_BOUNDARY_M)?
        .is_some_and(|d| d < BOUNDARY_ZONE_M);
    let (limit, detail) = if near_boundary {
        (t.get("within_2m_boundary")?, "within 2m of boundary")
    } else if ctx.text(keys::ROOF_TYPE)? == Some("dual_pitched") {
        (t.get("dual_pitched")?, "dual-pitched roof")
    } else {
        (t.get("other")?, "other roof type")
    };

    let Some(height) = ctx.measurement(keys::OUTBUILDING_HEIGHT_M)? else {
        return Ok(ComplianceCheckResult::missing("outbuilding height"));
    };
    Ok(ComplianceCheckResult::measured(
        height <= limit,
        height,
        limit,
        "m",
        format!("Outbuilding height {height}m (max {limit}m for {detail})"),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::rules::RuleRegistry;

    fn check(id: &str, ctx: &EvaluationContext) -> ComplianceCheckResult {
        RuleRegistry::new().get(id).unwrap().evaluate(ctx)
    }

    fn outbuilding(height: f64) -> EvaluationContext {
        EvaluationContext::new()
            .with(keys::EXTENSION_TYPE, "outbuilding")
            .with(keys::OUTBUILDING_HEIGHT_M, height)
    }

    #[test]
    fn rooflight_protrusion() {
        let ctx = EvaluationContext::new()
            .with(keys::HAS_ROOFLIGHT, true)
            .with(keys::ROOFLIGHT_PROTRUSION_M, 0.2);
        assert_eq!(check("C.1(b)", &ctx).compliant, Some(false));
    }

    #[test]
    fn porch_triple_check() {
        let ctx = EvaluationContext::new()
            .with(keys::EXTENSION_TYPE, "porch")
            .with(keys::PORCH_AREA_M2, 2.5)
            .with(keys::PORCH_HEIGHT_M, 2.8);
        let r = check("D.1", &ctx);
        assert_eq!(r.compliant, None);
        assert_eq!(r.sub_checks.len(), 3);

        let ok = ctx.clone().with(keys::HIGHWAY_DISTANCE_M, 4.0);
        assert_eq!(check("D.1", &ok).compliant, Some(true));

        let close = ctx.with(keys::HIGHWAY_DISTANCE_M, 1.5);
        let r = check("D.1", &close);
        assert_eq!(r.compliant, Some(false));
        assert_eq!(r.message, "Porch area 2.5m2, height 2.8m, highway distance 1.5m");
    }

    #[test]
    fn outbuilding_thresholds() {
        assert_eq!(check("E.1(e)", &outbuilding(3.5)).compliant, Some(false));
        let dual = outbuilding(3.5).with(keys::ROOF_TYPE, "dual_pitched");
        assert_eq!(check("E.1(e)", &dual).compliant, Some(true));

        // The boundary limit overrides the roof type.
        let near = dual.with(keys::DISTANCE_TO_BOUNDARY_M, 1.0);
        let r = check("E.1(e)", &near);
        assert_eq!(r.compliant, Some(false));
        assert_eq!(r.threshold, Some(2.5));
    }

    #[test]
    fn outbuilding_without_height() {
        let ctx = EvaluationContext::new().with(keys::EXTENSION_TYPE, "outbuilding");
        assert_eq!(check("E.1(e)", &ctx).compliant, None);
    }
}
