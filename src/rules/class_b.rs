//! Class B: additions and alterations to the roof.

use super::{ComplianceCheckResult, ComplianceRule, Thresholds};
use crate::context::{keys, EvaluationContext};
use crate::error::RuleError;

#[must_use]
pub fn rules() -> Vec<ComplianceRule> {
    vec![
        ComplianceRule::new(
            "B.1(d)",
            "Class B, Section 1(d)",
            34,
            "Loft conversion volume: 40m3 terraced, 50m3 other",
            loft_volume,
        )
        .when(|ctx| ctx.is(keys::EXTENSION_TYPE, "loft"))
        .with_thresholds(&[("terraced", 40.0), ("other", 50.0)]),
        ComplianceRule::new(
            "B.2(b)",
            "Class B, Section 2(b)",
            35,
            "Dormer must be set back 0.2m from eaves",
            dormer_setback,
        )
        .when(|ctx| ctx.flag(keys::HAS_DORMER))
        .with_thresholds(&[("min_setback", 0.2)]),
    ]
}

fn loft_volume(ctx: &EvaluationContext, t: &Thresholds) -> Result<ComplianceCheckResult, RuleError> {
    let Some(house_type) = ctx.text(keys::HOUSE_TYPE)? else {
        return Ok(ComplianceCheckResult::missing("house type"));
    };
    let limit = t.get(if house_type == "terraced" { "terraced" } else { "other" })?;
    let Some(volume) = ctx.measurement(keys::LOFT_VOLUME_M3)? else {
        return Ok(ComplianceCheckResult::missing("loft volume"));
    };
    Ok(ComplianceCheckResult::measured(
        volume <= limit,
        volume,
        limit,
        "m3",
        format!("Loft volume is {volume}m3 (max {limit}m3 for {house_type})"),
    ))
}

fn dormer_setback(ctx: &EvaluationContext, t: &Thresholds) -> Result<ComplianceCheckResult, RuleError> {
    let min = t.get("min_setback")?;
    let Some(setback) = ctx.measurement(keys::DORMER_SETBACK_M)? else {
        return Ok(ComplianceCheckResult::missing("dormer setback"));
    };
    Ok(ComplianceCheckResult::measured(
        setback >= min,
        setback,
        min,
        "m",
        format!("Dormer setback is {setback}m (min {min}m required)"),
    ))
}
