//! Permitted-development rules and their evaluation.
//!
//! A rule is a plain record: an applicability predicate and a check, both
//! reading only the [`EvaluationContext`], and a table of thresholds that the
//! check receives alongside it. Rules never see each other.

pub mod class_a;
pub mod class_b;
pub mod class_cde;
pub mod result;

pub use result::{ComplianceCheckResult, ComplianceSummary, SubCheck};

use std::collections::BTreeMap;

use serde::Serialize;

use crate::context::EvaluationContext;
use crate::error::RuleError;

/// Decides whether a rule is relevant to a context.
pub type Applicability = fn(&EvaluationContext) -> bool;

/// Checks a context against a rule's thresholds.
pub type CheckFn = fn(&EvaluationContext, &Thresholds) -> Result<ComplianceCheckResult, RuleError>;

/// Named limits for one rule, keyed by category (house type, roof type...)
/// or by measurement.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Thresholds(BTreeMap<&'static str, f64>);

impl Thresholds {
    #[must_use]
    pub fn new(entries: &[(&'static str, f64)]) -> Self {
        Self(entries.iter().copied().collect())
    }

    /// # Errors
    ///
    /// Returns `RuleError::MissingThreshold` for an unknown key.
    pub fn get(&self, key: &str) -> Result<f64, RuleError> {
        self.0
            .get(key)
            .copied()
            .ok_or_else(|| RuleError::MissingThreshold(key.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

#[derive(Debug, Clone)]
pub struct ComplianceRule {
    pub id: &'static str,
    pub class_reference: &'static str,
    /// Page of the technical guidance document.
    pub pdf_page: u32,
    pub description: &'static str,
    pub thresholds: Thresholds,
    applies_when: Applicability,
    check: CheckFn,
}

impl ComplianceRule {
    /// A rule that always applies and has no thresholds.
    #[must_use]
    pub fn new(
        id: &'static str,
        class_reference: &'static str,
        pdf_page: u32,
        description: &'static str,
        check: CheckFn,
    ) -> Self {
        Self {
            id,
            class_reference,
            pdf_page,
            description,
            thresholds: Thresholds::default(),
            applies_when: |_| true,
            check,
        }
    }

    #[must_use]
    pub fn when(mut self, applies_when: Applicability) -> Self {
        self.applies_when = applies_when;
        self
    }

    #[must_use]
    pub fn with_thresholds(mut self, entries: &[(&'static str, f64)]) -> Self {
        self.thresholds = Thresholds::new(entries);
        self
    }

    #[must_use]
    pub fn citation(&self) -> String {
        format!("{}, page {}", self.class_reference, self.pdf_page)
    }

    #[must_use]
    pub fn applies(&self, ctx: &EvaluationContext) -> bool {
        (self.applies_when)(ctx)
    }

    /// Runs the check. A check error becomes an inconclusive result
    /// carrying the error text.
    #[must_use]
    pub fn evaluate(&self, ctx: &EvaluationContext) -> ComplianceCheckResult {
        let mut result = match (self.check)(ctx, &self.thresholds) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(rule = self.id, error = %e, "rule check failed");
                ComplianceCheckResult::inconclusive(e.to_string())
            }
        };
        result.rule_id = self.id.to_string();
        result.description = self.description.to_string();
        result.citation = self.citation();
        result
    }
}

/// Fixed table of rules. Built once; evaluation never mutates it.
#[derive(Debug, Clone)]
pub struct RuleRegistry {
    rules: Vec<ComplianceRule>,
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleRegistry {
    /// The permitted-development rules for classes A to E.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for rule in class_a::rules()
            .into_iter()
            .chain(class_b::rules())
            .chain(class_cde::rules())
        {
            registry.register(rule);
        }
        registry
    }

    #[must_use]
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Appends a rule. A rule whose id is already registered is ignored.
    pub fn register(&mut self, rule: ComplianceRule) {
        if self.get(rule.id).is_some() {
            tracing::warn!(rule = rule.id, "duplicate rule id ignored");
            return;
        }
        self.rules.push(rule);
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ComplianceRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    #[must_use]
    pub fn rules(&self) -> &[ComplianceRule] {
        &self.rules
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn applicable<'a>(
        &'a self,
        ctx: &'a EvaluationContext,
    ) -> impl Iterator<Item = &'a ComplianceRule> + 'a {
        self.rules.iter().filter(move |r| r.applies(ctx))
    }

    /// Evaluates every applicable rule and aggregates the results.
    #[must_use]
    pub fn evaluate_all(&self, ctx: &EvaluationContext) -> ComplianceSummary {
        let results: Vec<ComplianceCheckResult> =
            self.applicable(ctx).map(|rule| rule.evaluate(ctx)).collect();
        let summary = ComplianceSummary::from_results(results);
        tracing::debug!(
            checked = summary.rules_checked,
            passed = summary.rules_passed,
            failed = summary.rules_failed,
            inconclusive = summary.rules_inconclusive,
            "rules evaluated"
        );
        summary
    }
}

/// Formats an optional measurement for a message.
fn show(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(|| "unknown".to_string(), |v| format!("{v}{unit}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::context::keys;

    fn always_fails(_: &EvaluationContext, t: &Thresholds) -> Result<ComplianceCheckResult, RuleError> {
        t.get("nope")?;
        Ok(ComplianceCheckResult::outcome(true, String::new()))
    }

    #[test]
    fn standard_table() {
        let registry = RuleRegistry::new();
        let ids: Vec<&str> = registry.rules().iter().map(|r| r.id).collect();
        assert_eq!(
            ids,
            [
                "A.1(b)", "A.1(e)", "A.1(f)", "A.1(g)", "A.1(h)", "A.1(i)", "A.1(j)", "B.1(d)",
                "B.2(b)", "C.1(b)", "D.1", "E.1(e)"
            ]
        );
        let f = registry.get("A.1(f)").unwrap();
        assert!((f.thresholds.get("detached").unwrap() - 4.0).abs() < f64::EPSILON);
        assert_eq!(f.citation(), "Class A, Section 1(f), page 17");
    }

    #[test]
    fn failing_check_is_inconclusive() {
        let mut registry = RuleRegistry::empty();
        registry.register(ComplianceRule::new("X", "Test", 1, "broken", always_fails));
        let summary = registry.evaluate_all(&EvaluationContext::new());
        assert_eq!(summary.rules_inconclusive, 1);
        let r = summary.result("X").unwrap();
        assert_eq!(r.compliant, None);
        assert_eq!(r.error.as_deref(), Some("rule has no threshold for `nope`"));
        assert_eq!(summary.overall_compliant, None);
    }

    #[test]
    fn duplicate_ids_are_ignored() {
        let mut registry = RuleRegistry::new();
        let before = registry.len();
        registry.register(ComplianceRule::new("A.1(b)", "Test", 1, "dup", always_fails));
        assert_eq!(registry.len(), before);
    }

    #[test]
    fn type_mismatch_does_not_abort_evaluation() {
        let ctx = EvaluationContext::new()
            .with(keys::COVERAGE_RATIO, "lots")
            .with(keys::EXTENDS_BEYOND_PRINCIPAL, false);
        let summary = RuleRegistry::new().evaluate_all(&ctx);
        assert_eq!(summary.result("A.1(b)").unwrap().compliant, None);
        assert_eq!(summary.result("A.1(e)").unwrap().compliant, Some(true));
        assert_eq!(summary.overall_compliant, Some(true));
    }

    #[test]
    fn registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RuleRegistry>();
    }
}
