use serde::Serialize;

/// One measurement inside a compound rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubCheck {
    pub check: String,
    pub measured: Option<f64>,
    pub threshold: f64,
    pub unit: String,
    pub compliant: Option<bool>,
}

impl SubCheck {
    /// `compliant` is `None` when the measurement is missing.
    #[must_use]
    pub fn new(
        check: &str,
        measured: Option<f64>,
        threshold: f64,
        unit: &str,
        passes: impl Fn(f64) -> bool,
    ) -> Self {
        Self {
            check: check.to_string(),
            measured,
            threshold,
            unit: unit.to_string(),
            compliant: measured.map(passes),
        }
    }
}

/// Outcome of one rule. `compliant == None` means inconclusive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceCheckResult {
    pub rule_id: String,
    pub description: String,
    pub citation: String,
    pub compliant: Option<bool>,
    pub measured_value: Option<f64>,
    pub threshold: Option<f64>,
    pub unit: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sub_checks: Vec<SubCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComplianceCheckResult {
    /// A determinate result against a single threshold.
    #[must_use]
    pub fn measured(compliant: bool, value: f64, threshold: f64, unit: &str, message: String) -> Self {
        Self {
            rule_id: String::new(),
            description: String::new(),
            citation: String::new(),
            compliant: Some(compliant),
            measured_value: Some(value),
            threshold: Some(threshold),
            unit: Some(unit.to_string()),
            message,
            sub_checks: Vec::new(),
            error: None,
        }
    }

    /// A pass/fail result with nothing to measure.
    #[must_use]
    pub fn outcome(compliant: bool, message: String) -> Self {
        Self {
            compliant: Some(compliant),
            error: None,
            ..Self::inconclusive(message)
        }
    }

    /// No verdict could be reached.
    #[must_use]
    pub fn inconclusive(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            rule_id: String::new(),
            description: String::new(),
            citation: String::new(),
            compliant: None,
            measured_value: None,
            threshold: None,
            unit: None,
            message: reason.clone(),
            sub_checks: Vec::new(),
            error: Some(reason),
        }
    }

    /// Inconclusive because a required value is absent.
    #[must_use]
    pub fn missing(what: &str) -> Self {
        Self::inconclusive(format!("Cannot check: {what} not provided"))
    }

    /// Combines sub-checks. A missing measurement makes the whole rule
    /// inconclusive; otherwise it passes only when every sub-check passes.
    #[must_use]
    pub fn compound(
        sub_checks: Vec<SubCheck>,
        measured_value: Option<f64>,
        threshold: Option<f64>,
        unit: &str,
        message: String,
    ) -> Self {
        let compliant = if sub_checks.iter().any(|c| c.compliant.is_none()) {
            None
        } else {
            Some(sub_checks.iter().all(|c| c.compliant == Some(true)))
        };
        let missing: Vec<&str> = sub_checks
            .iter()
            .filter(|c| c.measured.is_none())
            .map(|c| c.check.as_str())
            .collect();
        let error = (!missing.is_empty()).then(|| format!("Missing: {}", missing.join(", ")));
        Self {
            rule_id: String::new(),
            description: String::new(),
            citation: String::new(),
            compliant,
            measured_value,
            threshold,
            unit: Some(unit.to_string()),
            message,
            sub_checks,
            error,
        }
    }

    #[must_use]
    pub fn is_inconclusive(&self) -> bool {
        self.compliant.is_none()
    }
}

/// Aggregate of every applicable rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceSummary {
    /// `None` when no rule reached a verdict.
    pub overall_compliant: Option<bool>,
    pub rules_checked: usize,
    pub rules_passed: usize,
    pub rules_failed: usize,
    pub rules_inconclusive: usize,
    pub results: Vec<ComplianceCheckResult>,
    pub verdict: String,
}

impl ComplianceSummary {
    #[must_use]
    pub fn from_results(results: Vec<ComplianceCheckResult>) -> Self {
        let passed = results.iter().filter(|r| r.compliant == Some(true)).count();
        let failed = results.iter().filter(|r| r.compliant == Some(false)).count();
        let inconclusive = results.iter().filter(|r| r.is_inconclusive()).count();
        let overall_compliant = match (passed, failed) {
            (0, 0) => None,
            (_, 0) => Some(true),
            _ => Some(false),
        };
        let verdict = verdict(overall_compliant, &results);
        Self {
            overall_compliant,
            rules_checked: results.len(),
            rules_passed: passed,
            rules_failed: failed,
            rules_inconclusive: inconclusive,
            results,
            verdict,
        }
    }

    /// Results that failed.
    pub fn failures(&self) -> impl Iterator<Item = &ComplianceCheckResult> {
        self.results.iter().filter(|r| r.compliant == Some(false))
    }

    #[must_use]
    pub fn result(&self, rule_id: &str) -> Option<&ComplianceCheckResult> {
        self.results.iter().find(|r| r.rule_id == rule_id)
    }
}

fn verdict(overall: Option<bool>, results: &[ComplianceCheckResult]) -> String {
    match overall {
        Some(true) => "COMPLIANT: All checked rules pass".to_string(),
        Some(false) => {
            let mut lines = vec!["NON_COMPLIANT: The following rules are violated:".to_string()];
            lines.extend(
                results
                    .iter()
                    .filter(|r| r.compliant == Some(false))
                    .map(|r| format!("  {}: {}", r.rule_id, r.message)),
            );
            lines.join("\n")
        }
        None => "INCONCLUSIVE: No rule could be decided with the information available".to_string(),
    }
}
