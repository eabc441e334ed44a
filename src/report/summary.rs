use serde::Serialize;

use crate::context::{keys, EvaluationContext};

/// Plausible range for each summary field.
pub const SANITY_LIMITS: [(&str, f64, f64); 5] = [
    ("plot_area_sqm", 10.0, 10_000.0),
    ("building_footprint_sqm", 5.0, 5_000.0),
    ("building_height_m", 1.0, 20.0),
    ("eaves_height_m", 1.0, 15.0),
    ("distance_to_boundary_m", 0.0, 100.0),
];

/// Headline figures for a drawing, as presented to the applicant.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DrawingSummary {
    pub has_drawing: bool,
    pub plot_area_sqm: Option<f64>,
    pub building_footprint_sqm: Option<f64>,
    pub distance_to_boundary_m: Option<f64>,
    pub building_height_m: Option<f64>,
    pub eaves_height_m: Option<f64>,
    pub prior_extensions_sqm: Option<f64>,
}

impl DrawingSummary {
    /// Reads the figures from an assembled context. Values of the wrong
    /// type are treated as absent.
    #[must_use]
    pub fn from_context(ctx: &EvaluationContext, has_drawing: bool) -> Self {
        let number = |key: &str| ctx.number(key).ok().flatten();
        Self {
            has_drawing,
            plot_area_sqm: number(keys::PLOT_AREA_M2),
            building_footprint_sqm: number(keys::FOOTPRINT_AREA_M2),
            distance_to_boundary_m: number(keys::DISTANCE_TO_BOUNDARY_M),
            building_height_m: number(keys::EXTENSION_HEIGHT_M),
            eaves_height_m: number(keys::EAVES_HEIGHT_M),
            prior_extensions_sqm: number(keys::PRIOR_EXTENSIONS_SQM),
        }
    }

    fn field(&self, name: &str) -> Option<f64> {
        match name {
            "plot_area_sqm" => self.plot_area_sqm,
            "building_footprint_sqm" => self.building_footprint_sqm,
            "building_height_m" => self.building_height_m,
            "eaves_height_m" => self.eaves_height_m,
            "distance_to_boundary_m" => self.distance_to_boundary_m,
            _ => None,
        }
    }

    /// Flags figures that suggest the drawing was scaled or traced wrongly.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if let (Some(plot), Some(footprint)) = (self.plot_area_sqm, self.building_footprint_sqm) {
            if footprint > plot {
                warnings.push(
                    "Building footprint appears larger than plot area. \
                     Please check your drawing measurements."
                        .to_string(),
                );
            }
        }
        for (name, min, max) in SANITY_LIMITS {
            let Some(value) = self.field(name) else { continue };
            if !(min..=max).contains(&value) {
                warnings.push(format!(
                    "Unusual {}: {value}. Expected range: {min}-{max}.",
                    name.replace('_', " ")
                ));
            }
        }
        for warning in &warnings {
            tracing::warn!(%warning, "drawing sanity check failed");
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plausible_drawing_has_no_warnings() {
        let summary = DrawingSummary {
            has_drawing: true,
            plot_area_sqm: Some(400.0),
            building_footprint_sqm: Some(100.0),
            distance_to_boundary_m: Some(0.0),
            ..DrawingSummary::default()
        };
        assert!(summary.validate().is_empty());
    }

    #[test]
    fn footprint_larger_than_plot() {
        let summary = DrawingSummary {
            plot_area_sqm: Some(100.0),
            building_footprint_sqm: Some(150.0),
            ..DrawingSummary::default()
        };
        let warnings = summary.validate();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Building footprint appears larger"));
    }

    #[test]
    fn out_of_range_values() {
        let summary = DrawingSummary {
            plot_area_sqm: Some(4.0),
            eaves_height_m: Some(25.0),
            ..DrawingSummary::default()
        };
        assert_eq!(
            summary.validate(),
            vec![
                "Unusual plot area sqm: 4. Expected range: 10-10000.".to_string(),
                "Unusual eaves height m: 25. Expected range: 1-15.".to_string(),
            ]
        );
    }

    #[test]
    fn reads_context() {
        let ctx = EvaluationContext::new()
            .with(keys::PLOT_AREA_M2, 400.0)
            .with(keys::EAVES_HEIGHT_M, "tall");
        let summary = DrawingSummary::from_context(&ctx, true);
        assert_eq!(summary.plot_area_sqm, Some(400.0));
        assert_eq!(summary.eaves_height_m, None);
    }
}
