use geo::{MultiPolygon, Polygon};
use serde::Serialize;

use super::area::{footprint_area_mm2, polygon_area_mm2, union_footprint};
use crate::math::{round_to, MM2_TO_M2};

/// Share of the curtilage covered by buildings other than the original house.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoverageReport {
    pub curtilage_area_m2: f64,
    pub available_curtilage_m2: f64,
    pub building_area_m2: f64,
    /// Rounded to 4 dp.
    pub coverage_ratio: f64,
    /// Rounded to 1 dp.
    pub coverage_percent: f64,
    pub compliant_50_percent: bool,
    pub remaining_allowance_m2: f64,
    /// Unrounded ratio, for threshold comparisons.
    #[serde(skip)]
    pub exact_ratio: f64,
}

/// Computes curtilage coverage.
///
/// With an original house of positive area, both the available curtilage and
/// the building total exclude it. Floor area of earlier extensions that are
/// not drawn can be added with [`with_prior_extensions_m2`].
///
/// [`with_prior_extensions_m2`]: CurtilageCoverage::with_prior_extensions_m2
pub struct CurtilageCoverage<'a> {
    plot: &'a Polygon<f64>,
    buildings: &'a [Polygon<f64>],
    original: Option<&'a MultiPolygon<f64>>,
    prior_extensions_mm2: f64,
}

impl<'a> CurtilageCoverage<'a> {
    #[must_use]
    pub fn new(plot: &'a Polygon<f64>, buildings: &'a [Polygon<f64>]) -> Self {
        Self {
            plot,
            buildings,
            original: None,
            prior_extensions_mm2: 0.0,
        }
    }

    /// Sets the original house footprint to exclude.
    #[must_use]
    pub fn with_original(mut self, original: &'a MultiPolygon<f64>) -> Self {
        self.original = Some(original);
        self
    }

    #[must_use]
    pub fn with_prior_extensions_m2(mut self, area_m2: f64) -> Self {
        self.prior_extensions_mm2 = area_m2.max(0.0) / MM2_TO_M2;
        self
    }

    #[must_use]
    pub fn execute(&self) -> CoverageReport {
        let curtilage = polygon_area_mm2(self.plot);
        let total = footprint_area_mm2(&union_footprint(self.buildings));
        let original = self.original.map_or(0.0, footprint_area_mm2);

        let (available, added) = if original > 0.0 {
            (curtilage - original, total - original)
        } else {
            (curtilage, total)
        };
        let added = added + self.prior_extensions_mm2;

        let ratio = if available <= 0.0 { 1.0 } else { added / available };
        let remaining = (0.5 * available - added).max(0.0);

        CoverageReport {
            curtilage_area_m2: round_to(curtilage * MM2_TO_M2, 2),
            available_curtilage_m2: round_to(available * MM2_TO_M2, 2),
            building_area_m2: round_to(added * MM2_TO_M2, 2),
            coverage_ratio: round_to(ratio, 4),
            coverage_percent: round_to(ratio * 100.0, 1),
            compliant_50_percent: ratio <= 0.5,
            remaining_allowance_m2: round_to(remaining * MM2_TO_M2, 2),
            exact_ratio: ratio,
        }
    }
}

/// Shorthand for [`CurtilageCoverage`].
#[must_use]
pub fn curtilage_coverage(
    plot: &Polygon<f64>,
    buildings: &[Polygon<f64>],
    original: Option<&MultiPolygon<f64>>,
) -> CoverageReport {
    let op = CurtilageCoverage::new(plot, buildings);
    match original {
        Some(o) => op.with_original(o).execute(),
        None => op.execute(),
    }
}
