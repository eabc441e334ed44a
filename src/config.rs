//! Engine tolerances and heuristic constants.
//!
//! Every value has a default, so a TOML file only needs the keys it changes:
//!
//! ```toml
//! [inference]
//! facing_rule = "perpendicular"
//! corner_plot_ratio = 0.8
//! ```

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::error::ConfigError;

/// How "a wall faces a highway" is read from the angle between their
/// direction vectors (0–180°).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FacingRule {
    /// The wall runs alongside the highway: deviation is
    /// `min(angle, 180° - angle)`.
    #[default]
    Parallel,
    /// Deviation is `|90° - angle|`.
    Perpendicular,
}

impl FacingRule {
    /// Deviation in degrees from the ideal facing orientation.
    #[must_use]
    pub fn deviation(self, angle_deg: f64) -> f64 {
        match self {
            Self::Parallel => angle_deg.min(180.0 - angle_deg),
            Self::Perpendicular => (90.0 - angle_deg).abs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Endpoints closer than this are merged before polygonization.
    pub snap_tolerance_mm: f64,
    /// A layer needs at least this many loose segments to be polygonized.
    pub min_segments: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            snap_tolerance_mm: 50.0,
            min_segments: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub door_highway_radius_mm: f64,
    pub door_bonus: f64,
    pub boundary_weight: f64,
    pub min_boundary_distance_mm: f64,
    /// Second-best over best highway score above which a plot is a corner plot.
    pub corner_plot_ratio: f64,
    pub facing_rule: FacingRule,
    pub facing_tolerance_deg: f64,
    pub stepped_min_length_mm: f64,
    pub l_shape_fill_threshold: f64,
    pub party_wall_tolerance_mm: f64,
    pub opening_clearance_mm: f64,
    pub rectangle_factors: Vec<f64>,
    pub min_rectangle_coverage: f64,
    /// Extension pieces smaller than this are discarded as slivers.
    pub min_extension_area_mm2: f64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            door_highway_radius_mm: 10_000.0,
            door_bonus: 50_000.0,
            boundary_weight: 10_000.0,
            min_boundary_distance_mm: 100.0,
            corner_plot_ratio: 0.7,
            facing_rule: FacingRule::Parallel,
            facing_tolerance_deg: 45.0,
            stepped_min_length_mm: 1000.0,
            l_shape_fill_threshold: 0.75,
            party_wall_tolerance_mm: 100.0,
            opening_clearance_mm: 500.0,
            rectangle_factors: vec![1.0, 0.9, 0.8, 0.7, 0.6],
            min_rectangle_coverage: 0.9,
            min_extension_area_mm2: 10_000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    /// How far a reference wall is extended each way before clipping.
    pub line_extension_mm: f64,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            line_extension_mm: 100_000.0,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub parser: ParserConfig,
    pub inference: InferenceConfig,
    pub calculator: CalculatorConfig,
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Toml` for malformed TOML and
    /// `ConfigError::Invalid` when a value is out of range.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let inf = &self.inference;
        let positive = [
            ("parser.snap_tolerance_mm", self.parser.snap_tolerance_mm),
            ("inference.door_highway_radius_mm", inf.door_highway_radius_mm),
            ("inference.min_boundary_distance_mm", inf.min_boundary_distance_mm),
            ("inference.facing_tolerance_deg", inf.facing_tolerance_deg),
            ("calculator.line_extension_mm", self.calculator.line_extension_mm),
        ];
        for (key, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{key} must be positive, got {value}")));
            }
        }

        let ratios = [
            ("inference.corner_plot_ratio", inf.corner_plot_ratio),
            ("inference.l_shape_fill_threshold", inf.l_shape_fill_threshold),
            ("inference.min_rectangle_coverage", inf.min_rectangle_coverage),
        ];
        for (key, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!("{key} must be within [0, 1], got {value}")));
            }
        }

        if self.parser.min_segments < 3 {
            return Err(ConfigError::Invalid(
                "parser.min_segments must be at least 3".into(),
            ));
        }
        if inf.rectangle_factors.is_empty()
            || inf.rectangle_factors.iter().any(|f| !(*f > 0.0 && *f <= 1.0))
        {
            return Err(ConfigError::Invalid(
                "inference.rectangle_factors must be non-empty values in (0, 1]".into(),
            ));
        }
        Ok(())
    }
}
