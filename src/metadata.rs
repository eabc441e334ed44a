//! Facts about the property that the drawing cannot show, supplied by the
//! caller (usually from a conversation with the applicant).

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum HouseType {
    Detached,
    SemiDetached,
    #[serde(alias = "terrace")]
    #[strum(to_string = "terraced", serialize = "terrace")]
    Terraced,
    EndTerrace,
}

impl HouseType {
    /// Number of walls expected to be shared with neighbours.
    #[must_use]
    pub fn expected_party_walls(self) -> usize {
        match self {
            Self::Detached => 0,
            Self::SemiDetached | Self::EndTerrace => 1,
            Self::Terraced => 2,
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LandType {
    #[default]
    Standard,
    /// Article 2(3) land: conservation areas, national parks, AONB, the Broads
    /// and World Heritage Sites.
    #[serde(rename = "article_2_3")]
    #[strum(to_string = "article_2_3")]
    Article2_3,
    Sssi,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExtensionType {
    #[serde(alias = "rear")]
    #[strum(to_string = "rear_single", serialize = "rear")]
    RearSingle,
    RearMulti,
    Side,
    Loft,
    Porch,
    Outbuilding,
}

impl ExtensionType {
    #[must_use]
    pub fn is_rear(self) -> bool {
        matches!(self, Self::RearSingle | Self::RearMulti)
    }

    /// Category name used by rule applicability: both rear kinds are `rear`.
    #[must_use]
    pub fn category(self) -> &'static str {
        match self {
            Self::RearSingle | Self::RearMulti => "rear",
            Self::Side => "side",
            Self::Loft => "loft",
            Self::Porch => "porch",
            Self::Outbuilding => "outbuilding",
        }
    }

    /// Storey count implied by the extension kind.
    #[must_use]
    pub fn implied_storeys(self) -> Option<u32> {
        match self {
            Self::RearSingle => Some(1),
            Self::RearMulti => Some(2),
            _ => None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RoofType {
    DualPitched,
    Flat,
    #[default]
    Other,
}

/// Property facts. Every field is optional: rules that need a missing fact
/// report an inconclusive result instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionMetadata {
    pub house_type: Option<HouseType>,
    pub land_type: Option<LandType>,
    pub extension_type: Option<ExtensionType>,
    pub storeys: Option<u32>,
    pub neighbour_consultation: Option<bool>,
    pub roof_type: Option<RoofType>,
    pub prior_extensions_sqm: Option<f64>,
    pub eaves_height_m: Option<f64>,
    pub extension_height_m: Option<f64>,
    pub loft_volume_m3: Option<f64>,
    pub has_dormer: Option<bool>,
    pub dormer_setback_m: Option<f64>,
    pub has_rooflight: Option<bool>,
    pub rooflight_protrusion_m: Option<f64>,
    pub porch_area_m2: Option<f64>,
    pub porch_height_m: Option<f64>,
    pub outbuilding_height_m: Option<f64>,
    /// Overrides the rear-boundary distance measured from the drawing.
    pub distance_to_rear_boundary_m: Option<f64>,
}

impl SessionMetadata {
    /// Explicit storey count, else the count implied by the extension kind.
    #[must_use]
    pub fn effective_storeys(&self) -> Option<u32> {
        self.storeys
            .or_else(|| self.extension_type.and_then(ExtensionType::implied_storeys))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn string_forms() {
        assert_eq!(HouseType::SemiDetached.to_string(), "semi-detached");
        assert_eq!(HouseType::EndTerrace.as_ref(), "end-terrace");
        assert_eq!("terrace".parse::<HouseType>().unwrap(), HouseType::Terraced);
        assert_eq!(LandType::Article2_3.to_string(), "article_2_3");
        assert_eq!(RoofType::DualPitched.to_string(), "dual_pitched");
        assert_eq!(ExtensionType::RearMulti.to_string(), "rear_multi");
        assert_eq!("rear".parse::<ExtensionType>().unwrap(), ExtensionType::RearSingle);
    }

    #[test]
    fn deserializes_partial_metadata() {
        let meta: SessionMetadata = serde_json::from_str(
            r#"{"house_type": "semi-detached", "extension_type": "rear",
                "land_type": "article_2_3", "roof_type": "dual_pitched"}"#,
        )
        .unwrap();
        assert_eq!(meta.house_type, Some(HouseType::SemiDetached));
        assert_eq!(meta.extension_type, Some(ExtensionType::RearSingle));
        assert_eq!(meta.land_type, Some(LandType::Article2_3));
        assert_eq!(meta.roof_type, Some(RoofType::DualPitched));
        assert_eq!(meta.eaves_height_m, None);
    }

    #[test]
    fn storeys_fall_back_to_extension_kind() {
        let mut meta = SessionMetadata {
            extension_type: Some(ExtensionType::RearMulti),
            ..SessionMetadata::default()
        };
        assert_eq!(meta.effective_storeys(), Some(2));
        meta.storeys = Some(3);
        assert_eq!(meta.effective_storeys(), Some(3));
        meta.extension_type = Some(ExtensionType::Loft);
        meta.storeys = None;
        assert_eq!(meta.effective_storeys(), None);
    }

    #[test]
    fn party_wall_expectations() {
        assert_eq!(HouseType::Detached.expected_party_walls(), 0);
        assert_eq!(HouseType::SemiDetached.expected_party_walls(), 1);
        assert_eq!(HouseType::EndTerrace.expected_party_walls(), 1);
        assert_eq!(HouseType::Terraced.expected_party_walls(), 2);
    }
}
