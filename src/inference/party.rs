use geo::{MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::Inference;
use crate::config::InferenceConfig;
use crate::geometry::footprint::{exterior_points, footprint_centroid};
use crate::geometry::{Linework, Segment};
use crate::math::distance_2d::chain_to_chain;
use crate::math::Point2;
use crate::metadata::HouseType;
use crate::parser::ParsedDrawing;

/// Side of the house, looking at the drawing with x increasing to the right.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartyWalls {
    pub walls: Vec<Segment>,
    /// Sides with no party wall, where a side extension could go.
    pub buildable_sides: Vec<Side>,
}

/// Finds walls shared with neighbours.
///
/// A footprint segment is a candidate when any part of it comes within
/// `party_wall_tolerance_mm` of the plot boundary and no door or window is
/// near it.
#[must_use]
pub fn identify_party_walls(
    segments: &[Segment],
    footprint: &MultiPolygon<f64>,
    plot: &Polygon<f64>,
    house_type: HouseType,
    parsed: &ParsedDrawing,
    config: &InferenceConfig,
) -> Inference<PartyWalls> {
    let expected = house_type.expected_party_walls();
    if expected == 0 {
        return Inference::confident(
            PartyWalls {
                walls: Vec::new(),
                buildable_sides: vec![Side::Left, Side::Right],
            },
            1.0,
        );
    }

    let boundary = exterior_points(plot);
    let walls: Vec<Segment> = segments
        .iter()
        .filter(|s| on_boundary(s, &boundary, config.party_wall_tolerance_mm))
        .filter(|s| {
            !parsed
                .doors
                .iter()
                .chain(&parsed.windows)
                .any(|opening| opening.distance_to(*s) < config.opening_clearance_mm)
        })
        .copied()
        .collect();

    let mut buildable_sides = vec![Side::Left, Side::Right];
    if let Some(centre) = footprint_centroid(footprint) {
        for wall in &walls {
            let side = if wall.midpoint().x < centre.x {
                Side::Left
            } else {
                Side::Right
            };
            buildable_sides.retain(|s| *s != side);
        }
    }

    tracing::debug!(%house_type, found = walls.len(), expected, "party walls");
    let found = walls.len();
    let value = PartyWalls {
        walls,
        buildable_sides,
    };
    if found == expected {
        Inference::confident(value, 0.9)
    } else {
        Inference::unsure(
            value,
            0.5,
            format!(
                "Detected {found} potential party walls for {house_type} (expected {expected}). \
                 Please confirm which side(s) are attached to neighbours."
            ),
        )
    }
}

fn on_boundary(segment: &Segment, boundary: &[Point2], tolerance: f64) -> bool {
    chain_to_chain(&[segment.start, segment.end], false, boundary, true)
        .is_some_and(|(_, _, d)| d < tolerance)
}
