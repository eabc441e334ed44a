use geo::{Intersects, LineString, Polygon};
use serde::Serialize;

use super::Inference;
use crate::config::InferenceConfig;
use crate::geometry::footprint::exterior_points;
use crate::geometry::{Cardinal, Linework, Polyline, Segment};
use crate::math::angle_between_deg;
use crate::math::distance_2d::chain_to_chain;
use crate::parser::ParsedDrawing;

/// The front of the house.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrincipalElevation {
    /// Outline segment with the building interior on its left.
    pub wall: Segment,
    /// Cardinal of the wall's outward normal.
    pub direction: Cardinal,
    pub highway_distance_mm: Option<f64>,
    /// Deviation from the ideal facing orientation, in degrees.
    pub fronting_angle: Option<f64>,
}

/// How strongly one highway looks like the road the house fronts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HighwayScore {
    pub index: usize,
    pub facing_wall_length: f64,
    pub has_door: bool,
    pub boundary_distance_mm: f64,
    pub score: f64,
}

/// Scores every highway, best first.
#[must_use]
pub fn score_highways(
    segments: &[Segment],
    parsed: &ParsedDrawing,
    config: &InferenceConfig,
) -> Vec<HighwayScore> {
    let mut scores: Vec<HighwayScore> = parsed
        .highways
        .iter()
        .enumerate()
        .map(|(index, highway)| {
            let facing_wall_length = segments
                .iter()
                .filter(|s| faces(s, highway, config))
                .map(Linework::length)
                .sum::<f64>();

            let has_door = parsed.doors.iter().any(|door| {
                door.centroid()
                    .is_some_and(|c| highway.distance_to_point(&c) < config.door_highway_radius_mm)
            });

            let boundary_distance_mm = parsed
                .plot_boundary
                .as_ref()
                .map_or(f64::INFINITY, |plot| plot_to_highway(plot, highway));

            let score = facing_wall_length
                + if has_door { config.door_bonus } else { 0.0 }
                + config.boundary_weight / boundary_distance_mm.max(config.min_boundary_distance_mm);

            HighwayScore {
                index,
                facing_wall_length,
                has_door,
                boundary_distance_mm,
                score,
            }
        })
        .collect();
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
    scores
}

/// Picks the principal elevation from footprint outline segments
/// (counter-clockwise, interior on the left).
#[must_use]
pub fn identify_principal_elevation(
    segments: &[Segment],
    parsed: &ParsedDrawing,
    config: &InferenceConfig,
) -> Inference<Option<PrincipalElevation>> {
    if parsed.highways.is_empty() {
        return match (&parsed.plot_boundary, boundary_fallback(segments, parsed)) {
            (Some(_), Some(front)) => {
                Inference::unsure(Some(front), 0.5, "No highway found in drawing")
            }
            _ => Inference::unsure(None, 0.0, "No highway or plot boundary found"),
        };
    }

    let scores = score_highways(segments, parsed, config);
    let (chosen, confidence, clarification) = match scores.as_slice() {
        [] => return Inference::unsure(None, 0.0, "No highway found in drawing"),
        [only] => (only.index, 0.95, None),
        [first, second, ..] => {
            let ratio = second.score / first.score.max(0.001);
            if ratio > config.corner_plot_ratio {
                match (first.has_door, second.has_door) {
                    (true, false) => (first.index, 0.85, None),
                    (false, true) => (second.index, 0.85, None),
                    _ => (
                        first.index,
                        0.4,
                        Some("Corner plot detected. Please confirm which road your front door faces."),
                    ),
                }
            } else {
                (first.index, 0.9, None)
            }
        }
    };
    tracing::debug!(highway = chosen, confidence, "principal highway chosen");

    let Some(highway) = parsed.highways.get(chosen) else {
        return Inference::unsure(None, 0.0, "No highway or plot boundary found");
    };

    let best = segments
        .iter()
        .filter_map(|s| {
            let dev = deviation(s, highway, config);
            (dev < config.facing_tolerance_deg).then(|| (s, dev, s.distance_to(highway)))
        })
        .max_by(|a, b| {
            selection_score(a.1, a.2, config).total_cmp(&selection_score(b.1, b.2, config))
        });

    if let Some((wall, deviation, distance)) = best {
        let front = PrincipalElevation {
            wall: *wall,
            direction: Cardinal::from_vector(&wall.right_normal()),
            highway_distance_mm: Some(distance),
            fronting_angle: Some(deviation),
        };
        return Inference {
            value: Some(front),
            confidence,
            clarification: clarification.map(str::to_string),
        };
    }

    match boundary_fallback(segments, parsed) {
        Some(front) => Inference::unsure(Some(front), 0.3, "No wall clearly fronts the highway"),
        None => Inference::unsure(None, 0.0, "No wall clearly fronts the highway"),
    }
}

fn deviation(wall: &Segment, highway: &Polyline, config: &InferenceConfig) -> f64 {
    config
        .facing_rule
        .deviation(angle_between_deg(&wall.direction(), &highway.direction()))
}

fn faces(wall: &Segment, highway: &Polyline, config: &InferenceConfig) -> bool {
    deviation(wall, highway, config) < config.facing_tolerance_deg
}

fn selection_score(deviation: f64, distance: f64, config: &InferenceConfig) -> f64 {
    (1.0 / distance.max(1.0)) * (config.facing_tolerance_deg - deviation)
}

/// Zero when the highway crosses or lies inside the plot.
fn plot_to_highway(plot: &Polygon<f64>, highway: &Polyline) -> f64 {
    let line = LineString::from(
        highway
            .points
            .iter()
            .map(|p| (p.x, p.y))
            .collect::<Vec<_>>(),
    );
    if plot.intersects(&line) {
        return 0.0;
    }
    chain_to_chain(&exterior_points(plot), true, &highway.points, false)
        .map_or(f64::INFINITY, |(_, _, d)| d)
}

/// Without a usable highway, the front is taken to face the south-most edge
/// of the plot: the wall whose midpoint is nearest that edge.
fn boundary_fallback(segments: &[Segment], parsed: &ParsedDrawing) -> Option<PrincipalElevation> {
    let plot = parsed.plot_boundary.as_ref()?;
    let ring = exterior_points(plot);
    let n = ring.len();
    let front_edge = (0..n)
        .map(|i| Segment::new(ring[i], ring[(i + 1) % n]))
        .min_by(|a, b| a.midpoint().y.total_cmp(&b.midpoint().y))?;

    let wall = segments.iter().min_by(|a, b| {
        front_edge
            .distance_to_point(&a.midpoint())
            .total_cmp(&front_edge.distance_to_point(&b.midpoint()))
    })?;

    Some(PrincipalElevation {
        wall: *wall,
        direction: Cardinal::South,
        highway_distance_mm: None,
        fronting_angle: Some(0.0),
    })
}
