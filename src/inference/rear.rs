use serde::Serialize;

use super::principal::PrincipalElevation;
use super::Inference;
use crate::config::InferenceConfig;
use crate::geometry::{Cardinal, Linework, Segment};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RearWall {
    /// Oriented with the building exterior on its left, so that anything
    /// behind the house has a positive cross product.
    pub wall: Segment,
    pub distance_from_principal_mm: f64,
    /// More than one long wall faces the rear.
    pub is_stepped: bool,
}

/// Finds the wall opposite the principal elevation.
///
/// Candidates are outline segments (counter-clockwise) whose outward normal
/// points the opposite way to the front; the longest and furthest from the
/// front wins.
#[must_use]
pub fn identify_rear_wall(
    segments: &[Segment],
    front: &PrincipalElevation,
    config: &InferenceConfig,
) -> Inference<Option<RearWall>> {
    let facing: Cardinal = front.direction.opposite();
    let candidates: Vec<(&Segment, f64)> = segments
        .iter()
        .filter(|s| Cardinal::from_vector(&s.right_normal()) == facing)
        .map(|s| (s, s.distance_to(&front.wall)))
        .collect();

    let is_stepped = candidates
        .iter()
        .filter(|(s, _)| s.length() > config.stepped_min_length_mm)
        .count()
        > 1;

    let best = candidates
        .iter()
        .max_by(|a, b| (a.0.length() * a.1).total_cmp(&(b.0.length() * b.1)));

    match best {
        Some((wall, distance)) => {
            tracing::debug!(facing = %facing, candidates = candidates.len(), is_stepped, "rear wall found");
            Inference::confident(
                Some(RearWall {
                    wall: wall.reversed(),
                    distance_from_principal_mm: *distance,
                    is_stepped,
                }),
                1.0,
            )
        }
        None => Inference::unsure(None, 0.0, "Could not identify rear wall"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::footprint::{outline_segments, rectangle, union_all};
    use crate::math::Point2;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn front_of(segments: &[Segment], y: f64) -> PrincipalElevation {
        let wall = *segments
            .iter()
            .find(|s| (s.start.y - y).abs() < 1e-9 && (s.end.y - y).abs() < 1e-9)
            .unwrap();
        PrincipalElevation {
            wall,
            direction: Cardinal::South,
            highway_distance_mm: None,
            fronting_angle: None,
        }
    }

    #[test]
    fn simple_box_rear_wall() {
        let segments = outline_segments(&union_all([&rectangle(p(0.0, 0.0), p(10000.0, 10000.0))]));
        let front = front_of(&segments, 0.0);
        let rear = identify_rear_wall(&segments, &front, &InferenceConfig::default());
        assert!(!rear.requires_clarification());
        let rear = rear.value.unwrap();
        assert_eq!(rear.wall.start, p(0.0, 10000.0));
        assert_eq!(rear.wall.end, p(10000.0, 10000.0));
        assert!((rear.distance_from_principal_mm - 10000.0).abs() < 1e-9);
        assert!(!rear.is_stepped);
    }

    #[test]
    fn stepped_rear() {
        let a = rectangle(p(0.0, 0.0), p(6000.0, 10000.0));
        let b = rectangle(p(6000.0, 0.0), p(10000.0, 7000.0));
        let segments = outline_segments(&union_all([&a, &b]));
        let front = front_of(&segments, 0.0);
        let rear = identify_rear_wall(&segments, &front, &InferenceConfig::default())
            .value
            .unwrap();
        assert!(rear.is_stepped);
        // 6000 x 10000 beats 4000 x 7000.
        assert!((rear.wall.start.y - 10000.0).abs() < 1e-9);
    }

    #[test]
    fn no_opposite_wall() {
        let segments = vec![Segment::new(p(0.0, 0.0), p(10000.0, 0.0))];
        let front = PrincipalElevation {
            wall: segments[0],
            direction: Cardinal::South,
            highway_distance_mm: None,
            fronting_angle: None,
        };
        let rear = identify_rear_wall(&segments, &front, &InferenceConfig::default());
        assert!(rear.value.is_none());
        assert!(rear.confidence.abs() < f64::EPSILON);
        assert!(rear.requires_clarification());
    }
}
