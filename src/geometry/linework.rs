use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::error::GeometryError;
use crate::math::distance_2d::{chain_to_chain, point_to_segment_dist};
use crate::math::{Point2, Vector2, TOLERANCE};

/// Compass direction used for elevations. Drawings are read with +y north.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Cardinal {
    North,
    South,
    East,
    West,
}

impl Cardinal {
    /// Buckets a vector into the nearest compass direction.
    ///
    /// `[-45°, 45°)` is east, `[45°, 135°)` north, `[135°, 180°] ∪ (-180°, -135°)`
    /// west and everything else south.
    #[must_use]
    pub fn from_vector(v: &Vector2) -> Self {
        let angle = v.y.atan2(v.x).to_degrees();
        if (-45.0..45.0).contains(&angle) {
            Self::East
        } else if (45.0..135.0).contains(&angle) {
            Self::North
        } else if !(-135.0..135.0).contains(&angle) {
            Self::West
        } else {
            Self::South
        }
    }

    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
        }
    }
}

/// Shared measurements over open vertex chains (segments and polylines).
pub trait Linework {
    /// Vertices in order.
    fn vertices(&self) -> Vec<Point2>;

    /// Direction vector, last vertex minus first.
    fn direction(&self) -> Vector2 {
        let pts = self.vertices();
        match (pts.first(), pts.last()) {
            (Some(a), Some(b)) => b - a,
            _ => Vector2::zeros(),
        }
    }

    /// Total length along the chain.
    fn length(&self) -> f64 {
        self.vertices().windows(2).map(|w| (w[1] - w[0]).norm()).sum()
    }

    /// Length-weighted centroid; the first vertex for zero-length chains.
    fn centroid(&self) -> Option<Point2> {
        let pts = self.vertices();
        let first = *pts.first()?;
        let mut total = 0.0;
        let mut acc = Vector2::zeros();
        for w in pts.windows(2) {
            let len = (w[1] - w[0]).norm();
            let mid = w[0] + (w[1] - w[0]) * 0.5;
            acc += mid.coords * len;
            total += len;
        }
        if total < TOLERANCE {
            return Some(first);
        }
        Some(Point2::from(acc / total))
    }

    /// Minimum distance from a point to the chain.
    fn distance_to_point(&self, p: &Point2) -> f64 {
        let pts = self.vertices();
        match pts.len() {
            0 => f64::INFINITY,
            1 => (p - pts[0]).norm(),
            _ => pts
                .windows(2)
                .map(|w| point_to_segment_dist(p, &w[0], &w[1]))
                .fold(f64::INFINITY, f64::min),
        }
    }

    /// Minimum distance between two chains.
    fn distance_to<L: Linework + ?Sized>(&self, other: &L) -> f64 {
        let a = self.vertices();
        let b = other.vertices();
        if a.len() == 1 {
            return other.distance_to_point(&a[0]);
        }
        if b.len() == 1 {
            return self.distance_to_point(&b[0]);
        }
        chain_to_chain(&a, false, &b, false).map_or(f64::INFINITY, |(_, _, d)| d)
    }
}

/// A straight two-point segment, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point2,
    pub end: Point2,
}

impl Segment {
    #[must_use]
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    /// Same segment traversed the other way.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self::new(self.end, self.start)
    }

    #[must_use]
    pub fn midpoint(&self) -> Point2 {
        self.start + (self.end - self.start) * 0.5
    }

    /// Unit direction vector.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::ZeroLengthSegment` if start and end coincide.
    pub fn unit_direction(&self) -> Result<Vector2, GeometryError> {
        let d = self.end - self.start;
        let len = d.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroLengthSegment {
                x: self.start.x,
                y: self.start.y,
            });
        }
        Ok(d / len)
    }

    /// Normal pointing to the left of the direction of travel.
    #[must_use]
    pub fn left_normal(&self) -> Vector2 {
        let d = self.end - self.start;
        Vector2::new(-d.y, d.x)
    }

    /// Normal pointing to the right of the direction of travel.
    #[must_use]
    pub fn right_normal(&self) -> Vector2 {
        -self.left_normal()
    }
}

impl Linework for Segment {
    fn vertices(&self) -> Vec<Point2> {
        vec![self.start, self.end]
    }
}

/// An open chain of two or more points (highways, doors, windows).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<Point2>,
}

impl Polyline {
    /// Creates a polyline.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::InsufficientGeometry` for fewer than 2 points.
    pub fn new(points: Vec<Point2>) -> Result<Self, GeometryError> {
        if points.len() < 2 {
            return Err(GeometryError::InsufficientGeometry(format!(
                "a line needs 2 points, found {}",
                points.len()
            )));
        }
        Ok(Self { points })
    }

    /// Consecutive two-point pieces.
    #[must_use]
    pub fn segments(&self) -> Vec<Segment> {
        self.points
            .windows(2)
            .map(|w| Segment::new(w[0], w[1]))
            .collect()
    }
}

impl Linework for Polyline {
    fn vertices(&self) -> Vec<Point2> {
        self.points.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn cardinal_buckets() {
        assert_eq!(Cardinal::from_vector(&Vector2::new(1.0, 0.0)), Cardinal::East);
        assert_eq!(Cardinal::from_vector(&Vector2::new(0.0, 1.0)), Cardinal::North);
        assert_eq!(Cardinal::from_vector(&Vector2::new(-1.0, 0.0)), Cardinal::West);
        assert_eq!(Cardinal::from_vector(&Vector2::new(0.0, -1.0)), Cardinal::South);
        assert_eq!(Cardinal::from_vector(&Vector2::new(1.0, 0.9)), Cardinal::East);
    }

    #[test]
    fn cardinal_opposites_and_names() {
        assert_eq!(Cardinal::North.opposite(), Cardinal::South);
        assert_eq!(Cardinal::East.opposite(), Cardinal::West);
        assert_eq!(Cardinal::West.to_string(), "west");
        assert_eq!("south".parse::<Cardinal>().unwrap(), Cardinal::South);
    }

    #[test]
    fn segment_normals_and_midpoint() {
        let s = Segment::new(p(0.0, 0.0), p(10.0, 0.0));
        assert!(s.left_normal().y > 0.0);
        assert!(s.right_normal().y < 0.0);
        assert_eq!(s.midpoint(), p(5.0, 0.0));
        assert_eq!(s.reversed().start, p(10.0, 0.0));
    }

    #[test]
    fn zero_length_segment_has_no_direction() {
        let s = Segment::new(p(1.0, 1.0), p(1.0, 1.0));
        assert!(matches!(
            s.unit_direction(),
            Err(GeometryError::ZeroLengthSegment { .. })
        ));
    }

    #[test]
    fn polyline_needs_two_points() {
        assert!(Polyline::new(vec![p(0.0, 0.0)]).is_err());
        let line = Polyline::new(vec![p(0.0, 0.0), p(3.0, 0.0), p(3.0, 4.0)]).unwrap();
        assert!((line.length() - 7.0).abs() < 1e-12);
        assert_eq!(line.segments().len(), 2);
        assert_eq!(line.direction(), Vector2::new(3.0, 4.0));
    }

    #[test]
    fn centroid_is_length_weighted() {
        let line = Polyline::new(vec![p(0.0, 0.0), p(10.0, 0.0)]).unwrap();
        assert_eq!(line.centroid().unwrap(), p(5.0, 0.0));
    }

    #[test]
    fn chain_distances() {
        let highway = Polyline::new(vec![p(-5000.0, -2000.0), p(25000.0, -2000.0)]).unwrap();
        let wall = Segment::new(p(0.0, 0.0), p(10000.0, 0.0));
        assert!((wall.distance_to(&highway) - 2000.0).abs() < 1e-9);
        assert!((highway.distance_to_point(&p(0.0, 1000.0)) - 3000.0).abs() < 1e-9);
    }
}
