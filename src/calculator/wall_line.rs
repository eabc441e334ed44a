use geo::{BooleanOps, Intersects, LineString, MultiLineString, Polygon};

use crate::error::GeometryError;
use crate::geometry::Segment;

/// Tests whether an extension crosses the line of a reference wall.
///
/// "Beyond a wall" covers the area in front of the wall itself and in front
/// of the wall's line continued out to the plot boundary. The wall is
/// extended along its own direction and clipped to the boundary. Any contact
/// between that line and the extension counts, including a shared edge or a
/// single touching corner.
pub struct ExtendsBeyondWall<'a> {
    extension: &'a Polygon<f64>,
    wall: &'a Segment,
    boundary: &'a Polygon<f64>,
    line_extension_mm: f64,
}

impl<'a> ExtendsBeyondWall<'a> {
    #[must_use]
    pub fn new(extension: &'a Polygon<f64>, wall: &'a Segment, boundary: &'a Polygon<f64>) -> Self {
        Self {
            extension,
            wall,
            boundary,
            line_extension_mm: 100_000.0,
        }
    }

    /// How far the wall is continued each way before clipping.
    #[must_use]
    pub fn with_line_extension(mut self, mm: f64) -> Self {
        self.line_extension_mm = mm;
        self
    }

    /// The wall line continued to the boundary. Falls back to the wall
    /// itself when clipping does not leave exactly one line.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::InsufficientGeometry` for a zero-length wall.
    pub fn reference_line(&self) -> Result<LineString<f64>, GeometryError> {
        let dir = self
            .wall
            .unit_direction()
            .map_err(|_| GeometryError::InsufficientGeometry("reference wall has zero length".into()))?;
        let a = self.wall.start - dir * self.line_extension_mm;
        let b = self.wall.end + dir * self.line_extension_mm;
        let extended = MultiLineString::new(vec![LineString::from(vec![(a.x, a.y), (b.x, b.y)])]);

        let mut clipped = self.boundary.clip(&extended, false);
        if clipped.0.len() == 1 {
            if let Some(line) = clipped.0.pop() {
                return Ok(line);
            }
        }
        tracing::debug!(pieces = clipped.0.len(), "wall line clip ambiguous; using wall itself");
        Ok(LineString::from(vec![
            (self.wall.start.x, self.wall.start.y),
            (self.wall.end.x, self.wall.end.y),
        ]))
    }

    /// # Errors
    ///
    /// Returns `GeometryError::InsufficientGeometry` for a zero-length wall.
    pub fn execute(&self) -> Result<bool, GeometryError> {
        let line = self.reference_line()?;
        Ok(line.intersects(self.extension))
    }
}

/// Shorthand for [`ExtendsBeyondWall`] with the default line extension.
///
/// # Errors
///
/// Returns `GeometryError::InsufficientGeometry` for a zero-length wall.
pub fn extends_beyond_wall(
    extension: &Polygon<f64>,
    wall: &Segment,
    boundary: &Polygon<f64>,
) -> Result<bool, GeometryError> {
    ExtendsBeyondWall::new(extension, wall, boundary).execute()
}
