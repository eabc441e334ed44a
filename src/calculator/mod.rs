//! Stateless measurements over footprints, walls and boundaries.
//!
//! Inputs are millimetres; reported values are metres (or square metres)
//! rounded for presentation, with the raw millimetre figure alongside where
//! callers need to compare exactly.

pub mod area;
pub mod coverage;
pub mod depth;
pub mod distance;
pub mod wall_line;
pub mod width;

pub use area::{footprint_area_m2, polygon_area, polygon_area_mm2, union_footprint, AreaReport};
pub use coverage::{curtilage_coverage, CoverageReport, CurtilageCoverage};
pub use depth::{extension_depth, DepthReport};
pub use distance::{
    distance_along, distance_to_highway, min_distance_to_boundary, BoundaryDistance,
    HighwayDistance, BOUNDARY_ZONE_MM,
};
pub use wall_line::{extends_beyond_wall, ExtendsBeyondWall};
pub use width::{building_width, half_width_rule, HalfWidthReport, WidthAxis, WidthReport};
