pub mod footprint;
pub mod linework;

pub use footprint::{outline_segments, polygons_from_points, union_all};
pub use linework::{Cardinal, Linework, Polyline, Segment};
