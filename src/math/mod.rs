pub mod distance_2d;
pub mod intersect_2d;
pub mod polygon_2d;

/// 2D point type. Coordinates are drawing millimetres.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Global geometric tolerance for floating-point comparisons, in millimetres.
pub const TOLERANCE: f64 = 1e-9;

/// Millimetres to metres.
pub const MM_TO_M: f64 = 1.0 / 1000.0;

/// Square millimetres to square metres.
pub const MM2_TO_M2: f64 = 1.0 / 1_000_000.0;

/// Cubic millimetres to cubic metres.
pub const MM3_TO_M3: f64 = 1.0 / 1_000_000_000.0;

/// Rounds `value` to `places` decimal places for outward-facing reports.
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}

/// Z component of the 2D cross product `a × b`.
#[must_use]
pub fn cross_2d(a: &Vector2, b: &Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Angle between two vectors in degrees, in `[0, 180]`.
///
/// Returns `0.0` when either vector has zero length.
#[must_use]
pub fn angle_between_deg(a: &Vector2, b: &Vector2) -> f64 {
    let norms = a.norm() * b.norm();
    if norms < TOLERANCE {
        return 0.0;
    }
    let cos = (a.dot(b) / norms).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_away_from_zero() {
        assert!((round_to(1.005_1, 2) - 1.01).abs() < 1e-12);
        assert!((round_to(56.25, 1) - 56.3).abs() < 1e-12);
    }

    #[test]
    fn angle_between_perpendicular_and_opposite() {
        let x = Vector2::new(1.0, 0.0);
        let y = Vector2::new(0.0, 3.0);
        assert!((angle_between_deg(&x, &y) - 90.0).abs() < 1e-9);
        assert!((angle_between_deg(&x, &-x) - 180.0).abs() < 1e-9);
        assert!(angle_between_deg(&x, &Vector2::zeros()).abs() < 1e-12);
    }

    #[test]
    fn unit_factors() {
        assert!((4000.0 * MM_TO_M - 4.0).abs() < 1e-12);
        assert!((25_000_000.0 * MM2_TO_M2 - 25.0).abs() < 1e-12);
        // A 4 m x 5 m x 2.5 m loft.
        assert!((4000.0 * 5000.0 * 2500.0 * MM3_TO_M3 - 50.0).abs() < 1e-9);
    }

    #[test]
    fn cross_sign_follows_handedness() {
        let x = Vector2::new(1.0, 0.0);
        let y = Vector2::new(0.0, 1.0);
        assert!(cross_2d(&x, &y) > 0.0);
        assert!(cross_2d(&y, &x) < 0.0);
    }
}
