//! Involute curve sampling.

use crate::error::GeometryError;
use gear_types::Point2;

/// Number of points sampled along each tooth flank.
pub const INVOLUTE_SAMPLES: usize = 15;

/// Radii within this relative distance below the base circle are treated as
/// lying on it.
const BOUNDARY_TOLERANCE: f64 = 1e-12;

/// Point on the involute of a circle of radius `base_radius`, at distance
/// `radius` from the center.
///
/// The involute starts at `(base_radius, 0)` and unwinds counter-clockwise.
pub fn involute_point(base_radius: f64, radius: f64) -> Result<Point2, GeometryError> {
    if !(base_radius > 0.0) || !base_radius.is_finite() {
        return Err(GeometryError::Precondition {
            reason: format!("base radius must be positive, got {}", base_radius),
        });
    }
    if radius < base_radius * (1.0 - BOUNDARY_TOLERANCE) || !radius.is_finite() {
        return Err(GeometryError::Precondition {
            reason: format!(
                "radius {} lies inside the base circle of radius {}",
                radius, base_radius
            ),
        });
    }

    let r = radius.max(base_radius);
    let side = (r * r - base_radius * base_radius).max(0.0).sqrt();
    let alpha = side / base_radius;
    let theta = alpha - (base_radius / r).min(1.0).acos();
    Ok(Point2::from_polar(r, theta))
}

/// `n` points along the involute from the base diameter `bd` to the outside
/// diameter `od`, evenly spaced in radius.
pub fn involute_points(bd: f64, od: f64, n: usize) -> Result<Vec<Point2>, GeometryError> {
    if n < 2 {
        return Err(GeometryError::Precondition {
            reason: format!("need at least 2 involute samples, got {}", n),
        });
    }
    if od < bd {
        return Err(GeometryError::Precondition {
            reason: format!(
                "outside diameter {} is smaller than base diameter {}",
                od, bd
            ),
        });
    }

    let base_radius = 0.5 * bd;
    let step = (od - bd) / (2.0 * (n - 1) as f64);
    (0..n)
        .map(|i| involute_point(base_radius, base_radius + i as f64 * step))
        .collect()
}
