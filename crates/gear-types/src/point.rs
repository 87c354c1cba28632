use serde::{Deserialize, Serialize};

/// A point in the planar sketch frame. Profile geometry always lives at z = 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at distance `radius` from the origin and polar angle `angle`.
    pub fn from_polar(radius: f64, angle: f64) -> Self {
        Self {
            x: radius * angle.cos(),
            y: radius * angle.sin(),
        }
    }

    /// Distance from the origin.
    pub fn radius(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Polar angle in (-π, π].
    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x)
    }

    pub fn distance_to(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Rotate counter-clockwise about the origin.
    pub fn rotated(&self, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            x: self.x * c - self.y * s,
            y: self.x * s + self.y * c,
        }
    }

    /// Rotate counter-clockwise about `center`.
    pub fn rotated_about(&self, center: &Self, angle: f64) -> Self {
        let local = Self::new(self.x - center.x, self.y - center.y).rotated(angle);
        Self::new(local.x + center.x, local.y + center.y)
    }

    /// Mirror about the x axis.
    pub fn mirrored_x(&self) -> Self {
        Self {
            x: self.x,
            y: -self.y,
        }
    }
}

/// Rotate every point of a sequence counter-clockwise about the origin.
pub fn rotate_points(points: &[Point2], angle: f64) -> Vec<Point2> {
    points.iter().map(|p| p.rotated(angle)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn rotate_quarter_turn() {
        let p = Point2::new(2.0, 0.0).rotated(FRAC_PI_2);
        assert!(p.x.abs() < 1e-12);
        assert!((p.y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn rotate_about_center_keeps_center_fixed() {
        let c = Point2::new(3.0, 1.0);
        let p = c.rotated_about(&c, 1.234);
        assert!(p.distance_to(&c) < 1e-12);
    }

    #[test]
    fn polar_round_trip() {
        let p = Point2::from_polar(5.0, 0.75);
        assert!((p.radius() - 5.0).abs() < 1e-12);
        assert!((p.angle() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn point_serializes_as_object() {
        let json = serde_json::to_string(&Point2::new(1.0, -2.5)).unwrap();
        assert_eq!(json, r#"{"x":1.0,"y":-2.5}"#);
    }
}
