//! Single-tooth outline: two involute flanks, a tip arc and a root connection.

use crate::error::GeometryError;
use crate::involute::{involute_point, involute_points, INVOLUTE_SAMPLES};
use crate::params::GearDimensions;
use gear_types::{rotate_points, Point2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// How the flank starts connect to the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RootConnection {
    /// The involute reaches the root circle; one line closes the tooth
    /// from the start of flank B to the start of flank A.
    Direct,
    /// The involute starts above the root circle. Relief lines run from each
    /// root point to its flank start, tangent to the flank, and a base line
    /// joins `root_a` to `root_b`.
    Relief { root_a: Point2, root_b: Point2 },
}

/// Closed outline of one tooth, placed at `angle`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToothProfile {
    pub angle: f64,
    /// Lower flank, ordered from base circle to tip.
    pub flank_a: Vec<Point2>,
    /// Mirror of flank A, ordered from base circle to tip.
    pub flank_b: Vec<Point2>,
    pub tip_mid: Point2,
    pub root: RootConnection,
}

impl ToothProfile {
    pub fn flank_a_start(&self) -> Point2 {
        self.flank_a[0]
    }

    pub fn flank_b_start(&self) -> Point2 {
        self.flank_b[0]
    }

    pub fn flank_a_end(&self) -> Point2 {
        self.flank_a[self.flank_a.len() - 1]
    }

    pub fn flank_b_end(&self) -> Point2 {
        self.flank_b[self.flank_b.len() - 1]
    }
}

/// Lay out one tooth of the gear described by `dims`, centered on the ray at
/// `angle` from the origin.
pub fn build_tooth(dims: &GearDimensions, angle: f64) -> Result<ToothProfile, GeometryError> {
    dims.validate()?;
    let base_radius = 0.5 * dims.base_diameter;
    let pitch_radius = 0.5 * dims.pitch_diameter;

    let flank = involute_points(dims.base_diameter, dims.tip_diameter, INVOLUTE_SAMPLES)?;

    let pitch_point_angle = involute_point(base_radius, pitch_radius)?.angle();
    let half_pitch_angle = PI / dims.teeth as f64;
    let backlash_angle = dims.backlash / pitch_radius * 0.25;
    let centering = -(0.5 * half_pitch_angle + pitch_point_angle - backlash_angle);

    let centered = rotate_points(&flank, centering);
    let mirrored: Vec<Point2> = centered.iter().map(Point2::mirrored_x).collect();

    let flank_a = rotate_points(&centered, angle);
    let flank_b = rotate_points(&mirrored, angle);
    let tip_mid = Point2::from_polar(0.5 * dims.tip_diameter, angle);

    let root = if dims.needs_root_relief() {
        let root_radius = 0.5 * dims.root_diameter - dims.root_inset;
        RootConnection::Relief {
            root_a: Point2::from_polar(root_radius, flank_a[0].angle()),
            root_b: Point2::from_polar(root_radius, flank_b[0].angle()),
        }
    } else {
        RootConnection::Direct
    };

    Ok(ToothProfile {
        angle,
        flank_a,
        flank_b,
        tip_mid,
        root,
    })
}
