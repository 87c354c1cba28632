//! Whole-gear sketch layout, parameterized by [`GearKind`].

use crate::error::GeometryError;
use crate::params::{GearDimensions, GearParameters, SpurGearParameters};
use crate::tooth::{build_tooth, ToothProfile};
use gear_types::{GearKind, Point2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

/// Bores smaller than this are not drawn.
const MIN_BORE_DIAMETER: f64 = 1e-9;

/// The body the teeth stand on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RootShape {
    /// Half disc: an arc from `radius∠axis_angle` sweeping π counter-clockwise,
    /// closed by the diameter line, which doubles as the revolve axis.
    Fan { radius: f64, axis_angle: f64 },
    /// Full disc around the profile center.
    Disc { radius: f64 },
}

impl RootShape {
    /// End points of the fan's diameter line, `(arc start, arc end)`.
    pub fn diameter(&self) -> Option<(Point2, Point2)> {
        match *self {
            RootShape::Fan { radius, axis_angle } => Some((
                Point2::from_polar(radius, axis_angle),
                Point2::from_polar(radius, axis_angle + PI),
            )),
            RootShape::Disc { .. } => None,
        }
    }
}

/// Planar layout of one gear sketch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GearProfile {
    pub kind: GearKind,
    pub center: Point2,
    pub root: RootShape,
    pub bore_radius: Option<f64>,
    /// Construction-only tip circle radius.
    pub tip_guide: Option<f64>,
    pub teeth: Vec<ToothProfile>,
}

impl GearProfile {
    /// Lay out the sketch of `kind` for an ABENICS gear pair. `axis_angle`
    /// only affects the SH ball gear.
    pub fn build(
        kind: GearKind,
        params: &GearParameters,
        axis_angle: f64,
    ) -> Result<Self, GeometryError> {
        let profile = match kind {
            GearKind::ShBall => Self::ball(&params.sh_dimensions(), axis_angle)?,
            GearKind::MpMating => Self::mating_blank(params)?,
            GearKind::Spur => Self::spur(&params.sh_dimensions(), params.hole_diameter)?,
        };
        debug!(
            kind = ?kind,
            teeth = profile.teeth.len(),
            axis_angle,
            "gear profile laid out"
        );
        Ok(profile)
    }

    /// Half-section of the SH ball gear: root fan plus floor(N/2) teeth at
    /// `pitch·i + pitch/2 + axis_angle`.
    pub fn ball(dims: &GearDimensions, axis_angle: f64) -> Result<Self, GeometryError> {
        dims.validate()?;
        let pitch = dims.pitch_angle();
        let teeth = (0..dims.teeth / 2)
            .map(|i| build_tooth(dims, pitch * i as f64 + 0.5 * pitch + axis_angle))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            kind: GearKind::ShBall,
            center: Point2::ORIGIN,
            root: RootShape::Fan {
                radius: 0.5 * dims.root_diameter,
                axis_angle,
            },
            bore_radius: None,
            tip_guide: Some(0.5 * dims.tip_diameter),
            teeth,
        })
    }

    /// Toothless MP blank at the mating center, sized to the MP tip circle.
    pub fn mating_blank(params: &GearParameters) -> Result<Self, GeometryError> {
        let radius = 0.5 * params.tip_diameter_mp();
        if !(radius > 0.0) {
            return Err(GeometryError::degenerate(format!(
                "MP tip diameter must be positive, got {}",
                params.tip_diameter_mp()
            )));
        }
        let bore_radius = bore(params.hole_diameter, radius)?;
        Ok(Self {
            kind: GearKind::MpMating,
            center: Point2::new(params.center_distance(), 0.0),
            root: RootShape::Disc { radius },
            bore_radius,
            tip_guide: None,
            teeth: Vec::new(),
        })
    }

    /// Full spur gear: root disc, optional bore and all N teeth at `pitch·i`.
    pub fn spur(dims: &GearDimensions, hole_diameter: f64) -> Result<Self, GeometryError> {
        dims.validate()?;
        let radius = 0.5 * dims.root_diameter;
        let bore_radius = bore(hole_diameter, radius)?;
        let pitch = dims.pitch_angle();
        let teeth = (0..dims.teeth)
            .map(|i| build_tooth(dims, pitch * i as f64))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            kind: GearKind::Spur,
            center: Point2::ORIGIN,
            root: RootShape::Disc { radius },
            bore_radius,
            tip_guide: None,
            teeth,
        })
    }

    /// Spur gear layout from standalone spur parameters.
    pub fn from_spur(params: &SpurGearParameters) -> Result<Self, GeometryError> {
        Self::spur(&params.dimensions(), params.hole_diameter)
    }
}

fn bore(hole_diameter: f64, outer_radius: f64) -> Result<Option<f64>, GeometryError> {
    if hole_diameter <= MIN_BORE_DIAMETER {
        return Ok(None);
    }
    let radius = 0.5 * hole_diameter;
    if radius >= outer_radius {
        return Err(GeometryError::invalid(
            "hole_diameter",
            format!("bore radius {} reaches the outer radius {}", radius, outer_radius),
        ));
    }
    Ok(Some(radius))
}
