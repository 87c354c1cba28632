//! Gear parameters, derived dimensions and input validation.

use crate::error::GeometryError;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};
use tracing::debug;

/// Minimum wall left between the bore and the root circle, in millimetres.
const HOLE_CLEARANCE_MM: f64 = 0.1;

/// Radial pull-in of root-relief line endpoints, in millimetres.
const ROOT_INSET_MM: f64 = 0.01;

const CM_PER_INCH: f64 = 2.54;

/// Root fillets may use at most this share of the base-circle tooth thickness.
const MAX_FILLET_SHARE: f64 = 0.4;

/// Diametral pitches below this many teeth per centimetre take the coarse
/// 1.157/P dedendum.
const COARSE_PITCH_LIMIT: f64 = 20.0 * PI / 180.0 - 1e-6;

/// Length unit of the modeling host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    Millimeter,
    #[default]
    Centimeter,
}

impl LengthUnit {
    /// Model units per millimetre.
    pub fn scale(&self) -> f64 {
        match self {
            LengthUnit::Millimeter => 1.0,
            LengthUnit::Centimeter => 0.1,
        }
    }
}

/// Standard pressure angles, or a custom one in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureAngle {
    Deg14_5,
    #[default]
    Deg20,
    Deg25,
    Custom(f64),
}

impl PressureAngle {
    pub fn radians(&self) -> f64 {
        match self {
            PressureAngle::Deg14_5 => 14.5f64.to_radians(),
            PressureAngle::Deg20 => 20f64.to_radians(),
            PressureAngle::Deg25 => 25f64.to_radians(),
            PressureAngle::Custom(rad) => *rad,
        }
    }

    fn validate(&self) -> Result<(), GeometryError> {
        let rad = self.radians();
        if !(rad > 0.0 && rad < FRAC_PI_2) {
            return Err(GeometryError::invalid(
                "pressure_angle",
                format!("must lie strictly between 0 and π/2 radians, got {}", rad),
            ));
        }
        Ok(())
    }
}

/// The concentric circles of one toothed gear, in model units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GearDimensions {
    pub teeth: u32,
    pub pitch_diameter: f64,
    pub base_diameter: f64,
    pub root_diameter: f64,
    pub tip_diameter: f64,
    /// Radians.
    pub pressure_angle: f64,
    pub backlash: f64,
    /// Radial pull-in of the root-relief endpoints.
    pub root_inset: f64,
}

impl GearDimensions {
    /// Build dimensions from pitch diameter, dedendum and addendum.
    pub fn from_pitch(
        teeth: u32,
        pitch_diameter: f64,
        dedendum: f64,
        addendum: f64,
        pressure_angle: f64,
        backlash: f64,
        unit: LengthUnit,
    ) -> Self {
        Self {
            teeth,
            pitch_diameter,
            base_diameter: pitch_diameter * pressure_angle.cos(),
            root_diameter: pitch_diameter - 2.0 * dedendum,
            tip_diameter: pitch_diameter + 2.0 * addendum,
            pressure_angle,
            backlash,
            root_inset: ROOT_INSET_MM * unit.scale(),
        }
    }

    /// Angle between neighbouring teeth.
    pub fn pitch_angle(&self) -> f64 {
        2.0 * PI / self.teeth as f64
    }

    /// True when the involute stops short of the root circle and root-relief
    /// lines are needed.
    pub fn needs_root_relief(&self) -> bool {
        self.base_diameter >= self.root_diameter
    }

    /// Arc length of one tooth measured on the base circle.
    pub fn base_tooth_thickness(&self) -> f64 {
        PI * self.base_diameter / (2.0 * self.teeth as f64)
    }

    /// Checks the circles describe a drawable toothed gear.
    pub(crate) fn validate(&self) -> Result<(), GeometryError> {
        if self.teeth < 4 {
            return Err(GeometryError::degenerate(format!(
                "at least 4 teeth are required, got {}",
                self.teeth
            )));
        }
        if !(self.pitch_diameter > 0.0) || !self.pitch_diameter.is_finite() {
            return Err(GeometryError::degenerate(format!(
                "pitch diameter must be positive, got {}",
                self.pitch_diameter
            )));
        }
        if !(self.root_diameter > 0.0) {
            return Err(GeometryError::degenerate(format!(
                "root diameter must be positive, got {}",
                self.root_diameter
            )));
        }
        if self.tip_diameter < self.base_diameter {
            return Err(GeometryError::degenerate(format!(
                "tip diameter {} lies inside the base circle {}",
                self.tip_diameter, self.base_diameter
            )));
        }
        Ok(())
    }
}

/// Input parameters of the ABENICS gear pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GearParameters {
    /// Millimetres.
    pub module: f64,
    pub pressure_angle: PressureAngle,
    pub teeth_sh: u32,
    /// SH tooth count over MP tooth count.
    pub gear_ratio: f64,
    pub backlash: f64,
    /// MP extrusion depth.
    pub thickness: f64,
    /// MP bore diameter, 0 for none.
    pub hole_diameter: f64,
    pub unit: LengthUnit,
}

impl Default for GearParameters {
    fn default() -> Self {
        Self {
            module: 1.0,
            pressure_angle: PressureAngle::Deg20,
            teeth_sh: 40,
            gear_ratio: 2.0,
            backlash: 0.0,
            thickness: 4.0,
            hole_diameter: 0.4,
            unit: LengthUnit::Centimeter,
        }
    }
}

impl GearParameters {
    fn scaled_module(&self) -> f64 {
        self.module * self.unit.scale()
    }

    pub fn pressure_angle_rad(&self) -> f64 {
        self.pressure_angle.radians()
    }

    pub fn pitch_diameter_sh(&self) -> f64 {
        self.scaled_module() * self.teeth_sh as f64
    }

    pub fn pitch_angle_sh(&self) -> f64 {
        2.0 * PI / self.teeth_sh as f64
    }

    pub fn pitch_diameter_mp(&self) -> f64 {
        self.pitch_diameter_sh() / self.gear_ratio
    }

    /// MP tooth count, rounded down when the ratio does not divide evenly.
    pub fn teeth_mp(&self) -> u32 {
        (self.teeth_sh as f64 / self.gear_ratio).floor() as u32
    }

    pub fn dedendum(&self) -> f64 {
        1.25 * self.scaled_module()
    }

    pub fn addendum(&self) -> f64 {
        self.scaled_module()
    }

    pub fn base_diameter_sh(&self) -> f64 {
        self.pitch_diameter_sh() * self.pressure_angle_rad().cos()
    }

    pub fn root_diameter_sh(&self) -> f64 {
        self.pitch_diameter_sh() - 2.0 * self.dedendum()
    }

    pub fn tip_diameter_sh(&self) -> f64 {
        self.pitch_diameter_sh() + 2.0 * self.addendum()
    }

    pub fn root_diameter_mp(&self) -> f64 {
        self.pitch_diameter_mp() - 2.0 * self.dedendum()
    }

    pub fn tip_diameter_mp(&self) -> f64 {
        self.pitch_diameter_mp() + 2.0 * self.addendum()
    }

    /// Distance between the SH and MP rotation axes.
    pub fn center_distance(&self) -> f64 {
        0.5 * self.pitch_diameter_sh() + 0.5 * self.pitch_diameter_mp()
    }

    /// Dimensions of the SH ball gear's tooth section.
    pub fn sh_dimensions(&self) -> GearDimensions {
        GearDimensions::from_pitch(
            self.teeth_sh,
            self.pitch_diameter_sh(),
            self.dedendum(),
            self.addendum(),
            self.pressure_angle_rad(),
            self.backlash,
            self.unit,
        )
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.teeth_sh < 4 {
            return Err(GeometryError::degenerate(format!(
                "at least 4 teeth are required, got {}",
                self.teeth_sh
            )));
        }
        check_positive("module", self.module)?;
        check_positive("gear_ratio", self.gear_ratio)?;
        check_positive("thickness", self.thickness)?;
        check_non_negative("backlash", self.backlash)?;
        check_non_negative("hole_diameter", self.hole_diameter)?;
        self.pressure_angle.validate()?;

        self.sh_dimensions().validate()?;
        if self.teeth_mp() < 1 {
            return Err(GeometryError::degenerate(format!(
                "gear ratio {} leaves the MP gear without teeth",
                self.gear_ratio
            )));
        }
        let root_mp = self.root_diameter_mp();
        if !(root_mp > 0.0) {
            return Err(GeometryError::degenerate(format!(
                "MP root diameter must be positive, got {}",
                root_mp
            )));
        }
        let max_hole = root_mp - HOLE_CLEARANCE_MM * self.unit.scale();
        if self.hole_diameter >= max_hole {
            return Err(GeometryError::invalid(
                "hole_diameter",
                format!("must be less than {}", max_hole),
            ));
        }

        debug!(
            pitch_sh = self.pitch_diameter_sh(),
            pitch_mp = self.pitch_diameter_mp(),
            teeth_mp = self.teeth_mp(),
            "gear parameters validated"
        );
        Ok(())
    }
}

/// Tooth size of a standalone spur gear.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToothPitch {
    /// Millimetres of pitch diameter per tooth.
    Module(f64),
    /// Teeth per inch of pitch diameter.
    DiametralPitch(f64),
}

/// Input parameters of a standalone spur gear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpurGearParameters {
    pub pitch: ToothPitch,
    pub teeth: u32,
    pub thickness: f64,
    pub pressure_angle: PressureAngle,
    pub backlash: f64,
    pub hole_diameter: f64,
    pub root_fillet_radius: f64,
    pub unit: LengthUnit,
}

impl Default for SpurGearParameters {
    fn default() -> Self {
        Self {
            pitch: ToothPitch::Module(1.0),
            teeth: 24,
            thickness: 0.5,
            pressure_angle: PressureAngle::Deg20,
            backlash: 0.0,
            hole_diameter: 0.4,
            root_fillet_radius: 0.0,
            unit: LengthUnit::Centimeter,
        }
    }
}

impl SpurGearParameters {
    pub fn dimensions(&self) -> GearDimensions {
        let scale = self.unit.scale();
        let n = self.teeth as f64;
        let (pitch_diameter, dedendum, addendum) = match self.pitch {
            ToothPitch::Module(m) => (m * n * scale, 1.25 * m * scale, m * scale),
            ToothPitch::DiametralPitch(p) => {
                // Dedendum rules work in teeth per centimetre.
                let per_cm = p / CM_PER_INCH;
                let dedendum = if per_cm < COARSE_PITCH_LIMIT {
                    1.157 / per_cm
                } else {
                    1.2 / per_cm + 0.002 * CM_PER_INCH
                };
                let cm = 10.0 * scale;
                (n / per_cm * cm, dedendum * cm, cm / per_cm)
            }
        };
        GearDimensions::from_pitch(
            self.teeth,
            pitch_diameter,
            dedendum,
            addendum,
            self.pressure_angle.radians(),
            self.backlash,
            self.unit,
        )
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        match self.pitch {
            ToothPitch::Module(m) => check_positive("module", m)?,
            ToothPitch::DiametralPitch(p) => check_positive("diametral_pitch", p)?,
        }
        check_positive("thickness", self.thickness)?;
        check_non_negative("backlash", self.backlash)?;
        check_non_negative("hole_diameter", self.hole_diameter)?;
        check_non_negative("root_fillet_radius", self.root_fillet_radius)?;
        self.pressure_angle.validate()?;

        let dims = self.dimensions();
        dims.validate()?;
        let max_hole = dims.root_diameter - HOLE_CLEARANCE_MM * self.unit.scale();
        if self.hole_diameter >= max_hole {
            return Err(GeometryError::invalid(
                "hole_diameter",
                format!("must be less than {}", max_hole),
            ));
        }
        let max_fillet = MAX_FILLET_SHARE * dims.base_tooth_thickness();
        if self.root_fillet_radius > max_fillet {
            return Err(GeometryError::invalid(
                "root_fillet_radius",
                format!("must not exceed {}", max_fillet),
            ));
        }
        Ok(())
    }
}

fn check_positive(name: &'static str, value: f64) -> Result<(), GeometryError> {
    if !(value > 0.0) || !value.is_finite() {
        return Err(GeometryError::invalid(
            name,
            format!("must be positive and finite, got {}", value),
        ));
    }
    Ok(())
}

fn check_non_negative(name: &'static str, value: f64) -> Result<(), GeometryError> {
    if !(value >= 0.0) || !value.is_finite() {
        return Err(GeometryError::invalid(
            name,
            format!("must be non-negative and finite, got {}", value),
        ));
    }
    Ok(())
}
