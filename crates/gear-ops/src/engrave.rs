//! Engrave simulation: roll the SH gear against the MP blank, cutting at
//! every step so the MP gear ends up with meshing teeth.

use gear_geometry::GearParameters;
use gear_kernel::{BodyHandle, GroupId, Kernel, KernelError};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use tracing::{debug, info, instrument, warn};

use crate::types::{EngraveReport, EngraveStage, EngraveStep, OpError};

const Z_AXIS: [f64; 3] = [0.0, 0.0, 1.0];

/// Engrave run settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngraveConfig {
    /// Number of cut/rotate steps over one MP revolution.
    pub steps: usize,
    /// Group each step's cut and rotations into one timeline entry.
    pub group_steps: bool,
    /// Try to fold all steps into one outer group afterwards.
    pub fold_groups: bool,
}

impl Default for EngraveConfig {
    fn default() -> Self {
        Self {
            steps: 36,
            group_steps: true,
            fold_groups: true,
        }
    }
}

/// Drives the cut/rotate sequence for one gear pair.
#[derive(Debug, Clone)]
pub struct EngraveSimulator {
    config: EngraveConfig,
    gear_ratio: f64,
    /// MP rotation center on the x axis.
    mp_center: f64,
}

impl EngraveSimulator {
    pub fn new(params: &GearParameters, config: EngraveConfig) -> Self {
        Self {
            config,
            gear_ratio: params.gear_ratio,
            mp_center: params.center_distance(),
        }
    }

    pub fn config(&self) -> &EngraveConfig {
        &self.config
    }

    /// Angle the MP gear rolls back per step.
    pub fn step_angle(&self) -> f64 {
        TAU / self.config.steps as f64
    }

    /// Run every step in order. A failing cut, rotation or step group aborts
    /// the run; work already applied to the bodies is left in place.
    #[instrument(skip(self, kernel), fields(steps = self.config.steps))]
    pub fn run(
        &self,
        kernel: &mut dyn Kernel,
        sh: &BodyHandle,
        mp: &BodyHandle,
    ) -> Result<EngraveReport, OpError> {
        if self.config.steps == 0 {
            return Err(OpError::InvalidParameter {
                reason: "engrave needs at least one step".to_string(),
            });
        }
        if !(self.gear_ratio > 0.0) || !self.gear_ratio.is_finite() {
            return Err(OpError::InvalidParameter {
                reason: format!("gear ratio must be positive, got {}", self.gear_ratio),
            });
        }

        let delta = self.step_angle();
        let sh_step = delta / self.gear_ratio;
        let mp_origin = [self.mp_center, 0.0, 0.0];
        let tools = [sh.clone()];

        let mut steps = Vec::with_capacity(self.config.steps);
        let mut sh_rotation = 0.0;
        let mut mp_rotation = 0.0;

        for index in 0..self.config.steps {
            let fail = move |stage: EngraveStage| {
                move |source: KernelError| OpError::EngraveStepFailed {
                    step: index,
                    stage,
                    source,
                }
            };

            let cut = kernel
                .boolean_cut(mp, &tools, true)
                .map_err(fail(EngraveStage::Cut))?;
            let rotate_sh = kernel
                .rotate_body(sh, sh_step, Z_AXIS, [0.0; 3])
                .map_err(fail(EngraveStage::RotateSh))?;
            sh_rotation += sh_step;
            let rotate_mp = kernel
                .rotate_body(mp, -delta, Z_AXIS, mp_origin)
                .map_err(fail(EngraveStage::RotateMp))?;
            mp_rotation -= delta;

            let group = if self.config.group_steps {
                Some(
                    kernel
                        .group_timeline(cut, rotate_mp)
                        .map_err(fail(EngraveStage::Group))?,
                )
            } else {
                None
            };

            debug!(step = index, angle = delta * index as f64, "engrave step done");
            steps.push(EngraveStep {
                index,
                angle: delta * index as f64,
                cut,
                rotate_sh,
                rotate_mp,
                group,
            });
        }

        let outer_group = if self.config.fold_groups {
            self.fold(kernel, &steps)
        } else {
            None
        };

        info!(
            steps = steps.len(),
            sh_rotation,
            mp_rotation,
            folded = outer_group.is_some(),
            "engrave finished"
        );
        Ok(EngraveReport {
            steps,
            outer_group,
            sh_rotation,
            mp_rotation,
        })
    }

    /// Best-effort outer group over the whole run.
    fn fold(&self, kernel: &mut dyn Kernel, steps: &[EngraveStep]) -> Option<GroupId> {
        let (first, last) = (steps.first()?, steps.last()?);
        match kernel.group_timeline(first.cut, last.rotate_mp) {
            Ok(group) => Some(group),
            Err(e) => {
                warn!(error = %e, "could not fold engrave steps into one group");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gear_geometry::LengthUnit;

    #[test]
    fn default_config_uses_36_steps() {
        let config = EngraveConfig::default();
        assert_eq!(config.steps, 36);
        assert!(config.group_steps && config.fold_groups);
    }

    #[test]
    fn simulator_takes_center_distance_from_params() {
        let params = GearParameters {
            unit: LengthUnit::Millimeter,
            ..GearParameters::default()
        };
        let sim = EngraveSimulator::new(&params, EngraveConfig::default());
        assert!((sim.mp_center - 30.0).abs() < 1e-12);
        assert!((sim.step_angle() - TAU / 36.0).abs() < 1e-15);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: EngraveConfig = serde_json::from_str(r#"{"steps": 72}"#).unwrap();
        assert_eq!(config.steps, 72);
        assert!(config.fold_groups);
    }
}
