//! Full ABENICS pair: SH ball gear, engraved MP gear and the SH cross teeth.

use gear_geometry::{GearParameters, GearProfile};
use gear_kernel::{BodyHandle, FeatureOperation, Kernel, TimelineIndex};
use gear_types::GearKind;
use std::f64::consts::{FRAC_PI_2, TAU};
use tracing::{info, instrument};

use crate::engrave::{EngraveConfig, EngraveSimulator};
use crate::extrude::execute_symmetric_extrude;
use crate::revolve::execute_revolve;
use crate::sketch::emit_profile;
use crate::types::{EngraveReport, OpError};

/// Bodies and history produced by [`generate_abenics`].
#[derive(Debug, Clone)]
pub struct AbenicsOutput {
    pub sh_body: BodyHandle,
    pub mp_body: BodyHandle,
    pub engrave: EngraveReport,
    /// Rotation that returned the SH body to its starting orientation.
    pub sh_reset: TimelineIndex,
    /// Intersect feature adding the second tooth family, when enabled.
    pub cross_teeth: Option<TimelineIndex>,
}

/// Build the SH ball gear, engrave the MP gear with it and finish the SH
/// gear's orthogonal teeth.
#[instrument(skip(kernel, params, engrave), fields(teeth_sh = params.teeth_sh, ratio = params.gear_ratio))]
pub fn generate_abenics(
    kernel: &mut dyn Kernel,
    params: &GearParameters,
    engrave: &EngraveConfig,
    cross_teeth: bool,
) -> Result<AbenicsOutput, OpError> {
    params.validate()?;

    let sh_layout = GearProfile::build(GearKind::ShBall, params, 0.0)?;
    let sh_sketch = emit_profile(kernel, &sh_layout)?;
    let sh = execute_revolve(kernel, &sh_sketch, TAU, FeatureOperation::NewBody, &[])?;

    let mp_layout = GearProfile::build(GearKind::MpMating, params, 0.0)?;
    let mp_sketch = emit_profile(kernel, &mp_layout)?;
    let blank = mp_sketch.root_profile().ok_or(OpError::NoProfiles)?;
    let mp = execute_symmetric_extrude(
        kernel,
        blank,
        params.thickness,
        FeatureOperation::NewBody,
        &[],
    )?;

    let report = EngraveSimulator::new(params, engrave.clone()).run(kernel, &sh.handle, &mp.handle)?;

    let sh_reset = kernel.rotate_body(
        &sh.handle,
        -report.sh_rotation,
        [0.0, 0.0, 1.0],
        [0.0; 3],
    )?;

    let cross = if cross_teeth {
        let layout = GearProfile::build(GearKind::ShBall, params, FRAC_PI_2)?;
        let sketch = emit_profile(kernel, &layout)?;
        let out = execute_revolve(
            kernel,
            &sketch,
            TAU,
            FeatureOperation::Intersect,
            std::slice::from_ref(&sh.handle),
        )?;
        Some(out.timeline)
    } else {
        None
    };

    info!(
        teeth_mp = params.teeth_mp(),
        steps = report.steps.len(),
        cross_teeth,
        "ABENICS gear pair generated"
    );

    Ok(AbenicsOutput {
        sh_body: sh.handle,
        mp_body: mp.handle,
        engrave: report,
        sh_reset,
        cross_teeth: cross,
    })
}
