//! Standalone involute spur gear.

use gear_geometry::{GearProfile, SpurGearParameters};
use gear_kernel::{BodyHandle, CurveId, FeatureOperation, GroupId, Kernel};
use std::slice;
use tracing::{info, instrument};

use crate::extrude::execute_extrude;
use crate::sketch::emit_profile;
use crate::types::OpError;

/// Result of [`generate_spur`].
#[derive(Debug, Clone)]
pub struct SpurOutput {
    pub body: BodyHandle,
    /// Number of tooth extrusions joined onto the root disc.
    pub teeth_joined: usize,
    /// Construction circle marking the pitch diameter.
    pub pitch_circle: CurveId,
    /// Timeline group holding the disc and tooth features.
    pub group: GroupId,
}

/// Extrude the root disc, then extrude every tooth and join it to the disc.
/// The features are grouped in the timeline and a construction pitch circle
/// is left in the sketch.
#[instrument(skip(kernel, params), fields(teeth = params.teeth))]
pub fn generate_spur(
    kernel: &mut dyn Kernel,
    params: &SpurGearParameters,
) -> Result<SpurOutput, OpError> {
    params.validate()?;
    let layout = GearProfile::from_spur(params)?;
    let sketch = emit_profile(kernel, &layout)?;

    let disc = sketch.root_profile().ok_or(OpError::NoProfiles)?;
    let base = execute_extrude(kernel, disc, params.thickness, FeatureOperation::NewBody, &[])?;

    let mut last = base.timeline;
    for &tooth in sketch.tooth_profiles() {
        last = execute_extrude(
            kernel,
            tooth,
            params.thickness,
            FeatureOperation::Join,
            slice::from_ref(&base.handle),
        )?
        .timeline;
    }

    let dims = params.dimensions();
    let pitch_circle = kernel.make_circle(layout.center, 0.5 * dims.pitch_diameter, true)?;
    let group = kernel.group_timeline(base.timeline, last)?;

    let teeth_joined = sketch.tooth_profiles().len();
    info!(teeth_joined, "spur gear generated");
    Ok(SpurOutput {
        body: base.handle,
        teeth_joined,
        pitch_circle,
        group,
    })
}
