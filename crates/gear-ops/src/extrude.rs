use gear_kernel::{BodyHandle, FeatureOperation, Kernel, ProfileId};

use crate::types::{BodyOutput, OpError};

/// Extrude a profile one-sided along the sketch normal.
pub fn execute_extrude(
    kernel: &mut dyn Kernel,
    profile: ProfileId,
    distance: f64,
    operation: FeatureOperation,
    participants: &[BodyHandle],
) -> Result<BodyOutput, OpError> {
    extrude(kernel, profile, distance, false, operation, participants)
}

/// Extrude a profile by `distance` in total, centered on the sketch plane.
pub fn execute_symmetric_extrude(
    kernel: &mut dyn Kernel,
    profile: ProfileId,
    distance: f64,
    operation: FeatureOperation,
    participants: &[BodyHandle],
) -> Result<BodyOutput, OpError> {
    extrude(kernel, profile, distance, true, operation, participants)
}

fn extrude(
    kernel: &mut dyn Kernel,
    profile: ProfileId,
    distance: f64,
    symmetric: bool,
    operation: FeatureOperation,
    participants: &[BodyHandle],
) -> Result<BodyOutput, OpError> {
    if !(distance > 0.0) {
        return Err(OpError::InvalidParameter {
            reason: format!("extrude distance must be positive, got {}", distance),
        });
    }
    let out = kernel.extrude(profile, distance, symmetric, operation, participants)?;
    Ok(BodyOutput {
        handle: out.body,
        timeline: out.timeline,
    })
}
