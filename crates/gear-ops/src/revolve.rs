use gear_kernel::{BodyHandle, FeatureOperation, Kernel};
use tracing::debug;

use crate::sketch::EmittedSketch;
use crate::types::{BodyOutput, OpError};

/// Revolve every profile of a sketch about its root-fan diameter line.
pub fn execute_revolve(
    kernel: &mut dyn Kernel,
    sketch: &EmittedSketch,
    angle: f64,
    operation: FeatureOperation,
    participants: &[BodyHandle],
) -> Result<BodyOutput, OpError> {
    if sketch.profiles.is_empty() {
        return Err(OpError::NoProfiles);
    }
    let axis = sketch.axis_line.ok_or_else(|| OpError::InvalidParameter {
        reason: "sketch has no revolve axis".to_string(),
    })?;
    if operation.needs_participants() && participants.is_empty() {
        return Err(OpError::InvalidParameter {
            reason: format!("{:?} revolve needs participant bodies", operation),
        });
    }

    let out = kernel.revolve(&sketch.profiles, axis, angle, operation, participants)?;
    debug!(
        profiles = sketch.profiles.len(),
        angle,
        operation = ?operation,
        "revolved sketch"
    );
    Ok(BodyOutput {
        handle: out.body,
        timeline: out.timeline,
    })
}
