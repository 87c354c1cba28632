use gear_geometry::GeometryError;
use gear_kernel::{BodyHandle, GroupId, KernelError, TimelineIndex};
use serde::{Deserialize, Serialize};

/// A body produced or modified by an operation.
#[derive(Debug, Clone)]
pub struct BodyOutput {
    /// Handle to the solid in the kernel. Runtime-only, not persisted.
    pub handle: BodyHandle,
    /// The feature that produced the body.
    pub timeline: TimelineIndex,
}

/// Stage of an engrave step, reported when the step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngraveStage {
    /// Cutting the SH body out of the MP body.
    Cut,
    /// Advancing the SH body about the origin.
    RotateSh,
    /// Rolling the MP body back about its own center.
    RotateMp,
    /// Grouping the step's features in the timeline.
    Group,
}

/// Record of one completed engrave step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngraveStep {
    pub index: usize,
    /// MP roll angle at cut time, Δθ·index.
    pub angle: f64,
    pub cut: TimelineIndex,
    pub rotate_sh: TimelineIndex,
    pub rotate_mp: TimelineIndex,
    pub group: Option<GroupId>,
}

/// Outcome of a full engrave run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngraveReport {
    pub steps: Vec<EngraveStep>,
    /// Set when the step groups were folded into one outer group.
    pub outer_group: Option<GroupId>,
    /// Net rotation applied to the SH body, radians.
    pub sh_rotation: f64,
    /// Net rotation applied to the MP body, radians.
    pub mp_rotation: f64,
}

/// Errors from gear operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OpError {
    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("engrave step {step} failed during {stage:?}: {source}")]
    EngraveStepFailed {
        step: usize,
        stage: EngraveStage,
        #[source]
        source: KernelError,
    },

    #[error("no profiles available for operation")]
    NoProfiles,

    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    #[error("invalid configuration: {reason}")]
    Config { reason: String },
}
