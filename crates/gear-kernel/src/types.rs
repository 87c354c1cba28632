use serde::{Deserialize, Serialize};

// Re-export shared types from gear-types
pub use gear_types::{FeatureOperation, Point2};

/// Opaque handle to a solid body in the kernel.
/// NEVER persisted. Valid only for the current kernel session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub(crate) u64);

impl BodyHandle {
    pub(crate) fn id(&self) -> u64 {
        self.0
    }
}

/// Sketch curve created in the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurveId(pub u64);

/// Closed planar region usable by extrude and revolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileId(pub u64);

/// Position of a feature in the kernel's history timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimelineIndex(pub usize);

/// A group of consecutive timeline entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub u64);

/// One curve of a profile loop, traversed forwards or backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopEdge {
    pub curve: CurveId,
    pub reversed: bool,
}

impl LoopEdge {
    pub fn forward(curve: CurveId) -> Self {
        Self {
            curve,
            reversed: false,
        }
    }

    pub fn reversed(curve: CurveId) -> Self {
        Self {
            curve,
            reversed: true,
        }
    }
}

/// An ordered, closed chain of curves. Each edge ends where the next begins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileLoop {
    pub edges: Vec<LoopEdge>,
}

impl ProfileLoop {
    pub fn new(edges: Vec<LoopEdge>) -> Self {
        Self { edges }
    }
}

/// Result of a solid-producing feature.
#[derive(Debug, Clone)]
pub struct FeatureOutput {
    /// The new body, or the participant body that was modified in place.
    pub body: BodyHandle,
    /// Where the feature landed in the timeline.
    pub timeline: TimelineIndex,
}

/// Kind of kernel entity, used in lookup errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Curve,
    Profile,
    Body,
}

/// Errors from kernel operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KernelError {
    #[error("{kind:?} not found: {id}")]
    EntityNotFound { kind: EntityKind, id: u64 },

    #[error("profile is not closed: {reason}")]
    OpenProfile { reason: String },

    #[error("invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    #[error("boolean operation failed: {reason}")]
    BooleanFailed { reason: String },

    #[error("timeline grouping failed: {reason}")]
    GroupingFailed { reason: String },

    #[error("kernel error: {message}")]
    Other { message: String },
}

impl KernelError {
    pub(crate) fn body_not_found(handle: &BodyHandle) -> Self {
        KernelError::EntityNotFound {
            kind: EntityKind::Body,
            id: handle.id(),
        }
    }

    pub(crate) fn curve_not_found(curve: CurveId) -> Self {
        KernelError::EntityNotFound {
            kind: EntityKind::Curve,
            id: curve.0,
        }
    }

    pub(crate) fn profile_not_found(profile: ProfileId) -> Self {
        KernelError::EntityNotFound {
            kind: EntityKind::Profile,
            id: profile.0,
        }
    }
}
