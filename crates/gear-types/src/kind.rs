use serde::{Deserialize, Serialize};

/// Which body a gear profile is laid out for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GearKind {
    /// Standalone spur gear: every tooth laid out, extruded by the thickness.
    Spur,
    /// Spherical "SH" ball gear: half the teeth on a root fan, revolved 2π.
    ShBall,
    /// Mating "MP" pinion: a bored blank whose teeth are engraved.
    MpMating,
}

/// How a new feature combines with existing bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FeatureOperation {
    /// Produce a new, independent body.
    NewBody,
    /// Union the feature into the participant bodies.
    Join,
    /// Subtract the feature from the participant bodies.
    Cut,
    /// Keep only the overlap of the feature and the participant bodies.
    Intersect,
}

impl FeatureOperation {
    /// Whether the operation modifies participant bodies instead of creating one.
    pub fn needs_participants(&self) -> bool {
        !matches!(self, FeatureOperation::NewBody)
    }
}
