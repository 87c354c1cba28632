/// Errors raised while computing gear geometry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("geometry precondition violated: {reason}")]
    Precondition { reason: String },

    #[error("degenerate profile: {reason}")]
    DegenerateProfile { reason: String },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl GeometryError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        GeometryError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        GeometryError::DegenerateProfile {
            reason: reason.into(),
        }
    }
}
