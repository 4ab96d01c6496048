use crate::{joints::AnchorPolicy, registry::JointId, BodyIndex};
use thiserror::Error;

/// Failure reported by a `PhysicsBackend` when it cannot materialize a joint.
///
/// The backend must have released anything it partially built before
/// returning this.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors produced by `JointRegistry` operations.
#[derive(Debug, Error)]
pub enum JointError {
    /// A non-fixed joint was submitted with a negligible primary axis.
    #[error("cannot create joint `{name}` without axis1")]
    InvalidAxis { name: String },

    /// The physics backend refused to create the joint.
    #[error("backend could not create joint `{name}`: {source}")]
    Backend {
        name: String,
        #[source]
        source: BackendError,
    },

    /// The anchor policy referenced a body the resolver does not know.
    /// This is a topology error on the caller's side, not a runtime condition.
    #[error("anchor policy {policy:?} of joint `{name}` requires body {body}, which cannot be resolved")]
    InvariantViolated {
        name: String,
        body: BodyIndex,
        policy: AnchorPolicy,
    },

    /// No active joint carries this id.
    #[error("could not find joint with index: {0}")]
    NotFound(JointId),
}

impl JointError {
    /// Whether the error signals a programmer error rather than a tolerable
    /// runtime failure.
    pub fn is_fatal(&self) -> bool {
        matches!(self, JointError::InvariantViolated { .. })
    }
}
