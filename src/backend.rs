//! # Backend module
//! The seam between the joint registry and the physics engine. The registry
//! never touches engine state directly; everything it needs from the engine
//! goes through a `PhysicsBackend`.

use crate::{
    error::BackendError,
    joints::{JointSpec, SpringDamper},
    nalgebra::{self as na, Point3, RealField, Vector3},
};

/// A single parameter change forwarded to the backend for a live joint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum JointParams<N: RealField + Copy> {
    Anchor(Point3<N>),
    Axis1(Vector3<N>),
    Axis2(Vector3<N>),
    Torque(N),
    Velocity(N),
    Velocity2(N),
    ForceLimit(N),
    ForceLimit2(N),
    SpringDamper(SpringDamper<N>),
}

/// What the backend reports about a joint after one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JointFeedback<N: RealField + Copy> {
    /// Raw position on the first axis (angle for rotational, distance for
    /// translational joints).
    pub position1: N,
    pub velocity1: N,
    pub position2: N,
    pub velocity2: N,
    /// Constraint force acting on the first body.
    pub force: Vector3<N>,
    /// Constraint torque acting on the first body.
    pub torque: Vector3<N>,
}

impl<N: RealField + Copy> Default for JointFeedback<N> {
    fn default() -> Self {
        Self {
            position1: na::zero(),
            velocity1: na::zero(),
            position2: na::zero(),
            velocity2: na::zero(),
            force: Vector3::zeros(),
            torque: Vector3::zeros(),
        }
    }
}

/// Adapter to a physics engine capable of materializing joints.
///
/// `create_joint` is called without the registry lock held and may run
/// concurrently with itself. The other methods are called while the registry
/// lock is held; implementations must not call back into the registry from
/// them.
pub trait PhysicsBackend<N: RealField + Copy>: Send + Sync {
    /// Engine handle of a body, as produced by the body resolver.
    type BodyHandle: Clone + Send + Sync;
    /// Engine handle of a materialized joint. Exclusively owned by one
    /// `JointInstance`.
    type JointHandle: Send;

    /// Materializes `spec` between `body1` and `body2`, where `None` means the
    /// world frame. On failure, anything partially built must be released
    /// before returning.
    fn create_joint(
        &self,
        spec: &JointSpec<N>,
        body1: Option<&Self::BodyHandle>,
        body2: Option<&Self::BodyHandle>,
    ) -> Result<Self::JointHandle, BackendError>;

    /// Moves a live joint onto freshly resolved bodies, after one of them was
    /// reset or replaced. `spec.anchor` already holds the recomputed anchor.
    fn reattach_joint(
        &self,
        handle: &mut Self::JointHandle,
        spec: &JointSpec<N>,
        body1: Option<&Self::BodyHandle>,
        body2: Option<&Self::BodyHandle>,
    );

    /// Releases the engine resources of a joint.
    fn destroy_joint(&self, handle: Self::JointHandle);

    /// Applies a parameter change to a live joint.
    fn apply_params(&self, handle: &mut Self::JointHandle, params: &JointParams<N>);

    /// Advances the joint by `dt` and reports its current state.
    fn step(&self, handle: &mut Self::JointHandle, dt: N) -> JointFeedback<N>;
}
