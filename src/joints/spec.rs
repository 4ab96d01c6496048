use crate::{
    nalgebra::{self as na, Point3, RealField, Vector3},
    BodyIndex, WORLD_BODY,
};
use serde::{Deserialize, Serialize};

/// The kinematic type of a joint.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum JointType {
    /// One rotational degree of freedom about `axis1`.
    Hinge,
    /// Two rotational degrees of freedom about `axis1` and `axis2`, as used
    /// for steered wheels.
    Hinge2,
    /// One translational degree of freedom along `axis1`.
    Slider,
    /// Three rotational degrees of freedom about the anchor.
    Ball,
    /// Two rotational degrees of freedom about perpendicular axes.
    Universal,
    /// Rigid connection; axes are ignored.
    Fixed,
}

impl JointType {
    /// Whether this type needs a usable `axis1` to be created.
    pub fn requires_axis(self) -> bool {
        self != JointType::Fixed
    }
}

/// How the anchor of a joint is derived at creation time.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum AnchorPolicy {
    /// Use `JointSpec::anchor` as given.
    Explicit,
    /// Use the position of the first body.
    FromBody1,
    /// Use the position of the second body.
    FromBody2,
    /// Use the midpoint between both bodies.
    Midpoint,
}

impl AnchorPolicy {
    /// Computes the anchor given the world positions of the resolved bodies.
    /// Returns `None` when a position this policy needs is missing; `explicit`
    /// is returned untouched for `Explicit`.
    pub fn resolve<N: RealField + Copy>(
        self,
        explicit: Point3<N>,
        body1: Option<Point3<N>>,
        body2: Option<Point3<N>>,
    ) -> Option<Point3<N>> {
        match self {
            AnchorPolicy::Explicit => Some(explicit),
            AnchorPolicy::FromBody1 => body1,
            AnchorPolicy::FromBody2 => body2,
            AnchorPolicy::Midpoint => match (body1, body2) {
                (Some(p1), Some(p2)) => Some(na::center(&p1, &p2)),
                _ => None,
            },
        }
    }
}

/// Which of the (up to) two axes of a joint an operation addresses.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum JointAxis {
    First,
    Second,
}

/// Spring and damper constants for both joint axes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, new)]
pub struct SpringDamper<N: RealField + Copy> {
    pub stiffness1: N,
    pub damping1: N,
    pub stiffness2: N,
    pub damping2: N,
}

impl<N: RealField + Copy> Default for SpringDamper<N> {
    fn default() -> Self {
        Self::new(na::zero(), na::zero(), na::zero(), na::zero())
    }
}

/// Description of a joint between two bodies, as submitted to
/// `JointRegistry::create`.
///
/// `id` is ignored on submission and overwritten with the assigned id once
/// the joint is live.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointSpec<N: RealField + Copy> {
    pub id: u64,
    pub name: String,
    pub joint_type: JointType,
    pub body_index1: BodyIndex,
    pub body_index2: BodyIndex,
    pub anchor: Point3<N>,
    pub anchor_policy: AnchorPolicy,
    pub axis1: Vector3<N>,
    pub axis2: Vector3<N>,
    pub angle_offset1: N,
    pub angle_offset2: N,
    pub spring_damper: SpringDamper<N>,
}

impl<N: RealField + Copy> JointSpec<N> {
    /// A joint of `joint_type` between two bodies with an explicit anchor at
    /// the origin, `axis1` along z and `axis2` along x.
    pub fn new(
        name: impl Into<String>,
        joint_type: JointType,
        body_index1: BodyIndex,
        body_index2: BodyIndex,
    ) -> Self {
        Self {
            id: 0,
            name: name.into(),
            joint_type,
            body_index1,
            body_index2,
            anchor: Point3::origin(),
            anchor_policy: AnchorPolicy::Explicit,
            axis1: Vector3::z(),
            axis2: Vector3::x(),
            angle_offset1: na::zero(),
            angle_offset2: na::zero(),
            spring_damper: SpringDamper::default(),
        }
    }

    /// A joint attaching a single body to the world frame.
    pub fn to_world(name: impl Into<String>, joint_type: JointType, body_index: BodyIndex) -> Self {
        Self::new(name, joint_type, body_index, WORLD_BODY)
    }

    pub fn with_anchor(mut self, anchor: Point3<N>) -> Self {
        self.anchor = anchor;
        self.anchor_policy = AnchorPolicy::Explicit;
        self
    }

    pub fn with_anchor_policy(mut self, policy: AnchorPolicy) -> Self {
        self.anchor_policy = policy;
        self
    }

    pub fn with_axes(mut self, axis1: Vector3<N>, axis2: Vector3<N>) -> Self {
        self.axis1 = axis1;
        self.axis2 = axis2;
        self
    }

    pub fn with_angle_offsets(mut self, offset1: N, offset2: N) -> Self {
        self.angle_offset1 = offset1;
        self.angle_offset2 = offset2;
        self
    }

    pub fn with_spring_damper(mut self, spring_damper: SpringDamper<N>) -> Self {
        self.spring_damper = spring_damper;
        self
    }

    /// Whether `axis1` is usable for this joint type, i.e. the type ignores
    /// axes or the squared length of `axis1` reaches `epsilon`.
    pub fn has_valid_axis(&self, epsilon: N) -> bool {
        !self.joint_type.requires_axis() || self.axis1.norm_squared() >= epsilon
    }

    /// Whether this joint connects `a` and `b`, in either order.
    pub fn connects(&self, a: BodyIndex, b: BodyIndex) -> bool {
        (self.body_index1 == a && self.body_index2 == b)
            || (self.body_index1 == b && self.body_index2 == a)
    }

    /// Whether either side of this joint is `body`.
    pub fn references(&self, body: BodyIndex) -> bool {
        self.body_index1 == body || self.body_index2 == body
    }
}
