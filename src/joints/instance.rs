use crate::{
    backend::{JointFeedback, JointParams, PhysicsBackend},
    bodies::BodyRef,
    joints::{JointAxis, JointSpec, JointSummary, JointType, SpringDamper},
    nalgebra::{self as na, Point3, RealField, Vector3},
    registry::JointId,
    BodyIndex,
};

/// A live joint: the backend handle it exclusively owns, the bodies it was
/// attached to, and its current parameters.
///
/// Instances only exist inside a `JointRegistry`; the backend handle is
/// released through `destroy`, which the registry calls on removal.
pub struct JointInstance<N: RealField + Copy, P: PhysicsBackend<N>> {
    spec: JointSpec<N>,
    handle: P::JointHandle,
    body1: Option<BodyRef<N, P::BodyHandle>>,
    body2: Option<BodyRef<N, P::BodyHandle>>,
    torque: N,
    velocity: [N; 2],
    force_limit: [N; 2],
    offline_value: Option<N>,
    feedback: JointFeedback<N>,
}

impl<N: RealField + Copy, P: PhysicsBackend<N>> JointInstance<N, P> {
    pub(crate) fn new(
        spec: JointSpec<N>,
        handle: P::JointHandle,
        body1: Option<BodyRef<N, P::BodyHandle>>,
        body2: Option<BodyRef<N, P::BodyHandle>>,
    ) -> Self {
        Self {
            spec,
            handle,
            body1,
            body2,
            torque: na::zero(),
            velocity: [na::zero(); 2],
            force_limit: [na::zero(); 2],
            offline_value: None,
            feedback: JointFeedback::default(),
        }
    }

    pub fn id(&self) -> JointId {
        JointId(self.spec.id)
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn joint_type(&self) -> JointType {
        self.spec.joint_type
    }

    /// The spec as currently configured, including edits made since creation.
    pub fn spec(&self) -> &JointSpec<N> {
        &self.spec
    }

    pub fn body_indices(&self) -> (BodyIndex, BodyIndex) {
        (self.spec.body_index1, self.spec.body_index2)
    }

    pub fn bodies(
        &self,
    ) -> (
        Option<&BodyRef<N, P::BodyHandle>>,
        Option<&BodyRef<N, P::BodyHandle>>,
    ) {
        (self.body1.as_ref(), self.body2.as_ref())
    }

    pub fn anchor(&self) -> Point3<N> {
        self.spec.anchor
    }

    pub fn axis1(&self) -> Vector3<N> {
        self.spec.axis1
    }

    pub fn axis2(&self) -> Vector3<N> {
        self.spec.axis2
    }

    pub fn torque(&self) -> N {
        self.torque
    }

    pub fn velocity(&self, axis: JointAxis) -> N {
        self.velocity[Self::slot(axis)]
    }

    pub fn force_limit(&self, axis: JointAxis) -> N {
        self.force_limit[Self::slot(axis)]
    }

    pub fn spring_damper(&self) -> SpringDamper<N> {
        self.spec.spring_damper
    }

    pub fn offline_value(&self) -> Option<N> {
        self.offline_value
    }

    /// Position on `axis`: the backend reading of the last step plus the
    /// configured angle offset. An injected offline value replaces the
    /// reading on the first axis.
    pub fn position(&self, axis: JointAxis) -> N {
        match axis {
            JointAxis::First => self
                .offline_value
                .unwrap_or(self.feedback.position1 + self.spec.angle_offset1),
            JointAxis::Second => self.feedback.position2 + self.spec.angle_offset2,
        }
    }

    /// Measured velocity on `axis` as of the last step.
    pub fn measured_velocity(&self, axis: JointAxis) -> N {
        match axis {
            JointAxis::First => self.feedback.velocity1,
            JointAxis::Second => self.feedback.velocity2,
        }
    }

    pub fn force(&self) -> Vector3<N> {
        self.feedback.force
    }

    pub fn feedback_torque(&self) -> Vector3<N> {
        self.feedback.torque
    }

    pub fn summary(&self) -> JointSummary<N> {
        JointSummary::new(
            self.id(),
            self.spec.name.clone(),
            self.spec.joint_type,
            self.body_indices(),
            self.spec.anchor,
            self.spec.axis1,
            self.position(JointAxis::First),
            self.measured_velocity(JointAxis::First),
        )
    }

    pub(crate) fn set_anchor(&mut self, backend: &P, anchor: Point3<N>) {
        self.spec.anchor = anchor;
        backend.apply_params(&mut self.handle, &JointParams::Anchor(anchor));
    }

    pub(crate) fn set_axis1(&mut self, backend: &P, axis: Vector3<N>) {
        self.spec.axis1 = axis;
        backend.apply_params(&mut self.handle, &JointParams::Axis1(axis));
    }

    pub(crate) fn set_axis2(&mut self, backend: &P, axis: Vector3<N>) {
        self.spec.axis2 = axis;
        backend.apply_params(&mut self.handle, &JointParams::Axis2(axis));
    }

    pub(crate) fn set_torque(&mut self, backend: &P, torque: N) {
        self.torque = torque;
        backend.apply_params(&mut self.handle, &JointParams::Torque(torque));
    }

    pub(crate) fn set_velocity(&mut self, backend: &P, axis: JointAxis, velocity: N) {
        self.velocity[Self::slot(axis)] = velocity;
        let params = match axis {
            JointAxis::First => JointParams::Velocity(velocity),
            JointAxis::Second => JointParams::Velocity2(velocity),
        };
        backend.apply_params(&mut self.handle, &params);
    }

    pub(crate) fn set_force_limit(&mut self, backend: &P, axis: JointAxis, max_force: N) {
        self.force_limit[Self::slot(axis)] = max_force;
        let params = match axis {
            JointAxis::First => JointParams::ForceLimit(max_force),
            JointAxis::Second => JointParams::ForceLimit2(max_force),
        };
        backend.apply_params(&mut self.handle, &params);
    }

    pub(crate) fn set_spring_damper(&mut self, backend: &P, spring_damper: SpringDamper<N>) {
        self.spec.spring_damper = spring_damper;
        backend.apply_params(&mut self.handle, &JointParams::SpringDamper(spring_damper));
    }

    pub(crate) fn set_offline_value(&mut self, value: Option<N>) {
        self.offline_value = value;
    }

    /// Re-sends the spring/damper constants, which the backend derives its
    /// step-size dependent constraint terms from.
    pub(crate) fn change_step_size(&mut self, backend: &P) {
        let spring_damper = self.spec.spring_damper;
        backend.apply_params(&mut self.handle, &JointParams::SpringDamper(spring_damper));
    }

    /// Attaches the joint to freshly resolved bodies and, unless the anchor
    /// is explicit, moves the anchor to match their current poses.
    pub(crate) fn reattach(
        &mut self,
        backend: &P,
        body1: Option<BodyRef<N, P::BodyHandle>>,
        body2: Option<BodyRef<N, P::BodyHandle>>,
    ) -> bool {
        let anchor = self.spec.anchor_policy.resolve(
            self.spec.anchor,
            body1.as_ref().map(|b| b.position),
            body2.as_ref().map(|b| b.position),
        );
        match anchor {
            Some(anchor) => {
                self.spec.anchor = anchor;
                self.body1 = body1;
                self.body2 = body2;
                backend.reattach_joint(
                    &mut self.handle,
                    &self.spec,
                    self.body1.as_ref().map(|body| &body.handle),
                    self.body2.as_ref().map(|body| &body.handle),
                );
                true
            }
            None => false,
        }
    }

    pub(crate) fn update(&mut self, backend: &P, dt: N) {
        self.feedback = backend.step(&mut self.handle, dt);
    }

    pub(crate) fn destroy(self, backend: &P) {
        backend.destroy_joint(self.handle);
    }

    fn slot(axis: JointAxis) -> usize {
        match axis {
            JointAxis::First => 0,
            JointAxis::Second => 1,
        }
    }
}
