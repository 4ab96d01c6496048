//! Test doubles for the registry's collaborators.

use crate::{
    backend::{JointFeedback, JointParams, PhysicsBackend},
    bodies::{BodyRef, BodyResolver},
    error::BackendError,
    joints::JointSpec,
    motors::MotorSubsystem,
    nalgebra::Point3,
    registry::JointId,
    BodyIndex,
};

use parking_lot::Mutex;
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

#[derive(Clone, Debug, PartialEq)]
pub enum BackendCall {
    Create {
        name: String,
        anchor: Point3<f64>,
        body1: Option<BodyIndex>,
        body2: Option<BodyIndex>,
    },
    Reattach {
        joint: u64,
        anchor: Point3<f64>,
        body1: Option<BodyIndex>,
        body2: Option<BodyIndex>,
    },
    Destroy {
        joint: u64,
    },
    Apply {
        joint: u64,
        params: JointParams<f64>,
    },
    Step {
        joint: u64,
        dt: f64,
    },
}

/// Engine joint of the recording backend. Deliberately not `Clone`.
#[derive(Debug)]
pub struct MockJoint(u64);

#[derive(Default)]
struct BackendState {
    serial: u64,
    live: HashSet<u64>,
    calls: Vec<BackendCall>,
    failing: HashSet<String>,
    feedback: JointFeedback<f64>,
}

/// Backend recording every call; body handles are body indices.
#[derive(Clone, Default)]
pub struct RecordingBackend {
    state: Arc<Mutex<BackendState>>,
}

impl RecordingBackend {
    /// A second view on the same recorded state.
    pub fn probe(&self) -> Self {
        self.clone()
    }

    /// Makes creation of joints called `name` fail.
    pub fn fail_on(&self, name: &str) {
        self.state.lock().failing.insert(name.to_owned());
    }

    pub fn set_feedback(&self, feedback: JointFeedback<f64>) {
        self.state.lock().feedback = feedback;
    }

    pub fn live_joints(&self) -> usize {
        self.state.lock().live.len()
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.state.lock().calls.clone()
    }

    pub fn params(&self) -> Vec<JointParams<f64>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BackendCall::Apply { params, .. } => Some(params),
                _ => None,
            })
            .collect()
    }
}

impl PhysicsBackend<f64> for RecordingBackend {
    type BodyHandle = BodyIndex;
    type JointHandle = MockJoint;

    fn create_joint(
        &self,
        spec: &JointSpec<f64>,
        body1: Option<&BodyIndex>,
        body2: Option<&BodyIndex>,
    ) -> Result<MockJoint, BackendError> {
        let mut state = self.state.lock();
        state.calls.push(BackendCall::Create {
            name: spec.name.clone(),
            anchor: spec.anchor,
            body1: body1.copied(),
            body2: body2.copied(),
        });
        if state.failing.contains(&spec.name) {
            return Err(BackendError::new("joint rejected"));
        }
        state.serial += 1;
        let serial = state.serial;
        state.live.insert(serial);
        Ok(MockJoint(serial))
    }

    fn reattach_joint(
        &self,
        handle: &mut MockJoint,
        spec: &JointSpec<f64>,
        body1: Option<&BodyIndex>,
        body2: Option<&BodyIndex>,
    ) {
        self.state.lock().calls.push(BackendCall::Reattach {
            joint: handle.0,
            anchor: spec.anchor,
            body1: body1.copied(),
            body2: body2.copied(),
        });
    }

    fn destroy_joint(&self, handle: MockJoint) {
        let mut state = self.state.lock();
        state.live.remove(&handle.0);
        state.calls.push(BackendCall::Destroy { joint: handle.0 });
    }

    fn apply_params(&self, handle: &mut MockJoint, params: &JointParams<f64>) {
        self.state.lock().calls.push(BackendCall::Apply {
            joint: handle.0,
            params: *params,
        });
    }

    fn step(&self, handle: &mut MockJoint, dt: f64) -> JointFeedback<f64> {
        let mut state = self.state.lock();
        state.calls.push(BackendCall::Step { joint: handle.0, dt });
        state.feedback
    }
}

/// Body table whose poses and handles can be changed between calls. Bodies
/// placed with `place` use their index as handle.
#[derive(Default)]
pub struct MockBodies {
    positions: Mutex<HashMap<BodyIndex, (BodyIndex, Point3<f64>)>>,
}

impl MockBodies {
    pub fn place(&self, index: BodyIndex, position: Point3<f64>) {
        self.replace(index, index, position);
    }

    /// Puts a new engine body with `handle` behind `index`.
    pub fn replace(&self, index: BodyIndex, handle: BodyIndex, position: Point3<f64>) {
        self.positions.lock().insert(index, (handle, position));
    }

    pub fn take(&self, index: BodyIndex) {
        self.positions.lock().remove(&index);
    }
}

impl BodyResolver<f64> for MockBodies {
    type Handle = BodyIndex;

    fn resolve(&self, index: BodyIndex) -> Option<BodyRef<f64, BodyIndex>> {
        self.positions
            .lock()
            .get(&index)
            .map(|(handle, position)| BodyRef::new(index, *handle, *position))
    }
}

#[derive(Default)]
pub struct RecordingMotors {
    detached: Mutex<Vec<JointId>>,
}

impl RecordingMotors {
    pub fn detached(&self) -> Vec<JointId> {
        self.detached.lock().clone()
    }
}

impl MotorSubsystem for RecordingMotors {
    fn detach_joint(&self, joint: JointId) {
        self.detached.lock().push(joint);
    }
}
