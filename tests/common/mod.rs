#![allow(dead_code)]

use sim_joints::{
    nalgebra::Point3, BackendError, BodyIndex, BodyRef, BodyResolver, JointFeedback, JointParams,
    JointSpec, PhysicsBackend,
};

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Once,
    },
    thread,
    time::Duration,
};

static LOGGER: Once = Once::new();

pub fn init_logging() {
    LOGGER.call_once(|| {
        let _ = simple_logger::init_with_level(log::Level::Warn);
    });
}

/// Backend counting live joints. Joints whose name starts with `"fail"` are
/// rejected; creation optionally sleeps to widen race windows.
#[derive(Clone, Default)]
pub struct CountingBackend {
    pub live: Arc<AtomicUsize>,
    pub created: Arc<AtomicUsize>,
    pub create_delay: Option<Duration>,
}

impl PhysicsBackend<f64> for CountingBackend {
    type BodyHandle = BodyIndex;
    type JointHandle = usize;

    fn create_joint(
        &self,
        spec: &JointSpec<f64>,
        _: Option<&BodyIndex>,
        _: Option<&BodyIndex>,
    ) -> Result<usize, BackendError> {
        if let Some(delay) = self.create_delay {
            thread::sleep(delay);
        }
        if spec.name.starts_with("fail") {
            return Err(BackendError::new(format!("refusing {}", spec.name)));
        }
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(self.created.fetch_add(1, Ordering::SeqCst))
    }

    fn reattach_joint(
        &self,
        _: &mut usize,
        _: &JointSpec<f64>,
        _: Option<&BodyIndex>,
        _: Option<&BodyIndex>,
    ) {
    }

    fn destroy_joint(&self, _: usize) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }

    fn apply_params(&self, _: &mut usize, _: &JointParams<f64>) {}

    fn step(&self, _: &mut usize, _: f64) -> JointFeedback<f64> {
        JointFeedback::default()
    }
}

/// Fixed body table: body `i` sits at `(i, 0, 0)` for `1..=count`.
pub struct LineOfBodies {
    positions: HashMap<BodyIndex, Point3<f64>>,
}

impl LineOfBodies {
    pub fn new(count: BodyIndex) -> Self {
        Self {
            positions: (1..=count)
                .map(|i| (i, Point3::new(i as f64, 0.0, 0.0)))
                .collect(),
        }
    }
}

impl BodyResolver<f64> for LineOfBodies {
    type Handle = BodyIndex;

    fn resolve(&self, index: BodyIndex) -> Option<BodyRef<f64, BodyIndex>> {
        self.positions
            .get(&index)
            .map(|position| BodyRef::new(index, index, *position))
    }
}
