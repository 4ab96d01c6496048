use crate::registry::JointId;

use parking_lot::Mutex;
use shrev::{EventChannel, ReaderId};

/// The structural change that made the scene dirty.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SceneChange {
    /// A joint was created under this id.
    JointCreated(JointId),
    /// Removal of this id was requested. Sent even if no such joint existed.
    JointRemoved(JointId),
    /// Every active joint was destroyed.
    JointsCleared,
}

/// Downstream consumer (renderer, persistence, ...) that has to invalidate
/// cached state when the joint topology changes.
pub trait SceneObserver: Send + Sync {
    fn scene_changed(&self, change: SceneChange);
}

/// Observer for registries nobody listens to.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSceneObserver;

impl SceneObserver for NoSceneObserver {
    fn scene_changed(&self, _: SceneChange) {}
}

/// `SceneEvents` is a `SceneObserver` that buffers every `SceneChange` in an
/// `EventChannel`, so any number of consumers can drain them at their own
/// pace.
#[derive(Default)]
pub struct SceneEvents {
    channel: Mutex<EventChannel<SceneChange>>,
}

impl SceneEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_reader(&self) -> ReaderId<SceneChange> {
        self.channel.lock().register_reader()
    }

    /// Drains every change `reader` has not seen yet.
    pub fn read(&self, reader: &mut ReaderId<SceneChange>) -> Vec<SceneChange> {
        self.channel.lock().read(reader).copied().collect()
    }
}

impl SceneObserver for SceneEvents {
    fn scene_changed(&self, change: SceneChange) {
        self.channel.lock().single_write(change);
    }
}
