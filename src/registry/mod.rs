/*!
# Registry module

The `JointRegistry` owns every live joint of a simulation. It is the only
place joints are created, mutated and destroyed, and it keeps the reload
templates used to rebuild the joint topology after a scene reset.

All state sits behind one exclusive lock. Creation validates and calls the
backend without the lock held, so concurrent creations only serialize on id
assignment and insertion. `update` holds the lock for a whole pass.

Three failure policies apply:
- creation failures are logged and reported as `JointId::NONE` by `create`
  (`try_create` returns them as `JointError`),
- `get_full_spec` on an unknown id is an error,
- every other operation on an unknown id does nothing.
*/

mod ids;

pub use ids::{IdAllocator, JointId};

use crate::{
    backend::PhysicsBackend,
    bodies::{BodyRef, BodyResolver},
    error::JointError,
    events::{NoSceneObserver, SceneChange, SceneObserver},
    joints::{AnchorPolicy, JointAxis, JointInstance, JointSpec, JointSummary, SpringDamper},
    motors::{MotorSubsystem, NoMotors},
    nalgebra::{Point3, RealField, Vector3},
    parameters::RegistryParameters,
    BodyIndex, WORLD_BODY,
};

use parking_lot::Mutex;
use std::{
    collections::BTreeMap,
    mem,
    sync::Arc,
};

/// Key of a reload template. Drawn by the registry for every original
/// creation, independent of `JointSpec::id`.
pub type TemplateKey = u64;

/// Outcome of `JointRegistry::reload`.
#[derive(Debug, Default)]
pub struct ReloadReport {
    /// Template key and the id of the joint recreated from it.
    pub created: Vec<(TemplateKey, JointId)>,
    /// Template key and why recreating it failed.
    pub failed: Vec<(TemplateKey, JointError)>,
}

impl ReloadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Origin {
    Original,
    Reload,
}

/// Active joints are ordered by id, so scans find the lowest matching id.
struct RegistryState<N: RealField + Copy, P: PhysicsBackend<N>> {
    active: BTreeMap<JointId, JointInstance<N, P>>,
    templates: BTreeMap<TemplateKey, JointSpec<N>>,
    next_template: TemplateKey,
    ids: IdAllocator,
}

impl<N: RealField + Copy, P: PhysicsBackend<N>> RegistryState<N, P> {
    const FIRST_TEMPLATE: TemplateKey = 1;

    fn store_template(&mut self, spec: JointSpec<N>) -> TemplateKey {
        let key = self.next_template;
        self.next_template += 1;
        self.templates.insert(key, spec);
        key
    }
}

/// Thread-safe registry of live joints and their reload templates.
pub struct JointRegistry<N, P, R>
where
    N: RealField + Copy,
    P: PhysicsBackend<N>,
    R: BodyResolver<N, Handle = P::BodyHandle>,
{
    backend: P,
    bodies: R,
    motors: Arc<dyn MotorSubsystem>,
    observer: Arc<dyn SceneObserver>,
    parameters: RegistryParameters<N>,
    state: Mutex<RegistryState<N, P>>,
}

impl<N, P, R> JointRegistry<N, P, R>
where
    N: RealField + Copy,
    P: PhysicsBackend<N>,
    R: BodyResolver<N, Handle = P::BodyHandle>,
{
    /// Creates an empty registry materializing joints through `backend` and
    /// resolving bodies through `bodies`, without motors or scene observers.
    pub fn new(backend: P, bodies: R) -> Self {
        Self {
            backend,
            bodies,
            motors: Arc::new(NoMotors),
            observer: Arc::new(NoSceneObserver),
            parameters: RegistryParameters::default(),
            state: Mutex::new(RegistryState {
                active: BTreeMap::new(),
                templates: BTreeMap::new(),
                next_template: RegistryState::<N, P>::FIRST_TEMPLATE,
                ids: IdAllocator::new(),
            }),
        }
    }

    /// Sets the motor subsystem notified on every joint removal.
    pub fn with_motors(mut self, motors: Arc<dyn MotorSubsystem>) -> Self {
        self.motors = motors;
        self
    }

    /// Sets the observer notified after every structural change.
    pub fn with_scene_observer(mut self, observer: Arc<dyn SceneObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_parameters(mut self, parameters: RegistryParameters<N>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn backend(&self) -> &P {
        &self.backend
    }

    pub fn bodies(&self) -> &R {
        &self.bodies
    }

    pub fn parameters(&self) -> &RegistryParameters<N> {
        &self.parameters
    }

    /// Creates a joint from `spec` and returns its id, or `JointId::NONE` if
    /// `spec` was rejected or the backend failed. Failures are logged.
    ///
    /// # Panics
    ///
    /// Panics if the anchor policy of `spec` needs a body that cannot be
    /// resolved. Use `try_create` to handle that case yourself.
    pub fn create(&self, spec: JointSpec<N>) -> JointId {
        match self.try_create(spec) {
            Ok(id) => id,
            Err(err) if err.is_fatal() => panic!("{}", err),
            Err(err) => {
                error!("{}", err);
                JointId::NONE
            }
        }
    }

    /// Creates a joint from `spec`, reporting every failure as a `JointError`.
    ///
    /// Unless the axis check fails, `spec` is stored verbatim as a new reload
    /// template before anything else happens, even if creation fails later.
    pub fn try_create(&self, spec: JointSpec<N>) -> Result<JointId, JointError> {
        self.create_joint(spec, Origin::Original)
    }

    fn create_joint(&self, mut spec: JointSpec<N>, origin: Origin) -> Result<JointId, JointError> {
        if !spec.has_valid_axis(self.parameters.axis_epsilon) {
            return Err(JointError::InvalidAxis { name: spec.name });
        }

        if origin == Origin::Original {
            let key = self.state.lock().store_template(spec.clone());
            trace!("Stored joint `{}` as reload template {}.", spec.name, key);
        }

        let body1 = self.resolve_body(spec.body_index1);
        let body2 = self.resolve_body(spec.body_index2);
        spec.anchor = Self::resolve_anchor(&spec, body1.as_ref(), body2.as_ref())?;

        for (index, body) in [(spec.body_index1, &body1), (spec.body_index2, &body2)].iter() {
            if *index != WORLD_BODY && body.is_none() {
                warn!(
                    "Joint `{}` references body {} which cannot be resolved, attaching it to the world.",
                    spec.name, index
                );
            }
        }

        let handle = self
            .backend
            .create_joint(
                &spec,
                body1.as_ref().map(|body| &body.handle),
                body2.as_ref().map(|body| &body.handle),
            )
            .map_err(|source| JointError::Backend {
                name: spec.name.clone(),
                source,
            })?;

        let id = {
            let mut state = self.state.lock();
            let id = state.ids.allocate();
            spec.id = *id;
            trace!("Created joint {} (`{}`).", id, spec.name);
            state
                .active
                .insert(id, JointInstance::new(spec, handle, body1, body2));
            id
        };
        self.observer.scene_changed(SceneChange::JointCreated(id));
        Ok(id)
    }

    fn resolve_body(&self, index: BodyIndex) -> Option<BodyRef<N, P::BodyHandle>> {
        if index == WORLD_BODY {
            None
        } else {
            self.bodies.resolve(index)
        }
    }

    fn resolve_anchor(
        spec: &JointSpec<N>,
        body1: Option<&BodyRef<N, P::BodyHandle>>,
        body2: Option<&BodyRef<N, P::BodyHandle>>,
    ) -> Result<Point3<N>, JointError> {
        let policy = spec.anchor_policy;
        policy
            .resolve(
                spec.anchor,
                body1.map(|body| body.position),
                body2.map(|body| body.position),
            )
            .ok_or_else(|| {
                let body = match (policy, body1) {
                    (AnchorPolicy::FromBody1, _) | (AnchorPolicy::Midpoint, None) => {
                        spec.body_index1
                    }
                    _ => spec.body_index2,
                };
                JointError::InvariantViolated {
                    name: spec.name.clone(),
                    body,
                    policy,
                }
            })
    }

    fn with_instance(&self, id: JointId, f: impl FnOnce(&mut JointInstance<N, P>, &P)) {
        let mut state = self.state.lock();
        if let Some(joint) = state.active.get_mut(&id) {
            f(joint, &self.backend);
        }
    }

    /// Overwrites anchor and both axes of joint `id`.
    pub fn edit(&self, id: JointId, anchor: Point3<N>, axis1: Vector3<N>, axis2: Vector3<N>) {
        self.with_instance(id, |joint, backend| {
            joint.set_anchor(backend, anchor);
            joint.set_axis1(backend, axis1);
            joint.set_axis2(backend, axis2);
        });
    }

    pub fn set_torque(&self, id: JointId, torque: N) {
        self.with_instance(id, |joint, backend| joint.set_torque(backend, torque));
    }

    pub fn set_velocity(&self, id: JointId, axis: JointAxis, velocity: N) {
        self.with_instance(id, |joint, backend| {
            joint.set_velocity(backend, axis, velocity)
        });
    }

    pub fn set_force_limit(&self, id: JointId, axis: JointAxis, max_force: N) {
        self.with_instance(id, |joint, backend| {
            joint.set_force_limit(backend, axis, max_force)
        });
    }

    pub fn set_spring_damper(&self, id: JointId, spring_damper: SpringDamper<N>) {
        self.with_instance(id, |joint, backend| {
            joint.set_spring_damper(backend, spring_damper)
        });
    }

    /// Injects a sensor value reported instead of the backend reading for the
    /// primary axis, or clears it with `None`.
    pub fn set_offline_value(&self, id: JointId, value: Option<N>) {
        self.with_instance(id, |joint, _| joint.set_offline_value(value));
    }

    /// Re-applies step-size dependent parameters of every joint. Call after
    /// the simulation step size changed.
    pub fn change_step_size(&self) {
        let mut state = self.state.lock();
        for joint in state.active.values_mut() {
            joint.change_step_size(&self.backend);
        }
    }

    /// Removes joint `id` and detaches its motors. Motors are detached and the
    /// scene is marked changed even if no such joint exists. Returns whether a
    /// joint was removed.
    pub fn remove(&self, id: JointId) -> bool {
        let removed = {
            let mut state = self.state.lock();
            let removed = state.active.remove(&id);
            self.motors.detach_joint(id);
            match removed {
                Some(joint) => {
                    debug!("Removing joint {} (`{}`).", id, joint.name());
                    joint.destroy(&self.backend);
                    true
                }
                None => false,
            }
        };
        self.observer.scene_changed(SceneChange::JointRemoved(id));
        removed
    }

    /// Removes the joint with the lowest id connecting bodies `a` and `b`, in
    /// either order.
    pub fn remove_by_body_pair(&self, a: BodyIndex, b: BodyIndex) -> bool {
        let found = self
            .state
            .lock()
            .active
            .iter()
            .find(|(_, joint)| joint.spec().connects(a, b))
            .map(|(id, _)| *id);
        match found {
            Some(id) => self.remove(id),
            None => false,
        }
    }

    /// Destroys every active joint and rewinds the id allocator. With
    /// `reset_templates`, the reload templates are discarded too.
    pub fn clear_all(&self, reset_templates: bool) {
        {
            let mut state = self.state.lock();
            if reset_templates {
                state.templates.clear();
                state.next_template = RegistryState::<N, P>::FIRST_TEMPLATE;
            }
            let count = state.active.len();
            for (id, joint) in mem::take(&mut state.active) {
                self.motors.detach_joint(id);
                joint.destroy(&self.backend);
            }
            state.ids.reset();
            debug!(
                "Cleared {} joints{}.",
                count,
                if reset_templates { " and their templates" } else { "" }
            );
        }
        self.observer.scene_changed(SceneChange::JointsCleared);
    }

    /// Recreates a joint from every reload template. Recreated joints get
    /// fresh ids. A failing template does not stop the others.
    pub fn reload(&self) -> ReloadReport {
        let templates: Vec<(TemplateKey, JointSpec<N>)> = self
            .state
            .lock()
            .templates
            .iter()
            .map(|(key, spec)| (*key, spec.clone()))
            .collect();

        let mut report = ReloadReport::default();
        for (key, spec) in templates {
            match self.create_joint(spec, Origin::Reload) {
                Ok(id) => report.created.push((key, id)),
                Err(err) => {
                    error!("Failed to reload joint template {}: {}", key, err);
                    report.failed.push((key, err));
                }
            }
        }
        info!(
            "Reloaded {} of {} joint templates.",
            report.created.len(),
            report.created.len() + report.failed.len()
        );
        report
    }

    /// Reattaches every joint connected to `body` against the current poses
    /// of its bodies.
    pub fn reattach_all(&self, body: BodyIndex) {
        let mut state = self.state.lock();
        for joint in state
            .active
            .values_mut()
            .filter(|joint| joint.spec().references(body))
        {
            let (index1, index2) = joint.body_indices();
            let body1 = self.resolve_body(index1);
            let body2 = self.resolve_body(index2);
            if !joint.reattach(&self.backend, body1, body2) {
                warn!(
                    "Could not reattach joint {} (`{}`): its bodies cannot be resolved.",
                    joint.id(),
                    joint.name()
                );
            }
        }
    }

    /// Steps every joint by `dt`. Structural changes wait until the pass is
    /// done.
    pub fn update(&self, dt: N) {
        let mut state = self.state.lock();
        for joint in state.active.values_mut() {
            joint.update(&self.backend, dt);
        }
    }

    /// The current spec of joint `id`.
    pub fn get_full_spec(&self, id: JointId) -> Result<JointSpec<N>, JointError> {
        self.state
            .lock()
            .active
            .get(&id)
            .map(|joint| joint.spec().clone())
            .ok_or(JointError::NotFound(id))
    }

    pub fn count(&self) -> usize {
        self.state.lock().active.len()
    }

    /// Replaces the contents of `out` with one summary per active joint, in id
    /// order.
    pub fn list_summaries(&self, out: &mut Vec<JointSummary<N>>) {
        let state = self.state.lock();
        out.clear();
        out.extend(state.active.values().map(JointInstance::summary));
    }

    pub fn summary(&self, id: JointId) -> Option<JointSummary<N>> {
        self.state.lock().active.get(&id).map(JointInstance::summary)
    }

    /// The lowest id of a joint called `name`, or `JointId::NONE`.
    pub fn find_id_by_name(&self, name: &str) -> JointId {
        self.state
            .lock()
            .active
            .values()
            .find(|joint| joint.name() == name)
            .map_or(JointId::NONE, JointInstance::id)
    }

    /// Ids of all active joints in ascending order.
    pub fn joint_ids(&self) -> Vec<JointId> {
        self.state.lock().active.keys().copied().collect()
    }

    /// Runs `f` on joint `id` with the registry locked. The borrow cannot
    /// escape `f`.
    pub fn with_joint<T>(&self, id: JointId, f: impl FnOnce(&JointInstance<N, P>) -> T) -> Option<T> {
        self.state.lock().active.get(&id).map(f)
    }

    /// Data-broker group and data name under which joint `id` publishes its
    /// sensor values.
    pub fn data_broker_names(&self, id: JointId) -> Option<(String, String)> {
        self.state
            .lock()
            .active
            .get(&id)
            .map(|joint| self.parameters.data_broker_names(joint.name()))
    }

    /// The id the next successful creation will receive.
    pub fn next_id(&self) -> JointId {
        self.state.lock().ids.peek()
    }

    pub fn template(&self, key: TemplateKey) -> Option<JointSpec<N>> {
        self.state.lock().templates.get(&key).cloned()
    }

    pub fn template_keys(&self) -> Vec<TemplateKey> {
        self.state.lock().templates.keys().copied().collect()
    }

    pub fn template_count(&self) -> usize {
        self.state.lock().templates.len()
    }

    fn with_template(&self, key: TemplateKey, f: impl FnOnce(&mut JointSpec<N>)) {
        if let Some(spec) = self.state.lock().templates.get_mut(&key) {
            f(spec);
        }
    }

    /// Sets the primary angle offset joint `key` will be reloaded with.
    pub fn set_reload_offset(&self, key: TemplateKey, offset: N) {
        self.with_template(key, |spec| spec.angle_offset1 = offset);
    }

    pub fn set_reload_axis(&self, key: TemplateKey, axis: Vector3<N>) {
        self.with_template(key, |spec| spec.axis1 = axis);
    }

    pub fn set_reload_anchor(&self, key: TemplateKey, anchor: Point3<N>) {
        self.with_template(key, |spec| spec.anchor = anchor);
    }

    /// Scales the anchor of every template component-wise.
    pub fn scale_reload_anchors(&self, factors: Vector3<N>) {
        let mut state = self.state.lock();
        for spec in state.templates.values_mut() {
            spec.anchor.coords.component_mul_assign(&factors);
        }
    }
}

impl<N, P, R> Drop for JointRegistry<N, P, R>
where
    N: RealField + Copy,
    P: PhysicsBackend<N>,
    R: BodyResolver<N, Handle = P::BodyHandle>,
{
    fn drop(&mut self) {
        let state = self.state.get_mut();
        for (_, joint) in mem::take(&mut state.active) {
            joint.destroy(&self.backend);
        }
    }
}
