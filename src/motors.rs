use crate::registry::JointId;

/// The motor subsystem as seen by the joint registry.
pub trait MotorSubsystem: Send + Sync {
    /// Detaches every motor bound to `joint`. Called on every removal, whether
    /// or not the joint existed, so this must be idempotent.
    ///
    /// Runs with the registry locked and must not call back into it.
    fn detach_joint(&self, joint: JointId);
}

/// Motor subsystem for simulations without motors.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoMotors;

impl MotorSubsystem for NoMotors {
    fn detach_joint(&self, _: JointId) {}
}
