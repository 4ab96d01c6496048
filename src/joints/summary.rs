use crate::{
    joints::JointType,
    nalgebra::{Point3, RealField, Vector3},
    registry::JointId,
    BodyIndex,
};
use serde::{Deserialize, Serialize};

/// Read-only exchange record describing one live joint, as produced by
/// `JointRegistry::list_summaries`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, new)]
pub struct JointSummary<N: RealField + Copy> {
    pub id: JointId,
    pub name: String,
    pub joint_type: JointType,
    pub bodies: (BodyIndex, BodyIndex),
    pub anchor: Point3<N>,
    pub axis1: Vector3<N>,
    /// Primary-axis position as of the last update.
    pub position: N,
    /// Primary-axis velocity as of the last update.
    pub velocity: N,
}
