//! # Parameters module
//! Tunables of the joint registry.

use crate::nalgebra::{self as na, RealField};
use serde::{Deserialize, Serialize};

/// Configuration of a `JointRegistry`, see `JointRegistry::with_parameters`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegistryParameters<N: RealField + Copy> {
    /// Lower bound for the squared length of `axis1` of every joint type that
    /// uses axes. Joints below it are rejected at creation.
    ///
    /// default: `1e-6`
    pub axis_epsilon: N,

    /// Group under which joint sensor values are published.
    ///
    /// default: `"mars_sim"`
    pub data_broker_group: String,

    /// Prefix prepended to the joint name to form its data name.
    ///
    /// default: `"Joints/"`
    pub data_broker_prefix: String,
}

impl<N: RealField + Copy> RegistryParameters<N> {
    /// Data-broker group and data name for the joint called `name`.
    pub fn data_broker_names(&self, name: &str) -> (String, String) {
        (
            self.data_broker_group.clone(),
            format!("{}{}", self.data_broker_prefix, name),
        )
    }
}

impl<N: RealField + Copy> Default for RegistryParameters<N> {
    fn default() -> Self {
        RegistryParameters {
            axis_epsilon: na::convert(1e-6),
            data_broker_group: "mars_sim".to_owned(),
            data_broker_prefix: "Joints/".to_owned(),
        }
    }
}
