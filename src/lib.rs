//! sim-joints
//! Joint lifecycle management for a stepped physics simulation: a thread-safe
//! registry of live joints, reload templates, and the seams to an opaque
//! physics backend.

pub extern crate nalgebra;
#[macro_use]
extern crate derive_new;
#[macro_use]
extern crate log;
#[macro_use]
extern crate shrinkwraprs;

pub mod backend;
pub mod bodies;
pub mod error;
pub mod events;
pub mod joints;
pub mod motors;
pub mod parameters;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use self::backend::*;
pub use self::bodies::*;
pub use self::error::*;
pub use self::events::*;
pub use self::joints::*;
pub use self::motors::*;
pub use self::parameters::*;
pub use self::registry::*;

/// Index of a simulated body as known to the body resolver. `0` is the world
/// frame.
pub type BodyIndex = u64;

/// The body index denoting "no body", i.e. the fixed world frame.
pub const WORLD_BODY: BodyIndex = 0;
