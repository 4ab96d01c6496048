use crate::{
    nalgebra::{Point3, RealField},
    BodyIndex,
};

/// A resolved body: its index, the engine handle used to attach joints, and
/// its world position at resolution time.
///
/// This is a relation only. Holding a `BodyRef` does not keep the body alive.
#[derive(Clone, Debug, PartialEq, new)]
pub struct BodyRef<N: RealField + Copy, H> {
    pub index: BodyIndex,
    pub handle: H,
    pub position: Point3<N>,
}

/// Maps body indices to live bodies.
///
/// The registry never asks for `WORLD_BODY`; it is always "no body".
pub trait BodyResolver<N: RealField + Copy>: Send + Sync {
    type Handle: Clone + Send + Sync;

    fn resolve(&self, index: BodyIndex) -> Option<BodyRef<N, Self::Handle>>;
}
