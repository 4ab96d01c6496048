use std::fmt;
use serde::{Deserialize, Serialize};

/// Identifier of a live joint. `JointId::NONE` (0) is never handed out and
/// means "no joint" or "creation failed".
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize, Shrinkwrap,
)]
pub struct JointId(pub u64);

impl JointId {
    pub const NONE: JointId = JointId(0);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

impl fmt::Display for JointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic source of joint ids. Only a reset rewinds it.
#[derive(Debug)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub const INITIAL: u64 = 1;

    pub fn new() -> Self {
        Self {
            next: Self::INITIAL,
        }
    }

    /// The id the next call to `allocate` will return.
    pub fn peek(&self) -> JointId {
        JointId(self.next)
    }

    pub fn allocate(&mut self) -> JointId {
        let id = JointId(self.next);
        self.next += 1;
        id
    }

    pub fn reset(&mut self) {
        self.next = Self::INITIAL;
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
