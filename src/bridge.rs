//! Render bridge: one off-screen scene rendered into one shared GPU texture.

use std::fmt::{Display, Formatter};

mod bridge;
mod scheduler;

pub use bridge::{BridgeState, RenderBridge, RenderStats, TextureChanged};
pub use scheduler::UpdateScheduler;

/// Identifies a bridge across the C boundary. Never zero.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BridgeId(u64);

impl BridgeId {
    /// Returns `None` for the null handle.
    pub fn from_raw(raw: u64) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    pub fn as_raw(&self) -> u64 {
        self.0
    }

    pub(crate) fn first() -> Self {
        Self(1)
    }

    pub(crate) fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl Display for BridgeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
