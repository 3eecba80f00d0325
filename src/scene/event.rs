use std::fmt::{Display, Formatter};
use tokio::sync::mpsc;

/// Notifications from the scene graph to the bridge that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneEvent {
    /// GPU-side scene resources are ready; a render target can be attached
    Initialized,
    /// GPU-side scene resources are gone; the render target must be released
    Invalidated,
    /// Scene content changed structurally, a sync pass is needed
    Changed,
    /// Content is unchanged but must be painted again
    SyncRequested,
    /// Web view load progress in percent
    LoadProgress(u8),
}

pub type SceneEventSender = mpsc::UnboundedSender<SceneEvent>;
pub type SceneEventReceiver = mpsc::UnboundedReceiver<SceneEvent>;

/// Load state of the web view's current navigation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadStatus {
    #[default]
    Idle,
    Started,
    Succeeded,
    Failed,
}

/// Page lifecycle state as reported by the web view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LifecycleState {
    #[default]
    Active,
    Frozen,
    Discarded,
}

impl Display for LoadStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadStatus::Idle => write!(f, "Idle"),
            LoadStatus::Started => write!(f, "Started"),
            LoadStatus::Succeeded => write!(f, "Succeeded"),
            LoadStatus::Failed => write!(f, "Failed"),
        }
    }
}

impl Display for LifecycleState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Active => write!(f, "Active"),
            LifecycleState::Frozen => write!(f, "Frozen"),
            LifecycleState::Discarded => write!(f, "Discarded"),
        }
    }
}
