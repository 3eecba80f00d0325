use crate::bridge::BridgeId;
use crate::gl::NativeApi;

/// Failures while discovering the host's GPU context.
#[derive(Debug, thiserror::Error)]
pub enum InteropError {
    #[error("No GLX or EGL context is current on the calling thread")]
    NoActiveContext,

    #[error("{0} display handle is unavailable")]
    DisplayUnavailable(NativeApi),

    #[error("No compatible framebuffer configuration")]
    ConfigUnavailable,

    #[error("Shared context creation failed")]
    ContextCreationFailed,
}

impl InteropError {
    /// Status code reported over the C boundary.
    pub fn code(&self) -> i32 {
        match self {
            InteropError::NoActiveContext => -1,
            InteropError::DisplayUnavailable(NativeApi::Egl) => -2,
            InteropError::DisplayUnavailable(NativeApi::Glx) => -100,
            InteropError::ConfigUnavailable => -99,
            InteropError::ContextCreationFailed => -98,
        }
    }
}

/// Failures while starting or running the graphics host.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("No GPU context was captured before starting the host")]
    NotLoaded,

    #[error("Host is already running")]
    AlreadyRunning,

    #[error("Captured {0} context could not be adopted as share root")]
    ShareRootRejected(NativeApi),

    #[error("Application context sharing with the root could not be created")]
    ShareContextCreation,

    #[error("Event loop runtime error: {0}")]
    Runtime(String),
}

impl HostError {
    /// Status code reported over the C boundary.
    pub fn code(&self) -> i32 {
        match self {
            HostError::ShareRootRejected(NativeApi::Egl) => -1000,
            HostError::ShareContextCreation => -1001,
            HostError::ShareRootRejected(NativeApi::Glx) => -1002,
            HostError::NotLoaded => -1003,
            HostError::AlreadyRunning => -1004,
            HostError::Runtime(_) => -1005,
        }
    }
}

/// Failures submitting work to the graphics thread.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MarshalError {
    #[error("Graphics event loop is not running")]
    LoopNotRunning,

    #[error("Graphics event loop exited before running the call")]
    CallDropped,

    #[error("Blocking call issued from the graphics thread itself")]
    Reentrant,
}

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Off-screen surface error: {0}")]
    Surface(anyhow::Error),

    #[error("Scene error: {0}")]
    Scene(anyhow::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Unknown bridge {0}")]
    UnknownBridge(BridgeId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn setup_codes_are_distinct_and_negative() {
        let codes = [
            InteropError::NoActiveContext.code(),
            InteropError::DisplayUnavailable(NativeApi::Egl).code(),
            InteropError::DisplayUnavailable(NativeApi::Glx).code(),
            InteropError::ConfigUnavailable.code(),
            InteropError::ContextCreationFailed.code(),
            HostError::NotLoaded.code(),
            HostError::AlreadyRunning.code(),
            HostError::ShareRootRejected(NativeApi::Egl).code(),
            HostError::ShareRootRejected(NativeApi::Glx).code(),
            HostError::ShareContextCreation.code(),
            HostError::Runtime(String::new()).code(),
        ];

        assert!(codes.iter().all(|c| *c < 0));
        assert_eq!(codes.iter().collect::<HashSet<_>>().len(), codes.len());
    }
}
