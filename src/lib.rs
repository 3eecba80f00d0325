pub mod config;
pub mod errors;
pub mod viewport;
pub mod gl;
pub mod scene;
pub mod bridge;
pub mod marshal;
pub mod host;
pub mod ffi;

pub use bridge::{BridgeId, RenderBridge};
pub use config::HostConfig;
pub use gl::{discover_and_capture_external_context, GraphicsBootstrap};
pub use marshal::{EventLoop, LoopContext, LoopProxy};
