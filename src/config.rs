use std::time::Duration;
use crate::gl::SurfaceFormat;

/// Root scene description loaded by every bridge.
pub const DEFAULT_SCENE_SOURCE: &str = "embedded://webview";

/// Host configuration shared by the graphics thread and every bridge it creates.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Scene description handed to the scene builder for each new bridge
    pub scene_source: String,
    /// Pixel format requested for shared contexts and off-screen surfaces
    pub surface_format: SurfaceFormat,
    /// Interval of the scene tick while any scene is animating or loading
    pub tick_interval: Duration,
    /// Default `env_logger` filter when `RUST_LOG` is not set
    pub log_filter: String,
    /// Progress added per tick by the headless web view
    pub headless_load_step: u8,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            scene_source: DEFAULT_SCENE_SOURCE.to_string(),
            surface_format: SurfaceFormat::default(),
            tick_interval: Duration::from_millis(16),    // ~60hz
            log_filter: "info".to_string(),
            headless_load_step: 10,
        }
    }
}
