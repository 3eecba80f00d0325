//! Scene-graph collaborators driven by the render bridge.
//!
//! The web engine and its retained scene graph are external. A [`SceneBuilder`] turns
//! the fixed scene description into a [`Scene`]: the off-screen window, the render
//! control that runs frame phases, and the typed [`WebView`] root item. Notifications
//! flow back as [`SceneEvent`]s on the channel handed to the builder.

use anyhow::Result;
use url::Url;
use crate::gl::{SurfaceFormat, TextureId};
use crate::viewport::{SurfaceSize, Viewport};

pub mod event;
pub mod headless;

pub use event::{LifecycleState, LoadStatus, SceneEvent, SceneEventSender};

/// Texture the scene renders into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTarget {
    pub texture: TextureId,
    pub size: SurfaceSize,
}

/// Drives the scene graph's frame phases against the current GPU context.
pub trait RenderControl {
    /// Set up GPU-side scene resources. Emits [`SceneEvent::Initialized`] on success.
    fn initialize(&mut self) -> Result<()>;
    fn begin_frame(&mut self);
    /// Layout pass run before a sync.
    fn polish_items(&mut self);
    /// Synchronise the scene with its render tree. Returns true if anything changed.
    fn sync(&mut self) -> bool;
    /// Paint pass.
    fn render(&mut self);
    fn end_frame(&mut self);
}

/// Off-screen window hosting the scene.
pub trait SceneWindow {
    fn set_format(&mut self, format: SurfaceFormat);
    fn set_geometry(&mut self, geometry: Viewport);
    /// `None` detaches the current target.
    fn set_render_target(&mut self, target: Option<RenderTarget>);
    fn has_content_root(&self) -> bool;

    /// True while the scene has time-driven work (animations, page loads).
    fn wants_tick(&self) -> bool {
        false
    }

    fn tick(&mut self) {}
}

/// The web view capability of the scene's root item.
pub trait WebView {
    /// Size the root item.
    fn set_size(&mut self, size: SurfaceSize);
    fn set_url(&mut self, url: Url);
    fn url(&self) -> Option<Url>;
    /// Load progress in percent.
    fn load_progress(&self) -> u8;
    fn load_status(&self) -> LoadStatus;
    fn lifecycle_state(&self) -> LifecycleState;
    fn is_visible(&self) -> bool;
}

pub struct Scene {
    pub window: Box<dyn SceneWindow>,
    pub control: Box<dyn RenderControl>,
    pub root: Box<dyn WebView>,
}

/// Builds a scene from its description. Runs on the graphics thread with the shared
/// context current.
pub trait SceneBuilder {
    fn name(&self) -> &str;
    fn build(&self, source: &str, events: SceneEventSender) -> Result<Scene>;
}
