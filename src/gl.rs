//! Graphics-context interop.
//!
//! Discovers the GPU context the host made current on its own thread, captures a
//! [`GraphicsBootstrap`] from it and later adopts that bootstrap as the shared root
//! context of the graphics thread. Two native APIs are supported: GLX (tied to the X
//! window system) and EGL (display-server independent). A headless backend stands in
//! when no GPU is available.

use std::fmt::{Display, Formatter};

mod bootstrap;
mod context;
mod format;
pub mod headless;

#[cfg(feature = "egl")]
pub mod egl;
#[cfg(feature = "glx")]
pub mod glx;

pub use bootstrap::{discover_and_capture_external_context, GraphicsBootstrap};
pub use context::{GpuContext, OffscreenSurface, TextureId, NO_TEXTURE};
pub use format::SurfaceFormat;

/// Native graphics API a context was discovered through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeApi {
    Glx,
    Egl,
}

impl Display for NativeApi {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NativeApi::Glx => write!(f, "GLX"),
            NativeApi::Egl => write!(f, "EGL"),
        }
    }
}
