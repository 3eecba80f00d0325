use std::rc::Rc;
use log::{error, info};
use crate::errors::{HostError, InteropError};
use crate::gl::headless::HeadlessContext;
use crate::gl::{GpuContext, NativeApi, SurfaceFormat};

#[cfg(feature = "egl")]
use crate::gl::egl;
#[cfg(feature = "glx")]
use crate::gl::glx;

/// Result of context discovery, carried from the host thread into the event loop.
///
/// Exactly one variant is produced per process and it decides which sharing path
/// the graphics thread uses.
pub enum GraphicsBootstrap {
    /// Helper context created in the host's GLX share group.
    #[cfg(feature = "glx")]
    Glx(glx::GlxShareRoot),
    /// Host EGL context and display; the application context is created on adoption.
    #[cfg(feature = "egl")]
    Egl(egl::EglShareRoot),
    /// No GPU at all. Textures are bookkeeping only.
    Headless(SurfaceFormat),
}

impl std::fmt::Debug for GraphicsBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.api() {
            Some(api) => write!(f, "GraphicsBootstrap({api})"),
            None => write!(f, "GraphicsBootstrap(headless)"),
        }
    }
}

impl GraphicsBootstrap {
    pub fn api(&self) -> Option<NativeApi> {
        match self {
            #[cfg(feature = "glx")]
            GraphicsBootstrap::Glx(_) => Some(NativeApi::Glx),
            #[cfg(feature = "egl")]
            GraphicsBootstrap::Egl(_) => Some(NativeApi::Egl),
            GraphicsBootstrap::Headless(_) => None,
        }
    }

    /// Turn the captured state into the root context of the graphics thread.
    ///
    /// Must run on the graphics thread. GLX adopts the helper context as-is; EGL creates
    /// a new context on the host's display sharing with the host context.
    pub fn adopt(self, format: &SurfaceFormat) -> Result<Rc<dyn GpuContext>, HostError> {
        let context: Rc<dyn GpuContext> = match self {
            #[cfg(feature = "glx")]
            GraphicsBootstrap::Glx(root) => match glx::GlxContext::adopt(root) {
                Ok(ctx) => Rc::new(ctx),
                Err(e) => {
                    error!("Unable to adopt GLX share root: {e}");
                    return Err(HostError::ShareRootRejected(NativeApi::Glx));
                }
            },
            #[cfg(feature = "egl")]
            GraphicsBootstrap::Egl(root) => Rc::new(egl::EglContext::adopt(root, format)?),
            GraphicsBootstrap::Headless(captured) => {
                if captured != *format {
                    info!("Headless context uses captured format {captured}, requested {format}");
                }
                Rc::new(HeadlessContext::new(captured))
            }
        };

        info!("Adopted {} share root context ({})", context.name(), context.format());
        Ok(context)
    }
}

/// Inspect the calling thread's current GPU context, GLX first, then EGL.
///
/// Must run on the host thread that has its context current, before the event loop starts.
pub fn discover_and_capture_external_context(format: &SurfaceFormat) -> Result<GraphicsBootstrap, InteropError> {
    if let Some(bootstrap) = capture_glx(format)? {
        return Ok(bootstrap);
    }

    if let Some(bootstrap) = capture_egl()? {
        return Ok(bootstrap);
    }

    Err(InteropError::NoActiveContext)
}

#[cfg(feature = "glx")]
fn capture_glx(format: &SurfaceFormat) -> Result<Option<GraphicsBootstrap>, InteropError> {
    Ok(glx::capture(format)?.map(GraphicsBootstrap::Glx))
}

#[cfg(not(feature = "glx"))]
fn capture_glx(_format: &SurfaceFormat) -> Result<Option<GraphicsBootstrap>, InteropError> {
    Ok(None)
}

#[cfg(feature = "egl")]
fn capture_egl() -> Result<Option<GraphicsBootstrap>, InteropError> {
    Ok(egl::capture()?.map(GraphicsBootstrap::Egl))
}

#[cfg(not(feature = "egl"))]
fn capture_egl() -> Result<Option<GraphicsBootstrap>, InteropError> {
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_bootstrap_adopts_without_gpu() {
        let format = SurfaceFormat::default();
        let bootstrap = GraphicsBootstrap::Headless(format);
        assert_eq!(bootstrap.api(), None);

        let ctx = bootstrap.adopt(&format).unwrap();
        assert_eq!(ctx.name(), "headless");
        assert_eq!(ctx.format(), format);
    }

    #[test]
    fn thread_without_context_reports_none_active() {
        let result = std::thread::spawn(|| {
            discover_and_capture_external_context(&SurfaceFormat::default()).map(|b| b.api())
        })
        .join()
        .unwrap();

        assert!(matches!(result, Err(InteropError::NoActiveContext)));
    }
}
