//! EGL backend, loaded at runtime through `khronos-egl`.
//!
//! Discovery only records the host's (context, display) pair. Adoption creates a
//! fresh context on the same display that shares the host context's resources.

use std::any::Any;
use std::ffi::c_void;
use std::rc::Rc;
use anyhow::{anyhow, Result};
use khronos_egl as egl;
use log::{debug, warn};
use crate::errors::{HostError, InteropError};
use crate::gl::context::{allocate_texture, release_texture};
use crate::gl::{GpuContext, NativeApi, OffscreenSurface, SurfaceFormat, TextureId};
use crate::viewport::SurfaceSize;

type Egl = egl::DynamicInstance<egl::EGL1_4>;

const OPENGL_ES3_BIT: egl::Int = 0x0040;

/// The host's current EGL context and display, captured on the host thread.
pub struct EglShareRoot {
    egl: Egl,
    display: egl::Display,
    context: egl::Context,
    api: egl::Enum,
}

// SAFETY: the host context is only named as a share partner, never made current by
// this crate, and the display handle is process-wide.
unsafe impl Send for EglShareRoot {}

/// Inspect the calling thread's EGL state.
///
/// Returns `Ok(None)` when libEGL cannot be loaded or no context is current.
pub fn capture() -> Result<Option<EglShareRoot>, InteropError> {
    let egl = match unsafe { Egl::load_required() } {
        Ok(egl) => egl,
        Err(e) => {
            debug!("EGL library unavailable: {e}");
            return Ok(None);
        }
    };

    let Some(context) = egl.get_current_context() else {
        return Ok(None);
    };
    let Some(display) = egl.get_current_display() else {
        return Err(InteropError::DisplayUnavailable(NativeApi::Egl));
    };
    let api = egl.query_api();

    debug!("Captured EGL context {:?} on display {:?}", context.as_ptr(), display.as_ptr());
    Ok(Some(EglShareRoot {
        egl,
        display,
        context,
        api,
    }))
}

fn config_attribs(format: &SurfaceFormat, api: egl::Enum) -> Vec<egl::Int> {
    let renderable = if api == egl::OPENGL_ES_API {
        OPENGL_ES3_BIT
    } else {
        egl::OPENGL_BIT
    };

    vec![
        egl::SURFACE_TYPE, egl::PBUFFER_BIT,
        egl::RENDERABLE_TYPE, renderable,
        egl::RED_SIZE, format.red as egl::Int,
        egl::GREEN_SIZE, format.green as egl::Int,
        egl::BLUE_SIZE, format.blue as egl::Int,
        egl::ALPHA_SIZE, format.alpha as egl::Int,
        egl::DEPTH_SIZE, format.depth as egl::Int,
        egl::STENCIL_SIZE, format.stencil as egl::Int,
        egl::NONE,
    ]
}

fn context_attribs(api: egl::Enum) -> Vec<egl::Int> {
    if api == egl::OPENGL_ES_API {
        vec![egl::CONTEXT_CLIENT_VERSION, 3, egl::NONE]
    } else {
        vec![egl::NONE]
    }
}

pub struct EglPbuffer {
    egl: Rc<Egl>,
    display: egl::Display,
    surface: egl::Surface,
}

impl OffscreenSurface for EglPbuffer {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for EglPbuffer {
    fn drop(&mut self) {
        if let Err(e) = self.egl.destroy_surface(self.display, self.surface) {
            warn!("eglDestroySurface failed: {e}");
        }
    }
}

/// Application context sharing with the host's EGL context.
pub struct EglContext {
    gl: glow::Context,
    _probe: EglPbuffer,
    egl: Rc<Egl>,
    display: egl::Display,
    config: egl::Config,
    context: egl::Context,
    format: SurfaceFormat,
}

impl EglContext {
    pub fn adopt(root: EglShareRoot, format: &SurfaceFormat) -> Result<Self, HostError> {
        let EglShareRoot { egl, display, context: host_context, api } = root;
        let egl = Rc::new(egl);

        egl.bind_api(api)
            .map_err(|_| HostError::ShareRootRejected(NativeApi::Egl))?;

        let config = egl
            .choose_first_config(display, &config_attribs(format, api))
            .ok()
            .flatten()
            .ok_or(HostError::ShareRootRejected(NativeApi::Egl))?;

        let context = egl
            .create_context(display, config, Some(host_context), &context_attribs(api))
            .map_err(|e| {
                warn!("eglCreateContext failed: {e}");
                HostError::ShareContextCreation
            })?;

        let probe = match create_pbuffer(&egl, display, config) {
            Ok(probe) => probe,
            Err(e) => {
                warn!("{e}");
                let _ = egl.destroy_context(display, context);
                return Err(HostError::ShareContextCreation);
            }
        };

        if egl.make_current(display, Some(probe.surface), Some(probe.surface), Some(context)).is_err() {
            drop(probe);
            let _ = egl.destroy_context(display, context);
            return Err(HostError::ShareContextCreation);
        }

        let gl = unsafe {
            glow::Context::from_loader_function(|name| {
                egl.get_proc_address(name)
                    .map_or(std::ptr::null(), |f| f as *const c_void)
            })
        };

        let _ = egl.make_current(display, None, None, None);

        Ok(Self {
            gl,
            _probe: probe,
            egl,
            display,
            config,
            context,
            format: *format,
        })
    }
}

fn create_pbuffer(egl: &Rc<Egl>, display: egl::Display, config: egl::Config) -> Result<EglPbuffer> {
    let attribs = [egl::WIDTH, 1, egl::HEIGHT, 1, egl::NONE];
    let surface = egl
        .create_pbuffer_surface(display, config, &attribs)
        .map_err(|e| anyhow!("eglCreatePbufferSurface failed: {e}"))?;

    Ok(EglPbuffer {
        egl: egl.clone(),
        display,
        surface,
    })
}

impl GpuContext for EglContext {
    fn name(&self) -> &str {
        "egl"
    }

    fn format(&self) -> SurfaceFormat {
        self.format
    }

    fn create_offscreen_surface(&self) -> Result<Box<dyn OffscreenSurface>> {
        Ok(Box::new(create_pbuffer(&self.egl, self.display, self.config)?))
    }

    fn make_current(&self, surface: &dyn OffscreenSurface) -> bool {
        let Some(pbuffer) = surface.as_any().downcast_ref::<EglPbuffer>() else {
            warn!("EGL context used with a non-EGL surface");
            return false;
        };

        self.egl
            .make_current(self.display, Some(pbuffer.surface), Some(pbuffer.surface), Some(self.context))
            .is_ok()
    }

    fn done_current(&self) {
        let _ = self.egl.make_current(self.display, None, None, None);
    }

    fn create_texture(&self, size: SurfaceSize) -> Result<TextureId> {
        allocate_texture(&self.gl, size)
    }

    fn delete_texture(&self, texture: TextureId) {
        release_texture(&self.gl, texture);
    }
}

impl Drop for EglContext {
    fn drop(&mut self) {
        self.done_current();
        if let Err(e) = self.egl.destroy_context(self.display, self.context) {
            warn!("eglDestroyContext failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gles_hosts_get_an_es3_config_and_context() {
        let attribs = config_attribs(&SurfaceFormat::default(), egl::OPENGL_ES_API);
        assert!(attribs.windows(2).any(|w| w == [egl::RENDERABLE_TYPE, OPENGL_ES3_BIT]));
        assert_eq!(context_attribs(egl::OPENGL_ES_API), vec![egl::CONTEXT_CLIENT_VERSION, 3, egl::NONE]);
    }

    #[test]
    fn desktop_gl_hosts_get_an_opengl_config() {
        let attribs = config_attribs(&SurfaceFormat::default(), egl::OPENGL_API);
        assert!(attribs.windows(2).any(|w| w == [egl::RENDERABLE_TYPE, egl::OPENGL_BIT]));
        assert_eq!(*attribs.last().unwrap(), egl::NONE);
        assert_eq!(context_attribs(egl::OPENGL_API), vec![egl::NONE]);
    }
}
