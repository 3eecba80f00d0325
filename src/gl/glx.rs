//! GLX backend, loaded at runtime through `x11-dl`.
//!
//! The host's context is never used directly: discovery creates a helper context in
//! the host's share group and that helper becomes the graphics thread's root context.

use std::any::Any;
use std::ffi::{c_void, CString};
use std::os::raw::c_int;
use std::ptr;
use anyhow::{anyhow, Result};
use log::{debug, warn};
use x11_dl::glx::{self, GLXContext, GLXFBConfig, GLXPbuffer, Glx};
use x11_dl::xlib::{Display, Xlib};
use crate::errors::InteropError;
use crate::gl::context::{allocate_texture, release_texture};
use crate::gl::{GpuContext, NativeApi, OffscreenSurface, SurfaceFormat, TextureId};
use crate::viewport::SurfaceSize;

const TRUE: c_int = 1;

/// Helper context created in the host's share group, not yet adopted.
pub struct GlxShareRoot {
    _xlib: Xlib,
    glx: Glx,
    display: *mut Display,
    config: GLXFBConfig,
    context: GLXContext,
    format: SurfaceFormat,
}

// SAFETY: the helper context is never current while the root moves between the
// host thread (capture) and the graphics thread (adoption); the display pointer is
// only used from the graphics thread afterwards.
unsafe impl Send for GlxShareRoot {}

impl Drop for GlxShareRoot {
    fn drop(&mut self) {
        unsafe { (self.glx.glXDestroyContext)(self.display, self.context) };
    }
}

fn fb_config_attribs(format: &SurfaceFormat) -> Vec<c_int> {
    vec![
        glx::GLX_X_RENDERABLE, TRUE,
        glx::GLX_DRAWABLE_TYPE, glx::GLX_WINDOW_BIT | glx::GLX_PBUFFER_BIT,
        glx::GLX_RENDER_TYPE, glx::GLX_RGBA_BIT,
        glx::GLX_X_VISUAL_TYPE, glx::GLX_TRUE_COLOR,
        glx::GLX_RED_SIZE, format.red as c_int,
        glx::GLX_GREEN_SIZE, format.green as c_int,
        glx::GLX_BLUE_SIZE, format.blue as c_int,
        glx::GLX_ALPHA_SIZE, format.alpha as c_int,
        glx::GLX_DEPTH_SIZE, format.depth as c_int,
        glx::GLX_STENCIL_SIZE, format.stencil as c_int,
        glx::GLX_DOUBLEBUFFER, format.double_buffer as c_int,
        0,
    ]
}

/// Inspect the calling thread's GLX state.
///
/// Returns `Ok(None)` when libGL cannot be loaded or no GLX context is current, so the
/// caller can fall through to EGL.
pub fn capture(format: &SurfaceFormat) -> Result<Option<GlxShareRoot>, InteropError> {
    let (Ok(xlib), Ok(glx)) = (Xlib::open(), Glx::open()) else {
        debug!("GLX libraries unavailable, skipping GLX probe");
        return Ok(None);
    };

    let external = unsafe { (glx.glXGetCurrentContext)() };
    if external.is_null() {
        return Ok(None);
    }

    let display = unsafe { (glx.glXGetCurrentDisplay)() };
    if display.is_null() {
        return Err(InteropError::DisplayUnavailable(NativeApi::Glx));
    }

    let screen = unsafe { (xlib.XDefaultScreen)(display) };
    let attribs = fb_config_attribs(format);
    let mut count: c_int = 0;
    let configs = unsafe { (glx.glXChooseFBConfig)(display, screen, attribs.as_ptr(), &mut count) };
    if configs.is_null() || count == 0 {
        if !configs.is_null() {
            unsafe { (xlib.XFree)(configs as *mut c_void) };
        }
        return Err(InteropError::ConfigUnavailable);
    }

    let config = unsafe { *configs };
    let context = unsafe { (glx.glXCreateNewContext)(display, config, glx::GLX_RGBA_TYPE, external, TRUE) };
    unsafe { (xlib.XFree)(configs as *mut c_void) };

    if context.is_null() {
        return Err(InteropError::ContextCreationFailed);
    }

    debug!("Captured GLX share root ({count} matching configs)");
    Ok(Some(GlxShareRoot {
        _xlib: xlib,
        glx,
        display,
        config,
        context,
        format: *format,
    }))
}

pub struct GlxPbuffer {
    display: *mut Display,
    pbuffer: GLXPbuffer,
    destroy: unsafe extern "C" fn(*mut Display, GLXPbuffer),
}

impl OffscreenSurface for GlxPbuffer {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for GlxPbuffer {
    fn drop(&mut self) {
        unsafe { (self.destroy)(self.display, self.pbuffer) };
    }
}

/// Adopted GLX root context.
pub struct GlxContext {
    gl: glow::Context,
    _probe: GlxPbuffer,
    root: GlxShareRoot,
}

impl GlxContext {
    /// Adopt a captured share root. GL entry points are resolved with the context
    /// current on a private pbuffer.
    pub fn adopt(root: GlxShareRoot) -> Result<Self> {
        let probe = create_pbuffer(&root)?;

        let made_current = unsafe {
            (root.glx.glXMakeContextCurrent)(root.display, probe.pbuffer, probe.pbuffer, root.context)
        };
        if made_current == 0 {
            return Err(anyhow!("glXMakeContextCurrent failed on adoption"));
        }

        let get_proc = root.glx.glXGetProcAddress;
        let gl = unsafe {
            glow::Context::from_loader_function(|name| {
                CString::new(name)
                    .ok()
                    .and_then(|name| get_proc(name.as_ptr() as *const u8))
                    .map_or(ptr::null(), |f| f as *const c_void)
            })
        };

        unsafe { (root.glx.glXMakeContextCurrent)(root.display, 0, 0, ptr::null_mut()) };

        Ok(Self { gl, _probe: probe, root })
    }
}

fn create_pbuffer(root: &GlxShareRoot) -> Result<GlxPbuffer> {
    let attribs = [glx::GLX_PBUFFER_WIDTH, 1, glx::GLX_PBUFFER_HEIGHT, 1, 0];
    let pbuffer = unsafe { (root.glx.glXCreatePbuffer)(root.display, root.config, attribs.as_ptr()) };
    if pbuffer == 0 {
        return Err(anyhow!("glXCreatePbuffer failed"));
    }

    Ok(GlxPbuffer {
        display: root.display,
        pbuffer,
        destroy: root.glx.glXDestroyPbuffer,
    })
}

impl GpuContext for GlxContext {
    fn name(&self) -> &str {
        "glx"
    }

    fn format(&self) -> SurfaceFormat {
        self.root.format
    }

    fn create_offscreen_surface(&self) -> Result<Box<dyn OffscreenSurface>> {
        Ok(Box::new(create_pbuffer(&self.root)?))
    }

    fn make_current(&self, surface: &dyn OffscreenSurface) -> bool {
        let Some(pbuffer) = surface.as_any().downcast_ref::<GlxPbuffer>() else {
            warn!("GLX context used with a non-GLX surface");
            return false;
        };

        unsafe {
            (self.root.glx.glXMakeContextCurrent)(self.root.display, pbuffer.pbuffer, pbuffer.pbuffer, self.root.context) != 0
        }
    }

    fn done_current(&self) {
        unsafe { (self.root.glx.glXMakeContextCurrent)(self.root.display, 0, 0, ptr::null_mut()) };
    }

    fn create_texture(&self, size: SurfaceSize) -> Result<TextureId> {
        allocate_texture(&self.gl, size)
    }

    fn delete_texture(&self, texture: TextureId) {
        release_texture(&self.gl, texture);
    }
}

impl Drop for GlxContext {
    fn drop(&mut self) {
        // The context must not be current anywhere when the root destroys it.
        self.done_current();
    }
}
