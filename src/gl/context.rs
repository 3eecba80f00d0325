use std::any::Any;
use std::num::NonZeroU32;
use anyhow::{anyhow, Result};
use glow::HasContext;
use crate::gl::SurfaceFormat;
use crate::viewport::SurfaceSize;

/// GL texture name as seen by the host. `0` means "no texture".
pub type TextureId = u32;

pub const NO_TEXTURE: TextureId = 0;

/// Type-erased off-screen drawable, so a bridge can own one without knowing the backend.
pub trait OffscreenSurface: Any {
    fn as_any(&self) -> &dyn Any;
}

/// A GPU context owned by the graphics thread. All calls happen on that thread.
///
/// Texture calls require the context to be current; callers bracket them with
/// [`make_current`](GpuContext::make_current) and [`done_current`](GpuContext::done_current).
pub trait GpuContext {
    fn name(&self) -> &str;

    /// Pixel format the context was created with.
    fn format(&self) -> SurfaceFormat;

    /// Create a private drawable compatible with this context.
    fn create_offscreen_surface(&self) -> Result<Box<dyn OffscreenSurface>>;

    /// Bind the context to `surface` on the calling thread. Returns false on failure.
    fn make_current(&self, surface: &dyn OffscreenSurface) -> bool;

    /// Release the context from the calling thread.
    fn done_current(&self);

    /// Allocate a 2D texture of exactly `size`.
    fn create_texture(&self, size: SurfaceSize) -> Result<TextureId>;

    fn delete_texture(&self, texture: TextureId);
}

/// Allocates the render target texture: nearest filtering, sRGB internal format, no initial data.
pub(crate) fn allocate_texture(gl: &glow::Context, size: SurfaceSize) -> Result<TextureId> {
    let width = i32::try_from(size.width)?;
    let height = i32::try_from(size.height)?;

    unsafe {
        let texture = gl
            .create_texture()
            .map_err(|e| anyhow!("glGenTextures failed: {e}"))?;

        gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::NEAREST as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::NEAREST as i32);
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            glow::SRGB as i32,
            width,
            height,
            0,
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            glow::PixelUnpackData::Slice(None),
        );
        gl.bind_texture(glow::TEXTURE_2D, None);

        Ok(texture.0.get())
    }
}

pub(crate) fn release_texture(gl: &glow::Context, texture: TextureId) {
    if let Some(name) = NonZeroU32::new(texture) {
        unsafe { gl.delete_texture(glow::NativeTexture(name)) };
    }
}
