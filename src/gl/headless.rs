//! GPU-less context. Texture names are handed out from a counter and tracked so
//! leaks and sizes can be checked; making the context current can be forced to fail.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use anyhow::{bail, Result};
use crate::gl::{GpuContext, OffscreenSurface, SurfaceFormat, TextureId};
use crate::viewport::SurfaceSize;

pub struct HeadlessContext {
    format: SurfaceFormat,
    next_texture: Cell<TextureId>,
    textures: RefCell<HashMap<TextureId, SurfaceSize>>,
    current: Cell<bool>,
    refuse_current: Cell<bool>,
}

impl HeadlessContext {
    pub fn new(format: SurfaceFormat) -> Self {
        Self {
            format,
            next_texture: Cell::new(1),
            textures: RefCell::new(HashMap::new()),
            current: Cell::new(false),
            refuse_current: Cell::new(false),
        }
    }

    /// When set, every `make_current` call fails.
    pub fn refuse_make_current(&self, refuse: bool) {
        self.refuse_current.set(refuse);
    }

    pub fn is_current(&self) -> bool {
        self.current.get()
    }

    /// Size of a live texture, `None` if it was never allocated or has been deleted.
    pub fn texture_size(&self, texture: TextureId) -> Option<SurfaceSize> {
        self.textures.borrow().get(&texture).copied()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.borrow().len()
    }
}

impl Default for HeadlessContext {
    fn default() -> Self {
        Self::new(SurfaceFormat::default())
    }
}

pub struct HeadlessSurface;

impl OffscreenSurface for HeadlessSurface {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl GpuContext for HeadlessContext {
    fn name(&self) -> &str {
        "headless"
    }

    fn format(&self) -> SurfaceFormat {
        self.format
    }

    fn create_offscreen_surface(&self) -> Result<Box<dyn OffscreenSurface>> {
        Ok(Box::new(HeadlessSurface))
    }

    fn make_current(&self, surface: &dyn OffscreenSurface) -> bool {
        if self.refuse_current.get() || surface.as_any().downcast_ref::<HeadlessSurface>().is_none() {
            return false;
        }

        self.current.set(true);
        true
    }

    fn done_current(&self) {
        self.current.set(false);
    }

    fn create_texture(&self, size: SurfaceSize) -> Result<TextureId> {
        if !self.current.get() {
            bail!("headless context is not current");
        }

        let id = self.next_texture.get();
        self.next_texture.set(id + 1);
        self.textures.borrow_mut().insert(id, size);
        Ok(id)
    }

    fn delete_texture(&self, texture: TextureId) {
        self.textures.borrow_mut().remove(&texture);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn textures_need_a_current_context() {
        let ctx = HeadlessContext::default();
        let surface = ctx.create_offscreen_surface().unwrap();

        assert!(ctx.create_texture(SurfaceSize::new(4, 4)).is_err());

        assert!(ctx.make_current(surface.as_ref()));
        let tex = ctx.create_texture(SurfaceSize::new(4, 4)).unwrap();
        assert_ne!(tex, 0);
        assert_eq!(ctx.texture_size(tex), Some(SurfaceSize::new(4, 4)));

        ctx.delete_texture(tex);
        ctx.done_current();
        assert_eq!(ctx.live_textures(), 0);
        assert!(!ctx.is_current());
    }

    #[test]
    fn refusal_blocks_make_current() {
        let ctx = HeadlessContext::default();
        let surface = ctx.create_offscreen_surface().unwrap();

        ctx.refuse_make_current(true);
        assert!(!ctx.make_current(surface.as_ref()));
        ctx.refuse_make_current(false);
        assert!(ctx.make_current(surface.as_ref()));
    }
}
