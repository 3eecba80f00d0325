//! Viewport definition for the off-screen render target.
//!
//! A [`Viewport`] describes the area the embedded scene is laid out in. The
//! bridge keeps one per instance and sizes both the scene root and the GPU
//! texture from it, so the texture is always exactly `width` x `height`.
//!
//! ```
//! use offscreen_webview::viewport::Viewport;
//!
//! let mut vp = Viewport::new(0, 0, 800, 600);
//! vp.resize(400, 300);
//! assert_eq!(vp.as_size().width, 400);
//! assert_eq!(vp, Viewport::new(0, 0, 400, 300));
//! ```

/// Size of a surface or texture in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Converts signed sizes coming over the C boundary. Returns `None` unless both are positive.
    pub fn from_signed(width: i32, height: i32) -> Option<Self> {
        let width = u32::try_from(width).ok().filter(|w| *w > 0)?;
        let height = u32::try_from(height).ok().filter(|h| *h > 0)?;
        Some(Self { width, height })
    }

}

impl From<Viewport> for SurfaceSize {
    fn from(vp: Viewport) -> Self {
        Self {
            width: vp.width,
            height: vp.height,
        }
    }
}

/// Represents the viewport the scene is rendered for.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    /// Horizontal offset in pixels from the origin.
    pub x: i32,

    /// Vertical offset in pixels from the origin.
    pub y: i32,

    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,
}

impl std::fmt::Debug for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Viewport {{ x: {}, y: {}, width: {}, height: {} }}",
            self.x, self.y, self.width, self.height
        )
    }
}

impl Viewport {
    /// Creates a new [`Viewport`] with the given position and size.
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Viewport anchored at the origin with the given size.
    pub fn sized(size: SurfaceSize) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// Resizes the viewport to the given width and height.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Converts this viewport to a [`SurfaceSize`].
    pub fn as_size(&self) -> SurfaceSize {
        SurfaceSize {
            width: self.width,
            height: self.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_sizes_must_be_positive() {
        assert_eq!(SurfaceSize::from_signed(800, 600), Some(SurfaceSize::new(800, 600)));
        assert_eq!(SurfaceSize::from_signed(0, 600), None);
        assert_eq!(SurfaceSize::from_signed(800, -1), None);
    }

    #[test]
    fn resize_keeps_origin() {
        let mut vp = Viewport::new(3, 4, 800, 600);
        vp.resize(1, 2);
        assert_eq!(vp, Viewport::new(3, 4, 1, 2));
        assert_eq!(SurfaceSize::from(vp), SurfaceSize::new(1, 2));
    }
}
