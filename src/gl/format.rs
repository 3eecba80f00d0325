use std::fmt::{Display, Formatter};

/// Pixel format requested for shared contexts and their off-screen surfaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceFormat {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
    pub depth: u8,
    pub stencil: u8,
    pub double_buffer: bool,
}

impl Default for SurfaceFormat {
    fn default() -> Self {
        Self {
            red: 8,
            green: 8,
            blue: 8,
            alpha: 8,
            depth: 24,
            stencil: 8,
            double_buffer: true,
        }
    }
}

impl Display for SurfaceFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RGBA={}{}{}{}, Depth={}, Stencil={}, DoubleBuffer={}",
            self.red, self.green, self.blue, self.alpha, self.depth, self.stencil, self.double_buffer
        )
    }
}
