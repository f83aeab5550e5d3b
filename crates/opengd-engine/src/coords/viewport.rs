/// GPU viewport rectangle anchored at the framebuffer origin, in pixels.
///
/// `Canvas::set_viewport(w, h)` produces `(0, 0, w, h)`; there is no offset.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}
