/// Straight-alpha RGBA color with components in `[0, 1]`.
///
/// Passed to the shader as the `uColor` uniform. Blending treats alpha as
/// straight (not premultiplied).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ColorRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorRgba {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    #[inline]
    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Opaque RGB color, used for screen clears (alpha is always 1).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ColorRgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl ColorRgb {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    #[inline]
    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Expands to RGBA with `a = 1`.
    #[inline]
    pub const fn opaque(self) -> ColorRgba {
        ColorRgba::new(self.r, self.g, self.b, 1.0)
    }
}

impl From<ColorRgb> for wgpu::Color {
    fn from(c: ColorRgb) -> Self {
        wgpu::Color {
            r: c.r as f64,
            g: c.g as f64,
            b: c.b as f64,
            a: 1.0,
        }
    }
}
