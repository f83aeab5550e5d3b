/// Placement metrics of one rasterized glyph, in pixels at the raster size.
///
/// `left` is the horizontal bearing from the pen position to the bitmap's
/// left edge; `top` is the distance from the baseline up to the bitmap's
/// top row.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct GlyphMetrics {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

/// A rasterized character: metrics plus an 8-bit coverage bitmap
/// (`width * height` bytes, row-major, top row first).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Glyph {
    pub metrics: GlyphMetrics,
    pub bitmap: Vec<u8>,
}

impl Glyph {
    /// True when there is nothing to draw (whitespace, unsupported char).
    pub fn is_empty(&self) -> bool {
        self.metrics.width == 0 || self.metrics.height == 0
    }
}

/// A font face able to rasterize characters at any pixel size.
///
/// Implementations must be pure: the same `(ch, px)` always yields the same
/// glyph and no size state is retained between calls.
pub trait Rasterizer {
    fn rasterize(&self, ch: char, px: f32) -> Glyph;
}

impl Rasterizer for fontdue::Font {
    fn rasterize(&self, ch: char, px: f32) -> Glyph {
        let (m, bitmap) = fontdue::Font::rasterize(self, ch, px);
        Glyph {
            metrics: GlyphMetrics {
                left: m.xmin,
                top: m.ymin + m.height as i32,
                width: m.width as u32,
                height: m.height as u32,
            },
            bitmap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_when_any_dimension_is_zero() {
        let mut g = Glyph::default();
        assert!(g.is_empty());
        g.metrics.width = 3;
        assert!(g.is_empty());
        g.metrics.height = 2;
        assert!(!g.is_empty());
    }
}
