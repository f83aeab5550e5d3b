//! Fixed-advance text layout.
//!
//! Every character advances the pen by `size / 1.5` pixels regardless of its
//! real width. Drawing and measuring share this rule so measured widths match
//! what is drawn.

use crate::coords::Vec2;

use super::GlyphMetrics;

/// Horizontal distance between consecutive character origins.
#[inline]
pub fn advance(size: u32) -> f32 {
    size as f32 / 1.5
}

/// Width in pixels of `text` drawn at `size`: `chars * size / 1.5`,
/// truncated toward zero.
///
/// No glyph is rasterized.
pub fn text_width(size: u32, text: &str) -> i32 {
    let units = text.chars().count() as u64 * u64::from(size);
    (units as f64 / 1.5) as i32
}

/// Top-left corner and size of the quad for the `index`-th character.
///
/// `metrics` come from a glyph rasterized at `resolution` pixels and are
/// scaled to the draw `size`. The vertical origin is one `size` below
/// `origin`, so `origin` is the top of the text line.
pub fn glyph_quad(
    origin: Vec2,
    index: usize,
    size: u32,
    resolution: u32,
    metrics: &GlyphMetrics,
) -> (Vec2, Vec2) {
    let scale = size as f32 / resolution.max(1) as f32;
    let pen_x = (index as u64 * u64::from(size)) as f32 / 1.5;

    let position = origin
        + Vec2::new(
            metrics.left as f32 * scale + pen_x,
            -(metrics.top as f32) * scale + size as f32,
        );
    let extent = Vec2::new(metrics.width as f32 * scale, metrics.height as f32 * scale);
    (position, extent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_truncates_the_total() {
        // 3 * 16 / 1.5 = 32 exactly
        assert_eq!(text_width(16, "abc"), 32);
        // 1 * 16 / 1.5 = 10.67 -> 10
        assert_eq!(text_width(16, "a"), 10);
        // 2 * 16 / 1.5 = 21.33 -> 21 (not 2 * 10)
        assert_eq!(text_width(16, "ab"), 21);
        assert_eq!(text_width(16, ""), 0);
    }

    #[test]
    fn width_counts_characters_not_bytes() {
        assert_eq!(text_width(15, "é"), text_width(15, "e"));
    }

    #[test]
    fn width_matches_advance() {
        for size in [8, 12, 15, 16, 24, 33] {
            for n in 0..20usize {
                let text = "x".repeat(n);
                let expected = (n as f64 * size as f64 / 1.5) as i32;
                assert_eq!(text_width(size, &text), expected);
            }
        }
    }

    #[test]
    fn quad_at_native_resolution() {
        let m = GlyphMetrics { left: 2, top: 12, width: 9, height: 12 };
        let (pos, size) = glyph_quad(Vec2::new(10.0, 20.0), 0, 16, 16, &m);
        assert_eq!(pos, Vec2::new(12.0, 24.0));
        assert_eq!(size, Vec2::new(9.0, 12.0));
    }

    #[test]
    fn quad_scales_metrics_from_resolution() {
        let m = GlyphMetrics { left: 4, top: 24, width: 18, height: 24 };
        let (pos, size) = glyph_quad(Vec2::zero(), 0, 16, 32, &m);
        assert_eq!(pos, Vec2::new(2.0, 4.0));
        assert_eq!(size, Vec2::new(9.0, 12.0));
    }

    #[test]
    fn pen_advances_by_fixed_amount() {
        let m = GlyphMetrics::default();
        let (a, _) = glyph_quad(Vec2::zero(), 0, 16, 16, &m);
        let (b, _) = glyph_quad(Vec2::zero(), 1, 16, 16, &m);
        let (c, _) = glyph_quad(Vec2::zero(), 2, 16, 16, &m);
        assert!((b.x - a.x - advance(16)).abs() < 1e-4);
        assert!((c.x - b.x - advance(16)).abs() < 1e-4);
    }
}
