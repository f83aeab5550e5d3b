use glam::{Mat4, Vec3};

use crate::coords::{ColorRgb, ColorRgba, Vec2, Viewport};
use crate::text::{FontSystem, TextError, layout};

use super::{BlendMode, BoundTexture, DrawCmd, DrawList, QuadCmd, Texture};

/// Orthographic projection mapping `(0, 0)..(width, height)` to clip space
/// with the origin top-left and +Y down.
pub fn ortho(width: f32, height: f32) -> Mat4 {
    Mat4::orthographic_rh_gl(0.0, width, height, 0.0, -1.0, 1.0)
}

/// `translate(position) * scale(size)` applied to the unit quad.
pub fn quad_model(position: Vec2, size: Vec2) -> Mat4 {
    Mat4::from_translation(Vec3::new(position.x, position.y, 0.0))
        * Mat4::from_scale(Vec3::new(size.x, size.y, 1.0))
}

/// Per-frame drawing state and command recorder.
///
/// Every state change (projection, viewport, blend mode, bound texture)
/// applies to the draws that follow it. Draws are recorded into a
/// [`DrawList`] and submitted by the GPU renderer when the frame is
/// presented.
#[derive(Debug)]
pub struct Canvas {
    projection: Mat4,
    view: Mat4,
    viewport: Viewport,
    blend: BlendMode,
    texture: BoundTexture,
    list: DrawList,
}

impl Canvas {
    /// Canvas with ortho and viewport covering `width x height`.
    pub fn new(width: u32, height: u32) -> Self {
        let mut canvas = Self {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            viewport: Viewport::default(),
            blend: BlendMode::Normal,
            texture: BoundTexture::None,
            list: DrawList::new(),
        };
        canvas.set_ortho(width as f32, height as f32);
        canvas.set_viewport(width, height);
        canvas
    }

    pub fn set_ortho(&mut self, width: f32, height: f32) {
        self.projection = ortho(width, height);
        self.view = Mat4::IDENTITY;
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
    }

    /// Clears color and depth. Draws recorded earlier in the frame are
    /// overwritten.
    pub fn clear_screen(&mut self, color: ColorRgb) {
        self.list.push(DrawCmd::Clear(color));
    }

    pub fn set_blend_normal(&mut self) {
        self.blend = BlendMode::Normal;
    }

    pub fn set_blend_additive(&mut self) {
        self.blend = BlendMode::Additive;
    }

    pub fn enable_texture(&mut self, texture: Texture) {
        self.texture = BoundTexture::Image(texture);
    }

    pub fn disable_texture(&mut self) {
        self.texture = BoundTexture::None;
    }

    /// Records one quad covering `position..position + size`.
    pub fn draw_quad(&mut self, position: Vec2, size: Vec2, color: ColorRgba) {
        self.list.push(DrawCmd::Quad(QuadCmd {
            projection: self.projection,
            view: self.view,
            model: quad_model(position, size),
            color,
            texture: self.texture.clone(),
            blend: self.blend,
            viewport: self.viewport,
        }));
    }

    /// Draws `text` with the active face, one quad per visible character.
    ///
    /// Glyphs are rasterized at `resolution` pixels and scaled to `size`.
    /// `position` is the top-left of the line. Every character advances the
    /// pen by `size / 1.5`; whitespace advances without drawing. The bound
    /// texture is left disabled afterwards.
    pub fn draw_text(
        &mut self,
        fonts: &mut FontSystem,
        position: Vec2,
        size: u32,
        resolution: u32,
        text: &str,
        color: ColorRgba,
    ) -> Result<(), TextError> {
        for (i, ch) in text.chars().enumerate() {
            let (key, glyph) = fonts.glyph(ch, resolution)?;
            if glyph.is_empty() {
                continue;
            }

            let (quad_pos, quad_size) = layout::glyph_quad(position, i, size, resolution, &glyph.metrics);
            self.texture = BoundTexture::Glyph { key, glyph };
            self.draw_quad(quad_pos, quad_size, color);
            self.texture = BoundTexture::None;
        }
        Ok(())
    }

    /// Width in pixels `text` would occupy at `size`. Rasterizes nothing.
    pub fn text_width(&self, size: u32, text: &str) -> i32 {
        layout::text_width(size, text)
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend
    }

    pub fn bound_texture(&self) -> &BoundTexture {
        &self.texture
    }

    pub fn draw_list(&self) -> &DrawList {
        &self.list
    }

    /// Hands the recorded frame to the caller and starts an empty one.
    pub fn take_frame(&mut self) -> DrawList {
        std::mem::take(&mut self.list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RawTexture;
    use crate::text::{FontId, Glyph, GlyphMetrics, Rasterizer};

    /// Every printable char is a `px/2 x px` box, whitespace is empty.
    struct BoxFont;

    impl Rasterizer for BoxFont {
        fn rasterize(&self, ch: char, px: f32) -> Glyph {
            if ch.is_whitespace() {
                return Glyph::default();
            }
            let (w, h) = ((px / 2.0) as u32, px as u32);
            Glyph {
                metrics: GlyphMetrics { left: 1, top: h as i32, width: w, height: h },
                bitmap: vec![255; (w * h) as usize],
            }
        }
    }

    fn fonts() -> FontSystem {
        let mut fonts = FontSystem::new();
        fonts.insert_face(FontId(0), BoxFont);
        fonts
    }

    fn only_quad(canvas: &Canvas) -> &QuadCmd {
        let quads: Vec<_> = canvas.draw_list().quads().collect();
        assert_eq!(quads.len(), 1);
        quads[0]
    }

    fn approx(a: glam::Vec4, b: glam::Vec4) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn draw_quad_model_is_translate_times_scale() {
        let mut canvas = Canvas::new(800, 600);
        canvas.draw_quad(Vec2::new(10.0, 20.0), Vec2::new(30.0, 40.0), ColorRgba::white());

        let q = only_quad(&canvas);
        let expected = Mat4::from_cols_array(&[
            30.0, 0.0, 0.0, 0.0, //
            0.0, 40.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            10.0, 20.0, 0.0, 1.0,
        ]);
        assert_eq!(q.model, expected);

        // unit quad corners land on the requested rectangle
        let far = q.model * glam::Vec4::new(1.0, 1.0, 0.0, 1.0);
        assert!(approx(far, glam::Vec4::new(40.0, 60.0, 0.0, 1.0)));
    }

    #[test]
    fn ortho_maps_top_left_origin_to_clip_space() {
        let canvas = Canvas::new(800, 600);
        let p = canvas.projection();
        assert!(approx(p * glam::Vec4::new(0.0, 0.0, 0.0, 1.0), glam::Vec4::new(-1.0, 1.0, 0.0, 1.0)));
        assert!(approx(p * glam::Vec4::new(800.0, 600.0, 0.0, 1.0), glam::Vec4::new(1.0, -1.0, 0.0, 1.0)));
        assert_eq!(canvas.view(), Mat4::IDENTITY);
    }

    #[test]
    fn quad_captures_state_at_record_time() {
        let mut canvas = Canvas::new(800, 600);
        canvas.set_viewport(320, 240);
        canvas.set_ortho(320.0, 240.0);
        canvas.draw_quad(Vec2::zero(), Vec2::new(1.0, 1.0), ColorRgba::black());
        canvas.set_viewport(800, 600);

        let q = only_quad(&canvas);
        assert_eq!(q.viewport, Viewport::new(320, 240));
        assert_eq!(q.projection, ortho(320.0, 240.0));
        assert_eq!(q.color, ColorRgba::black());
    }

    #[test]
    fn blend_modes_are_exclusive() {
        let mut canvas = Canvas::new(100, 100);
        assert_eq!(canvas.blend_mode(), BlendMode::Normal);

        canvas.set_blend_additive();
        canvas.draw_quad(Vec2::zero(), Vec2::new(1.0, 1.0), ColorRgba::white());
        canvas.set_blend_normal();
        canvas.draw_quad(Vec2::zero(), Vec2::new(1.0, 1.0), ColorRgba::white());

        let blends: Vec<_> = canvas.draw_list().quads().map(|q| q.blend).collect();
        assert_eq!(blends, vec![BlendMode::Additive, BlendMode::Normal]);
        assert_eq!(canvas.blend_mode(), BlendMode::Normal);
    }

    #[test]
    fn enable_and_disable_texture() {
        let tex = Texture { raw: RawTexture(7), width: 4, height: 4 };
        let mut canvas = Canvas::new(100, 100);

        canvas.enable_texture(tex);
        canvas.draw_quad(Vec2::zero(), Vec2::new(4.0, 4.0), ColorRgba::white());
        canvas.disable_texture();
        canvas.draw_quad(Vec2::zero(), Vec2::new(4.0, 4.0), ColorRgba::white());

        let textures: Vec<_> = canvas.draw_list().quads().map(|q| q.texture.clone()).collect();
        assert_eq!(textures, vec![BoundTexture::Image(tex), BoundTexture::None]);
    }

    #[test]
    fn clear_is_recorded_in_order() {
        let mut canvas = Canvas::new(100, 100);
        canvas.draw_quad(Vec2::zero(), Vec2::new(1.0, 1.0), ColorRgba::white());
        canvas.clear_screen(ColorRgb::new(0.1, 0.2, 0.3));

        let cmds = canvas.draw_list().cmds();
        assert!(matches!(cmds[0], DrawCmd::Quad(_)));
        assert_eq!(cmds[1], DrawCmd::Clear(ColorRgb::new(0.1, 0.2, 0.3)));
    }

    #[test]
    fn draw_text_hi_emits_two_quads_spaced_by_advance() {
        let mut fonts = fonts();
        let mut canvas = Canvas::new(800, 600);
        canvas
            .draw_text(&mut fonts, Vec2::new(10.0, 10.0), 16, 16, "Hi", ColorRgba::white())
            .unwrap();

        let quads: Vec<_> = canvas.draw_list().quads().collect();
        assert_eq!(quads.len(), 2);

        let x0 = quads[0].model.w_axis.x;
        let x1 = quads[1].model.w_axis.x;
        assert!((x1 - x0 - 16.0 / 1.5).abs() < 1e-4);

        // left bearing 1, top = height so the quad starts at the line top
        assert!((x0 - 11.0).abs() < 1e-4);
        assert!((quads[0].model.w_axis.y - 10.0).abs() < 1e-4);
        assert_eq!(quads[0].model.x_axis.x, 8.0);
        assert_eq!(quads[0].model.y_axis.y, 16.0);

        for q in &quads {
            assert!(matches!(q.texture, BoundTexture::Glyph { .. }));
        }
        assert!(canvas.bound_texture().is_none());
    }

    #[test]
    fn draw_text_scales_from_resolution() {
        let mut fonts = fonts();
        let mut canvas = Canvas::new(800, 600);
        canvas
            .draw_text(&mut fonts, Vec2::zero(), 16, 64, "A", ColorRgba::white())
            .unwrap();

        let q = only_quad(&canvas);
        assert_eq!(q.model.x_axis.x, 8.0);
        assert_eq!(q.model.y_axis.y, 16.0);
    }

    #[test]
    fn whitespace_advances_without_drawing() {
        let mut fonts = fonts();
        let mut canvas = Canvas::new(800, 600);
        canvas
            .draw_text(&mut fonts, Vec2::zero(), 15, 15, "a b", ColorRgba::white())
            .unwrap();

        let quads: Vec<_> = canvas.draw_list().quads().collect();
        assert_eq!(quads.len(), 2);
        let gap = quads[1].model.w_axis.x - quads[0].model.w_axis.x;
        assert!((gap - 2.0 * 15.0 / 1.5).abs() < 1e-4);
    }

    #[test]
    fn draw_text_unbinds_a_previously_enabled_texture() {
        let mut fonts = fonts();
        let mut canvas = Canvas::new(100, 100);
        canvas.enable_texture(Texture { raw: RawTexture(1), width: 1, height: 1 });
        canvas
            .draw_text(&mut fonts, Vec2::zero(), 16, 16, "x", ColorRgba::white())
            .unwrap();
        assert!(canvas.bound_texture().is_none());
    }

    #[test]
    fn draw_text_without_font_fails_and_draws_nothing() {
        let mut fonts = FontSystem::new();
        let mut canvas = Canvas::new(100, 100);
        let err = canvas
            .draw_text(&mut fonts, Vec2::zero(), 16, 16, "x", ColorRgba::white())
            .unwrap_err();
        assert!(matches!(err, TextError::NoActiveFace));
        assert!(canvas.draw_list().is_empty());
    }

    #[test]
    fn text_width_needs_no_font() {
        let canvas = Canvas::new(100, 100);
        assert_eq!(canvas.text_width(16, "abc"), 32);
    }

    #[test]
    fn take_frame_resets_the_list() {
        let mut canvas = Canvas::new(100, 100);
        canvas.clear_screen(ColorRgb::black());
        let frame = canvas.take_frame();
        assert_eq!(frame.len(), 1);
        assert!(canvas.draw_list().is_empty());
    }
}
