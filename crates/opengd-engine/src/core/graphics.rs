use std::path::Path;

use anyhow::Result;

use crate::assets::GpuTextureLoader;
use crate::config::GraphicsConfig;
use crate::coords::{ColorRgb, ColorRgba, Vec2};
use crate::device::{GpuInit, SurfaceErrorAction};
use crate::render::{
    BlendMode, Canvas, GeometryCache, QuadRenderer, RenderCtx, RenderTarget, ShaderProgram,
    ShaderSources, Texture, TextureStore,
};
use crate::text::{FontId, FontSystem, GlyphCacheConfig, TextError};
use crate::time::{FrameClock, FrameTime};
use crate::window::{Platform, WindowSettings};

/// Creation parameters beyond the user-facing [`GraphicsConfig`].
#[derive(Debug, Clone)]
pub struct GraphicsInit {
    pub title: String,
    pub gpu: GpuInit,
    pub shaders: ShaderSources,
    pub glyph_cache: GlyphCacheConfig,
}

impl Default for GraphicsInit {
    fn default() -> Self {
        Self {
            title: "OpenGD".to_string(),
            gpu: GpuInit::default(),
            shaders: ShaderSources::builtin(),
            glyph_cache: GlyphCacheConfig::default(),
        }
    }
}

/// The window, its GPU context and everything drawn into it.
///
/// Per frame: issue state changes and draws, then call
/// [`poll_events`](Self::poll_events) which presents what was recorded and
/// processes platform events.
pub struct Graphics {
    platform: Platform,
    canvas: Canvas,
    program: Option<ShaderProgram>,
    geometry: GeometryCache,
    textures: TextureStore,
    renderer: QuadRenderer,
    fonts: FontSystem,
    clock: FrameClock,
    last_frame: Option<FrameTime>,
}

impl Graphics {
    /// Opens the window and builds the GPU state.
    ///
    /// A shader that fails to compile is logged and leaves the program
    /// unset: the window still opens and quad draws are skipped.
    pub fn create(config: &GraphicsConfig, init: GraphicsInit) -> Result<Self> {
        let settings = WindowSettings {
            title: init.title,
            width: config.width,
            height: config.height,
            fullscreen: config.fullscreen,
        };
        let platform = Platform::create(settings, init.gpu)?;

        let Some(gpu) = platform.gpu() else {
            anyhow::bail!("GPU context missing after window creation");
        };
        let textures = TextureStore::new(gpu.device(), gpu.queue());

        let program = match ShaderProgram::new(gpu.device(), gpu.surface_format(), &init.shaders, textures.layout()) {
            Ok(program) => Some(program),
            Err(e) => {
                log::error!("{e}");
                None
            }
        };

        let mut geometry = GeometryCache::new();
        geometry.quad(gpu.device());

        let (width, height) = platform.size();
        log::info!("graphics ready: {width}x{height}");

        Ok(Self {
            canvas: Canvas::new(width, height),
            program,
            geometry,
            textures,
            renderer: QuadRenderer::new(),
            fonts: FontSystem::with_cache(init.glyph_cache),
            clock: FrameClock::new(),
            last_frame: None,
            platform,
        })
    }

    pub fn should_close(&self) -> bool {
        self.platform.should_close()
    }

    /// True when the shader program compiled and quads are drawn.
    pub fn has_program(&self) -> bool {
        self.program.is_some()
    }

    pub fn set_ortho(&mut self, width: f32, height: f32) {
        self.canvas.set_ortho(width, height);
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.canvas.set_viewport(width, height);
    }

    pub fn clear_screen(&mut self, color: ColorRgb) {
        self.canvas.clear_screen(color);
    }

    pub fn set_blend_normal(&mut self) {
        self.canvas.set_blend_normal();
    }

    pub fn set_blend_additive(&mut self) {
        self.canvas.set_blend_additive();
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.canvas.blend_mode()
    }

    pub fn enable_texture(&mut self, texture: Texture) {
        self.canvas.enable_texture(texture);
    }

    pub fn disable_texture(&mut self) {
        self.canvas.disable_texture();
    }

    pub fn draw_quad(&mut self, position: Vec2, size: Vec2, color: ColorRgba) {
        self.canvas.draw_quad(position, size, color);
    }

    /// See [`Canvas::draw_text`].
    pub fn draw_text(
        &mut self,
        position: Vec2,
        size: u32,
        resolution: u32,
        text: &str,
        color: ColorRgba,
    ) -> Result<(), TextError> {
        self.canvas
            .draw_text(&mut self.fonts, position, size, resolution, text, color)
    }

    pub fn text_width(&self, size: u32, text: &str) -> i32 {
        self.canvas.text_width(size, text)
    }

    pub fn load_font(&mut self, path: impl AsRef<Path>, id: FontId) -> Result<(), TextError> {
        self.fonts.load_font(path, id)
    }

    pub fn fonts_mut(&mut self) -> &mut FontSystem {
        &mut self.fonts
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Loader that decodes images straight into this context's textures.
    pub fn texture_loader(&mut self) -> Option<GpuTextureLoader<'_>> {
        let gpu = self.platform.gpu()?;
        Some(GpuTextureLoader {
            device: gpu.device(),
            queue: gpu.queue(),
            store: &mut self.textures,
        })
    }

    /// Presents the recorded frame, then processes pending platform events.
    pub fn poll_events(&mut self) {
        self.present();
        self.platform.pump();
        self.last_frame = Some(self.clock.tick());
    }

    /// New drawable size if the window changed since the last call.
    pub fn take_resize(&mut self) -> Option<(u32, u32)> {
        self.platform.take_resize()
    }

    /// Seconds since creation.
    pub fn time(&self) -> f64 {
        self.clock.elapsed()
    }

    /// Timing of the last presented frame.
    pub fn last_frame(&self) -> Option<FrameTime> {
        self.last_frame
    }

    pub fn width(&self) -> u32 {
        self.platform.size().0
    }

    pub fn height(&self) -> u32 {
        self.platform.size().1
    }

    pub fn screen_aspect(&self) -> f32 {
        let (w, h) = self.platform.size();
        w as f32 / h.max(1) as f32
    }

    /// Destroys GPU resources and the window, then the event loop.
    pub fn kill(self) {
        let Self {
            platform,
            program,
            geometry,
            textures,
            renderer,
            ..
        } = self;
        drop((renderer, textures, geometry, program));
        platform.close();
        log::info!("graphics shut down");
    }

    fn present(&mut self) {
        let list = self.canvas.take_frame();

        let begun = match self.platform.gpu() {
            Some(gpu) => gpu.begin_frame(),
            None => return,
        };
        let mut frame = match begun {
            Ok(frame) => frame,
            Err(err) => {
                let action = self.platform.with_gpu_mut(|gpu| gpu.handle_surface_error(err));
                if action == Some(SurfaceErrorAction::Fatal) {
                    log::error!("surface lost beyond recovery; closing");
                    self.platform.request_close();
                }
                return;
            }
        };

        let Some(gpu) = self.platform.gpu() else { return };
        let size = gpu.size();
        let ctx = RenderCtx::new(gpu.device(), gpu.queue(), gpu.surface_format(), (size.width, size.height));
        let quad = self.geometry.quad(gpu.device());
        {
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view, gpu.depth_view());
            self.renderer
                .render(&ctx, &mut target, self.program.as_ref(), quad, &self.textures, &list);
        }
        gpu.submit(frame);
    }
}
