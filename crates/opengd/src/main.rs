use std::process::ExitCode;

use opengd_engine::assets::{AssetRegistry, SoundLoader};
use opengd_engine::config::{AssetManifest, ConfigSource, GraphicsConfig, TomlConfig};
use opengd_engine::coords::{ColorRgb, ColorRgba, Vec2};
use opengd_engine::core::{Graphics, GraphicsInit};
use opengd_engine::device::GpuInit;
use opengd_engine::logging::{LoggingConfig, init_logging};
use opengd_engine::render::ShaderSources;
use opengd_engine::text::FontId;
use opengd_engine::time::FrameLimiter;

const CONFIG_PATH: &str = "config.toml";
const TARGET_FPS: f32 = 60.0;

fn main() -> ExitCode {
    let (config, config_error) = match TomlConfig::load(CONFIG_PATH) {
        Ok(config) => (config, None),
        Err(e) => (TomlConfig::default(), Some(e)),
    };

    init_logging(LoggingConfig::from_source(&config));
    log::info!("Launched OpenGD {}", env!("CARGO_PKG_VERSION"));
    if let Some(e) = config_error {
        log::warn!("{e}; using default settings");
    }

    let gfx = GraphicsConfig::from_source(&config);
    let init = GraphicsInit {
        gpu: GpuInit::from_source(&config),
        shaders: shader_sources(&config),
        ..GraphicsInit::default()
    };

    let mut graphics = match Graphics::create(&gfx, init) {
        Ok(graphics) => graphics,
        Err(e) => {
            log::error!("could not create the graphics context: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let mut assets = AssetRegistry::new();
    let manifest = AssetManifest::from_source(&config);
    load_assets(&mut graphics, &mut assets, &manifest);

    run(&mut graphics, &assets);

    graphics.kill();
    ExitCode::SUCCESS
}

/// Shader files named in `[GFX]`, or the built-in sources when they cannot
/// be read.
fn shader_sources(config: &dyn ConfigSource) -> ShaderSources {
    let vertex = config.load_data("GFX", "vertex_shader", "assets/shaders/quad2d.vert.wgsl");
    let fragment = config.load_data("GFX", "fragment_shader", "assets/shaders/quad2d.frag.wgsl");
    match ShaderSources::from_files(&vertex, &fragment) {
        Ok(sources) => sources,
        Err(e) => {
            log::warn!("{e}; using built-in shaders");
            ShaderSources::builtin()
        }
    }
}

fn load_assets(graphics: &mut Graphics, assets: &mut AssetRegistry, manifest: &AssetManifest) {
    for path in &manifest.textures {
        assets.push_texture_path(path);
    }
    for path in &manifest.sounds {
        assets.push_sound_path(path);
    }

    if let Some(mut textures) = graphics.texture_loader() {
        let report = assets.load_everything(&mut textures, &mut SoundLoader);
        log::info!("assets: {} loaded, {} failed", report.loaded, report.failed);
    }

    for (i, path) in manifest.fonts.iter().enumerate() {
        if let Err(e) = graphics.load_font(path, FontId(i as u32)) {
            log::error!("{e}");
        }
    }
}

fn run(graphics: &mut Graphics, assets: &AssetRegistry) {
    let mut limiter = FrameLimiter::from_fps(TARGET_FPS);
    let mut text_failed = false;

    while !graphics.should_close() {
        limiter.begin();

        if let Some((w, h)) = graphics.take_resize() {
            graphics.set_viewport(w, h);
            graphics.set_ortho(w as f32, h as f32);
        }

        graphics.clear_screen(ColorRgb::black());

        if let Ok(background) = assets.texture(0) {
            let size = Vec2::new(graphics.width() as f32, graphics.height() as f32);
            graphics.enable_texture(*background);
            graphics.draw_quad(Vec2::zero(), size, ColorRgba::white());
            graphics.disable_texture();
        }

        if !text_failed {
            let label = "OpenGD";
            let x = (graphics.width() as i32 - graphics.text_width(32, label)) / 2;
            let drawn = graphics.draw_text(Vec2::new(x as f32, 16.0), 32, 64, label, ColorRgba::white());
            if let Err(e) = drawn {
                log::warn!("text disabled: {e}");
                text_failed = true;
            }
        }

        graphics.poll_events();
        limiter.wait();
    }
}
