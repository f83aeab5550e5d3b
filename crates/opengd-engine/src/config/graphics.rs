use super::ConfigSource;

const SECTION: &str = "GFX";
const DEFAULT_SIZE: u32 = 800;

/// Window settings read from the `GFX` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphicsConfig {
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            fullscreen: false,
        }
    }
}

impl GraphicsConfig {
    /// Reads `screen_width`, `screen_height` and `fullscreen`.
    ///
    /// Only the exact string `"True"` enables fullscreen. Unparsable or zero
    /// sizes fall back to 800 with a warning.
    pub fn from_source(source: &dyn ConfigSource) -> Self {
        let width = parse_size(source, "screen_width");
        let height = parse_size(source, "screen_height");
        let fullscreen = source.load_data(SECTION, "fullscreen", "False") == "True";

        Self { width, height, fullscreen }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

fn parse_size(source: &dyn ConfigSource, key: &str) -> u32 {
    let raw = source.load_data(SECTION, key, &DEFAULT_SIZE.to_string());
    match raw.trim().parse::<u32>() {
        Ok(v) if v > 0 => v,
        _ => {
            log::warn!("config {SECTION}.{key}: invalid size {raw:?}; using {DEFAULT_SIZE}");
            DEFAULT_SIZE
        }
    }
}
