use crate::config::ConfigSource;

/// Initialization parameters for the GPU layer.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    ///
    /// Off by default: colors and textures are authored for a plain UNORM
    /// framebuffer and are written without conversion.
    pub prefer_srgb: bool,

    /// Present mode. FIFO (vsync) is supported everywhere.
    pub present_mode: wgpu::PresentMode,

    /// Alpha mode preference; replaced by a supported one if needed.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,

    /// Desired maximum frame latency for the surface. A hint.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: false,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}

impl GpuInit {
    /// Reads `[GFX] vsync` (default "True") and `[GFX] srgb` (default
    /// "False"). Like `fullscreen`, only the exact string "True" is true.
    pub fn from_source(source: &dyn ConfigSource) -> Self {
        let vsync = source.load_data("GFX", "vsync", "True") == "True";
        let prefer_srgb = source.load_data("GFX", "srgb", "False") == "True";
        Self {
            prefer_srgb,
            present_mode: if vsync {
                wgpu::PresentMode::Fifo
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;

    #[test]
    fn vsync_on_unless_disabled() {
        let init = GpuInit::from_source(&MapConfig::new());
        assert_eq!(init.present_mode, wgpu::PresentMode::Fifo);
        assert!(!init.prefer_srgb);

        let init = GpuInit::from_source(&MapConfig::new().with("GFX", "vsync", "False"));
        assert_eq!(init.present_mode, wgpu::PresentMode::AutoNoVsync);
    }

    #[test]
    fn srgb_needs_exact_true() {
        let init = GpuInit::from_source(&MapConfig::new().with("GFX", "srgb", "true"));
        assert!(!init.prefer_srgb);
        let init = GpuInit::from_source(&MapConfig::new().with("GFX", "srgb", "True"));
        assert!(init.prefer_srgb);
    }
}
