use std::sync::Arc;

use crate::text::{Glyph, GlyphKey};

use super::Texture;

/// Framebuffer blending. Exactly one mode is active at a time.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum BlendMode {
    /// `src * src.a + dst * (1 - src.a)`
    #[default]
    Normal,
    /// `src * src.a + dst`
    Additive,
}

impl BlendMode {
    pub fn blend_state(self) -> wgpu::BlendState {
        let dst_factor = match self {
            BlendMode::Normal => wgpu::BlendFactor::OneMinusSrcAlpha,
            BlendMode::Additive => wgpu::BlendFactor::One,
        };
        let component = wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor,
            operation: wgpu::BlendOperation::Add,
        };
        wgpu::BlendState {
            color: component,
            alpha: component,
        }
    }
}

/// How the fragment stage interprets the bound texture.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum Sampling {
    /// RGBA texel multiplied with the color uniform.
    #[default]
    Color,
    /// Single-channel coverage: red becomes alpha, RGB is white.
    AlphaMask,
}

impl Sampling {
    /// Value of the `sampling` uniform read by the fragment shader.
    pub fn as_uniform(self) -> u32 {
        match self {
            Sampling::Color => 0,
            Sampling::AlphaMask => 1,
        }
    }
}

/// Texture bound for subsequent quad draws.
#[derive(Debug, Clone, Default)]
pub enum BoundTexture {
    /// Nothing bound; draws sample a white texel.
    #[default]
    None,
    Image(Texture),
    /// A rasterized glyph, uploaded lazily by the renderer.
    Glyph { key: GlyphKey, glyph: Arc<Glyph> },
}

impl BoundTexture {
    pub fn sampling(&self) -> Sampling {
        match self {
            BoundTexture::Glyph { .. } => Sampling::AlphaMask,
            BoundTexture::None | BoundTexture::Image(_) => Sampling::Color,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, BoundTexture::None)
    }
}

impl PartialEq for BoundTexture {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (BoundTexture::None, BoundTexture::None) => true,
            (BoundTexture::Image(a), BoundTexture::Image(b)) => a == b,
            (BoundTexture::Glyph { key: a, .. }, BoundTexture::Glyph { key: b, .. }) => a == b,
            _ => false,
        }
    }
}
