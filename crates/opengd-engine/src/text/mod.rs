//! Glyph rasterization and text layout.
//!
//! - [`FontSystem`] owns font faces keyed by caller-chosen [`FontId`]s and
//!   tracks the active face used by `Canvas::draw_text`
//! - [`Rasterizer::rasterize`] is a pure `(face, char, px) -> Glyph` call;
//!   pixel size is never stored on the face
//! - [`GlyphCache`] memoizes rasterized glyphs by `(face, px, char)` with
//!   LRU eviction
//! - [`layout`] holds the fixed-advance text metrics

mod cache;
mod font_system;
mod glyph;
pub mod layout;

pub use cache::{GlyphCache, GlyphCacheConfig, GlyphKey};
pub use font_system::{FontId, FontSystem, TextError};
pub use glyph::{Glyph, GlyphMetrics, Rasterizer};
