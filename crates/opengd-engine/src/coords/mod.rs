//! Coordinate and color types shared by the canvas and renderers.
//!
//! Canonical CPU space:
//! - Screen pixels
//! - Origin top-left
//! - +X right, +Y down
//!
//! The orthographic projection set through `Canvas::set_ortho` maps this
//! space to clip space.

mod color;
mod vec2;
mod viewport;

pub use color::{ColorRgb, ColorRgba};
pub use vec2::Vec2;
pub use viewport::Viewport;
